use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[serde(alias = "m", alias = "Male", alias = "MALE", alias = "ذكر")]
    Male,
    #[serde(alias = "f", alias = "Female", alias = "FEMALE", alias = "أنثى", alias = "انثى")]
    Female,
}

impl Gender {
    pub fn label_ar(self) -> &'static str {
        match self {
            Gender::Male => "ذكر",
            Gender::Female => "أنثى",
        }
    }
}

/// Club roster entry as delivered by the roster collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Athlete {
    pub id: String,
    #[serde(default, alias = "fullNameAr", alias = "nameAr")]
    pub name_ar: String,
    #[serde(default, alias = "fullNameLat", alias = "nameLat", alias = "name_en", alias = "nameEn")]
    pub name_lat: String,
    #[serde(default, alias = "birthDate", alias = "dateOfBirth", deserialize_with = "lenient::date")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::gender")]
    pub gender: Option<Gender>,
    #[serde(default, alias = "weight", deserialize_with = "lenient::f64_opt")]
    pub weight_kg: Option<f64>,
    #[serde(default, alias = "height", deserialize_with = "lenient::f64_opt")]
    pub height_cm: Option<f64>,
}

impl Athlete {
    /// Arabic name first, Latin name as fallback.
    pub fn display_name(&self) -> &str {
        if self.name_ar.trim().is_empty() { self.name_lat.trim() } else { self.name_ar.trim() }
    }
}

/// Copy of the athlete fields a result row keeps for display and evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AthleteSnapshot {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, deserialize_with = "lenient::u32_or_zero")]
    pub age: u32,
    #[serde(default, deserialize_with = "lenient::gender")]
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub weight_kg: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub height_cm: Option<f64>,
}

/// Tolerant parsers for values typed into sheet cells or stored by older clients.
/// Anything unreadable becomes `None`/0, never an error.
pub mod lenient {
    use super::*;

    pub fn parse_f64(v: &Value) -> Option<f64> {
        match v {
            Value::Number(n) => n.as_f64().filter(|x| x.is_finite()),
            Value::String(s) => parse_str_f64(s),
            _ => None,
        }
    }

    /// Accepts "12", " 12.5 ", "12,5". Empty or garbage → None.
    pub fn parse_str_f64(s: &str) -> Option<f64> {
        let t = s.trim();
        if t.is_empty() {
            return None;
        }
        t.replace(',', ".").parse::<f64>().ok().filter(|x| x.is_finite())
    }

    pub fn parse_date(s: &str) -> Option<NaiveDate> {
        let t = s.trim();
        // ISO timestamps: keep the date part
        let t = t.split('T').next().unwrap_or(t);
        ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"]
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(t, fmt).ok())
    }

    pub fn f64_opt<'de, D>(de: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = Value::deserialize(de)?;
        Ok(parse_f64(&v))
    }

    pub fn f64_vec<'de, D>(de: D) -> Result<Vec<Option<f64>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = Value::deserialize(de)?;
        Ok(match v {
            Value::Array(items) => items.iter().map(parse_f64).collect(),
            _ => Vec::new(),
        })
    }

    pub fn u32_or_zero<'de, D>(de: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = Value::deserialize(de)?;
        Ok(parse_f64(&v)
            .filter(|x| *x >= 0.0 && *x <= u32::MAX as f64)
            .map(|x| x as u32)
            .unwrap_or(0))
    }

    pub fn date<'de, D>(de: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = Value::deserialize(de)?;
        Ok(match v {
            Value::String(s) => parse_date(&s),
            _ => None,
        })
    }

    pub fn gender<'de, D>(de: D) -> Result<Option<Gender>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = Value::deserialize(de)?;
        Ok(serde_json::from_value::<Gender>(v).ok())
    }
}
