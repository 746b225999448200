// core/src/descriptor.rs
// One table engine for every physical test sheet: a static descriptor per test,
// a tagged raw record per test, and a single recompute.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::category::derive_category;
use crate::error::{CoreError, Result};
use crate::evaluation::{self as ev, BodyComposition, Interval, Rating, Technique};
use crate::models::{lenient, Athlete, AthleteSnapshot};
use crate::units::{or_zero, RoundTo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    ExplosiveStrength,
    MaxDynamicStrength,
    Groundwork,
    SpecialSpeed,
    SpecialEndurance,
    ThrowingSkills,
    UchiKomi,
    BodyType,
    BodyComposition,
}

#[derive(Debug)]
pub struct TestDescriptor {
    pub kind: TestKind,
    /// Store key, also the document prefix.
    pub key: &'static str,
    pub title_ar: &'static str,
    /// Editable raw fields, in column order.
    pub raw_fields: &'static [&'static str],
    /// Derived columns, in column order.
    pub derived_columns: &'static [&'static str],
    pub default_rows: usize,
}

const ATTEMPT_FIELDS: &[&str] = &["attempt_1", "attempt_2", "attempt_3"];
const ROUND_FIELDS: [&str; ev::ENDURANCE_ROUNDS] =
    ["round_1", "round_2", "round_3", "round_4", "round_5", "round_6"];

static DESCRIPTORS: [TestDescriptor; 9] = [
    TestDescriptor {
        kind: TestKind::ExplosiveStrength,
        key: "explosive_strength",
        title_ar: "القوة الانفجارية (التخلص من مسكة الكومي كاتا)",
        raw_fields: ATTEMPT_FIELDS,
        derived_columns: &["best", "rating"],
        default_rows: 6,
    },
    TestDescriptor {
        kind: TestKind::MaxDynamicStrength,
        key: "max_dynamic_strength",
        title_ar: "القوة القصوى الديناميكية",
        raw_fields: ATTEMPT_FIELDS,
        derived_columns: &["best", "rating"],
        default_rows: 6,
    },
    TestDescriptor {
        kind: TestKind::Groundwork,
        key: "groundwork_skills",
        title_ar: "مهارات العمل الأرضي",
        raw_fields: ATTEMPT_FIELDS,
        derived_columns: &["best", "rating"],
        default_rows: 6,
    },
    TestDescriptor {
        kind: TestKind::SpecialSpeed,
        key: "special_speed",
        title_ar: "السرعة الخاصة",
        raw_fields: &["time_s", "wrong"],
        derived_columns: &["final_score", "rating"],
        default_rows: 6,
    },
    TestDescriptor {
        kind: TestKind::SpecialEndurance,
        key: "special_endurance",
        title_ar: "التحمل الخاص (6 جولات × 4 دقائق)",
        raw_fields: &ROUND_FIELDS,
        derived_columns: &["mean", "rating"],
        default_rows: 6,
    },
    TestDescriptor {
        kind: TestKind::ThrowingSkills,
        key: "throwing_skills",
        title_ar: "مهارات الرمي",
        raw_fields: &["interval_s", "result"],
        derived_columns: &["percentage"],
        default_rows: 9,
    },
    TestDescriptor {
        kind: TestKind::UchiKomi,
        key: "uchi_komi",
        title_ar: "الأوتشي كومي",
        raw_fields: &["interval_s", "result"],
        derived_columns: &["percentage"],
        default_rows: 9,
    },
    TestDescriptor {
        kind: TestKind::BodyType,
        key: "body_type",
        title_ar: "مؤشر نمط الجسم",
        raw_fields: &["weight_kg", "height_cm"],
        derived_columns: &["index", "rating"],
        default_rows: 3,
    },
    TestDescriptor {
        kind: TestKind::BodyComposition,
        key: "body_composition",
        title_ar: "التركيب الجسمي",
        raw_fields: &["weight_kg", "fat_pct"],
        derived_columns: &["fat_kg", "lean_kg", "standard"],
        default_rows: 3,
    },
];

impl TestKind {
    pub const ALL: [TestKind; 9] = [
        TestKind::ExplosiveStrength,
        TestKind::MaxDynamicStrength,
        TestKind::Groundwork,
        TestKind::SpecialSpeed,
        TestKind::SpecialEndurance,
        TestKind::ThrowingSkills,
        TestKind::UchiKomi,
        TestKind::BodyType,
        TestKind::BodyComposition,
    ];

    pub fn descriptor(self) -> &'static TestDescriptor {
        &DESCRIPTORS[self as usize]
    }

    pub fn key(self) -> &'static str {
        self.descriptor().key
    }

    pub fn from_key(key: &str) -> Option<TestKind> {
        TestKind::ALL.iter().copied().find(|k| k.key() == key)
    }

    pub fn empty_measurement(self) -> Measurement {
        match self {
            TestKind::ExplosiveStrength => Measurement::ExplosiveStrength(Attempts::default()),
            TestKind::MaxDynamicStrength => Measurement::MaxDynamicStrength(Attempts::default()),
            TestKind::Groundwork => Measurement::Groundwork(Attempts::default()),
            TestKind::SpecialSpeed => Measurement::SpecialSpeed(SpeedRaw::default()),
            TestKind::SpecialEndurance => Measurement::SpecialEndurance(EnduranceRaw::default()),
            TestKind::ThrowingSkills => Measurement::ThrowingSkills(IntervalRaw::default()),
            TestKind::UchiKomi => Measurement::UchiKomi(IntervalRaw::default()),
            TestKind::BodyType => Measurement::BodyType(BodyRaw::default()),
            TestKind::BodyComposition => Measurement::BodyComposition(CompositionRaw::default()),
        }
    }
}

/// Stored rows carry their test in `raw.test`. Older clients left it out;
/// the sheet's kind fills it in.
pub fn tag_raw(kind: TestKind, row: &mut Value) {
    let obj = match row.as_object_mut() {
        Some(obj) => obj,
        None => return,
    };
    if matches!(obj.get("raw"), None | Some(Value::Null)) {
        obj.insert("raw".to_string(), json!({}));
    }
    if let Some(Value::Object(raw)) = obj.get_mut("raw") {
        raw.entry("test").or_insert_with(|| json!(kind.key()));
    }
}

// ---------------------------------------------------------------------------
// Raw records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attempts {
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub attempt_1: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub attempt_2: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub attempt_3: Option<f64>,
}

impl Attempts {
    pub fn values(&self) -> [Option<f64>; 3] {
        [self.attempt_1, self.attempt_2, self.attempt_3]
    }

    fn slot(&mut self, field: &str) -> Option<&mut Option<f64>> {
        match field {
            "attempt_1" => Some(&mut self.attempt_1),
            "attempt_2" => Some(&mut self.attempt_2),
            "attempt_3" => Some(&mut self.attempt_3),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeedRaw {
    #[serde(default, alias = "achievedTime", deserialize_with = "lenient::f64_opt")]
    pub time_s: Option<f64>,
    #[serde(default, alias = "wrongAttempts", deserialize_with = "lenient::f64_opt")]
    pub wrong: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnduranceRaw {
    #[serde(default, deserialize_with = "lenient::f64_vec")]
    pub rounds: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntervalRaw {
    #[serde(default, alias = "interval", deserialize_with = "lenient::f64_opt")]
    pub interval_s: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub result: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyRaw {
    #[serde(default, alias = "weight", deserialize_with = "lenient::f64_opt")]
    pub weight_kg: Option<f64>,
    #[serde(default, alias = "height", deserialize_with = "lenient::f64_opt")]
    pub height_cm: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositionRaw {
    #[serde(default, alias = "weight", deserialize_with = "lenient::f64_opt")]
    pub weight_kg: Option<f64>,
    #[serde(default, alias = "fatPercentage", deserialize_with = "lenient::f64_opt")]
    pub fat_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "test", rename_all = "snake_case")]
pub enum Measurement {
    ExplosiveStrength(Attempts),
    MaxDynamicStrength(Attempts),
    #[serde(rename = "groundwork_skills", alias = "groundwork")]
    Groundwork(Attempts),
    SpecialSpeed(SpeedRaw),
    SpecialEndurance(EnduranceRaw),
    ThrowingSkills(IntervalRaw),
    UchiKomi(IntervalRaw),
    BodyType(BodyRaw),
    BodyComposition(CompositionRaw),
}

impl Measurement {
    pub fn kind(&self) -> TestKind {
        match self {
            Measurement::ExplosiveStrength(_) => TestKind::ExplosiveStrength,
            Measurement::MaxDynamicStrength(_) => TestKind::MaxDynamicStrength,
            Measurement::Groundwork(_) => TestKind::Groundwork,
            Measurement::SpecialSpeed(_) => TestKind::SpecialSpeed,
            Measurement::SpecialEndurance(_) => TestKind::SpecialEndurance,
            Measurement::ThrowingSkills(_) => TestKind::ThrowingSkills,
            Measurement::UchiKomi(_) => TestKind::UchiKomi,
            Measurement::BodyType(_) => TestKind::BodyType,
            Measurement::BodyComposition(_) => TestKind::BodyComposition,
        }
    }

    /// Mutable slot behind a raw field name.
    fn slot(&mut self, field: &str) -> Option<&mut Option<f64>> {
        match self {
            Measurement::ExplosiveStrength(a)
            | Measurement::MaxDynamicStrength(a)
            | Measurement::Groundwork(a) => a.slot(field),
            Measurement::SpecialSpeed(s) => match field {
                "time_s" => Some(&mut s.time_s),
                "wrong" => Some(&mut s.wrong),
                _ => None,
            },
            Measurement::SpecialEndurance(e) => {
                let idx = ROUND_FIELDS.iter().position(|f| *f == field)?;
                if e.rounds.len() <= idx {
                    e.rounds.resize(idx + 1, None);
                }
                e.rounds.get_mut(idx)
            }
            Measurement::ThrowingSkills(t) | Measurement::UchiKomi(t) => match field {
                "interval_s" => Some(&mut t.interval_s),
                "result" => Some(&mut t.result),
                _ => None,
            },
            Measurement::BodyType(b) => match field {
                "weight_kg" => Some(&mut b.weight_kg),
                "height_cm" => Some(&mut b.height_cm),
                _ => None,
            },
            Measurement::BodyComposition(c) => match field {
                "weight_kg" => Some(&mut c.weight_kg),
                "fat_pct" => Some(&mut c.fat_pct),
                _ => None,
            },
        }
    }

    fn raw_value(&self, field: &str) -> Option<f64> {
        match self {
            Measurement::ExplosiveStrength(a)
            | Measurement::MaxDynamicStrength(a)
            | Measurement::Groundwork(a) => {
                let idx = ATTEMPT_FIELDS.iter().position(|f| *f == field)?;
                a.values()[idx]
            }
            Measurement::SpecialSpeed(s) => match field {
                "time_s" => s.time_s,
                "wrong" => s.wrong,
                _ => None,
            },
            Measurement::SpecialEndurance(e) => {
                let idx = ROUND_FIELDS.iter().position(|f| *f == field)?;
                e.rounds.get(idx).copied().flatten()
            }
            Measurement::ThrowingSkills(t) | Measurement::UchiKomi(t) => match field {
                "interval_s" => t.interval_s,
                "result" => t.result,
                _ => None,
            },
            Measurement::BodyType(b) => match field {
                "weight_kg" => b.weight_kg,
                "height_cm" => b.height_cm,
                _ => None,
            },
            Measurement::BodyComposition(c) => match field {
                "weight_kg" => c.weight_kg,
                "fat_pct" => c.fat_pct,
                _ => None,
            },
        }
    }

    /// Derived fields, purely from raw fields and the athlete snapshot.
    pub fn evaluate(&self, athlete: &AthleteSnapshot) -> Derived {
        let mut d = Derived::default();
        match self {
            Measurement::ExplosiveStrength(a) => {
                d.best = ev::best_max(&a.values());
                d.rating = d.best.and_then(ev::explosive_strength_rating);
            }
            Measurement::MaxDynamicStrength(a) => {
                d.best = ev::best_min(&a.values());
                d.rating = d.best.and_then(ev::max_dynamic_strength_rating);
            }
            Measurement::Groundwork(a) => {
                d.best = ev::best_max(&a.values());
                d.rating = d.best.and_then(ev::groundwork_rating);
            }
            Measurement::SpecialSpeed(s) => {
                d.final_score =
                    ev::special_speed_score(or_zero(s.time_s), or_zero(s.wrong), athlete.gender);
                d.rating = d.final_score.and_then(ev::special_speed_rating);
            }
            Measurement::SpecialEndurance(e) => {
                d.mean = ev::endurance_mean(&e.rounds);
                d.rating = d.mean.and_then(ev::endurance_rating);
            }
            Measurement::ThrowingSkills(t) => {
                d.percentage = technique(Technique::Throwing, t, athlete.age);
            }
            Measurement::UchiKomi(t) => {
                d.percentage = technique(Technique::UchiKomi, t, athlete.age);
            }
            Measurement::BodyType(b) => {
                d.index = ev::body_type_index(or_zero(b.weight_kg), or_zero(b.height_cm));
                d.rating = d.index.and_then(ev::body_type_rating);
            }
            Measurement::BodyComposition(c) => {
                d.composition = ev::body_composition(or_zero(c.weight_kg), or_zero(c.fat_pct));
                d.standard = ev::body_fat_standard(athlete.age).map(str::to_string);
            }
        }
        d
    }
}

fn technique(technique: Technique, raw: &IntervalRaw, age: u32) -> Option<f64> {
    let interval = raw.interval_s.and_then(Interval::from_secs);
    ev::technique_percentage(technique, or_zero(raw.result), age, interval)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Derived {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composition: Option<BodyComposition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard: Option<String>,
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestRow {
    pub id: String,
    #[serde(default, alias = "athleteId")]
    pub athlete_id: Option<String>,
    #[serde(default)]
    pub athlete: AthleteSnapshot,
    pub raw: Measurement,
    /// Stored for printing; recomputed on every load and edit.
    #[serde(default)]
    pub derived: Derived,
    #[serde(default)]
    pub notes: String,
}

impl TestRow {
    pub fn placeholder(kind: TestKind, index: usize) -> TestRow {
        TestRow {
            id: (index + 1).to_string(),
            athlete_id: None,
            athlete: AthleteSnapshot::default(),
            raw: kind.empty_measurement(),
            derived: Derived::default(),
            notes: String::new(),
        }
    }

    /// Row pre-filled from the roster; body sheets also take weight and height.
    pub fn from_athlete(kind: TestKind, index: usize, athlete: &Athlete, today: NaiveDate) -> TestRow {
        let assignment = derive_category(athlete.birth_date, today);
        let mut raw = kind.empty_measurement();
        match &mut raw {
            Measurement::BodyType(b) => {
                b.weight_kg = athlete.weight_kg;
                b.height_cm = athlete.height_cm;
            }
            Measurement::BodyComposition(c) => c.weight_kg = athlete.weight_kg,
            _ => {}
        }
        let mut row = TestRow {
            id: (index + 1).to_string(),
            athlete_id: Some(athlete.id.clone()),
            athlete: AthleteSnapshot {
                name: athlete.display_name().to_string(),
                category: assignment.label().to_string(),
                age: assignment.age,
                gender: athlete.gender,
                weight_kg: athlete.weight_kg,
                height_cm: athlete.height_cm,
            },
            raw,
            derived: Derived::default(),
            notes: String::new(),
        };
        row.recompute();
        row
    }

    pub fn kind(&self) -> TestKind {
        self.raw.kind()
    }

    pub fn recompute(&mut self) {
        self.derived = self.raw.evaluate(&self.athlete);
    }

    /// Sets one cell from user text and recomputes. Unreadable numbers clear the cell.
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<()> {
        match field {
            "notes" => self.notes = value.to_string(),
            "name" => self.athlete.name = value.to_string(),
            _ => {
                let test = self.kind().key();
                let slot = self.raw.slot(field).ok_or_else(|| CoreError::UnknownField {
                    test,
                    field: field.to_string(),
                })?;
                *slot = lenient::parse_str_f64(value);
            }
        }
        self.recompute();
        Ok(())
    }

    pub fn raw_value(&self, field: &str) -> Option<f64> {
        self.raw.raw_value(field)
    }

    /// Display text of a raw field or derived column.
    pub fn cell(&self, column: &str) -> String {
        let num = |v: Option<f64>| v.map(fmt_num).unwrap_or_default();
        let d = &self.derived;
        match column {
            "best" => num(d.best),
            "final_score" => num(d.final_score),
            "mean" => num(d.mean),
            "percentage" => d.percentage.map(|p| format!("{}%", fmt_num(p))).unwrap_or_default(),
            "index" => num(d.index),
            "rating" => d.rating.map(|r| r.label_ar().to_string()).unwrap_or_default(),
            "fat_kg" => num(d.composition.map(|c| c.fat_kg)),
            "lean_kg" => num(d.composition.map(|c| c.lean_kg)),
            "standard" => d.standard.clone().unwrap_or_default(),
            other => num(self.raw_value(other)),
        }
    }
}

/// Two decimals, trailing zeros dropped.
pub fn fmt_num(v: f64) -> String {
    // -0.001 rounds to -0.0
    let v = v.round_to(2);
    let v = if v == 0.0 { 0.0 } else { v };
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-" { "0".to_string() } else { s.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptors_line_up_with_kinds() {
        for kind in TestKind::ALL {
            assert_eq!(kind.descriptor().kind, kind);
            assert_eq!(TestKind::from_key(kind.key()), Some(kind));
            assert_eq!(kind.empty_measurement().kind(), kind);
        }
    }

    #[test]
    fn every_raw_field_is_settable() {
        for kind in TestKind::ALL {
            let mut row = TestRow::placeholder(kind, 0);
            for field in kind.descriptor().raw_fields {
                row.set_field(field, "3").unwrap();
                assert_eq!(row.raw_value(field), Some(3.0), "{}.{}", kind.key(), field);
            }
        }
    }

    #[test]
    fn fmt_num_trims() {
        assert_eq!(fmt_num(12.0), "12");
        assert_eq!(fmt_num(12.5), "12.5");
        assert_eq!(fmt_num(0.004), "0");
        assert_eq!(fmt_num(-0.001), "0");
        assert_eq!(fmt_num(-1.5), "-1.5");
    }

    #[test]
    fn stored_kind_matches_store_key() {
        for kind in TestKind::ALL {
            let v = serde_json::to_value(kind.empty_measurement()).unwrap();
            assert_eq!(v["test"], json!(kind.key()));
        }
    }

    #[test]
    fn untagged_raw_takes_the_sheet_kind() {
        let mut row = json!({"id": "1", "raw": {"attempt_1": "4"}});
        tag_raw(TestKind::Groundwork, &mut row);
        let row: TestRow = serde_json::from_value(row).unwrap();
        assert_eq!(row.kind(), TestKind::Groundwork);
        assert_eq!(row.raw_value("attempt_1"), Some(4.0));

        let mut bare = json!({"id": "2"});
        tag_raw(TestKind::BodyType, &mut bare);
        assert_eq!(bare["raw"]["test"], json!("body_type"));

        let legacy: Measurement = serde_json::from_value(json!({"test": "groundwork"})).unwrap();
        assert_eq!(legacy.kind(), TestKind::Groundwork);

        // an explicit tag wins
        let mut tagged = json!({"id": "3", "raw": {"test": "uchi_komi"}});
        tag_raw(TestKind::ThrowingSkills, &mut tagged);
        assert_eq!(tagged["raw"]["test"], json!("uchi_komi"));
    }
}
