// core/src/api.rs
// JSON in → recomputed JSON out. Shared by the Python bridge and the portal backend.
use chrono::{Local, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use serde_path_to_error as spte;

use crate::category::{
    category_for_birth_year_in, derive_category, normalize_category_label, REFERENCE_YEAR,
};
use crate::descriptor::{tag_raw, TestKind, TestRow};
use crate::error::{CoreError, Result};
use crate::models::{lenient, Gender};
use crate::team_record::{self, TeamEntry};

fn parse<T: DeserializeOwned>(json_in: &str) -> Result<T> {
    let mut de = serde_json::Deserializer::from_str(json_in);
    Ok(spte::deserialize(&mut de)?)
}

/// Accepts either a bare array or `{"test"?: key, "rows": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RowsIn<R> {
    Wrapped {
        #[serde(default)]
        test: Option<String>,
        rows: Vec<R>,
    },
    Bare(Vec<R>),
}

impl<R> RowsIn<R> {
    fn into_parts(self) -> (Option<String>, Vec<R>) {
        match self {
            RowsIn::Wrapped { test, rows } => (test, rows),
            RowsIn::Bare(rows) => (None, rows),
        }
    }
}

#[derive(Debug, Serialize)]
struct RowsOut<'a, R> {
    rows: &'a [R],
}

/// Recomputes every derived field of a test sheet.
/// With a top-level `"test"`, rows whose `raw` has no tag take that test.
pub fn evaluate_rows_json(json_in: &str) -> Result<String> {
    let (test, values) = parse::<RowsIn<Value>>(json_in)?.into_parts();
    let kind = match test {
        Some(key) => Some(TestKind::from_key(&key).ok_or_else(|| CoreError::Parse {
            path: "test".to_string(),
            message: format!("unknown test `{}`", key),
        })?),
        None => None,
    };

    let mut rows = Vec::with_capacity(values.len());
    for (i, mut value) in values.into_iter().enumerate() {
        if let Some(kind) = kind {
            tag_raw(kind, &mut value);
        }
        let mut row: TestRow = spte::deserialize(value).map_err(|e| CoreError::Parse {
            path: format!("rows[{}].{}", i, e.path()),
            message: e.inner().to_string(),
        })?;
        row.recompute();
        rows.push(row);
    }
    Ok(serde_json::to_string(&RowsOut { rows: &rows })?)
}

/// Re-normalizes a whole team record.
pub fn team_record_json(json_in: &str) -> Result<String> {
    let (_, mut rows) = parse::<RowsIn<TeamEntry>>(json_in)?.into_parts();
    team_record::normalize(&mut rows);
    Ok(serde_json::to_string(&RowsOut { rows: &rows })?)
}

#[derive(Debug, Deserialize)]
struct CategoryIn {
    #[serde(default, alias = "birthDate", deserialize_with = "lenient::date")]
    birth_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::date")]
    today: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::gender")]
    gender: Option<Gender>,
    #[serde(default, alias = "birthYear")]
    birth_year: Option<i32>,
    #[serde(default, alias = "referenceYear")]
    reference_year: Option<i32>,
}

/// `{birth_date, today?, gender?}` or `{birth_year, reference_year?}` →
/// `{age, category, weight_classes}`.
pub fn athlete_category_json(json_in: &str) -> Result<String> {
    let input: CategoryIn = parse(json_in)?;

    let (age, category) = match (input.birth_date, input.birth_year) {
        (None, Some(year)) => {
            let reference = input.reference_year.unwrap_or(REFERENCE_YEAR);
            let spec = category_for_birth_year_in(year, reference);
            ((reference - year).max(0) as u32, Some(spec))
        }
        (dob, _) => {
            let today = input.today.unwrap_or_else(|| Local::now().date_naive());
            let a = derive_category(dob, today);
            (a.age, a.category)
        }
    };

    let weight_classes: Value = match (category, input.gender) {
        (Some(c), Some(g)) => json!(c.weight_classes(g)),
        _ => Value::Null,
    };

    Ok(json!({
        "age": age,
        "category": category,
        "label": category.map(|c| c.name_ar).unwrap_or(""),
        "weight_classes": weight_classes,
    })
    .to_string())
}

/// `{"label": "..."}` → `{"label": canonical}`.
pub fn normalize_label_json(json_in: &str) -> Result<String> {
    #[derive(Deserialize)]
    struct LabelIn {
        label: String,
    }
    let input: LabelIn = parse(json_in)?;
    Ok(json!({ "label": normalize_category_label(&input.label) }).to_string())
}
