// core/src/team_record.rs
// Team record: roster-relative grades over five physical capacities.
// Grades depend on the cohort maximum, so every edit re-normalizes the whole roster.
use chrono::NaiveDate;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::category::derive_category;
use crate::evaluation::Rating;
use crate::models::{lenient, Athlete};
use crate::units::{or_zero, RoundTo};

/// Per-side cap on raw values.
pub const SIDE_MAX: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capacity {
    Arms,
    Trunk,
    Legs,
    Endurance,
    OneRm,
}

impl Capacity {
    pub const ALL: [Capacity; 5] = [
        Capacity::Arms,
        Capacity::Trunk,
        Capacity::Legs,
        Capacity::Endurance,
        Capacity::OneRm,
    ];

    pub fn label_ar(self) -> &'static str {
        match self {
            Capacity::Arms => "الذراعين",
            Capacity::Trunk => "الجذع",
            Capacity::Legs => "الرجلين",
            Capacity::Endurance => "التحمل",
            Capacity::OneRm => "1RM",
        }
    }

    fn idx(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Right,
    Left,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SidePair {
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub right: Option<f64>,
    #[serde(default, deserialize_with = "lenient::f64_opt")]
    pub left: Option<f64>,
}

impl SidePair {
    pub fn new(right: f64, left: f64) -> Self {
        SidePair { right: Some(right), left: Some(left) }
    }

    /// `min(right, 50) + min(left, 50)`, negatives count as 0.
    pub fn sum(&self) -> f64 {
        clamp_side(or_zero(self.right)) + clamp_side(or_zero(self.left))
    }

    fn is_blank(&self) -> bool {
        or_zero(self.right) <= 0.0 && or_zero(self.left) <= 0.0
    }
}

fn clamp_side(v: f64) -> f64 {
    v.clamp(0.0, SIDE_MAX)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamEntry {
    pub id: String,
    #[serde(default, alias = "athleteId")]
    pub athlete_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    /// Raw values, indexed like [`Capacity::ALL`].
    #[serde(default)]
    pub values: [SidePair; 5],
    /// Derived: 0–100 per capacity.
    #[serde(default)]
    pub grades: [f64; 5],
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub overall: f64,
    #[serde(default)]
    pub standard: Option<Rating>,
}

impl TeamEntry {
    pub fn placeholder(index: usize) -> TeamEntry {
        TeamEntry { id: (index + 1).to_string(), ..Default::default() }
    }

    pub fn from_athlete(index: usize, athlete: &Athlete, today: NaiveDate) -> TeamEntry {
        TeamEntry {
            id: (index + 1).to_string(),
            athlete_id: Some(athlete.id.clone()),
            name: athlete.display_name().to_string(),
            category: derive_category(athlete.birth_date, today).label().to_string(),
            ..Default::default()
        }
    }

    pub fn value(&self, capacity: Capacity) -> &SidePair {
        &self.values[capacity.idx()]
    }

    pub fn grade(&self, capacity: Capacity) -> f64 {
        self.grades[capacity.idx()]
    }

    /// Raw edit only; call [`normalize`] on the roster afterwards.
    pub fn set_value(&mut self, capacity: Capacity, side: Side, value: Option<f64>) {
        let pair = &mut self.values[capacity.idx()];
        let value = value.filter(|v| v.is_finite()).map(clamp_side);
        match side {
            Side::Right => pair.right = value,
            Side::Left => pair.left = value,
        }
    }

    fn is_blank(&self) -> bool {
        self.values.iter().all(SidePair::is_blank)
    }
}

pub fn standard_for(overall: f64) -> Rating {
    match overall {
        g if g >= 90.0 => Rating::Excellent,
        g if g >= 80.0 => Rating::VeryGood,
        g if g >= 70.0 => Rating::Good,
        g if g >= 60.0 => Rating::Acceptable,
        _ => Rating::Weak,
    }
}

/// `100 / max_sum`, 0 when nobody has a value.
pub fn coefficient(entries: &[TeamEntry], capacity: Capacity) -> f64 {
    let max_sum = entries
        .iter()
        .map(|e| OrderedFloat(e.value(capacity).sum()))
        .max()
        .map(|m| m.into_inner())
        .unwrap_or(0.0);
    if max_sum > 0.0 { 100.0 / max_sum } else { 0.0 }
}

/// Recomputes grades, totals and standards for every entry.
pub fn normalize(entries: &mut [TeamEntry]) {
    let cohort: &[TeamEntry] = &*entries;
    let coefficients: Vec<f64> = Capacity::ALL.iter().map(|c| coefficient(cohort, *c)).collect();

    for entry in entries.iter_mut() {
        for (i, coef) in coefficients.iter().enumerate() {
            entry.grades[i] = (entry.values[i].sum() * coef).min(100.0).round_to(2);
        }
        entry.total = entry.grades.iter().sum::<f64>().round_to(2);
        entry.overall = (entry.total / Capacity::ALL.len() as f64).round_to(2);
        entry.standard = if entry.is_blank() { None } else { Some(standard_for(entry.overall)) };
    }
}
