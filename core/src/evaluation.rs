// core/src/evaluation.rs
// Per-test evaluation rules. Same shape everywhere:
// guard (zero/absent → no label) → ordered bands → label.
use serde::{Deserialize, Serialize};

use crate::models::Gender;
use crate::units::{cm_to_in, kg_to_lb, kg_to_lb_453, lb_to_kg_453, RoundTo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Excellent,
    VeryGood,
    Good,
    Average,
    Acceptable,
    Weak,
    Enduring,
    Thin,
    Full,
}

impl Rating {
    pub fn label(self) -> &'static str {
        match self {
            Rating::Excellent => "excellent",
            Rating::VeryGood => "very good",
            Rating::Good => "good",
            Rating::Average => "average",
            Rating::Acceptable => "acceptable",
            Rating::Weak => "weak",
            Rating::Enduring => "enduring",
            Rating::Thin => "thin",
            Rating::Full => "full",
        }
    }

    pub fn label_ar(self) -> &'static str {
        match self {
            Rating::Excellent => "ممتاز",
            Rating::VeryGood => "جيد جدا",
            Rating::Good => "جيد",
            Rating::Average => "متوسط",
            Rating::Acceptable => "مقبول",
            Rating::Weak => "ضعيف",
            Rating::Enduring => "متحمل",
            Rating::Thin => "نحيف",
            Rating::Full => "ممتلئ",
        }
    }
}

/// Entered, finite, strictly positive values.
fn entered(values: &[Option<f64>]) -> impl Iterator<Item = f64> + '_ {
    values.iter().flatten().copied().filter(|v| v.is_finite() && *v > 0.0)
}

/// Highest entered attempt (more repetitions = better).
pub fn best_max(attempts: &[Option<f64>]) -> Option<f64> {
    entered(attempts).fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
}

/// Lowest entered attempt (less time = better).
pub fn best_min(attempts: &[Option<f64>]) -> Option<f64> {
    entered(attempts).fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.min(v))))
}

// --- kumi-kata release -------------------------------------------------------

pub fn explosive_strength_rating(best: f64) -> Option<Rating> {
    match best {
        b if !(b > 0.0) => None,
        b if b < 5.0 => Some(Rating::Excellent),
        b if b < 10.0 => Some(Rating::Good),
        b if b < 20.0 => Some(Rating::Average),
        _ => Some(Rating::Weak),
    }
}

/// Above 20 there is no band.
pub fn max_dynamic_strength_rating(best: f64) -> Option<Rating> {
    match best {
        b if !(b > 0.0) => None,
        b if b < 5.0 => Some(Rating::Excellent),
        b if b < 10.0 => Some(Rating::Good),
        b if b < 20.0 => Some(Rating::Average),
        b if b == 20.0 => Some(Rating::Weak),
        _ => None,
    }
}

pub fn groundwork_rating(best: f64) -> Option<Rating> {
    match best {
        b if !(b > 0.0) => None,
        b if b < 5.0 => Some(Rating::Weak),
        b if b < 10.0 => Some(Rating::Average),
        b if b < 20.0 => Some(Rating::Good),
        _ => Some(Rating::Excellent),
    }
}

// --- special speed -----------------------------------------------------------

pub fn speed_penalty(gender: Option<Gender>) -> f64 {
    match gender {
        Some(Gender::Male) => 3.0,
        Some(Gender::Female) => 2.0,
        None => 0.0,
    }
}

/// Achieved time plus the per-gender penalty for each wrong attempt.
pub fn special_speed_score(time_s: f64, wrong: f64, gender: Option<Gender>) -> Option<f64> {
    if !(time_s > 0.0) {
        return None;
    }
    let wrong = if wrong.is_finite() && wrong > 0.0 { wrong } else { 0.0 };
    Some((time_s + wrong * speed_penalty(gender)).round_to(2))
}

/// Four tiers, lower is better. Scores between the tabulated bands get no label.
pub fn special_speed_rating(score: f64) -> Option<Rating> {
    match score {
        s if !(s > 0.0) => None,
        s if s < 19.0 => Some(Rating::Excellent),
        s if (20.0..=25.0).contains(&s) => Some(Rating::VeryGood),
        s if (26.0..=30.0).contains(&s) => Some(Rating::Good),
        s if s >= 31.0 => Some(Rating::Average),
        _ => None,
    }
}

// --- special endurance (6 × 4 min) ---------------------------------------------

/// Rounds in one special endurance test.
pub const ENDURANCE_ROUNDS: usize = 6;

/// Mean of the entered rounds (zero counts, empty does not). Values past round 6 are ignored.
pub fn endurance_mean(rounds: &[Option<f64>]) -> Option<f64> {
    let vals: Vec<f64> = rounds
        .iter()
        .take(ENDURANCE_ROUNDS)
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();
    if vals.is_empty() {
        return None;
    }
    Some((vals.iter().sum::<f64>() / vals.len() as f64).round_to(2))
}

pub fn endurance_rating(mean: f64) -> Option<Rating> {
    match mean {
        m if !(m > 0.0) => None,
        m if m >= 4.0 => Some(Rating::Enduring),
        m if m >= 3.0 => Some(Rating::Good),
        m if m >= 2.0 => Some(Rating::Average),
        _ => Some(Rating::Weak),
    }
}

// --- throwing skills / uchi-komi ---------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "20")]
    Twenty,
    #[serde(rename = "30")]
    Thirty,
}

impl Interval {
    pub fn from_secs(secs: f64) -> Option<Interval> {
        match secs.round() as i64 {
            10 => Some(Interval::Ten),
            20 => Some(Interval::Twenty),
            30 => Some(Interval::Thirty),
            _ => None,
        }
    }

    fn column(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Technique {
    Throwing,
    UchiKomi,
}

/// Reference repetitions per age band (8–12, 13–16, 17+) × interval (10/20/30 s).
const THROWING_MAX: [[f64; 3]; 3] = [
    [5.0, 9.0, 13.0],
    [6.0, 11.0, 16.0],
    [7.0, 13.0, 19.0],
];

const UCHI_KOMI_MAX: [[f64; 3]; 3] = [
    [8.0, 15.0, 22.0],
    [10.0, 18.0, 26.0],
    [12.0, 22.0, 32.0],
];

fn age_band(age: u32) -> Option<usize> {
    match age {
        0 => None,
        1..=12 => Some(0),
        13..=16 => Some(1),
        _ => Some(2),
    }
}

pub fn technique_max(technique: Technique, age: u32, interval: Interval) -> Option<f64> {
    let table = match technique {
        Technique::Throwing => &THROWING_MAX,
        Technique::UchiKomi => &UCHI_KOMI_MAX,
    };
    age_band(age).map(|band| table[band][interval.column()])
}

/// `min(100, result × 100 / max)`, two decimals.
pub fn technique_percentage(
    technique: Technique,
    result: f64,
    age: u32,
    interval: Option<Interval>,
) -> Option<f64> {
    if !(result > 0.0) {
        return None;
    }
    let max = technique_max(technique, age, interval?)?;
    Some((result * 100.0 / max).min(100.0).round_to(2))
}

// --- body type -----------------------------------------------------------------

/// Weight (lb) / height (in). Zero weight or height → None.
pub fn body_type_index(weight_kg: f64, height_cm: f64) -> Option<f64> {
    if !(weight_kg > 0.0) || !(height_cm > 0.0) {
        return None;
    }
    Some((kg_to_lb(weight_kg) / cm_to_in(height_cm)).round_to(2))
}

pub fn body_type_rating(index: f64) -> Option<Rating> {
    match index {
        i if !(i > 0.0) => None,
        i if i < 2.0 => Some(Rating::Thin),
        i if i <= 2.8 => Some(Rating::Average),
        _ => Some(Rating::Full),
    }
}

// --- body composition ----------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyComposition {
    pub weight_lb: f64,
    pub fat_lb: f64,
    pub lean_lb: f64,
    pub fat_kg: f64,
    pub lean_kg: f64,
}

/// Fat and lean mass on the 453 g pound the composition sheet prints with.
pub fn body_composition(weight_kg: f64, fat_pct: f64) -> Option<BodyComposition> {
    if !(weight_kg > 0.0) {
        return None;
    }
    let fat_pct = if fat_pct.is_finite() { fat_pct.clamp(0.0, 100.0) } else { 0.0 };
    let weight_lb = kg_to_lb_453(weight_kg);
    let fat_lb = weight_lb * fat_pct / 100.0;
    let lean_lb = weight_lb - fat_lb;
    Some(BodyComposition {
        weight_lb: weight_lb.round_to(2),
        fat_lb: fat_lb.round_to(2),
        lean_lb: lean_lb.round_to(2),
        fat_kg: lb_to_kg_453(fat_lb).round_to(2),
        lean_kg: lb_to_kg_453(lean_lb).round_to(2),
    })
}

/// Reference fat % range printed next to the result. Unknown age → None.
pub fn body_fat_standard(age: u32) -> Option<&'static str> {
    match age {
        0 => None,
        1..=10 => Some("7-9"),
        11..=15 => Some("6-8"),
        _ => Some("5-7"),
    }
}
