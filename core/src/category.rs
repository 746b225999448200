// core/src/category.rs
use std::collections::HashMap;

use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::models::Gender;

/// Season the literal birth-year table was drawn up for.
pub const REFERENCE_YEAR: i32 = 2025;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryId {
    Eveil,
    MiniPoussin,
    Poussin,
    Benjamin,
    Minime,
    Cadet,
    Junior,
    Senior,
}

impl CategoryId {
    pub fn key(self) -> &'static str {
        match self {
            CategoryId::Eveil => "eveil",
            CategoryId::MiniPoussin => "mini_poussin",
            CategoryId::Poussin => "poussin",
            CategoryId::Benjamin => "benjamin",
            CategoryId::Minime => "minime",
            CategoryId::Cadet => "cadet",
            CategoryId::Junior => "junior",
            CategoryId::Senior => "senior",
        }
    }

    pub fn spec(self) -> &'static CategorySpec {
        // CATEGORIES is ordered like the enum
        &CATEGORIES[self as usize]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorySpec {
    pub id: CategoryId,
    pub name_ar: &'static str,
    pub name_fr: &'static str,
    pub min_age: u32,
    /// Inclusive. `None` for the open senior band.
    pub max_age: Option<u32>,
    pub min_grade: &'static str,
    pub weights_male: &'static [&'static str],
    pub weights_female: &'static [&'static str],
}

impl CategorySpec {
    pub fn weight_classes(&self, gender: Gender) -> &'static [&'static str] {
        match gender {
            Gender::Male => self.weights_male,
            Gender::Female => self.weights_female,
        }
    }

    /// Birth years (inclusive) falling in this band for a given season.
    pub fn birth_years(&self, reference_year: i32) -> (Option<i32>, i32) {
        let youngest = reference_year - self.min_age as i32;
        let oldest = self.max_age.map(|a| reference_year - a as i32);
        (oldest, youngest)
    }
}

pub static CATEGORIES: [CategorySpec; 8] = [
    CategorySpec {
        id: CategoryId::Eveil,
        name_ar: "إيقاظ",
        name_fr: "Éveil",
        min_age: 0,
        max_age: Some(5),
        min_grade: "أبيض",
        weights_male: &["-18", "-20", "-22", "-24", "-26", "+26"],
        weights_female: &["-18", "-20", "-22", "-24", "-26", "+26"],
    },
    CategorySpec {
        id: CategoryId::MiniPoussin,
        name_ar: "براعم صغار",
        name_fr: "Mini-poussin",
        min_age: 6,
        max_age: Some(7),
        min_grade: "أبيض",
        weights_male: &["-20", "-22", "-24", "-27", "-30", "-34", "+34"],
        weights_female: &["-20", "-22", "-24", "-27", "-30", "-34", "+34"],
    },
    CategorySpec {
        id: CategoryId::Poussin,
        name_ar: "براعم",
        name_fr: "Poussin",
        min_age: 8,
        max_age: Some(9),
        min_grade: "أبيض أصفر",
        weights_male: &["-22", "-25", "-28", "-31", "-34", "-38", "-42", "+42"],
        weights_female: &["-22", "-25", "-28", "-31", "-34", "-38", "-42", "+42"],
    },
    CategorySpec {
        id: CategoryId::Benjamin,
        name_ar: "أصاغر",
        name_fr: "Benjamin",
        min_age: 10,
        max_age: Some(11),
        min_grade: "أصفر",
        weights_male: &["-26", "-30", "-34", "-38", "-42", "-46", "-50", "-55", "+55"],
        weights_female: &["-24", "-28", "-32", "-36", "-40", "-44", "-48", "-52", "+52"],
    },
    CategorySpec {
        id: CategoryId::Minime,
        name_ar: "صغار",
        name_fr: "Minime",
        min_age: 12,
        max_age: Some(13),
        min_grade: "أصفر برتقالي",
        weights_male: &["-34", "-38", "-42", "-46", "-50", "-55", "-60", "-66", "+66"],
        weights_female: &["-32", "-36", "-40", "-44", "-48", "-52", "-57", "-63", "+63"],
    },
    CategorySpec {
        id: CategoryId::Cadet,
        name_ar: "أشبال",
        name_fr: "Cadet",
        min_age: 14,
        max_age: Some(16),
        min_grade: "برتقالي",
        weights_male: &["-50", "-55", "-60", "-66", "-73", "-81", "-90", "+90"],
        weights_female: &["-40", "-44", "-48", "-52", "-57", "-63", "-70", "+70"],
    },
    CategorySpec {
        id: CategoryId::Junior,
        name_ar: "أواسط",
        name_fr: "Junior",
        min_age: 17,
        max_age: Some(18),
        min_grade: "أخضر",
        weights_male: &["-55", "-60", "-66", "-73", "-81", "-90", "-100", "+100"],
        weights_female: &["-44", "-48", "-52", "-57", "-63", "-70", "-78", "+78"],
    },
    CategorySpec {
        id: CategoryId::Senior,
        name_ar: "أكابر",
        name_fr: "Senior",
        min_age: 19,
        max_age: None,
        min_grade: "أزرق",
        weights_male: &["-60", "-66", "-73", "-81", "-90", "-100", "+100"],
        weights_female: &["-48", "-52", "-57", "-63", "-70", "-78", "+78"],
    },
];

/// Literal birth-year table for the 2025 season (inclusive ranges).
const BIRTH_YEARS_2025: [(CategoryId, i32, i32); 8] = [
    (CategoryId::Senior, 1960, 2006),
    (CategoryId::Junior, 2007, 2008),
    (CategoryId::Cadet, 2009, 2011),
    (CategoryId::Minime, 2012, 2013),
    (CategoryId::Benjamin, 2014, 2015),
    (CategoryId::Poussin, 2016, 2017),
    (CategoryId::MiniPoussin, 2018, 2019),
    (CategoryId::Eveil, 2020, 2022),
];

/// Whole years between `dob` and `today`, birthday-aware. Never negative.
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> u32 {
    let mut years = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

pub fn category_for_age(age: u32) -> &'static CategorySpec {
    let id = match age {
        a if a >= 19 => CategoryId::Senior,
        17..=18 => CategoryId::Junior,
        14..=16 => CategoryId::Cadet,
        12..=13 => CategoryId::Minime,
        10..=11 => CategoryId::Benjamin,
        8..=9 => CategoryId::Poussin,
        6..=7 => CategoryId::MiniPoussin,
        _ => CategoryId::Eveil,
    };
    id.spec()
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryAssignment {
    pub age: u32,
    pub category: Option<&'static CategorySpec>,
}

impl CategoryAssignment {
    /// Arabic category label, empty when unknown.
    pub fn label(&self) -> &'static str {
        self.category.map(|c| c.name_ar).unwrap_or("")
    }
}

/// Age and category as of `today`. Unknown date of birth → age 0, no category.
pub fn derive_category(dob: Option<NaiveDate>, today: NaiveDate) -> CategoryAssignment {
    match dob {
        Some(d) => {
            let age = age_on(d, today);
            CategoryAssignment { age, category: Some(category_for_age(age)) }
        }
        None => CategoryAssignment { age: 0, category: None },
    }
}

/// Same as [`derive_category`] against the local clock.
pub fn derive_category_today(dob: Option<NaiveDate>) -> CategoryAssignment {
    derive_category(dob, Local::now().date_naive())
}

/// Category from the birth year alone, 2025 season.
pub fn category_for_birth_year(year: i32) -> &'static CategorySpec {
    category_for_birth_year_in(year, REFERENCE_YEAR)
}

/// Literal table when the season has one, age banding otherwise.
pub fn category_for_birth_year_in(year: i32, reference_year: i32) -> &'static CategorySpec {
    if reference_year == REFERENCE_YEAR {
        if let Some((id, _, _)) = BIRTH_YEARS_2025
            .iter()
            .find(|(_, from, to)| (*from..=*to).contains(&year))
        {
            return id.spec();
        }
    }
    category_for_age((reference_year - year).max(0) as u32)
}

/// Years covered by the literal table.
pub fn tabulated_birth_years() -> impl Iterator<Item = i32> {
    BIRTH_YEARS_2025.iter().flat_map(|(_, from, to)| *from..=*to)
}

// ---------------------------------------------------------------------------
// Label normalization
// ---------------------------------------------------------------------------

static DIRECT_LABELS: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for c in CATEGORIES.iter() {
        m.insert(c.id.key().to_string(), c.name_ar);
        m.insert(simplify_latin(c.id.key()), c.name_ar);
        m.insert(simplify_latin(c.name_fr), c.name_ar);
        m.insert(c.name_ar.to_string(), c.name_ar);
    }
    let extra: [(&str, CategoryId); 8] = [
        ("eveil", CategoryId::Eveil),
        ("mini poussins", CategoryId::MiniPoussin),
        ("poussins", CategoryId::Poussin),
        ("benjamins", CategoryId::Benjamin),
        ("minimes", CategoryId::Minime),
        ("cadets", CategoryId::Cadet),
        ("juniors", CategoryId::Junior),
        ("seniors", CategoryId::Senior),
    ];
    for (k, id) in extra {
        m.insert(simplify_latin(k), id.spec().name_ar);
    }
    m
});

static FOLDED_LABELS: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    CATEGORIES
        .iter()
        .map(|c| (fold_arabic(c.name_ar), c.name_ar))
        .collect()
});

fn simplify_latin(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .replace(['é', 'è', 'ê'], "e")
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strips harakat and tatweel, unifies alef/hamza/yaa forms and drops a leading "ال".
fn fold_arabic(s: &str) -> String {
    let folded: String = s
        .trim()
        .chars()
        .filter(|c| !matches!(*c, '\u{064B}'..='\u{0652}' | '\u{0670}' | '\u{0640}'))
        .map(|c| match c {
            'أ' | 'إ' | 'آ' | 'ٱ' => 'ا',
            'ؤ' => 'و',
            'ئ' | 'ى' => 'ي',
            'ة' => 'ه',
            other => other,
        })
        .collect();
    let words: Vec<String> = folded
        .split_whitespace()
        .map(|w| w.strip_prefix("ال").filter(|r| r.chars().count() > 1).unwrap_or(w).to_string())
        .collect();
    words.join(" ")
}

/// Maps free text or a category key to the canonical Arabic label.
/// Unknown input is returned unchanged.
pub fn normalize_category_label(raw: &str) -> String {
    if let Some(label) = DIRECT_LABELS.get(raw.trim()) {
        return (*label).to_string();
    }
    if let Some(label) = DIRECT_LABELS.get(&simplify_latin(raw)) {
        return (*label).to_string();
    }
    if let Some(label) = FOLDED_LABELS.get(&fold_arabic(raw)) {
        return (*label).to_string();
    }
    raw.to_string()
}
