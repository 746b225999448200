#![allow(dead_code)]
use std::path::PathBuf;

use chrono::NaiveDate;
use judofed_core::models::{lenient, Athlete};
use judofed_core::Gender;

pub const CLUB: &str = "club7";

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

/// Roster fixture, read the way a club export arrives: text cells, mixed date formats.
pub fn roster_from_csv() -> Vec<Athlete> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/roster_club7.csv");
    let mut rdr = csv::Reader::from_path(&path).expect("open roster fixture");
    rdr.records()
        .map(|rec| {
            let rec = rec.expect("csv record");
            let cell = |i: usize| rec.get(i).unwrap_or("").trim().to_string();
            Athlete {
                id: cell(0),
                name_ar: cell(1),
                name_lat: cell(2),
                birth_date: lenient::parse_date(&cell(3)),
                gender: match cell(4).as_str() {
                    "male" => Some(Gender::Male),
                    "female" => Some(Gender::Female),
                    _ => None,
                },
                weight_kg: lenient::parse_str_f64(&cell(5)),
                height_cm: lenient::parse_str_f64(&cell(6)),
            }
        })
        .collect()
}

/// Fresh directory under the system temp dir.
pub fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("judofed_{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}
