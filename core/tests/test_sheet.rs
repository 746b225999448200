mod common;

use std::cell::Cell;

use judofed_core::metrics::{roster_autofills_total, sheet_saves_total, store_failures_total};
use judofed_core::models::Athlete;
use judofed_core::session::{Role, Session};
use judofed_core::store::load_rows;
use judofed_core::{
    Capacity, CoreError, Metrics, MemoryRoster, MemoryStore, Rating, ResultStore, Result,
    RosterSource, Sheet, Side, TeamEntry, TestKind, TestRow,
};
use serde_json::{json, Value};

use common::{today, CLUB};

fn roster() -> MemoryRoster {
    MemoryRoster::new().with_club(CLUB, common::roster_from_csv())
}

struct FailingStore;

impl ResultStore for FailingStore {
    fn get_results(&self, _: &str, _: &str) -> Result<Vec<Value>> {
        Err(CoreError::Store("offline".into()))
    }
    fn save_results(&self, _: &str, _: &str, _: &[Value]) -> Result<()> {
        Err(CoreError::Store("offline".into()))
    }
    fn delete_results(&self, _: &str, _: &str) -> Result<()> {
        Err(CoreError::Store("offline".into()))
    }
}

struct FailingRoster;

impl RosterSource for FailingRoster {
    fn athletes_by_club(&self, _: &str) -> Result<Vec<Athlete>> {
        Err(CoreError::Http("roster timeout".into()))
    }
}

#[test]
fn test_load_autofills_from_roster() {
    let metrics = Metrics::new().unwrap();
    let mut sheet = Sheet::<TestRow>::new(TestKind::SpecialSpeed, CLUB);
    sheet.load(&MemoryStore::new(), &roster(), today(), &metrics).unwrap();

    let rows = sheet.rows();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].athlete.name, "ياسين بن علي");
    assert_eq!(rows[0].athlete.category, "أواسط");
    assert_eq!(rows[0].athlete.age, 17);
    assert_eq!(rows[1].athlete.category, "صغار");
    assert_eq!(rows[2].athlete.category, "");
    assert_eq!(rows[2].athlete_id.as_deref(), Some("a3"));
    assert_eq!(roster_autofills_total(&metrics, "special_speed").get(), 1);
}

#[test]
fn test_load_without_roster_gives_placeholders() {
    let metrics = Metrics::new().unwrap();
    let mut sheet = Sheet::<TestRow>::new(TestKind::SpecialSpeed, "empty-club");
    sheet.load(&MemoryStore::new(), &roster(), today(), &metrics).unwrap();
    assert_eq!(sheet.rows().len(), TestKind::SpecialSpeed.descriptor().default_rows);
    assert!(sheet.rows().iter().all(|r| r.athlete.name.is_empty()));
    assert_eq!(sheet.rows()[0].id, "1");

    let mut wide = Sheet::<TestRow>::new(TestKind::Groundwork, "empty-club").with_placeholder_rows(12);
    wide.load(&MemoryStore::new(), &roster(), today(), &metrics).unwrap();
    assert_eq!(wide.rows().len(), 12);
}

#[test]
fn test_roster_failure_keeps_placeholders() {
    let metrics = Metrics::new().unwrap();
    let mut sheet = Sheet::<TestRow>::new(TestKind::UchiKomi, CLUB);
    sheet.load(&MemoryStore::new(), &FailingRoster, today(), &metrics).unwrap();
    assert_eq!(sheet.rows().len(), TestKind::UchiKomi.descriptor().default_rows);
    assert_eq!(roster_autofills_total(&metrics, "uchi_komi").get(), 0);
}

#[test]
fn test_store_failure_is_reported() {
    let metrics = Metrics::new().unwrap();
    let mut sheet = Sheet::<TestRow>::new(TestKind::BodyType, CLUB);
    let err = sheet.load(&FailingStore, &roster(), today(), &metrics).unwrap_err();
    assert!(matches!(err, CoreError::Store(_)));
    assert!(sheet.rows().is_empty());
    assert_eq!(store_failures_total(&metrics, "body_type").get(), 1);

    assert!(sheet.save(&FailingStore, &metrics).is_err());
    assert_eq!(store_failures_total(&metrics, "body_type").get(), 2);
    assert!(!sheet.is_saving());
}

#[test]
fn test_edit_save_and_reload() {
    let metrics = Metrics::new().unwrap();
    let store = MemoryStore::new();
    let mut sheet = Sheet::<TestRow>::new(TestKind::SpecialSpeed, CLUB);
    sheet.load(&store, &roster(), today(), &metrics).unwrap();

    sheet.set_field(0, "time_s", "20").unwrap();
    sheet.set_field(0, "wrong", "2").unwrap();
    sheet.set_field(0, "notes", "left early").unwrap();
    assert_eq!(sheet.rows()[0].derived.final_score, Some(26.0));
    assert_eq!(sheet.rows()[0].derived.rating, Some(Rating::Good));

    sheet.save(&store, &metrics).unwrap();
    assert_eq!(sheet_saves_total(&metrics, "special_speed").get(), 1);
    assert_eq!(store.get_results("special_speed", CLUB).unwrap().len(), 3);

    let mut again = Sheet::<TestRow>::new(TestKind::SpecialSpeed, CLUB);
    again.load(&store, &roster(), today(), &metrics).unwrap();
    assert_eq!(again.rows(), sheet.rows());
    // names present: no second auto-fill
    assert_eq!(roster_autofills_total(&metrics, "special_speed").get(), 1);
}

#[test]
fn test_bad_edits() {
    let metrics = Metrics::new().unwrap();
    let mut sheet = Sheet::<TestRow>::new(TestKind::ExplosiveStrength, CLUB);
    sheet.load(&MemoryStore::new(), &roster(), today(), &metrics).unwrap();

    let err = sheet.set_field(0, "time_s", "12").unwrap_err();
    assert!(matches!(err, CoreError::UnknownField { test: "explosive_strength", .. }));
    assert!(matches!(sheet.set_field(9, "attempt_1", "3"), Err(CoreError::RowOutOfRange(9))));

    // unreadable text clears the cell
    sheet.set_field(1, "attempt_1", "6").unwrap();
    sheet.set_field(1, "attempt_1", "six").unwrap();
    assert_eq!(sheet.rows()[1].raw_value("attempt_1"), None);
    assert_eq!(sheet.rows()[1].derived.rating, None);
}

#[test]
fn test_stale_stored_derivations_are_recomputed() {
    let metrics = Metrics::new().unwrap();
    let store = MemoryStore::new();
    let stored = json!({
        "id": "1",
        "athlete": {"name": "Sara", "age": "13", "gender": "f"},
        "raw": {"test": "special_speed", "time_s": "20", "wrong": 1},
        "derived": {"final_score": 99, "rating": "weak"},
        "notes": ""
    });
    store.save_results("special_speed", CLUB, &[stored, json!({"garbage": true})]).unwrap();

    let mut sheet = Sheet::<TestRow>::new(TestKind::SpecialSpeed, CLUB);
    sheet.load(&store, &roster(), today(), &metrics).unwrap();
    assert_eq!(sheet.rows().len(), 1);
    assert_eq!(sheet.rows()[0].derived.final_score, Some(22.0));
    assert_eq!(sheet.rows()[0].derived.rating, Some(Rating::VeryGood));
}

#[test]
fn test_rows_can_be_added_and_removed() {
    let metrics = Metrics::new().unwrap();
    let mut sheet = Sheet::<TestRow>::new(TestKind::SpecialEndurance, CLUB);
    sheet.load(&MemoryStore::new(), &roster(), today(), &metrics).unwrap();
    sheet.add_row().unwrap();
    assert_eq!(sheet.rows().len(), 4);
    assert_eq!(sheet.rows()[3].id, "4");
    let removed = sheet.remove_row(0).unwrap();
    assert_eq!(removed.athlete_id.as_deref(), Some("a1"));
    assert_eq!(sheet.rows().len(), 3);
    assert!(matches!(sheet.remove_row(3), Err(CoreError::RowOutOfRange(3))));
}

#[test]
fn test_delete_resets_sheet() {
    let metrics = Metrics::new().unwrap();
    let store = MemoryStore::new();
    let mut sheet = Sheet::<TestRow>::new(TestKind::Groundwork, CLUB);
    sheet.load(&store, &roster(), today(), &metrics).unwrap();
    sheet.save(&store, &metrics).unwrap();

    sheet.delete(&store, &metrics).unwrap();
    assert!(store.get_results("groundwork_skills", CLUB).unwrap().is_empty());
    assert_eq!(sheet.rows().len(), TestKind::Groundwork.descriptor().default_rows);
    assert!(sheet.rows().iter().all(|r| r.athlete_id.is_none()));
}

/// Store that tries to save the same sheet again from inside a save.
struct ReentrantStore<'a> {
    sheet: Cell<Option<&'a Sheet<TestRow>>>,
    metrics: &'a Metrics,
    inner: MemoryStore,
    nested: Cell<Option<bool>>,
}

impl ResultStore for ReentrantStore<'_> {
    fn get_results(&self, t: &str, c: &str) -> Result<Vec<Value>> {
        self.inner.get_results(t, c)
    }

    fn save_results(&self, t: &str, c: &str, rows: &[Value]) -> Result<()> {
        if let Some(sheet) = self.sheet.take() {
            let nested = sheet.save(self, self.metrics);
            self.nested.set(Some(matches!(nested, Err(CoreError::SaveInProgress(_)))));
        }
        self.inner.save_results(t, c, rows)
    }

    fn delete_results(&self, t: &str, c: &str) -> Result<()> {
        self.inner.delete_results(t, c)
    }
}

#[test]
fn test_concurrent_save_is_rejected() {
    let metrics = Metrics::new().unwrap();
    let mut sheet = Sheet::<TestRow>::new(TestKind::ThrowingSkills, CLUB);
    sheet.load(&MemoryStore::new(), &roster(), today(), &metrics).unwrap();

    let store = ReentrantStore {
        sheet: Cell::new(None),
        metrics: &metrics,
        inner: MemoryStore::new(),
        nested: Cell::new(None),
    };
    store.sheet.set(Some(&sheet));
    sheet.save(&store, &metrics).unwrap();

    assert_eq!(store.nested.get(), Some(true));
    assert!(!sheet.is_saving());
    assert_eq!(sheet_saves_total(&metrics, "throwing_skills").get(), 1);
    // the flag is released: a later save goes through
    sheet.save(&store, &metrics).unwrap();
    assert_eq!(sheet_saves_total(&metrics, "throwing_skills").get(), 2);
}

#[test]
fn test_team_record_sheet() {
    let metrics = Metrics::new().unwrap();
    let store = MemoryStore::new();
    let mut sheet = Sheet::<TeamEntry>::new((), CLUB);
    sheet.load(&store, &roster(), today(), &metrics).unwrap();
    assert_eq!(sheet.rows().len(), 3);
    assert_eq!(sheet.rows()[0].category, "أواسط");

    sheet.set_value(0, Capacity::Arms, Side::Right, Some(50.0)).unwrap();
    sheet.set_value(0, Capacity::Arms, Side::Left, Some(50.0)).unwrap();
    sheet.set_value(1, Capacity::Arms, Side::Right, Some(25.0)).unwrap();
    sheet.set_value(1, Capacity::Arms, Side::Left, Some(25.0)).unwrap();
    assert_eq!(sheet.rows()[0].grade(Capacity::Arms), 100.0);
    assert_eq!(sheet.rows()[1].grade(Capacity::Arms), 50.0);

    sheet.set_value(0, Capacity::Arms, Side::Right, Some(10.0)).unwrap();
    sheet.set_value(0, Capacity::Arms, Side::Left, Some(10.0)).unwrap();
    assert_eq!(sheet.rows()[0].grade(Capacity::Arms), 40.0);
    assert_eq!(sheet.rows()[1].grade(Capacity::Arms), 100.0);
    assert_eq!(sheet.rows()[2].standard, None);

    sheet.save(&store, &metrics).unwrap();
    let stored: Vec<TeamEntry> = load_rows(&store, "team_record", CLUB).unwrap();
    assert_eq!(stored, sheet.rows());
}

#[test]
fn test_untagged_stored_rows_survive_a_save() {
    let metrics = Metrics::new().unwrap();
    let store = MemoryStore::new();
    let legacy = json!({
        "id": "1",
        "athlete": {"name": "Sara"},
        "raw": {"time_s": "20", "wrong": 1},
        "notes": "kept?"
    });
    store.save_results("special_speed", "c1", &[legacy]).unwrap();

    let mut sheet = Sheet::<TestRow>::new(TestKind::SpecialSpeed, "c1");
    sheet.load(&store, &MemoryRoster::new(), today(), &metrics).unwrap();
    assert_eq!(sheet.rows().len(), 1);
    assert_eq!(sheet.rows()[0].athlete.name, "Sara");
    assert_eq!(sheet.rows()[0].derived.final_score, Some(20.0));

    sheet.save(&store, &metrics).unwrap();
    let stored = store.get_results("special_speed", "c1").unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["notes"], json!("kept?"));
    assert_eq!(stored[0]["raw"]["test"], json!("special_speed"));
    assert_eq!(stored[0]["raw"]["time_s"], json!(20.0));
}

#[test]
fn test_secretary_sheet_is_read_only() {
    let metrics = Metrics::new().unwrap();
    let store = MemoryStore::new();
    let secretary = Session::new(CLUB, Role::GeneralSecretary);
    assert!(!secretary.can_edit_results());

    let mut sheet = Sheet::<TestRow>::for_session(TestKind::BodyType, &secretary);
    assert!(sheet.is_read_only());
    sheet.load(&store, &roster(), today(), &metrics).unwrap();
    assert_eq!(sheet.rows().len(), 3);

    assert!(matches!(sheet.set_field(0, "weight_kg", "70"), Err(CoreError::ReadOnly(_))));
    assert!(matches!(sheet.add_row(), Err(CoreError::ReadOnly(_))));
    assert!(matches!(sheet.remove_row(0), Err(CoreError::ReadOnly(_))));
    assert!(matches!(sheet.save(&store, &metrics), Err(CoreError::ReadOnly(_))));
    assert!(matches!(sheet.delete(&store, &metrics), Err(CoreError::ReadOnly(_))));
    assert!(store.get_results("body_type", CLUB).unwrap().is_empty());

    let trainer = Session::new(CLUB, Role::PhysicalTrainer);
    let mut editable = Sheet::<TestRow>::for_session(TestKind::BodyType, &trainer);
    editable.load(&store, &roster(), today(), &metrics).unwrap();
    editable.set_field(0, "weight_kg", "70").unwrap();
    editable.save(&store, &metrics).unwrap();
    assert_eq!(store.get_results("body_type", CLUB).unwrap().len(), 3);
}
