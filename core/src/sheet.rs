// core/src/sheet.rs
// Sheet lifecycle: load → placeholders → roster auto-fill → edit/recompute → save.
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::descriptor::{tag_raw, TestKind, TestRow};
use crate::error::{CoreError, Result};
use crate::metrics::{
    roster_autofills_total, sheet_loads_total, sheet_saves_total, store_failures_total, Metrics,
};
use crate::models::Athlete;
use crate::config::PortalConfig;
use crate::session::Session;
use crate::store::{load_rows_with, save_rows, ResultStore, RosterSource};
use crate::team_record::{self, Capacity, Side, TeamEntry};

/// What the generic sheet needs from a row type.
pub trait SheetRow: Clone + Serialize + DeserializeOwned {
    type Kind: Copy;

    fn store_key(kind: Self::Kind) -> &'static str;
    fn default_rows(kind: Self::Kind) -> usize;
    fn placeholder(kind: Self::Kind, index: usize) -> Self;
    fn from_athlete(kind: Self::Kind, index: usize, athlete: &Athlete, today: NaiveDate) -> Self;
    fn has_name(&self) -> bool;
    /// Fills in what older stored rows left out, before decoding.
    fn prepare_stored(_kind: Self::Kind, _value: &mut Value) {}
    /// Recompute every derived field of every row.
    fn refresh(rows: &mut [Self]);
}

impl SheetRow for TestRow {
    type Kind = TestKind;

    fn store_key(kind: TestKind) -> &'static str {
        kind.key()
    }

    fn default_rows(kind: TestKind) -> usize {
        kind.descriptor().default_rows
    }

    fn placeholder(kind: TestKind, index: usize) -> Self {
        TestRow::placeholder(kind, index)
    }

    fn from_athlete(kind: TestKind, index: usize, athlete: &Athlete, today: NaiveDate) -> Self {
        TestRow::from_athlete(kind, index, athlete, today)
    }

    fn has_name(&self) -> bool {
        !self.athlete.name.trim().is_empty()
    }

    fn prepare_stored(kind: TestKind, value: &mut Value) {
        tag_raw(kind, value);
    }

    fn refresh(rows: &mut [Self]) {
        rows.iter_mut().for_each(TestRow::recompute);
    }
}

pub const TEAM_RECORD_KEY: &str = "team_record";

impl SheetRow for TeamEntry {
    type Kind = ();

    fn store_key(_: ()) -> &'static str {
        TEAM_RECORD_KEY
    }

    fn default_rows(_: ()) -> usize {
        6
    }

    fn placeholder(_: (), index: usize) -> Self {
        TeamEntry::placeholder(index)
    }

    fn from_athlete(_: (), index: usize, athlete: &Athlete, today: NaiveDate) -> Self {
        TeamEntry::from_athlete(index, athlete, today)
    }

    fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    fn refresh(rows: &mut [Self]) {
        team_record::normalize(rows);
    }
}

pub struct Sheet<R: SheetRow> {
    kind: R::Kind,
    club_id: String,
    rows: Vec<R>,
    placeholder_rows: usize,
    read_only: bool,
    saving: AtomicBool,
}

/// Clears the saving flag when the save returns, whatever the outcome.
struct SavingGuard<'a>(&'a AtomicBool);

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<R: SheetRow> Sheet<R> {
    pub fn new(kind: R::Kind, club_id: impl Into<String>) -> Self {
        Sheet {
            kind,
            club_id: club_id.into(),
            rows: Vec::new(),
            placeholder_rows: R::default_rows(kind),
            read_only: false,
            saving: AtomicBool::new(false),
        }
    }

    /// The session's club; read-only unless the role may edit results.
    pub fn for_session(kind: R::Kind, session: &Session) -> Self {
        let mut sheet = Self::new(kind, session.club_id.clone());
        sheet.read_only = !session.can_edit_results();
        sheet
    }

    pub fn from_config(kind: R::Kind, cfg: &PortalConfig, session: &Session) -> Self {
        Self::for_session(kind, session).with_placeholder_rows(cfg.placeholder_rows)
    }

    /// Overrides the descriptor's placeholder count (0 keeps the default).
    pub fn with_placeholder_rows(mut self, n: usize) -> Self {
        if n > 0 {
            self.placeholder_rows = n;
        }
        self
    }

    pub fn kind(&self) -> R::Kind {
        self.kind
    }

    pub fn key(&self) -> &'static str {
        R::store_key(self.kind)
    }

    pub fn club_id(&self) -> &str {
        &self.club_id
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::SeqCst)
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn check_writable(&self) -> Result<()> {
        if self.read_only {
            return Err(CoreError::ReadOnly(format!("{}/{}", self.key(), self.club_id)));
        }
        Ok(())
    }

    /// Replaces the rows wholesale and recomputes.
    pub fn set_rows(&mut self, rows: Vec<R>) {
        self.rows = rows;
        R::refresh(&mut self.rows);
    }

    /// Stored rows, or placeholders; auto-filled from the roster while every name is empty.
    /// A roster failure keeps the placeholders; a store failure is returned.
    pub fn load(
        &mut self,
        store: &dyn ResultStore,
        roster: &dyn RosterSource,
        today: NaiveDate,
        metrics: &Metrics,
    ) -> Result<()> {
        let key = self.key();
        let kind = self.kind;
        let stored = load_rows_with(store, key, &self.club_id, |v| R::prepare_stored(kind, v));
        let mut rows: Vec<R> = match stored {
            Ok(rows) => rows,
            Err(e) => {
                store_failures_total(metrics, key).inc();
                warn!("⚠️ could not load {} for club {}: {}", key, self.club_id, e);
                return Err(e);
            }
        };
        sheet_loads_total(metrics, key).inc();

        if rows.is_empty() {
            rows = (0..self.placeholder_rows).map(|i| R::placeholder(self.kind, i)).collect();
        }

        if rows.iter().all(|r| !r.has_name()) {
            match roster.athletes_by_club(&self.club_id) {
                Ok(athletes) if !athletes.is_empty() => {
                    rows = athletes
                        .iter()
                        .enumerate()
                        .map(|(i, a)| R::from_athlete(self.kind, i, a, today))
                        .collect();
                    roster_autofills_total(metrics, key).inc();
                    info!("📋 {} pre-filled with {} athletes (club {})", key, rows.len(), self.club_id);
                }
                Ok(_) => {}
                Err(e) => warn!("⚠️ roster unavailable for club {}: {}", self.club_id, e),
            }
        }

        self.set_rows(rows);
        Ok(())
    }

    /// Applies one edit to one row, then recomputes the whole sheet.
    pub fn edit<F>(&mut self, index: usize, apply: F) -> Result<()>
    where
        F: FnOnce(&mut R) -> Result<()>,
    {
        self.check_writable()?;
        let row = self.rows.get_mut(index).ok_or(CoreError::RowOutOfRange(index))?;
        apply(row)?;
        R::refresh(&mut self.rows);
        Ok(())
    }

    pub fn add_row(&mut self) -> Result<()> {
        self.check_writable()?;
        let next = R::placeholder(self.kind, self.rows.len());
        self.rows.push(next);
        R::refresh(&mut self.rows);
        Ok(())
    }

    pub fn remove_row(&mut self, index: usize) -> Result<R> {
        self.check_writable()?;
        if index >= self.rows.len() {
            return Err(CoreError::RowOutOfRange(index));
        }
        let removed = self.rows.remove(index);
        R::refresh(&mut self.rows);
        Ok(removed)
    }

    /// Whole-array replace. Rejected on a read-only sheet and while another save on this
/// sheet is running.
    pub fn save(&self, store: &dyn ResultStore, metrics: &Metrics) -> Result<()> {
        self.check_writable()?;
        let key = self.key();
        if self.saving.swap(true, Ordering::SeqCst) {
            return Err(CoreError::SaveInProgress(format!("{}/{}", key, self.club_id)));
        }
        let _guard = SavingGuard(&self.saving);

        match save_rows(store, key, &self.club_id, &self.rows) {
            Ok(()) => {
                sheet_saves_total(metrics, key).inc();
                info!("✅ {} saved ({} rows, club {})", key, self.rows.len(), self.club_id);
                Ok(())
            }
            Err(e) => {
                store_failures_total(metrics, key).inc();
                warn!("⚠️ saving {} for club {} failed: {}", key, self.club_id, e);
                Err(e)
            }
        }
    }

    /// Drops the stored document and resets to placeholders.
    pub fn delete(&mut self, store: &dyn ResultStore, metrics: &Metrics) -> Result<()> {
        self.check_writable()?;
        let key = self.key();
        if let Err(e) = store.delete_results(key, &self.club_id) {
            store_failures_total(metrics, key).inc();
            return Err(e);
        }
        let rows = (0..self.placeholder_rows).map(|i| R::placeholder(self.kind, i)).collect();
        self.set_rows(rows);
        Ok(())
    }
}

impl Sheet<TestRow> {
    /// Sets one cell from user text.
    pub fn set_field(&mut self, index: usize, field: &str, value: &str) -> Result<()> {
        self.edit(index, |row| row.set_field(field, value))
    }
}

impl Sheet<TeamEntry> {
    /// Sets one raw value; every athlete's grades follow.
    pub fn set_value(
        &mut self,
        index: usize,
        capacity: Capacity,
        side: Side,
        value: Option<f64>,
    ) -> Result<()> {
        self.edit(index, |entry| {
            entry.set_value(capacity, side, value);
            Ok(())
        })
    }
}
