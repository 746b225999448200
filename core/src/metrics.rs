use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::error::Result;

/// Counters for sheet traffic, labelled by test key.
#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,
    sheet_loads: IntCounterVec,
    sheet_saves: IntCounterVec,
    store_failures: IntCounterVec,
    roster_autofills: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let counter = |name: &str, help: &str| -> Result<IntCounterVec> {
            let c = IntCounterVec::new(Opts::new(name, help), &["test"])?;
            registry.register(Box::new(c.clone()))?;
            Ok(c)
        };
        let sheet_loads = counter("judofed_sheet_loads_total", "Sheets loaded from the store")?;
        let sheet_saves = counter("judofed_sheet_saves_total", "Sheets saved to the store")?;
        let store_failures = counter("judofed_store_failures_total", "Failed store calls")?;
        let roster_autofills =
            counter("judofed_roster_autofills_total", "Sheets pre-filled from the club roster")?;
        Ok(Metrics { registry, sheet_loads, sheet_saves, store_failures, roster_autofills })
    }

    /// Prometheus text exposition.
    pub fn render(&self) -> Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

pub fn sheet_loads_total(m: &Metrics, test: &str) -> IntCounter {
    m.sheet_loads.with_label_values(&[test])
}

pub fn sheet_saves_total(m: &Metrics, test: &str) -> IntCounter {
    m.sheet_saves.with_label_values(&[test])
}

pub fn store_failures_total(m: &Metrics, test: &str) -> IntCounter {
    m.store_failures.with_label_values(&[test])
}

pub fn roster_autofills_total(m: &Metrics, test: &str) -> IntCounter {
    m.roster_autofills.with_label_values(&[test])
}
