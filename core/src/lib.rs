pub mod api;
pub mod category;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod evaluation;
pub mod metrics;
pub mod models;
pub mod print;
pub mod remote;
pub mod session;
pub mod sheet;
pub mod store;
pub mod team_record;
pub mod units;

#[cfg(feature = "python")]
mod py;

pub use api::{athlete_category_json, evaluate_rows_json, normalize_label_json, team_record_json};
pub use category::{
    age_on, category_for_age, category_for_birth_year, derive_category, normalize_category_label,
    CategoryId, CategorySpec,
};
pub use config::{load_config, PortalConfig};
pub use descriptor::{Measurement, TestKind, TestRow};
pub use error::{CoreError, Result};
pub use evaluation::Rating;
pub use metrics::Metrics;
pub use models::{Athlete, Gender};
pub use session::{Role, Session};
pub use sheet::Sheet;
pub use store::{FileStore, MemoryRoster, MemoryStore, ResultStore, RosterSource};
pub use team_record::{Capacity, Side, TeamEntry};
pub use units::RoundTo;
