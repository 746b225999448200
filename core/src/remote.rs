// core/src/remote.rs
use std::time::Duration;

use log::{debug, info};
use serde_json::Value;
use ureq::Agent;

use crate::error::{CoreError, Result};
use crate::models::Athlete;
use crate::session::Session;
use crate::store::{document_id, path_segment, ResultStore, ResultsDocument, RosterSource};

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// REST document store client – simple blocking version (ureq).
///
/// Layout:
/// - `GET|PUT|DELETE {base}/results/{test}_{club}` → `{"results": [...]}`
/// - `GET {base}/clubs/{club}/athletes` → `[athlete, ...]`
pub struct HttpStore {
    agent: Agent,
    base_url: String,
    token: Option<String>,
}

impl HttpStore {
    pub fn new(base_url: &str, session: &Session) -> Self {
        Self::with_timeout(base_url, session, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, session: &Session, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        HttpStore {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: session.id_token.clone(),
        }
    }

    pub fn results_url(&self, test_key: &str, club_id: &str) -> String {
        format!("{}/results/{}", self.base_url, document_id(test_key, club_id))
    }

    pub fn roster_url(&self, club_id: &str) -> String {
        format!("{}/clubs/{}/athletes", self.base_url, path_segment(club_id))
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        let req = self.agent.request(method, url);
        match &self.token {
            Some(t) => req.set("Authorization", &format!("Bearer {t}")),
            None => req,
        }
    }
}

fn is_not_found(e: &ureq::Error) -> bool {
    matches!(e, ureq::Error::Status(404, _))
}

impl ResultStore for HttpStore {
    fn get_results(&self, test_key: &str, club_id: &str) -> Result<Vec<Value>> {
        let url = self.results_url(test_key, club_id);
        match self.request("GET", &url).call() {
            Ok(resp) => {
                let doc: ResultsDocument = resp.into_json()?;
                debug!("[store] GET {} => {} rows", url, doc.results.len());
                Ok(doc.results)
            }
            Err(e) if is_not_found(&e) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save_results(&self, test_key: &str, club_id: &str, rows: &[Value]) -> Result<()> {
        let url = self.results_url(test_key, club_id);
        let body = serde_json::to_value(ResultsDocument::new(rows))?;
        self.request("PUT", &url).send_json(body)?;
        info!("[store] PUT {} ({} rows)", url, rows.len());
        Ok(())
    }

    fn delete_results(&self, test_key: &str, club_id: &str) -> Result<()> {
        let url = self.results_url(test_key, club_id);
        match self.request("DELETE", &url).call() {
            Ok(_) => Ok(()),
            Err(e) if is_not_found(&e) => Ok(()),
            Err(e) => Err(CoreError::from(e)),
        }
    }
}

impl RosterSource for HttpStore {
    fn athletes_by_club(&self, club_id: &str) -> Result<Vec<Athlete>> {
        let url = self.roster_url(club_id);
        match self.request("GET", &url).call() {
            Ok(resp) => Ok(resp.into_json()?),
            Err(e) if is_not_found(&e) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}
