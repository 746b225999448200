use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    GeneralSecretary,
    PhysicalTrainer,
    ClubAdmin,
}

/// Signed-in user context, handed to collaborators instead of a global auth object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(alias = "clubId")]
    pub club_id: String,
    #[serde(default)]
    pub user: String,
    pub role: Role,
    /// Bearer token for the remote store, if it wants one.
    #[serde(default, alias = "idToken", skip_serializing)]
    pub id_token: Option<String>,
}

impl Session {
    pub fn new(club_id: impl Into<String>, role: Role) -> Self {
        Session { club_id: club_id.into(), user: String::new(), role, id_token: None }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.id_token = Some(token.into());
        self
    }

    /// Trainers and club admins fill in test sheets; the secretary only reads them.
    pub fn can_edit_results(&self) -> bool {
        matches!(self.role, Role::PhysicalTrainer | Role::ClubAdmin)
    }
}
