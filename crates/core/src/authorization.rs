//! The authorization record and the payloads that create and mutate it.

use serde::{Deserialize, Serialize};

use crate::id::Id;

/// Lifecycle status of an authorization.
///
/// `Unset` encodes as an empty string and is treated as active.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "")]
    Unset,
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "inactive")]
    Inactive,
}

impl Status {
    pub fn is_active(self) -> bool {
        !matches!(self, Status::Inactive)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Unset => "",
            Status::Active => "active",
            Status::Inactive => "inactive",
        }
    }
}

/// A credential binding a secret token to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    pub id: Id,
    #[serde(rename = "userID")]
    pub user_id: Id,
    pub token: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Input to `create`: everything but `user_id` may be left for the store to fill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAuthorization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(rename = "userID", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default)]
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewAuthorization {
    pub fn for_user(user_id: Id) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_id(mut self, id: Id) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl From<Authorization> for NewAuthorization {
    fn from(a: Authorization) -> Self {
        Self {
            id: Some(a.id),
            user_id: Some(a.user_id),
            token: Some(a.token),
            status: a.status,
            description: a.description,
        }
    }
}

/// Partial update: only the populated fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AuthorizationUpdate {
    /// Apply the populated fields to `auth`. Identity and token are never touched.
    pub fn apply_to(&self, auth: &mut Authorization) {
        if let Some(status) = self.status {
            auth.status = status;
        }
        if let Some(description) = &self.description {
            auth.description = Some(description.clone());
        }
    }
}
