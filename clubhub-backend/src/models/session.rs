use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Kind of account a login session belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AccountType {
    Student,
    Club,
}

/// Web login session
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: i64,
    pub token: String,
    pub account_type: AccountType,
    pub account_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
