use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Backend-maintained; the client never computes it.
    pub points_balance: i64,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreValue {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A recognition record from one user to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Praise {
    pub id: i64,
    pub giver_id: i64,
    pub receiver_id: i64,
    pub core_value_id: i64,
    pub message: String,
    pub points_awarded: i64,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,

    pub giver: User,
    pub receiver: User,
    pub core_value: CoreValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub point_cost: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redemption {
    pub id: i64,
    pub user_id: i64,
    pub reward_id: i64,
    pub points_spent: i64,
    pub status: RedemptionStatus,
    #[serde(with = "crate::timestamp")]
    pub redeemed_at: DateTime<Utc>,
    pub reward: Reward,
}

/// Fulfilment state of a redemption. Statuses this client does not know are
/// kept verbatim instead of failing the whole response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RedemptionStatus {
    Pending,
    Fulfilled,
    Other(String),
}

impl RedemptionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Fulfilled => "fulfilled",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for RedemptionStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => Self::Pending,
            "fulfilled" => Self::Fulfilled,
            _ => Self::Other(value),
        }
    }
}

impl From<RedemptionStatus> for String {
    fn from(value: RedemptionStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RedemptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
