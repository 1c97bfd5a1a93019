//! In-memory data behind the stub backend.

use std::collections::HashMap;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use serde_json::Value;

use praise_types::models::{CoreValue, Praise, Redemption, RedemptionStatus, Reward, User};

/// Points the backend awards per praise.
pub const POINTS_PER_PRAISE: i64 = 10;

/// One request as the stub saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    /// Raw `Authorization` header, if any.
    pub authorization: Option<String>,
    /// Parsed JSON body, if the request had one.
    pub body: Option<Value>,
}

impl RecordedRequest {
    pub fn bearer(&self) -> Option<&str> {
        self.authorization.as_deref()?.strip_prefix("Bearer ")
    }
}

#[derive(Debug, Clone)]
pub struct ForcedFailure {
    pub status: StatusCode,
    pub detail: Option<String>,
}

#[derive(Debug, Default)]
pub struct StubState {
    pub users: Vec<User>,
    pub passwords: HashMap<String, String>,
    pub core_values: Vec<CoreValue>,
    pub praise: Vec<Praise>,
    pub rewards: Vec<Reward>,
    pub redemptions: Vec<Redemption>,
    pub tokens: HashMap<String, i64>,
    pub requests: Vec<RecordedRequest>,
    failures: HashMap<(Method, String), ForcedFailure>,
    next_id: i64,
}

impl StubState {
    pub fn empty() -> Self {
        Self {
            next_id: 100,
            ..Self::default()
        }
    }

    /// Two users, three core values, two active rewards (plus one retired) and
    /// three praise records.
    ///
    /// | user | email | password | balance |
    /// |---|---|---|---|
    /// | 1 Chris Smith | chris@example.com | password1 | 40 |
    /// | 2 Sarah Johnson | sarah@example.com | password2 | 150 |
    pub fn seeded() -> Self {
        let mut state = Self::empty();
        state.add_user(1, "chris@example.com", "password1", "Chris", "Smith", 40);
        state.add_user(2, "sarah@example.com", "password2", "Sarah", "Johnson", 150);

        for (id, name) in [(1, "Teamwork"), (2, "Ownership"), (3, "Customer Focus")] {
            state.core_values.push(CoreValue {
                id,
                name: name.into(),
                description: None,
            });
        }

        state.rewards.push(Reward {
            id: 1,
            name: "Coffee Voucher".into(),
            description: Some("A coffee on the house".into()),
            point_cost: 50,
            is_active: true,
        });
        state.rewards.push(Reward {
            id: 2,
            name: "Extra Day Off".into(),
            description: None,
            point_cost: 100,
            is_active: true,
        });
        state.rewards.push(Reward {
            id: 3,
            name: "Retired Swag".into(),
            description: None,
            point_cost: 5,
            is_active: false,
        });

        state.seed_praise(1, 2, 1, "Thanks for covering the release");
        state.seed_praise(2, 1, 2, "Owned the incident end to end");
        state.seed_praise(1, 2, 3, "Great call with the customer");
        state
    }

    pub fn add_user(
        &mut self,
        id: i64,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
        points_balance: i64,
    ) {
        self.users.push(User {
            id,
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            points_balance,
            created_at: Utc::now(),
        });
        self.passwords.insert(email.into(), password.into());
    }

    /// Insert a praise record without touching balances.
    pub fn seed_praise(&mut self, giver_id: i64, receiver_id: i64, core_value_id: i64, message: &str) {
        let Some(record) = self.build_praise(giver_id, receiver_id, core_value_id, message) else {
            return;
        };
        self.praise.push(record);
    }

    pub fn user(&self, id: i64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_mut(&mut self, id: i64) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    pub fn issue_token(&mut self, user_id: i64) -> String {
        let token = format!("token-{}-{}", user_id, self.alloc_id());
        self.tokens.insert(token.clone(), user_id);
        token
    }

    pub fn fail_next(&mut self, method: Method, path: &str, status: StatusCode, detail: Option<&str>) {
        self.failures.insert(
            (method, path.to_string()),
            ForcedFailure {
                status,
                detail: detail.map(str::to_string),
            },
        );
    }

    pub(crate) fn take_failure(&mut self, method: &Method, path: &str) -> Option<ForcedFailure> {
        self.failures.remove(&(method.clone(), path.to_string()))
    }

    pub(crate) fn alloc_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    pub(crate) fn build_praise(
        &mut self,
        giver_id: i64,
        receiver_id: i64,
        core_value_id: i64,
        message: &str,
    ) -> Option<Praise> {
        let giver = self.user(giver_id)?.clone();
        let receiver = self.user(receiver_id)?.clone();
        let core_value = self.core_values.iter().find(|c| c.id == core_value_id)?.clone();
        let id = self.alloc_id();
        // Spread creation times so "newest first" ordering is stable.
        let created_at = Utc::now() + Duration::milliseconds(id);
        Some(Praise {
            id,
            giver_id,
            receiver_id,
            core_value_id,
            message: message.into(),
            points_awarded: POINTS_PER_PRAISE,
            created_at,
            giver,
            receiver,
            core_value,
        })
    }

    pub(crate) fn build_redemption(&mut self, user_id: i64, reward: Reward) -> Redemption {
        let id = self.alloc_id();
        Redemption {
            id,
            user_id,
            reward_id: reward.id,
            points_spent: reward.point_cost,
            status: RedemptionStatus::Pending,
            redeemed_at: Utc::now(),
            reward,
        }
    }
}
