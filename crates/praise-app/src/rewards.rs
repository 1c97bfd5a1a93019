//! Rewards catalog, redemption history and the redeem action.
//!
//! Catalog, history and the caller's own record (for the balance) are always
//! fetched together; the screen only leaves its loading state once all three
//! are in.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use praise_client::ApiClient;
use praise_types::models::{Redemption, Reward, User};

use crate::route::{Route, logout_on_auth_failure};

/// Lifetime of a success banner. Error banners stay until the next action.
pub const BANNER_TTL: Duration = Duration::from_secs(3);

const LOAD_ERROR: &str = "Failed to load rewards";
const REDEEM_ERROR: &str = "Failed to redeem reward";
const NOT_ENOUGH_POINTS: &str = "Not enough points!";
const NOT_LOADED: &str = "Rewards are not loaded yet";
const REDEEMED: &str = "Reward redeemed successfully!";

/// Whether a balance covers a cost. Advisory: the cached balance can be stale
/// and the backend has the final say.
pub fn can_redeem(balance: i64, cost: i64) -> bool {
    balance >= cost
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
    expires_at: Option<Instant>,
}

impl Banner {
    fn error(text: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Error,
            text: text.into(),
            expires_at: None,
        }
    }

    fn success(text: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Success,
            text: text.into(),
            expires_at: None,
        }
    }

    fn is_visible_at(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

#[derive(Debug, Clone)]
struct Catalog {
    rewards: Vec<Reward>,
    redemptions: Vec<Redemption>,
    user: User,
}

#[derive(Debug)]
enum Data {
    Loading,
    Failed(String),
    Ready(Catalog),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewardsScreen {
    Loading,
    Failed { message: String },
    Ready(RewardsPage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardsPage {
    pub balance: String,
    pub banner: Option<(BannerKind, String)>,
    pub rewards: Vec<RewardCard>,
    pub rewards_empty: Option<&'static str>,
    pub redemptions_heading: String,
    pub redemptions: Vec<RedemptionLine>,
    pub redemptions_empty: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardCard {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub cost: String,
    pub redeemable: bool,
    pub button: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionLine {
    pub name: String,
    pub status: String,
    pub points: String,
    pub date: String,
}

pub struct RewardsView {
    client: ApiClient,
    data: Data,
    banner: Option<Banner>,
}

impl RewardsView {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            data: Data::Loading,
            banner: None,
        }
    }

    pub async fn mount(&mut self) -> Option<Route> {
        self.refresh().await
    }

    /// Re-fetch catalog, history and balance as one unit.
    ///
    /// A failed refresh after a successful load keeps the data already on
    /// screen.
    pub async fn refresh(&mut self) -> Option<Route> {
        let fetched = tokio::try_join!(
            self.client.list_rewards(),
            self.client.my_redemptions(),
            self.client.current_user(),
        );

        match fetched {
            Ok((rewards, redemptions, user)) => {
                debug!(
                    "Loaded {} rewards, {} redemptions, balance {}",
                    rewards.len(),
                    redemptions.len(),
                    user.points_balance
                );
                self.data = Data::Ready(Catalog {
                    rewards,
                    redemptions,
                    user,
                });
                None
            }
            Err(e) => {
                if matches!(self.data, Data::Ready(_)) {
                    warn!("Rewards refresh failed, keeping previous data: {}", e);
                } else {
                    self.data = Data::Failed(e.message_or(LOAD_ERROR));
                }
                logout_on_auth_failure(self.client.session(), &e)
            }
        }
    }

    fn catalog(&self) -> Option<&Catalog> {
        match &self.data {
            Data::Ready(catalog) => Some(catalog),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.data, Data::Loading)
    }

    pub fn balance(&self) -> Option<i64> {
        self.catalog().map(|c| c.user.points_balance)
    }

    pub fn rewards(&self) -> &[Reward] {
        self.catalog().map_or(&[], |c| &c.rewards)
    }

    pub fn redemptions(&self) -> &[Redemption] {
        self.catalog().map_or(&[], |c| &c.redemptions)
    }

    /// The banner currently showing, if any.
    pub fn banner(&self) -> Option<&Banner> {
        let now = Instant::now();
        self.banner.as_ref().filter(|b| b.is_visible_at(now))
    }

    /// Redeem a reward from the loaded catalog.
    ///
    /// The cached balance is checked first; an obviously unaffordable reward
    /// never reaches the backend.
    pub async fn redeem(&mut self, reward_id: i64) -> Option<Route> {
        self.banner = None;

        let Some(catalog) = self.catalog() else {
            self.banner = Some(Banner::error(NOT_LOADED));
            return None;
        };
        let balance = catalog.user.points_balance;
        let Some(cost) = catalog
            .rewards
            .iter()
            .find(|r| r.id == reward_id)
            .map(|r| r.point_cost)
        else {
            self.banner = Some(Banner::error("Reward not found"));
            return None;
        };
        if !can_redeem(balance, cost) {
            self.banner = Some(Banner::error(NOT_ENOUGH_POINTS));
            return None;
        }

        match self.client.redeem_reward(reward_id).await {
            Ok(redemption) => {
                info!(
                    "Redeemed reward {} for {} points",
                    redemption.reward_id, redemption.points_spent
                );
                self.banner = Some(Banner::success(REDEEMED));
                let route = self.refresh().await;
                if let Some(banner) = self.banner.as_mut() {
                    banner.expires_at = Some(Instant::now() + BANNER_TTL);
                }
                route
            }
            Err(e) => {
                self.banner = Some(Banner::error(e.message_or(REDEEM_ERROR)));
                logout_on_auth_failure(self.client.session(), &e)
            }
        }
    }

    pub fn render(&self) -> RewardsScreen {
        let catalog = match &self.data {
            Data::Loading => return RewardsScreen::Loading,
            Data::Failed(message) => {
                return RewardsScreen::Failed {
                    message: message.clone(),
                };
            }
            Data::Ready(catalog) => catalog,
        };
        let balance = catalog.user.points_balance;

        let rewards: Vec<RewardCard> = catalog
            .rewards
            .iter()
            .map(|r| {
                let redeemable = can_redeem(balance, r.point_cost);
                RewardCard {
                    id: r.id,
                    name: r.name.clone(),
                    description: r.description.clone().filter(|d| !d.is_empty()),
                    cost: format!("{} points", r.point_cost),
                    redeemable,
                    button: if redeemable { "Redeem" } else { "Not Enough Points" },
                }
            })
            .collect();

        let redemptions: Vec<RedemptionLine> = catalog
            .redemptions
            .iter()
            .map(|r| RedemptionLine {
                name: r.reward.name.clone(),
                status: r.status.to_string(),
                points: format!("{} points", r.points_spent),
                date: r.redeemed_at.format("%Y-%m-%d").to_string(),
            })
            .collect();

        RewardsScreen::Ready(RewardsPage {
            balance: format!("You have {balance} points"),
            banner: self.banner().map(|b| (b.kind, b.text.clone())),
            rewards_empty: rewards.is_empty().then_some("No rewards available yet."),
            rewards,
            redemptions_heading: format!("My Redemptions ({})", redemptions.len()),
            redemptions_empty: redemptions
                .is_empty()
                .then_some("You haven't redeemed any rewards yet."),
            redemptions,
        })
    }
}
