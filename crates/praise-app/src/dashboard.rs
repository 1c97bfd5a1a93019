//! Praise feed with an auto-rotating carousel.
//!
//! The view fetches the feed once on mount. While the feed is non-empty a
//! background rotation task advances the displayed index every
//! [`ROTATION_PERIOD`], wrapping at the end of the list. The task belongs to
//! the view: replacing the feed aborts it and starts a fresh one, and dropping
//! or unmounting the view aborts it.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::debug;

use praise_client::ApiClient;
use praise_types::models::Praise;

use crate::route::{Route, logout_on_auth_failure};

pub const ROTATION_PERIOD: Duration = Duration::from_secs(4);

const EMPTY_MESSAGE: &str = "No praise yet! Be the first to give some.";
const LOAD_ERROR: &str = "Failed to load praise";

/// Next carousel position after one tick.
pub fn next_index(index: usize, len: usize) -> usize {
    if len == 0 { 0 } else { (index + 1) % len }
}

#[derive(Debug)]
enum Feed {
    Loading,
    Failed(String),
    Loaded(Vec<Praise>),
}

/// Aborts the rotation task when dropped.
#[derive(Debug)]
struct Rotation {
    task: JoinHandle<()>,
}

impl Rotation {
    fn start(index: watch::Sender<usize>, len: usize, period: Duration) -> Self {
        let task = tokio::spawn(async move {
            // First advance happens one full period after the feed appears.
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                index.send_modify(|i| *i = next_index(*i, len));
            }
        });
        Self { task }
    }
}

impl Drop for Rotation {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardScreen {
    Loading,
    Empty { message: &'static str },
    Failed { message: String },
    Showing(PraiseSlide),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PraiseSlide {
    pub core_value: String,
    pub message: String,
    pub from: String,
    pub to: String,
    pub points: String,
    /// One entry per feed item; `true` marks the one on screen.
    pub dots: Vec<bool>,
    pub counter: String,
}

pub struct DashboardView {
    client: ApiClient,
    feed: Feed,
    index: watch::Receiver<usize>,
    rotation: Option<Rotation>,
}

impl DashboardView {
    pub fn new(client: ApiClient) -> Self {
        let (_, index) = watch::channel(0);
        Self {
            client,
            feed: Feed::Loading,
            index,
            rotation: None,
        }
    }

    /// Fetch the feed. Returns a route when the backend rejected the session.
    pub async fn mount(&mut self) -> Option<Route> {
        match self.client.list_praise().await {
            Ok(praise) => {
                debug!("Loaded {} praise records", praise.len());
                self.set_praise(praise);
                None
            }
            Err(e) => {
                self.stop_rotation();
                self.feed = Feed::Failed(e.message_or(LOAD_ERROR));
                logout_on_auth_failure(self.client.session(), &e)
            }
        }
    }

    /// Replace the feed, restarting the carousel from the first item.
    ///
    /// Must run inside a tokio runtime when `praise` is non-empty.
    pub fn set_praise(&mut self, praise: Vec<Praise>) {
        self.stop_rotation();

        let (tx, rx) = watch::channel(0);
        self.index = rx;
        if !praise.is_empty() {
            self.rotation = Some(Rotation::start(tx, praise.len(), ROTATION_PERIOD));
        }
        self.feed = Feed::Loaded(praise);
    }

    /// Tear down the rotation task. The loaded feed stays in place.
    pub fn unmount(&mut self) {
        self.stop_rotation();
    }

    fn stop_rotation(&mut self) {
        if self.rotation.take().is_some() {
            debug!("Carousel rotation stopped");
        }
    }

    pub fn is_rotating(&self) -> bool {
        self.rotation.as_ref().is_some_and(|r| !r.task.is_finished())
    }

    pub fn praise(&self) -> &[Praise] {
        match &self.feed {
            Feed::Loaded(praise) => praise,
            _ => &[],
        }
    }

    pub fn current_index(&self) -> usize {
        *self.index.borrow()
    }

    pub fn current(&self) -> Option<&Praise> {
        self.praise().get(self.current_index())
    }

    /// Wait for the carousel to move past the item on screen now. Returns
    /// `false` once no rotation is running, so front-ends can stop waiting.
    pub async fn next_rotation(&mut self) -> bool {
        if !self.is_rotating() {
            return false;
        }
        // Ticks already visible through `current_index` do not count.
        self.index.borrow_and_update();
        self.index.changed().await.is_ok()
    }

    pub fn render(&self) -> DashboardScreen {
        let praise = match &self.feed {
            Feed::Loading => return DashboardScreen::Loading,
            Feed::Failed(message) => {
                return DashboardScreen::Failed {
                    message: message.clone(),
                };
            }
            Feed::Loaded(praise) => praise,
        };

        let index = self.current_index();
        let Some(current) = praise.get(index) else {
            return DashboardScreen::Empty {
                message: EMPTY_MESSAGE,
            };
        };

        DashboardScreen::Showing(PraiseSlide {
            core_value: current.core_value.name.clone(),
            message: current.message.clone(),
            from: current.giver.full_name(),
            to: current.receiver.full_name(),
            points: format!("+{} points", current.points_awarded),
            dots: (0..praise.len()).map(|i| i == index).collect(),
            counter: format!("Showing {} of {} recent praise", index + 1, praise.len()),
        })
    }
}
