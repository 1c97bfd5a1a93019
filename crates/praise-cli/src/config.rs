use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use praise_client::client::DEFAULT_API_URL;
use praise_client::{ApiClient, ApiConfig, Session};

/// Praise and rewards from the terminal
#[derive(Parser, Debug)]
#[command(name = "praise")]
#[command(about = "Give praise, watch the feed and redeem rewards")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Command,
}

/// Connection settings. Flags win over the environment, which wins over the
/// defaults; `.env` is loaded before parsing.
#[derive(Args, Debug, Clone)]
pub struct Config {
    /// Base URL of the praise backend
    #[arg(long, global = true, env = "PRAISE_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// File holding the session token
    #[arg(
        long,
        global = true,
        env = "PRAISE_SESSION_PATH",
        default_value = "praise-session.json"
    )]
    pub session_path: PathBuf,
}

impl Config {
    pub fn session(&self) -> Session {
        Session::file(&self.session_path)
    }

    pub fn client(&self) -> anyhow::Result<ApiClient> {
        Ok(ApiClient::new(
            ApiConfig::with_base_url(&self.api_url),
            self.session(),
        )?)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and store the session token
    Login(Credentials),

    /// Create an account, then log in
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[command(flatten)]
        credentials: Credentials,
    },

    /// Forget the stored session token
    Logout,

    /// Show the recent praise carousel
    Feed {
        /// Rotations to show before exiting
        #[arg(long, env = "PRAISE_FEED_ROUNDS", default_value_t = 8)]
        rounds: usize,
    },

    /// Praise a colleague
    Give {
        /// Receiver user id
        #[arg(long)]
        to: String,
        /// Core value id
        #[arg(long)]
        value: String,
        #[arg(long, short)]
        message: String,
    },

    /// List who can be praised and for which core values
    Recipients,

    /// Show balance, rewards and past redemptions
    Rewards,

    /// Redeem a reward by id
    Redeem { reward_id: i64 },

    /// Show the logged in user
    Whoami,
}

#[derive(Args, Debug, Clone)]
pub struct Credentials {
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "PRAISE_PASSWORD", hide_env_values = true)]
    pub password: String,
}
