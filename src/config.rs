use clap::Parser;
use std::time::Duration;

/// Runtime settings for the lobby server.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "Bunga lobby server", long_about = None)]
pub struct Config {
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind: String,
    /// Seconds between idle checks; an empty lobby is closed at the next check.
    #[arg(long, env = "IDLE_SECS", default_value_t = 60)]
    pub idle: u64,
    #[arg(long, env = "WORKERS", default_value_t = 4)]
    pub workers: usize,
}

impl Config {
    pub fn idle(&self) -> Duration {
        Duration::from_secs(self.idle.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            idle: 60,
            workers: 4,
        }
    }
}
