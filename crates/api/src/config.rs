//! Environment configuration, read once at startup.

use std::net::SocketAddr;
use std::path::PathBuf;

use reservo_bookings::stats::DEFAULT_UPCOMING_DAYS;

pub const BIND_ADDR_ENV: &str = "RESERVO_BIND_ADDR";
pub const SEED_FILE_ENV: &str = "RESERVO_SEED_FILE";
pub const UPCOMING_DAYS_ENV: &str = "RESERVO_UPCOMING_DAYS";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Upper bound for the upcoming-bookings window, in days.
pub const MAX_UPCOMING_DAYS: i64 = 3650;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    /// JSON array of kind-tagged raw booking records loaded at startup.
    pub seed_file: Option<PathBuf>,
    pub upcoming_days: i64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            seed_file: None,
            upcoming_days: DEFAULT_UPCOMING_DAYS,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Invalid values fall back to defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let bind_addr = match lookup(BIND_ADDR_ENV) {
            None => defaults.bind_addr,
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "{BIND_ADDR_ENV} is not a socket address; using {DEFAULT_BIND_ADDR}");
                defaults.bind_addr
            }),
        };

        let seed_file = lookup(SEED_FILE_ENV)
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from);
        if seed_file.is_none() {
            tracing::warn!("{SEED_FILE_ENV} not set; starting with an empty booking store");
        }

        let upcoming_days = match lookup(UPCOMING_DAYS_ENV) {
            None => defaults.upcoming_days,
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(days) if (0..=MAX_UPCOMING_DAYS).contains(&days) => days,
                Ok(days) if days > MAX_UPCOMING_DAYS => {
                    tracing::warn!(value = days, "{UPCOMING_DAYS_ENV} capped at {MAX_UPCOMING_DAYS}");
                    MAX_UPCOMING_DAYS
                }
                _ => {
                    tracing::warn!(value = %raw, "{UPCOMING_DAYS_ENV} must be a non-negative integer; using {DEFAULT_UPCOMING_DAYS}");
                    defaults.upcoming_days
                }
            },
        };

        Self {
            bind_addr,
            seed_file,
            upcoming_days,
        }
    }
}
