use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

pub const DEFAULT_AVATAR_URL: &str = "https://api.dicebear.com/7.x/avataaars/svg?seed=default";
pub const DEFAULT_BIO: &str = "Welcome to my Nexus profile!";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub shell: ShellConfig,
    pub search: SearchConfig,
    pub notifications: NotificationConfig,
    pub profile: ProfileDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quiet period before a scheduled lookup fires
    pub debounce_ms: u64,
    /// Minimum trimmed query length, in characters
    pub min_query_chars: usize,
    pub result_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// How many notifications the badge refresh fetches
    pub badge_fetch_limit: usize,
}

/// Values used when a profile has to be synthesized or a field is left blank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDefaults {
    pub avatar_url: String,
    pub bio: String,
    pub first_name: String,
    pub last_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shell: ShellConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            search: SearchConfig {
                debounce_ms: 300,
                min_query_chars: 2,
                result_limit: 20,
            },
            notifications: NotificationConfig {
                badge_fetch_limit: 50,
            },
            profile: ProfileDefaults {
                avatar_url: DEFAULT_AVATAR_URL.to_string(),
                bio: DEFAULT_BIO.to_string(),
                first_name: "User".to_string(),
                last_name: "Name".to_string(),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            shell: ShellConfig {
                host: env::var("NEXUS_SHELL_HOST").unwrap_or(defaults.shell.host),
                port: parse_var("NEXUS_SHELL_PORT", defaults.shell.port)?,
            },
            search: SearchConfig {
                debounce_ms: parse_var("NEXUS_SEARCH_DEBOUNCE_MS", defaults.search.debounce_ms)?,
                min_query_chars: parse_var(
                    "NEXUS_SEARCH_MIN_CHARS",
                    defaults.search.min_query_chars,
                )?,
                result_limit: parse_var("NEXUS_SEARCH_LIMIT", defaults.search.result_limit)?,
            },
            notifications: NotificationConfig {
                badge_fetch_limit: parse_var(
                    "NEXUS_NOTIFICATION_BADGE_LIMIT",
                    defaults.notifications.badge_fetch_limit,
                )?,
            },
            profile: ProfileDefaults {
                avatar_url: env::var("NEXUS_DEFAULT_AVATAR_URL")
                    .unwrap_or(defaults.profile.avatar_url),
                bio: env::var("NEXUS_DEFAULT_BIO").unwrap_or(defaults.profile.bio),
                ..defaults.profile
            },
        })
    }

    pub fn shell_address(&self) -> String {
        format!("{}:{}", self.shell.host, self.shell.port)
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid value for {}: {}", name, e)),
        Err(_) => Ok(default),
    }
}
