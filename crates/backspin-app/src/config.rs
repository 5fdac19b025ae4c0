use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

/// Application configuration, read from the environment after loading an
/// optional `.env` file. The admin credential pair is a placeholder for a
/// real auth mechanism: with nothing configured, no login elevates.
#[derive(Debug, Clone)]
pub struct Config {
    /// Store file location. `None` keeps everything in memory.
    pub store_path: Option<PathBuf>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    /// How long the active toast stays up before auto-dismissing.
    pub toast_ttl: Duration,
    /// Hard cap on a live recording before auto-stop.
    pub capture_cap: Duration,
    /// Delay before the post-login event reminder fires.
    pub reminder_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env if present
        let _ = dotenvy::dotenv();

        let store_path = std::env::var("BACKSPIN_STORE_PATH")
            .unwrap_or_else(|_| "backspin.db".into());

        let toast_ttl = env_secs("BACKSPIN_TOAST_TTL_SECS", 5)?;
        let capture_cap = env_secs("BACKSPIN_CAPTURE_CAP_SECS", 30)?;
        let reminder_delay = env_secs("BACKSPIN_REMINDER_DELAY_SECS", 10)?;

        Ok(Self {
            store_path: Some(PathBuf::from(store_path)),
            admin_email: std::env::var("BACKSPIN_ADMIN_EMAIL").ok(),
            admin_password: std::env::var("BACKSPIN_ADMIN_PASSWORD").ok(),
            toast_ttl,
            capture_cap,
            reminder_delay,
        })
    }

    /// In-memory configuration with the stock timings. Used by tests and
    /// throwaway sessions.
    pub fn ephemeral() -> Self {
        Self {
            store_path: None,
            admin_email: None,
            admin_password: None,
            toast_ttl: Duration::from_secs(5),
            capture_cap: Duration::from_secs(30),
            reminder_delay: Duration::from_secs(10),
        }
    }

    /// True when the given pair matches the configured admin credentials.
    /// Comparison is case-insensitive on the email, exact on the password.
    pub fn is_admin_pair(&self, email: &str, password: &str) -> bool {
        match (&self.admin_email, &self.admin_password) {
            (Some(e), Some(p)) => e.eq_ignore_ascii_case(email) && p == password,
            _ => false,
        }
    }
}

fn env_secs(key: &str, default: u64) -> Result<Duration> {
    let secs: u64 = match std::env::var(key) {
        Ok(raw) => raw.parse()?,
        Err(_) => default,
    };
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_admin_pair_matches_nothing() {
        let config = Config::ephemeral();
        assert!(!config.is_admin_pair("anyone@example.com", "anything"));
    }

    #[test]
    fn admin_email_is_case_insensitive() {
        let mut config = Config::ephemeral();
        config.admin_email = Some("ops@backspin.test".into());
        config.admin_password = Some("spindle".into());

        assert!(config.is_admin_pair("OPS@Backspin.Test", "spindle"));
        assert!(!config.is_admin_pair("ops@backspin.test", "SPINDLE"));
    }
}
