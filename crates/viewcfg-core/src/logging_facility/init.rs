//! Subscriber installation

use serde::{Deserialize, Serialize};
use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Output profile, chosen by `log_profile` in the store config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Human-readable lines at debug level
    #[default]
    Development,
    /// One JSON object per event at info level
    Production,
    /// No output; tests install `init_test_capture()` instead
    Test,
}

impl Profile {
    /// Filter used when `RUST_LOG` is unset
    pub fn default_directive(self) -> &'static str {
        match self {
            Profile::Development => "viewcfg=debug",
            Profile::Production => "viewcfg=info",
            Profile::Test => "off",
        }
    }

    fn env_filter(self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }
}

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber for `profile`
///
/// Only the first call in a process has any effect.
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        // try_init throughout: embedding applications may own the subscriber
        let installed = match profile {
            Profile::Development => tracing_subscriber::fmt()
                .with_env_filter(profile.env_filter())
                .try_init()
                .is_ok(),
            Profile::Production => tracing_subscriber::fmt()
                .json()
                .with_env_filter(profile.env_filter())
                .try_init()
                .is_ok(),
            Profile::Test => tracing_subscriber::registry().try_init().is_ok(),
        };
        tracing::debug!(?profile, installed, "logging initialized");
    });
}
