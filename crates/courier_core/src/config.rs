//! Process-wide courier configuration.
//!
//! # Responsibility
//! - Hold the interceptor address that redirects every email in non-production
//!   environments.
//!
//! # Invariants
//! - An empty or whitespace-only interceptor address counts as unset.
//! - Reads never panic; a poisoned lock still yields the last written value.

use log::info;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};

/// Environment variable read by [`CourierConfig::from_env`].
pub const INTERCEPTOR_EMAIL_ENV: &str = "COURIER_INTERCEPTOR_EMAIL";

static CONFIGURATION: Lazy<RwLock<CourierConfig>> =
    Lazy::new(|| RwLock::new(CourierConfig::default()));

/// Courier settings consulted at delivery time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourierConfig {
    /// When set, every email is delivered here instead of its own recipient.
    pub interceptor_email: Option<String>,
}

impl CourierConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Self {
        Self {
            interceptor_email: std::env::var(INTERCEPTOR_EMAIL_ENV).ok(),
        }
    }

    /// Returns the interceptor address when configured non-empty.
    pub fn interceptor(&self) -> Option<&str> {
        self.interceptor_email
            .as_deref()
            .filter(|address| !address.trim().is_empty())
    }
}

/// Mutates the process-wide configuration.
pub fn configure(update: impl FnOnce(&mut CourierConfig)) {
    let mut guard = CONFIGURATION
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    update(&mut *guard);
    info!(
        "event=courier_configure module=config status=ok interceptor={}",
        guard.interceptor().is_some()
    );
}

/// Returns a snapshot of the process-wide configuration.
pub fn configuration() -> CourierConfig {
    CONFIGURATION
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Restores the process-wide configuration to defaults.
pub fn reset_configuration() {
    configure(|config| *config = CourierConfig::default());
}
