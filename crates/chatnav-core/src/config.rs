#![forbid(unsafe_code)]

//! Navigator timing and presentation knobs.
//!
//! All delays are milliseconds so the configuration round-trips through the
//! JSON options object a host page may hand to the content script.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::summary::DEFAULT_SUMMARY_LEN;

/// Where the page is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameContext {
    /// A normal top-level browser tab.
    TopLevel,
    /// Embedded in the extension's sidebar frame.
    Sidebar,
}

impl FrameContext {
    #[must_use]
    pub const fn is_sidebar(self) -> bool {
        matches!(self, Self::Sidebar)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TopLevel => "tab mode",
            Self::Sidebar => "sidebar mode",
        }
    }
}

/// Configuration for the overlay guardian.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Settle time after the host removes an overlay node.
    pub removal_debounce_ms: u64,

    /// Delay after a history navigation before reconciling; long enough for
    /// the host to commit the new route.
    pub navigation_delay_ms: u64,

    /// Delay before re-scanning a panel that was rebuilt while open.
    pub rebuild_rescan_delay_ms: u64,

    /// First automatic scan after install.
    pub initial_scan_delay_ms: u64,

    /// Retry delay when the document has no body yet.
    pub init_retry_ms: u64,

    /// Presence check interval in top-level tabs.
    pub tick_top_level_ms: u64,

    /// Presence check interval inside the sidebar frame, where hosts
    /// re-render more aggressively.
    pub tick_sidebar_ms: u64,

    /// Maximum summary length in characters (before the ellipsis).
    pub summary_max_len: usize,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            removal_debounce_ms: 50,
            navigation_delay_ms: 500,
            rebuild_rescan_delay_ms: 300,
            initial_scan_delay_ms: 2000,
            init_retry_ms: 200,
            tick_top_level_ms: 3000,
            tick_sidebar_ms: 1500,
            summary_max_len: DEFAULT_SUMMARY_LEN,
        }
    }
}

impl NavigatorConfig {
    /// Parse host-supplied overrides; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub const fn tick_interval(&self, frame: FrameContext) -> Duration {
        match frame {
            FrameContext::TopLevel => Duration::from_millis(self.tick_top_level_ms),
            FrameContext::Sidebar => Duration::from_millis(self.tick_sidebar_ms),
        }
    }

    #[must_use]
    pub const fn removal_debounce(&self) -> Duration {
        Duration::from_millis(self.removal_debounce_ms)
    }

    #[must_use]
    pub const fn navigation_delay(&self) -> Duration {
        Duration::from_millis(self.navigation_delay_ms)
    }

    #[must_use]
    pub const fn rebuild_rescan_delay(&self) -> Duration {
        Duration::from_millis(self.rebuild_rescan_delay_ms)
    }

    #[must_use]
    pub const fn initial_scan_delay(&self) -> Duration {
        Duration::from_millis(self.initial_scan_delay_ms)
    }

    #[must_use]
    pub const fn init_retry(&self) -> Duration {
        Duration::from_millis(self.init_retry_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sidebar_ticks_faster() {
        let config = NavigatorConfig::default();
        assert!(
            config.tick_interval(FrameContext::Sidebar)
                < config.tick_interval(FrameContext::TopLevel)
        );
        assert_eq!(
            config.tick_interval(FrameContext::Sidebar),
            Duration::from_millis(1500)
        );
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = NavigatorConfig::from_json_str(r#"{"navigation_delay_ms": 750}"#).unwrap();
        assert_eq!(
            config,
            NavigatorConfig {
                navigation_delay_ms: 750,
                ..NavigatorConfig::default()
            }
        );
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(
            NavigatorConfig::from_json_str("{}").unwrap(),
            NavigatorConfig::default()
        );
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(NavigatorConfig::from_json_str("{\"tick_sidebar_ms\": \"fast\"}").is_err());
    }

    #[test]
    fn frame_context_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&FrameContext::TopLevel).unwrap(),
            "\"top_level\""
        );
    }
}
