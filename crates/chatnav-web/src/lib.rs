#![forbid(unsafe_code)]

//! WASM content script for the conversation navigator.
//!
//! This crate is intentionally host-specific (web/WASM). It binds
//! `chatnav-core` to the live page:
//! - a `web-sys` implementation of [`HostDom`](chatnav_core::HostDom),
//! - `MutationObserver`s on the body subtree and the document root,
//! - the periodic presence tick and one-shot wakeups for pending deadlines,
//! - `history.pushState` / `history.replaceState` wrappers and `popstate`.
//!
//! The extension's loader imports the generated module and calls `boot()`;
//! the background script may call `stripFrameBlockers(headers)` from its
//! response-header listener.

use chatnav_core::NavigatorConfig;

#[cfg(target_arch = "wasm32")]
mod wasm;
#[cfg(target_arch = "wasm32")]
mod web_dom;

#[cfg(target_arch = "wasm32")]
pub use wasm::{boot, strip_frame_blockers_js};

/// Window property marking the navigator as loaded on this page.
pub const LOADED_FLAG: &str = "__chatnavLoaded";

/// Parse the optional JSON options handed to `boot()`.
pub fn parse_options(json: Option<&str>) -> Result<NavigatorConfig, serde_json::Error> {
    match json.map(str::trim) {
        None | Some("") | Some("null") | Some("undefined") => Ok(NavigatorConfig::default()),
        Some(json) => NavigatorConfig::from_json_str(json),
    }
}

/// Whether a click closure must outlive the pass that just ran.
///
/// `owner_id` is the id of the overlay control (toggle or panel) enclosing
/// the element, if any; `owner_id_taken` says whether the document currently
/// resolves that id to some node. A detached control may be re-attached by
/// the host, so its closures stay alive until a rebuilt control takes its id.
/// Detached nodes outside any control (rows cleared by a rescan) are dead.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
pub(crate) fn keep_listener(connected: bool, owner_id: Option<&str>, owner_id_taken: bool) -> bool {
    connected || (owner_id.is_some() && !owner_id_taken)
}

/// Native builds compile this crate as a stub so `cargo check --workspace`
/// stays green on non-wasm targets. There is no page to attach to.
#[cfg(not(target_arch = "wasm32"))]
pub fn boot() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_options_use_defaults() {
        for json in [None, Some(""), Some("null"), Some(" undefined ")] {
            assert_eq!(parse_options(json).unwrap(), NavigatorConfig::default());
        }
    }

    #[test]
    fn connected_controls_keep_their_listeners() {
        assert!(keep_listener(true, Some("chatnav-toggle"), true));
        assert!(keep_listener(true, None, false));
    }

    #[test]
    fn detached_control_keeps_listener_until_replaced() {
        // Host re-parenting: the toggle is out of the document for a moment
        // and nothing has been rebuilt under its id yet.
        assert!(keep_listener(false, Some("chatnav-toggle"), false));
        // A rebuilt toggle now owns the id; the old node is gone for good.
        assert!(!keep_listener(false, Some("chatnav-toggle"), true));
    }

    #[test]
    fn cleared_rows_drop_their_listeners() {
        assert!(!keep_listener(false, None, false));
    }

    #[test]
    fn options_override_fields() {
        let config = parse_options(Some(r#"{"tick_sidebar_ms": 1000}"#)).unwrap();
        assert_eq!(config.tick_sidebar_ms, 1000);
        assert_eq!(config.tick_top_level_ms, 3000);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn native_boot_is_inert() {
        assert!(!boot());
    }
}
