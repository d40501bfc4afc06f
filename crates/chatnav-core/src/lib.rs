#![forbid(unsafe_code)]

//! Core of the conversation navigator: site profiles, locator chains,
//! summaries, the panel controller and the overlay guardian.
//!
//! Nothing here touches a browser directly. The host page is reached through
//! the [`dom::HostDom`] trait and time is supplied by the host, so the whole
//! pipeline runs deterministically in native tests.

pub mod config;
pub mod dom;
pub mod error;
pub mod frame_headers;
pub mod guardian;
pub mod locator;
pub mod logging;
pub mod navigation;
pub mod panel;
pub mod selector;
pub mod site;
pub mod state;
pub mod summary;
pub mod timer;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, error, info, trace, warn};

pub use config::{FrameContext, NavigatorConfig};
pub use dom::{ClickAction, HostDom};
pub use error::{DomError, InitError};
pub use guardian::{Guardian, GuardianStats, Reconciled, StepReport, WriteFailure};
pub use navigation::HistorySignal;
pub use site::{SiteProfile, SiteVariant};
pub use state::OverlayState;
