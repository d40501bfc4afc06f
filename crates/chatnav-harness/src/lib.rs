#![forbid(unsafe_code)]

//! Test harness for the conversation navigator.
//!
//! - [`memory_dom::MemoryDom`]: an arena-backed document implementing
//!   [`HostDom`](chatnav_core::HostDom), with host-side mutation helpers that
//!   record removals the way a `MutationObserver` would.
//! - [`fixtures`]: synthetic chat pages for each supported site.
//! - [`session::Session`]: a host-driven loop that owns a page, a guardian
//!   and a deterministic clock.
//!
//! # Quick Start
//!
//! ```ignore
//! use chatnav_harness::{fixtures, session::Session};
//!
//! let mut session = Session::boot("claude.ai", fixtures::claude_page(&["Why?"])).unwrap();
//! session.install().unwrap();
//! session.click_id("chatnav-toggle");
//! assert_eq!(session.entry_labels(), vec!["Q1"]);
//! ```

pub mod fixtures;
pub mod memory_dom;
pub mod session;

pub use memory_dom::{MemoryDom, NodeId};
pub use session::Session;
