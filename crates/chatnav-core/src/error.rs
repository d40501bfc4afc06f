#![forbid(unsafe_code)]

//! Error types.
//!
//! Nothing in the navigator is fatal: host write failures are logged and the
//! next reconciliation pass retries. These types exist so the host binding can
//! report *why* a write failed.

use core::fmt;

/// A host DOM write that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The target handle no longer refers to a live node.
    Detached,
    /// The host rejected the operation (message from the host environment).
    Host(String),
    /// The operation is not available on this host.
    Unsupported(&'static str),
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detached => write!(f, "element is detached from the document"),
            Self::Host(msg) => write!(f, "host rejected operation: {msg}"),
            Self::Unsupported(what) => write!(f, "unsupported: {what}"),
        }
    }
}

impl std::error::Error for DomError {}

/// Why the overlay could not be installed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    /// `document.body` does not exist yet; retry after a fixed delay.
    BodyNotReady,
    /// The overlay is already installed on this page.
    AlreadyInstalled,
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BodyNotReady => write!(f, "document body not available yet"),
            Self::AlreadyInstalled => write!(f, "navigator already installed"),
        }
    }
}

impl std::error::Error for InitError {}
