#![forbid(unsafe_code)]

//! Overlay open/closed state.
//!
//! Held in memory by the guardian, never read back from the DOM, so it
//! survives the host replacing the panel's nodes.

/// Whether the navigation panel is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OverlayState {
    #[default]
    Closed,
    Open,
}

impl OverlayState {
    #[must_use]
    pub const fn from_open(open: bool) -> Self {
        if open { Self::Open } else { Self::Closed }
    }

    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Closed => Self::Open,
            Self::Open => Self::Closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed_and_toggles() {
        let state = OverlayState::default();
        assert_eq!(state, OverlayState::Closed);
        assert!(state.toggled().is_open());
        assert_eq!(state.toggled().toggled(), OverlayState::Closed);
        assert_eq!(OverlayState::from_open(true), OverlayState::Open);
    }
}
