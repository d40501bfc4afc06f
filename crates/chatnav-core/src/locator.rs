#![forbid(unsafe_code)]

//! Adaptive selector engine.
//!
//! Each site owns an ordered chain of [`LocatorStrategy`] values, newest
//! known markup first. [`locate`] walks the chain against the live DOM and
//! returns the result of the first strategy that finds anything. Results are
//! never unioned and never cached: the host may rebuild its message nodes at
//! any time, so every call queries afresh.

use crate::debug;
use crate::dom::HostDom;
use crate::selector::Selector;
use crate::site::SiteProfile;

/// Secondary heuristic applied after the structural query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyFilter {
    /// Drop elements carrying this class (an assistant/bot marker).
    ExcludeClass(&'static str),
}

impl StrategyFilter {
    fn keep<D: HostDom>(&self, dom: &D, element: &D::Element) -> bool {
        match *self {
            Self::ExcludeClass(class) => !dom.has_class(element, class),
        }
    }
}

/// One prioritized query for user-message elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatorStrategy {
    /// Short stable name used in logs.
    pub name: &'static str,
    pub selector: Selector,
    pub filter: Option<StrategyFilter>,
}

impl LocatorStrategy {
    /// Evaluate this strategy alone, in document order.
    pub fn evaluate<D: HostDom>(&self, dom: &D) -> Vec<D::Element> {
        let mut found = dom.query_all(&self.selector);
        if let Some(filter) = &self.filter {
            found.retain(|element| filter.keep(dom, element));
        }
        found
    }
}

/// Result of a located scan: the anchors plus the strategy that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Located<E> {
    pub anchors: Vec<E>,
    /// Position of the winning strategy in the chain; `None` when all missed.
    pub strategy: Option<usize>,
}

/// Walk `profile`'s chain and report which strategy won.
pub fn locate_with_strategy<D: HostDom>(dom: &D, profile: &SiteProfile) -> Located<D::Element> {
    for (idx, strategy) in profile.locators.iter().enumerate() {
        let anchors = strategy.evaluate(dom);
        if !anchors.is_empty() {
            debug!(
                site = profile.title,
                strategy = strategy.name,
                count = anchors.len(),
                "located user messages"
            );
            return Located {
                anchors,
                strategy: Some(idx),
            };
        }
    }
    debug!(site = profile.title, "no locator strategy matched");
    Located {
        anchors: Vec::new(),
        strategy: None,
    }
}

/// Current user-message anchors for `profile`, possibly empty.
pub fn locate<D: HostDom>(dom: &D, profile: &SiteProfile) -> Vec<D::Element> {
    locate_with_strategy(dom, profile).anchors
}
