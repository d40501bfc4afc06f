#![forbid(unsafe_code)]

//! Host-driven navigator session over a [`MemoryDom`].
//!
//! [`Session`] plays the role of the browser: it owns the page and a
//! deterministic clock, delivers recorded mutations to the guardian (the
//! observer callbacks), and wakes the guardian at each deadline (the timer
//! callbacks).
//!
//! 1. Mutate the page via [`Session::dom_mut`].
//! 2. Advance time via [`Session::advance`]; pending observer batches are
//!    delivered first, then every deadline up to the target fires in order.
//! 3. Inspect the page or [`Guardian::stats`].

use core::time::Duration;

use chatnav_core::panel::{LIST_ID, NUMBER_CLASS, TEXT_CLASS};
use chatnav_core::{
    FrameContext, Guardian, HistorySignal, HostDom, InitError, NavigatorConfig, Reconciled,
};

use crate::fixtures::Page;
use crate::memory_dom::{MemoryDom, NodeId};

/// A page, a guardian and a clock.
#[derive(Debug)]
pub struct Session {
    dom: MemoryDom,
    guardian: Guardian,
    now: Duration,
}

impl Session {
    /// Boot as a top-level tab with default configuration. `None` when the
    /// hostname is not a supported site.
    #[must_use]
    pub fn boot(hostname: &str, page: Page) -> Option<Self> {
        Self::boot_with(hostname, page.dom, FrameContext::TopLevel, NavigatorConfig::default())
    }

    #[must_use]
    pub fn boot_with(
        hostname: &str,
        dom: MemoryDom,
        frame: FrameContext,
        config: NavigatorConfig,
    ) -> Option<Self> {
        let guardian = Guardian::boot(hostname, frame, config)?;
        Some(Self {
            dom,
            guardian,
            now: Duration::ZERO,
        })
    }

    pub fn install(&mut self) -> Result<(), InitError> {
        let result = self.guardian.install(&mut self.dom, self.now);
        // Injection itself produces no sentinel removals; drop the batch.
        self.dom.take_removals();
        self.dom.take_root_mutations();
        result
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    #[must_use]
    pub fn dom(&self) -> &MemoryDom {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut MemoryDom {
        &mut self.dom
    }

    #[must_use]
    pub fn guardian(&self) -> &Guardian {
        &self.guardian
    }

    pub fn guardian_mut(&mut self) -> &mut Guardian {
        &mut self.guardian
    }

    /// Deliver pending observer batches at the current time.
    pub fn flush_observers(&mut self) {
        let removed = self.dom.take_removals();
        if !removed.is_empty() {
            self.guardian.on_body_mutation(&self.dom, &removed, self.now);
        }
        if self.dom.take_root_mutations() > 0 {
            self.guardian.on_root_mutation(&self.dom, self.now);
        }
    }

    /// Advance the clock by `dt`, firing deadlines in order.
    pub fn advance(&mut self, dt: Duration) {
        let target = self.now.saturating_add(dt);
        self.flush_observers();
        while let Some(deadline) = self.guardian.next_deadline() {
            if deadline > target {
                break;
            }
            self.now = self.now.max(deadline);
            self.guardian.step(&mut self.dom, self.now);
            self.flush_observers();
        }
        self.now = target;
    }

    pub fn advance_ms(&mut self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Run one reconciliation pass right now.
    pub fn reconcile(&mut self) -> Reconciled {
        let outcome = self.guardian.reconcile(&mut self.dom, self.now);
        self.flush_observers();
        outcome
    }

    /// Host called a history API.
    pub fn navigate(&mut self, signal: HistorySignal) {
        self.guardian.on_navigation(signal, self.now);
    }

    /// Click the attached element with `id`. Returns whether it had a listener.
    pub fn click_id(&mut self, id: &str) -> bool {
        match self.dom.element_by_id(id) {
            Some(node) => self.click(node),
            None => false,
        }
    }

    /// Click `node`, dispatching its listener to the guardian.
    pub fn click(&mut self, node: NodeId) -> bool {
        let Some(action) = self.dom.click_action(node) else {
            return false;
        };
        self.guardian.handle_click(&mut self.dom, action);
        self.flush_observers();
        true
    }

    /// Rendered entry rows under the panel list.
    #[must_use]
    pub fn entry_nodes(&self) -> Vec<NodeId> {
        self.dom
            .element_by_id(LIST_ID)
            .map(|list| self.dom.element_children(list))
            .unwrap_or_default()
            .into_iter()
            .filter(|&row| self.dom.has_class(&row, chatnav_core::panel::ITEM_CLASS))
            .collect()
    }

    /// `Q<n>` badges of the rendered entries, in order.
    #[must_use]
    pub fn entry_labels(&self) -> Vec<String> {
        self.entry_parts(NUMBER_CLASS)
    }

    /// Summaries of the rendered entries, in order.
    #[must_use]
    pub fn entry_summaries(&self) -> Vec<String> {
        self.entry_parts(TEXT_CLASS)
    }

    fn entry_parts(&self, class: &str) -> Vec<String> {
        self.entry_nodes()
            .into_iter()
            .filter_map(|row| {
                self.dom
                    .element_children(row)
                    .into_iter()
                    .find(|&part| self.dom.has_class(&part, class))
            })
            .map(|part| self.dom.text_content(&part))
            .collect()
    }
}
