#![forbid(unsafe_code)]

//! Overlay lifecycle manager.
//!
//! The [`Guardian`] owns the injected UI. It runs two independent loops:
//!
//! - the **open/closed state machine** ([`OverlayState`]), changed only by the
//!   user's toggle; entering `Open` rescans the conversation;
//! - **presence reconciliation**, which keeps the toggle and panel attached
//!   to `document.body` while the host framework rewrites the page.
//!
//! Reconciliation is driven by three signals that may arrive in any order:
//! removal of a sentinel node (debounced), the periodic tick, and SPA
//! navigation (delayed). It checks for the stable element ids before creating
//! anything, so redundant passes are no-ops and duplicates are impossible.
//!
//! Mutation handling looks only at *removed* nodes and only for the
//! sentinel ids, so the guardian's own writes never feed back into it.
//!
//! Time is supplied by the host as a monotonic `Duration` since boot. After
//! feeding a signal, the host calls [`Guardian::step`] once
//! [`Guardian::next_deadline`] has passed.

use core::time::Duration;

use crate::config::{FrameContext, NavigatorConfig};
use crate::dom::{ClickAction, HostDom};
use crate::error::{DomError, InitError};
use crate::locator::locate_with_strategy;
use crate::navigation::{HistorySignal, NavigationInterceptor};
use crate::panel::{self, PANEL_ID, Rendered, SIDEBAR_BODY_CLASS, STYLE_ID, TOGGLE_ID};
use crate::site::{SiteProfile, SiteVariant};
use crate::state::OverlayState;
use crate::timer::{DelayedTrigger, Ticker};
use crate::{debug, info, warn};

/// Counters for diagnostics and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GuardianStats {
    /// Reconciliation passes run.
    pub reconciles: u64,
    /// Toggle controls created (including the first).
    pub toggles_built: u64,
    /// Panel containers created (including the first).
    pub panels_built: u64,
    /// Scans that reached the panel list.
    pub scans: u64,
    /// Mutation batches that removed a sentinel node.
    pub removals_seen: u64,
    /// Host writes that failed.
    pub write_failures: u64,
}

/// What one reconciliation pass had to rebuild.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Reconciled {
    pub toggle_rebuilt: bool,
    pub panel_rebuilt: bool,
}

impl Reconciled {
    #[must_use]
    pub const fn is_noop(self) -> bool {
        !self.toggle_rebuilt && !self.panel_rebuilt
    }
}

/// What one [`Guardian::step`] did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    pub reconciled: bool,
    pub rebuilt: Reconciled,
    pub scanned: bool,
}

/// The most recent host write the guardian could not apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    /// Which step failed, e.g. `"build toggle"`.
    pub what: &'static str,
    pub error: DomError,
}

/// Keeps the injected overlay alive and consistent with [`OverlayState`].
#[derive(Debug)]
pub struct Guardian {
    profile: &'static SiteProfile,
    frame: FrameContext,
    config: NavigatorConfig,
    state: OverlayState,
    installed: bool,
    removal: DelayedTrigger,
    rescan_timer: DelayedTrigger,
    navigation: NavigationInterceptor,
    ticker: Option<Ticker>,
    stats: GuardianStats,
    last_write_failure: Option<WriteFailure>,
}

impl Guardian {
    #[must_use]
    pub fn new(profile: &'static SiteProfile, frame: FrameContext, config: NavigatorConfig) -> Self {
        Self {
            profile,
            frame,
            removal: DelayedTrigger::new(config.removal_debounce()),
            rescan_timer: DelayedTrigger::new(config.rebuild_rescan_delay()),
            navigation: NavigationInterceptor::new(config.navigation_delay()),
            config,
            state: OverlayState::Closed,
            installed: false,
            ticker: None,
            stats: GuardianStats::default(),
            last_write_failure: None,
        }
    }

    /// Resolve the site from `hostname`. Unknown hosts get no guardian at
    /// all: no UI, no listeners, no observers.
    #[must_use]
    pub fn boot(hostname: &str, frame: FrameContext, config: NavigatorConfig) -> Option<Self> {
        let variant = SiteVariant::detect(hostname)?;
        Some(Self::new(variant.profile(), frame, config))
    }

    #[must_use]
    pub const fn profile(&self) -> &'static SiteProfile {
        self.profile
    }

    #[must_use]
    pub const fn frame(&self) -> FrameContext {
        self.frame
    }

    #[must_use]
    pub const fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    #[must_use]
    pub const fn state(&self) -> OverlayState {
        self.state
    }

    #[must_use]
    pub const fn is_installed(&self) -> bool {
        self.installed
    }

    #[must_use]
    pub const fn stats(&self) -> GuardianStats {
        self.stats
    }

    #[must_use]
    pub const fn last_write_failure(&self) -> Option<&WriteFailure> {
        self.last_write_failure.as_ref()
    }

    #[must_use]
    pub const fn navigation(&self) -> &NavigationInterceptor {
        &self.navigation
    }

    /// Inject the style rule, toggle and panel, and start the periodic tick.
    ///
    /// Fails with [`InitError::BodyNotReady`] while the document has no body;
    /// the host retries after [`NavigatorConfig::init_retry`]. Write failures
    /// past that point are logged and left to the next reconciliation pass.
    pub fn install<D: HostDom>(&mut self, dom: &mut D, now: Duration) -> Result<(), InitError> {
        if self.installed {
            return Err(InitError::AlreadyInstalled);
        }
        let body = dom.body().ok_or(InitError::BodyNotReady)?;

        self.installed = true;
        self.ticker = Some(Ticker::start(self.config.tick_interval(self.frame), now));
        self.rescan_timer.arm_in(now, self.config.initial_scan_delay());

        self.restore_decorations(dom, &body);
        self.restore_controls(dom, &body, now);

        info!(
            site = self.profile.title,
            mode = self.frame.label(),
            "navigator installed"
        );
        Ok(())
    }

    // --- open/closed state machine -------------------------------------

    /// Flip the panel. Entering `Open` rescans immediately.
    ///
    /// This is the only public transition; callers cannot force a state:
    ///
    /// ```compile_fail
    /// fn force_open<D: chatnav_core::HostDom>(guardian: &mut chatnav_core::Guardian, dom: &mut D) {
    ///     guardian.set_state(dom, chatnav_core::OverlayState::Open);
    /// }
    /// ```
    pub fn toggle<D: HostDom>(&mut self, dom: &mut D) -> OverlayState {
        let next = self.state.toggled();
        self.set_state(dom, next);
        next
    }

    /// Set the open/closed state and mirror it onto the DOM. Only the user's
    /// toggle reaches this.
    fn set_state<D: HostDom>(&mut self, dom: &mut D, state: OverlayState) {
        let entering_open = state.is_open() && !self.state.is_open();
        self.state = state;
        for id in [TOGGLE_ID, PANEL_ID] {
            if let Some(el) = dom.element_by_id(id) {
                let applied = dom.set_class(&el, panel::OPEN_CLASS, state.is_open());
                self.note_failure(applied, "apply open class");
            }
        }
        if entering_open {
            self.rescan(dom);
        }
    }

    // --- scanning ------------------------------------------------------

    /// Locate, summarize and render. Returns the outcome, or `None` when the
    /// render failed part-way.
    pub fn rescan<D: HostDom>(&mut self, dom: &mut D) -> Option<Rendered> {
        let located = locate_with_strategy(dom, self.profile);
        let found = located.anchors.len();
        let entries = panel::build_entries(dom, located.anchors, self.config.summary_max_len);
        match panel::render(dom, found, &entries) {
            Ok(Rendered::PanelMissing) => {
                debug!("scan skipped: panel not attached");
                Some(Rendered::PanelMissing)
            }
            Ok(rendered) => {
                self.stats.scans += 1;
                debug!(found, strategy = ?located.strategy, "conversation scanned");
                Some(rendered)
            }
            Err(err) => {
                self.note_failure(Err(err), "render scan");
                None
            }
        }
    }

    // --- presence reconciliation ---------------------------------------

    /// Recreate whichever of toggle/panel is missing from the document.
    ///
    /// Idempotent: existing nodes are found by id and left alone. A panel
    /// rebuilt while `Open` gets the open class and one delayed rescan.
    pub fn reconcile<D: HostDom>(&mut self, dom: &mut D, now: Duration) -> Reconciled {
        if !self.installed {
            return Reconciled::default();
        }
        let Some(body) = dom.body() else {
            return Reconciled::default();
        };
        self.stats.reconciles += 1;
        self.restore_decorations(dom, &body);
        self.restore_controls(dom, &body, now)
    }

    /// Style rule and, in the side panel, the body marker class.
    fn restore_decorations<D: HostDom>(&mut self, dom: &mut D, body: &D::Element) {
        let styled = self.ensure_style(dom, body);
        self.note_failure(styled, "restore style");
        if self.frame.is_sidebar() && !dom.has_class(body, SIDEBAR_BODY_CLASS) {
            let tagged = dom.set_class(body, SIDEBAR_BODY_CLASS, true);
            self.note_failure(tagged, "tag sidebar body");
        }
    }

    fn restore_controls<D: HostDom>(
        &mut self,
        dom: &mut D,
        body: &D::Element,
        now: Duration,
    ) -> Reconciled {
        let mut outcome = Reconciled::default();
        let open = self.state.is_open();
        let first = self.stats.toggles_built == 0;

        if dom.element_by_id(TOGGLE_ID).is_none() {
            let built = panel::build_toggle(dom, self.profile).and_then(|toggle| {
                dom.set_class(&toggle, panel::OPEN_CLASS, open)?;
                dom.append_child(body, &toggle)
            });
            if built.is_ok() {
                self.stats.toggles_built += 1;
                outcome.toggle_rebuilt = true;
                if !first {
                    info!("toggle restored");
                }
            }
            self.note_failure(built, "build toggle");
        }

        if dom.element_by_id(PANEL_ID).is_none() {
            let built = panel::build_panel(dom, self.profile).and_then(|panel_el| {
                dom.set_class(&panel_el, panel::OPEN_CLASS, open)?;
                dom.append_child(body, &panel_el)
            });
            if built.is_ok() {
                self.stats.panels_built += 1;
                outcome.panel_rebuilt = true;
                if !first {
                    info!(open, "panel restored");
                }
                if open {
                    self.rescan_timer.arm_in(now, self.config.rebuild_rescan_delay());
                }
            }
            self.note_failure(built, "build panel");
        }

        outcome
    }

    fn ensure_style<D: HostDom>(&mut self, dom: &mut D, body: &D::Element) -> Result<(), DomError> {
        if dom.element_by_id(STYLE_ID).is_some() {
            return Ok(());
        }
        let style = panel::build_style(dom, self.profile)?;
        let parent = dom.head().unwrap_or_else(|| body.clone());
        dom.append_child(&parent, &style)
    }

    fn note_failure(&mut self, result: Result<(), DomError>, what: &'static str) {
        if let Err(err) = result {
            self.stats.write_failures += 1;
            warn!(error = %err, what, "overlay write failed");
            self.last_write_failure = Some(WriteFailure { what, error: err });
        }
    }

    // --- signals -------------------------------------------------------

    /// Body-subtree mutation batch. Only removals that are, or contain, a
    /// sentinel node arm the removal debounce. Returns whether it did.
    pub fn on_body_mutation<D: HostDom>(
        &mut self,
        dom: &D,
        removed: &[D::Element],
        now: Duration,
    ) -> bool {
        if !self.installed {
            return false;
        }
        let hit = removed.iter().any(|node| {
            dom.subtree_contains_id(node, TOGGLE_ID) || dom.subtree_contains_id(node, PANEL_ID)
        });
        if hit {
            self.stats.removals_seen += 1;
            self.removal.arm(now);
        }
        hit
    }

    /// Child-list mutation on the document root (the body itself may have
    /// been swapped). Arms the removal debounce when a body exists but the
    /// toggle does not.
    pub fn on_root_mutation<D: HostDom>(&mut self, dom: &D, now: Duration) -> bool {
        if !self.installed || dom.body().is_none() || dom.element_by_id(TOGGLE_ID).is_some() {
            return false;
        }
        self.stats.removals_seen += 1;
        self.removal.arm(now);
        true
    }

    /// History API call or back/forward navigation.
    pub fn on_navigation(&mut self, signal: HistorySignal, now: Duration) {
        if !self.installed {
            return;
        }
        debug!(%signal, "host navigation");
        self.navigation.record(signal, now);
    }

    /// Delivery of the host's own periodic timer: reconcile immediately.
    pub fn on_tick<D: HostDom>(&mut self, dom: &mut D, now: Duration) -> Reconciled {
        if let Some(ticker) = self.ticker.as_mut() {
            ticker.rearm(now);
        }
        self.reconcile(dom, now)
    }

    /// A click on one of the overlay's controls.
    pub fn handle_click<D: HostDom>(&mut self, dom: &mut D, action: ClickAction<D::Element>) {
        match action {
            ClickAction::Toggle => {
                self.toggle(dom);
            }
            ClickAction::Refresh => {
                self.rescan(dom);
            }
            ClickAction::Jump(anchor) => {
                let jumped = panel::jump(dom, &anchor);
                self.note_failure(jumped, "jump to message");
            }
        }
    }

    /// Fire everything due at `now`.
    pub fn step<D: HostDom>(&mut self, dom: &mut D, now: Duration) -> StepReport {
        let mut report = StepReport::default();

        let removal_due = self.removal.fire_if_due(now);
        let navigation_due = self.navigation.fire_if_due(now);
        let tick_due = self.ticker.as_mut().is_some_and(|ticker| ticker.due(now));

        if removal_due || navigation_due || tick_due {
            report.rebuilt = self.reconcile(dom, now);
            report.reconciled = true;
        }

        if self.rescan_timer.fire_if_due(now) {
            report.scanned = self.rescan(dom).is_some_and(|r| r != Rendered::PanelMissing);
        }
        report
    }

    /// Earliest pending one-shot deadline (removal debounce, navigation
    /// delay, rescan). Excludes the periodic tick.
    #[must_use]
    pub fn pending_deadline(&self) -> Option<Duration> {
        [
            self.removal.deadline(),
            self.navigation.deadline(),
            self.rescan_timer.deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Earliest moment [`step`](Self::step) has work, including the tick.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        let tick = self.ticker.as_ref().map(Ticker::next);
        self.pending_deadline().into_iter().chain(tick).min()
    }
}
