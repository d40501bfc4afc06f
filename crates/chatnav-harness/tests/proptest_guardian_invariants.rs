//! Property-based invariant tests for the overlay guardian.
//!
//! Verifies, for arbitrary interleavings of host disruption, user toggles,
//! history navigation and elapsed time:
//! 1. The document never holds more than one toggle or one panel.
//! 2. After a full tick interval with no further disruption, both exist.
//! 3. Any attached panel's open class matches the guardian's state.

use chatnav_core::panel::{OPEN_CLASS, PANEL_ID, TOGGLE_ID};
use chatnav_core::{HistorySignal, HostDom};
use chatnav_harness::{Session, fixtures};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    RemoveToggle,
    RemovePanel,
    ReplaceBody,
    ClickToggle,
    ClickRefresh,
    Navigate(HistorySignal),
    Reconcile,
    Advance(u64),
}

fn arb_signal() -> impl Strategy<Value = HistorySignal> {
    prop_oneof![
        Just(HistorySignal::PushState),
        Just(HistorySignal::ReplaceState),
        Just(HistorySignal::PopState),
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::RemoveToggle),
        Just(Op::RemovePanel),
        Just(Op::ReplaceBody),
        Just(Op::ClickToggle),
        Just(Op::ClickRefresh),
        arb_signal().prop_map(Op::Navigate),
        Just(Op::Reconcile),
        (0u64..4_000).prop_map(Op::Advance),
    ]
}

fn apply(session: &mut Session, op: &Op) {
    match op {
        Op::RemoveToggle => {
            if let Some(el) = session.dom().element_by_id(TOGGLE_ID) {
                session.dom_mut().remove(el);
            }
        }
        Op::RemovePanel => {
            if let Some(el) = session.dom().element_by_id(PANEL_ID) {
                session.dom_mut().remove(el);
            }
        }
        Op::ReplaceBody => {
            session.dom_mut().replace_body();
        }
        Op::ClickToggle => {
            session.click_id(TOGGLE_ID);
        }
        Op::ClickRefresh => {
            session.click_id("chatnav-refresh");
        }
        Op::Navigate(signal) => session.navigate(*signal),
        Op::Reconcile => {
            session.reconcile();
        }
        Op::Advance(ms) => session.advance_ms(*ms),
    }
}

fn check_panel_state(session: &Session) -> Result<(), TestCaseError> {
    if let Some(panel) = session.dom().element_by_id(PANEL_ID) {
        prop_assert_eq!(
            session.dom().has_class(&panel, OPEN_CLASS),
            session.guardian().state().is_open()
        );
    }
    Ok(())
}

proptest! {
    #[test]
    fn overlay_is_never_duplicated(ops in proptest::collection::vec(arb_op(), 1..40)) {
        let page = fixtures::claude_page(&["How does this work?", "And this?"]);
        let mut session = Session::boot("claude.ai", page).unwrap();
        session.install().unwrap();

        for op in &ops {
            apply(&mut session, op);
            prop_assert!(session.dom().count_id(TOGGLE_ID) <= 1);
            prop_assert!(session.dom().count_id(PANEL_ID) <= 1);
            check_panel_state(&session)?;
        }
    }

    #[test]
    fn overlay_always_recovers(ops in proptest::collection::vec(arb_op(), 1..40)) {
        let page = fixtures::gemini_page(&["Tell me about proptest?"]);
        let mut session = Session::boot("gemini.google.com", page).unwrap();
        session.install().unwrap();

        for op in &ops {
            apply(&mut session, op);
        }
        session.advance_ms(3_000);

        prop_assert_eq!(session.dom().count_id(TOGGLE_ID), 1);
        prop_assert_eq!(session.dom().count_id(PANEL_ID), 1);
        check_panel_state(&session)?;
    }
}
