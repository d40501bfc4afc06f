#![forbid(unsafe_code)]

//! Panel controller: builds the injected controls and renders entries.
//!
//! Markup is built node by node through [`HostDom`]; no HTML strings are
//! parsed, so hosts that enforce Trusted Types accept it. Every scan replaces
//! the list wholesale.

use crate::dom::{ClickAction, HostDom};
use crate::error::DomError;
use crate::site::SiteProfile;
use crate::summary::summarize;

pub const TOGGLE_ID: &str = "chatnav-toggle";
pub const PANEL_ID: &str = "chatnav-panel";
pub const HEADER_ID: &str = "chatnav-header";
pub const REFRESH_ID: &str = "chatnav-refresh";
pub const STATS_ID: &str = "chatnav-stats";
pub const LIST_ID: &str = "chatnav-list";
pub const EMPTY_ID: &str = "chatnav-empty";
pub const STYLE_ID: &str = "chatnav-theme";

pub const OPEN_CLASS: &str = "open";
pub const ITEM_CLASS: &str = "chatnav-item";
pub const NUMBER_CLASS: &str = "chatnav-number";
pub const TEXT_CLASS: &str = "chatnav-text";
pub const EXPAND_TEXT_CLASS: &str = "chatnav-expand-text";
pub const HIGHLIGHT_CLASS: &str = "chatnav-highlight";
pub const SIDEBAR_BODY_CLASS: &str = "chatnav-in-sidebar";

const IDLE_STATS: &str = "Click to scan conversation";

/// One row in the panel, rebuilt on every scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEntry<E> {
    /// 1-based position of the anchor in the located sequence.
    pub index: usize,
    pub summary: String,
    pub anchor: E,
}

impl<E> NavigationEntry<E> {
    /// Number badge, e.g. `Q3`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("Q{}", self.index)
    }
}

/// Summarize located anchors. Anchors without text are skipped; the rest
/// keep their position in the located sequence as their index.
pub fn build_entries<D: HostDom>(
    dom: &D,
    anchors: Vec<D::Element>,
    max_len: usize,
) -> Vec<NavigationEntry<D::Element>> {
    anchors
        .into_iter()
        .enumerate()
        .filter_map(|(pos, anchor)| {
            let text = dom.text_content(&anchor);
            if text.trim().is_empty() {
                return None;
            }
            Some(NavigationEntry {
                index: pos + 1,
                summary: summarize(&text, max_len),
                anchor,
            })
        })
        .collect()
}

/// `<tag id=.. class=..>text</tag>`
fn element<D: HostDom>(
    dom: &mut D,
    tag: &str,
    id: Option<&str>,
    classes: &[&str],
    text: Option<&str>,
) -> Result<D::Element, DomError> {
    let el = dom.create_element(tag)?;
    if let Some(id) = id {
        dom.set_id(&el, id)?;
    }
    for class in classes {
        dom.set_class(&el, class, true)?;
    }
    if let Some(text) = text {
        dom.set_text(&el, text)?;
    }
    Ok(el)
}

/// Floating button that opens and closes the panel.
pub fn build_toggle<D: HostDom>(dom: &mut D, profile: &SiteProfile) -> Result<D::Element, DomError> {
    let toggle = element(dom, "button", Some(TOGGLE_ID), &[], None)?;
    dom.append_text(&toggle, profile.icon)?;
    let label = element(dom, "span", None, &[EXPAND_TEXT_CLASS], Some("Navigate"))?;
    dom.append_child(&toggle, &label)?;
    dom.listen_click(&toggle, ClickAction::Toggle)?;
    Ok(toggle)
}

/// Panel container: header with refresh button, stats line, entry list.
pub fn build_panel<D: HostDom>(dom: &mut D, profile: &SiteProfile) -> Result<D::Element, DomError> {
    let header = element(dom, "div", Some(HEADER_ID), &[], None)?;
    let title = element(dom, "h3", None, &[], Some(&profile.header_title()))?;
    let refresh = element(dom, "button", Some(REFRESH_ID), &[], Some("\u{21BB} Refresh"))?;
    dom.listen_click(&refresh, ClickAction::Refresh)?;
    dom.append_child(&header, &title)?;
    dom.append_child(&header, &refresh)?;

    let stats = element(dom, "div", Some(STATS_ID), &[], Some(IDLE_STATS))?;
    let list = element(dom, "div", Some(LIST_ID), &[], None)?;

    let panel = element(dom, "div", Some(PANEL_ID), &[], None)?;
    dom.append_child(&panel, &header)?;
    dom.append_child(&panel, &stats)?;
    dom.append_child(&panel, &list)?;
    Ok(panel)
}

/// `<style>` carrying the base layout and this site's colors.
pub fn build_style<D: HostDom>(dom: &mut D, profile: &SiteProfile) -> Result<D::Element, DomError> {
    element(dom, "style", Some(STYLE_ID), &[], Some(&profile.theme_css()))
}

/// `N question(s) found`
#[must_use]
pub fn stats_line(found: usize) -> String {
    let plural = if found == 1 { "" } else { "s" };
    format!("{found} question{plural} found")
}

/// Outcome of [`render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendered {
    /// Entries were written to the list.
    Entries(usize),
    /// Nothing was located; the placeholder is shown.
    Placeholder,
    /// The list or stats node is not in the document.
    PanelMissing,
}

/// Replace the list contents with `entries` (or the placeholder when
/// `located` is zero) and update the stats line.
pub fn render<D: HostDom>(
    dom: &mut D,
    located: usize,
    entries: &[NavigationEntry<D::Element>],
) -> Result<Rendered, DomError> {
    let (Some(list), Some(stats)) = (dom.element_by_id(LIST_ID), dom.element_by_id(STATS_ID))
    else {
        return Ok(Rendered::PanelMissing);
    };

    dom.clear_children(&list)?;
    dom.set_text(&stats, &stats_line(located))?;

    if located == 0 {
        let placeholder = build_placeholder(dom)?;
        dom.append_child(&list, &placeholder)?;
        return Ok(Rendered::Placeholder);
    }

    for entry in entries {
        let item = element(dom, "div", None, &[ITEM_CLASS], None)?;
        let number = element(dom, "span", None, &[NUMBER_CLASS], Some(&entry.label()))?;
        let text = element(dom, "span", None, &[TEXT_CLASS], Some(&entry.summary))?;
        dom.append_child(&item, &number)?;
        dom.append_child(&item, &text)?;
        dom.listen_click(&item, ClickAction::Jump(entry.anchor.clone()))?;
        dom.append_child(&list, &item)?;
    }
    Ok(Rendered::Entries(entries.len()))
}

/// Explains an empty result. Detection cannot tell "no conversation yet"
/// from stale selectors, so both readings are offered to the user.
fn build_placeholder<D: HostDom>(dom: &mut D) -> Result<D::Element, DomError> {
    let empty = element(dom, "div", Some(EMPTY_ID), &[], None)?;
    dom.append_text(&empty, "No messages found yet.")?;
    line_breaks(dom, &empty, 2)?;
    dom.append_text(&empty, "Start a conversation and click refresh!")?;
    line_breaks(dom, &empty, 2)?;

    let hint = element(dom, "small", None, &[], None)?;
    dom.append_text(&hint, "If messages exist but aren't detected,")?;
    line_breaks(dom, &hint, 1)?;
    dom.append_text(&hint, "the site's structure may have changed.")?;
    dom.append_child(&empty, &hint)?;
    Ok(empty)
}

fn line_breaks<D: HostDom>(dom: &mut D, parent: &D::Element, count: usize) -> Result<(), DomError> {
    for _ in 0..count {
        let br = dom.create_element("br")?;
        dom.append_child(parent, &br)?;
    }
    Ok(())
}

/// Scroll a message into view and restart its highlight animation.
///
/// The class is removed and re-added around a forced layout read so the
/// animation replays even if the anchor is still highlighted.
pub fn jump<D: HostDom>(dom: &mut D, anchor: &D::Element) -> Result<(), DomError> {
    dom.scroll_into_view(anchor)?;
    dom.set_class(anchor, HIGHLIGHT_CLASS, false)?;
    dom.force_layout(anchor);
    dom.set_class(anchor, HIGHLIGHT_CLASS, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_line_pluralizes() {
        assert_eq!(stats_line(0), "0 questions found");
        assert_eq!(stats_line(1), "1 question found");
        assert_eq!(stats_line(12), "12 questions found");
    }

    #[test]
    fn entry_label_is_one_based_badge() {
        let entry = NavigationEntry {
            index: 3,
            summary: String::from("hello"),
            anchor: (),
        };
        assert_eq!(entry.label(), "Q3");
    }
}
