#![forbid(unsafe_code)]

//! The host-DOM seam.
//!
//! The navigator never owns host markup. Everything it reads or writes goes
//! through [`HostDom`], whose [`Element`](HostDom::Element) handles are
//! non-owning references that may be invalidated at any time by the host
//! framework. Callers re-resolve handles instead of holding them across
//! asynchronous boundaries.
//!
//! Reads are best effort and never fail: a missing node is simply absent.
//! Writes return [`DomError`] so the caller can log and move on.

use core::fmt::Debug;

use crate::error::DomError;
use crate::selector::Selector;

/// What a click on an injected control should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction<E> {
    /// Flip the panel between open and closed.
    Toggle,
    /// Re-scan the conversation.
    Refresh,
    /// Scroll to and highlight a message anchor.
    Jump(E),
}

/// Read/write access to the page the overlay is injected into.
pub trait HostDom {
    /// Non-owning element handle.
    type Element: Clone + PartialEq + Debug;

    // --- reads ---------------------------------------------------------

    /// `document.body`, if the document has one yet.
    fn body(&self) -> Option<Self::Element>;

    /// `document.head`, if present.
    fn head(&self) -> Option<Self::Element>;

    /// `document.getElementById(id)`; only finds nodes attached to the document.
    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    /// All attached elements matching `selector`, in document order.
    fn query_all(&self, selector: &Selector) -> Vec<Self::Element>;

    fn has_class(&self, element: &Self::Element, class: &str) -> bool;

    /// Concatenated text of the element's subtree.
    fn text_content(&self, element: &Self::Element) -> String;

    /// Whether `root` itself, or any node beneath it, carries `id`.
    ///
    /// Must work on detached subtrees (nodes just removed by the host).
    fn subtree_contains_id(&self, root: &Self::Element, id: &str) -> bool;

    // --- writes --------------------------------------------------------

    fn create_element(&mut self, tag: &str) -> Result<Self::Element, DomError>;

    fn set_id(&mut self, element: &Self::Element, id: &str) -> Result<(), DomError>;

    /// Replace the element's children with a single text node.
    fn set_text(&mut self, element: &Self::Element, text: &str) -> Result<(), DomError>;

    /// Append a text node after the element's existing children.
    fn append_text(&mut self, parent: &Self::Element, text: &str) -> Result<(), DomError>;

    fn append_child(
        &mut self,
        parent: &Self::Element,
        child: &Self::Element,
    ) -> Result<(), DomError>;

    /// Remove every child of `element`.
    fn clear_children(&mut self, element: &Self::Element) -> Result<(), DomError>;

    /// Add (`on = true`) or remove a class.
    fn set_class(&mut self, element: &Self::Element, class: &str, on: bool)
    -> Result<(), DomError>;

    /// Route clicks on `element` to `action`.
    fn listen_click(
        &mut self,
        element: &Self::Element,
        action: ClickAction<Self::Element>,
    ) -> Result<(), DomError>;

    /// Smooth-scroll so the element's top aligns with the viewport top.
    fn scroll_into_view(&mut self, element: &Self::Element) -> Result<(), DomError>;

    /// Force a synchronous layout read (restarts CSS animations).
    fn force_layout(&mut self, element: &Self::Element);
}
