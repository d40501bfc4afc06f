#![forbid(unsafe_code)]

//! Typed query expressions over the host DOM.
//!
//! A [`Selector`] is the small subset of CSS the locator chains need: an
//! optional tag, a set of required classes and at most one attribute test.
//! Keeping it typed lets the browser binding render it with
//! [`Selector::to_css`] while in-memory hosts match it structurally with
//! [`Selector::matches`].

use core::fmt;

/// Attribute comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    /// `[name="value"]`
    Equals,
    /// `[name^="value"]`
    Prefix,
}

/// Attribute test applied by a [`Selector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrMatch {
    pub name: &'static str,
    pub op: AttrOp,
    pub value: &'static str,
}

impl AttrMatch {
    #[must_use]
    pub fn matches(&self, actual: &str) -> bool {
        match self.op {
            AttrOp::Equals => actual == self.value,
            AttrOp::Prefix => actual.starts_with(self.value),
        }
    }
}

/// Structural query: `tag.class1.class2[attr op value]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selector {
    pub tag: Option<&'static str>,
    pub classes: &'static [&'static str],
    pub attr: Option<AttrMatch>,
}

impl Selector {
    /// Match by class list only (`.a.b`).
    #[must_use]
    pub const fn classes(classes: &'static [&'static str]) -> Self {
        Self {
            tag: None,
            classes,
            attr: None,
        }
    }

    /// Match by tag and class list (`div.a.b`).
    #[must_use]
    pub const fn tag_classes(tag: &'static str, classes: &'static [&'static str]) -> Self {
        Self {
            tag: Some(tag),
            classes,
            attr: None,
        }
    }

    /// `[name="value"]`
    #[must_use]
    pub const fn attr_eq(name: &'static str, value: &'static str) -> Self {
        Self {
            tag: None,
            classes: &[],
            attr: Some(AttrMatch {
                name,
                op: AttrOp::Equals,
                value,
            }),
        }
    }

    /// `[name^="value"]`
    #[must_use]
    pub const fn attr_prefix(name: &'static str, value: &'static str) -> Self {
        Self {
            tag: None,
            classes: &[],
            attr: Some(AttrMatch {
                name,
                op: AttrOp::Prefix,
                value,
            }),
        }
    }

    /// Render as a CSS selector for `querySelectorAll`.
    #[must_use]
    pub fn to_css(&self) -> String {
        self.to_string()
    }

    /// Structural match against an element description.
    ///
    /// `tag` is compared case-insensitively; `attr` looks up an attribute
    /// value by name.
    pub fn matches<'a>(
        &self,
        tag: &str,
        has_class: impl Fn(&str) -> bool,
        attr: impl Fn(&str) -> Option<&'a str>,
    ) -> bool {
        if let Some(want) = self.tag
            && !want.eq_ignore_ascii_case(tag)
        {
            return false;
        }
        if !self.classes.iter().all(|class| has_class(class)) {
            return false;
        }
        match &self.attr {
            Some(test) => attr(test.name).is_some_and(|value| test.matches(value)),
            None => true,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(tag) = self.tag {
            f.write_str(tag)?;
        }
        for class in self.classes {
            write!(f, ".{class}")?;
        }
        if let Some(attr) = &self.attr {
            let op = match attr.op {
                AttrOp::Equals => "=",
                AttrOp::Prefix => "^=",
            };
            write!(f, "[{}{}\"{}\"]", attr.name, op, attr.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_attrs(_: &str) -> Option<&'static str> {
        None
    }

    #[test]
    fn renders_css() {
        assert_eq!(
            Selector::tag_classes("div", &["message-row", "items-end"]).to_css(),
            "div.message-row.items-end"
        );
        assert_eq!(
            Selector::attr_eq("data-testid", "user-message").to_css(),
            "[data-testid=\"user-message\"]"
        );
        assert_eq!(
            Selector::attr_prefix("data-testid", "user-human-turn").to_css(),
            "[data-testid^=\"user-human-turn\"]"
        );
        assert_eq!(
            Selector::classes(&["query-text-line"]).to_css(),
            ".query-text-line"
        );
    }

    #[test]
    fn tag_and_classes_must_all_match() {
        let sel = Selector::tag_classes("div", &["message-row", "items-end"]);
        let classes = ["message-row", "items-end", "flex"];
        assert!(sel.matches("DIV", |c| classes.contains(&c), no_attrs));
        assert!(!sel.matches("p", |c| classes.contains(&c), no_attrs));
        assert!(!sel.matches("div", |c| c == "message-row", no_attrs));
    }

    #[test]
    fn attribute_prefix_and_equality() {
        let prefix = Selector::attr_prefix("data-testid", "user-human-turn");
        assert!(prefix.matches("div", |_| false, |_| Some("user-human-turn-3")));
        assert!(!prefix.matches("div", |_| false, |_| Some("assistant-turn")));
        assert!(!prefix.matches("div", |_| false, no_attrs));

        let eq = Selector::attr_eq("data-message-author-role", "user");
        assert!(eq.matches("div", |_| false, |_| Some("user")));
        assert!(!eq.matches("div", |_| false, |_| Some("user-ish")));
    }
}
