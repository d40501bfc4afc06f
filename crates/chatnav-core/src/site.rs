#![forbid(unsafe_code)]

//! Site profile resolution.
//!
//! The page is classified once, at boot, from its hostname. Every
//! variant-specific value (theme, copy, locator chain, outer-chrome URLs)
//! lives in a constant [`SiteProfile`] record so no other module branches on
//! the variant.

use core::fmt;

use crate::locator::{LocatorStrategy, StrategyFilter};
use crate::selector::Selector;

/// The chat sites the navigator knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteVariant {
    Claude,
    ChatGpt,
    Grok,
    Gemini,
}

/// Hostname substrings per variant, in match priority order.
const HOST_RULES: &[(&str, SiteVariant)] = &[
    ("claude.ai", SiteVariant::Claude),
    ("chatgpt.com", SiteVariant::ChatGpt),
    ("chat.openai.com", SiteVariant::ChatGpt),
    ("grok.com", SiteVariant::Grok),
    ("gemini.google.com", SiteVariant::Gemini),
];

impl SiteVariant {
    pub const ALL: [SiteVariant; 4] = [Self::Claude, Self::ChatGpt, Self::Grok, Self::Gemini];

    /// Classify a hostname. First rule whose domain is a substring wins;
    /// `None` means the navigator must stay completely inert.
    #[must_use]
    pub fn detect(hostname: &str) -> Option<Self> {
        HOST_RULES
            .iter()
            .find(|(needle, _)| hostname.contains(needle))
            .map(|&(_, variant)| variant)
    }

    #[must_use]
    pub fn profile(self) -> &'static SiteProfile {
        match self {
            Self::Claude => &CLAUDE,
            Self::ChatGpt => &CHATGPT,
            Self::Grok => &GROK,
            Self::Gemini => &GEMINI,
        }
    }
}

impl fmt::Display for SiteVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.profile().title)
    }
}

/// Per-site colors applied through the injected style rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub accent: &'static str,
    pub accent_hover: &'static str,
    pub text: &'static str,
}

/// Everything variant-specific, fixed for the page's lifetime.
#[derive(Debug)]
pub struct SiteProfile {
    pub variant: SiteVariant,
    pub theme: Theme,
    pub icon: &'static str,
    pub title: &'static str,
    /// User-message locators, newest known markup first.
    pub locators: &'static [LocatorStrategy],
    /// Landing page opened by the outer sidebar chrome.
    pub home_url: &'static str,
    /// Fresh-conversation page opened by the outer sidebar chrome.
    pub new_chat_url: &'static str,
}

impl SiteProfile {
    /// Panel header text, e.g. `✳ Claude Navigator`.
    #[must_use]
    pub fn header_title(&self) -> String {
        format!("{} {} Navigator", self.icon, self.title)
    }

    /// Base overlay layout plus this site's colors.
    #[must_use]
    pub fn theme_css(&self) -> String {
        let Theme {
            accent,
            accent_hover,
            text,
        } = self.theme;
        let mut css = String::from(BASE_CSS);
        css.push_str(&format!(
            "#chatnav-toggle {{ background: {accent} !important; color: {text} !important; }}\n\
             #chatnav-toggle:hover {{ background: {accent_hover} !important; }}\n\
             .chatnav-item {{ border-left-color: {accent} !important; }}\n\
             .chatnav-item:hover {{ border-left-color: {accent_hover} !important; }}\n\
             .chatnav-number {{ color: {accent} !important; }}\n\
             @keyframes chatnav-highlight {{ 0% {{ outline-color: {accent}; }} 100% {{ outline-color: transparent; }} }}\n"
        ));
        css
    }
}

/// Layout rules shared by every site; colors come from [`SiteProfile::theme_css`].
const BASE_CSS: &str = "\
#chatnav-toggle { position: fixed; top: 50%; right: 0; z-index: 2147483646; border: none; \
border-radius: 8px 0 0 8px; padding: 10px 8px; cursor: pointer; font-size: 18px; \
transform: translateY(-50%); box-shadow: 0 2px 8px rgba(0,0,0,0.3); }
#chatnav-toggle .chatnav-expand-text { display: none; margin-left: 6px; font-size: 13px; }
#chatnav-toggle:hover .chatnav-expand-text { display: inline; }
#chatnav-toggle.open { right: 320px; }
#chatnav-panel { position: fixed; top: 0; right: -320px; width: 320px; height: 100vh; \
z-index: 2147483645; background: #1e1e1e; color: #e5e5e5; display: flex; flex-direction: column; \
transition: right 0.25s ease; font: 13px/1.4 system-ui, sans-serif; box-shadow: -2px 0 12px rgba(0,0,0,0.4); }
#chatnav-panel.open { right: 0; }
#chatnav-header { display: flex; align-items: center; justify-content: space-between; \
padding: 12px; border-bottom: 1px solid #333; }
#chatnav-header h3 { margin: 0; font-size: 15px; }
#chatnav-refresh { background: #333; color: #e5e5e5; border: none; border-radius: 4px; \
padding: 4px 8px; cursor: pointer; }
#chatnav-stats { padding: 8px 12px; color: #999; font-size: 12px; }
#chatnav-list { flex: 1; overflow-y: auto; padding: 0 8px 12px; }
.chatnav-item { display: flex; gap: 8px; padding: 8px; margin: 4px 0; border-left: 3px solid; \
border-radius: 4px; background: #262626; cursor: pointer; }
.chatnav-item:hover { background: #303030; }
.chatnav-number { font-weight: 600; flex-shrink: 0; }
.chatnav-text { overflow: hidden; text-overflow: ellipsis; }
#chatnav-empty { padding: 16px 8px; color: #999; text-align: center; }
body.chatnav-in-sidebar #chatnav-panel { width: 260px; right: -260px; }
body.chatnav-in-sidebar #chatnav-panel.open { right: 0; }
body.chatnav-in-sidebar #chatnav-toggle.open { right: 260px; }
.chatnav-highlight { outline: 3px solid transparent; outline-offset: 4px; \
animation: chatnav-highlight 2s ease-out; }
";

const fn strategy(name: &'static str, selector: Selector) -> LocatorStrategy {
    LocatorStrategy {
        name,
        selector,
        filter: None,
    }
}

static CLAUDE: SiteProfile = SiteProfile {
    variant: SiteVariant::Claude,
    theme: Theme {
        accent: "#d97706",
        accent_hover: "#b45309",
        text: "white",
    },
    icon: "\u{2733}",
    title: "Claude",
    locators: &[
        strategy(
            "user-message-testid",
            Selector::attr_eq("data-testid", "user-message"),
        ),
        strategy("font-user-message", Selector::classes(&["font-user-message"])),
        strategy(
            "indexed-human-turn",
            Selector::attr_prefix("data-testid", "user-human-turn"),
        ),
    ],
    home_url: "https://claude.ai",
    new_chat_url: "https://claude.ai/new",
};

static CHATGPT: SiteProfile = SiteProfile {
    variant: SiteVariant::ChatGpt,
    theme: Theme {
        accent: "#6e6e6e",
        accent_hover: "#555555",
        text: "white",
    },
    icon: "\u{23E3}",
    title: "ChatGPT",
    locators: &[strategy(
        "author-role-user",
        Selector::attr_eq("data-message-author-role", "user"),
    )],
    home_url: "https://chatgpt.com",
    new_chat_url: "https://chatgpt.com/",
};

static GROK: SiteProfile = SiteProfile {
    variant: SiteVariant::Grok,
    theme: Theme {
        accent: "#dc2626",
        accent_hover: "#b91c1c",
        text: "white",
    },
    icon: "X",
    title: "Grok",
    locators: &[
        strategy(
            "row-items-end",
            Selector::tag_classes("div", &["message-row", "items-end"]),
        ),
        LocatorStrategy {
            name: "row-not-assistant",
            selector: Selector::tag_classes("div", &["message-row"]),
            filter: Some(StrategyFilter::ExcludeClass("items-start")),
        },
        strategy(
            "message-bubble",
            Selector::tag_classes("div", &["message-bubble"]),
        ),
    ],
    home_url: "https://grok.com",
    new_chat_url: "https://grok.com/",
};

static GEMINI: SiteProfile = SiteProfile {
    variant: SiteVariant::Gemini,
    theme: Theme {
        accent: "#4285f4",
        accent_hover: "#3367d6",
        text: "white",
    },
    icon: "\u{2726}",
    title: "Gemini",
    locators: &[
        strategy("query-text", Selector::tag_classes("div", &["query-text"])),
        strategy("query-text-line", Selector::classes(&["query-text-line"])),
        strategy(
            "query-text-line-paragraph",
            Selector::tag_classes("p", &["query-text-line"]),
        ),
    ],
    home_url: "https://gemini.google.com",
    new_chat_url: "https://gemini.google.com/app",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_hosts_resolve() {
        assert_eq!(SiteVariant::detect("claude.ai"), Some(SiteVariant::Claude));
        assert_eq!(
            SiteVariant::detect("chatgpt.com"),
            Some(SiteVariant::ChatGpt)
        );
        assert_eq!(
            SiteVariant::detect("chat.openai.com"),
            Some(SiteVariant::ChatGpt)
        );
        assert_eq!(SiteVariant::detect("grok.com"), Some(SiteVariant::Grok));
        assert_eq!(
            SiteVariant::detect("gemini.google.com"),
            Some(SiteVariant::Gemini)
        );
    }

    #[test]
    fn substring_match_covers_subdomains() {
        assert_eq!(
            SiteVariant::detect("www.claude.ai"),
            Some(SiteVariant::Claude)
        );
        assert_eq!(
            SiteVariant::detect("staging.grok.com"),
            Some(SiteVariant::Grok)
        );
    }

    #[test]
    fn unknown_hosts_are_inert() {
        for host in ["example.com", "google.com", "openai.com", "", "localhost"] {
            assert_eq!(SiteVariant::detect(host), None, "{host}");
        }
    }

    #[test]
    fn every_profile_matches_its_variant() {
        for variant in SiteVariant::ALL {
            let profile = variant.profile();
            assert_eq!(profile.variant, variant);
            assert!(!profile.locators.is_empty());
            assert!(profile.home_url.starts_with("https://"));
            assert!(profile.new_chat_url.starts_with(profile.home_url));
        }
    }

    #[test]
    fn theme_css_carries_site_colors() {
        let css = SiteVariant::Gemini.profile().theme_css();
        assert!(css.contains("#chatnav-toggle { background: #4285f4 !important"));
        assert!(css.contains("#3367d6"));
        assert!(css.contains("@keyframes chatnav-highlight"));
    }

    #[test]
    fn header_title_uses_icon_and_title() {
        assert_eq!(
            SiteVariant::Claude.profile().header_title(),
            "\u{2733} Claude Navigator"
        );
        assert_eq!(SiteVariant::Grok.to_string(), "Grok");
    }
}
