#![forbid(unsafe_code)]

//! Synthetic host pages.
//!
//! Each builder lays out a conversation the way the named site's markup
//! does, interleaving assistant turns so locators have something to reject.

use crate::memory_dom::{MemoryDom, NodeId};

/// A page plus the user-message nodes a correct locator should find.
#[derive(Debug, Clone)]
pub struct Page {
    pub dom: MemoryDom,
    pub user_messages: Vec<NodeId>,
}

fn conversation(dom: &mut MemoryDom) -> NodeId {
    let body = dom.body_id();
    let main = dom.add(body, "main", &[], &[], None);
    dom.add(main, "div", &["thread"], &[], None)
}

/// Current Claude markup: `[data-testid="user-message"]`.
#[must_use]
pub fn claude_page(questions: &[&str]) -> Page {
    let mut dom = MemoryDom::new();
    let thread = conversation(&mut dom);
    let mut user_messages = Vec::new();
    for question in questions {
        let turn = dom.add(thread, "div", &[], &[], None);
        user_messages.push(dom.add(
            turn,
            "div",
            &["font-user-message"],
            &[("data-testid", "user-message")],
            Some(question),
        ));
        dom.add(
            thread,
            "div",
            &["font-claude-message"],
            &[],
            Some("Here is a detailed answer."),
        );
    }
    Page { dom, user_messages }
}

/// Older Claude markup: indexed `data-testid="user-human-turn-N"`.
#[must_use]
pub fn claude_legacy_page(questions: &[&str]) -> Page {
    let mut dom = MemoryDom::new();
    let thread = conversation(&mut dom);
    let mut user_messages = Vec::new();
    for (idx, question) in questions.iter().enumerate() {
        let testid = format!("user-human-turn-{idx}");
        user_messages.push(dom.add(
            thread,
            "div",
            &[],
            &[("data-testid", testid.as_str())],
            Some(question),
        ));
        dom.add(thread, "div", &[], &[("data-testid", "assistant-turn")], Some("Answer."));
    }
    Page { dom, user_messages }
}

/// ChatGPT: `[data-message-author-role="user"]`.
#[must_use]
pub fn chatgpt_page(questions: &[&str]) -> Page {
    let mut dom = MemoryDom::new();
    let thread = conversation(&mut dom);
    let mut user_messages = Vec::new();
    for question in questions {
        user_messages.push(dom.add(
            thread,
            "div",
            &[],
            &[("data-message-author-role", "user")],
            Some(question),
        ));
        dom.add(
            thread,
            "div",
            &[],
            &[("data-message-author-role", "assistant")],
            Some("Sure, here you go."),
        );
    }
    Page { dom, user_messages }
}

/// Grok: user rows are `div.message-row.items-end`, bot rows `items-start`.
#[must_use]
pub fn grok_page(questions: &[&str]) -> Page {
    grok_rows(questions, "items-end")
}

/// Grok after a class rename: user rows lost `items-end`, bot rows still
/// carry `items-start`.
#[must_use]
pub fn grok_restyled_page(questions: &[&str]) -> Page {
    grok_rows(questions, "justify-end")
}

fn grok_rows(questions: &[&str], user_align: &str) -> Page {
    let mut dom = MemoryDom::new();
    let thread = conversation(&mut dom);
    let mut user_messages = Vec::new();
    for question in questions {
        user_messages.push(dom.add(
            thread,
            "div",
            &["message-row", user_align],
            &[],
            Some(question),
        ));
        dom.add(
            thread,
            "div",
            &["message-row", "items-start"],
            &[],
            Some("Grok says hi."),
        );
    }
    Page { dom, user_messages }
}

/// Gemini: `div.query-text` wrapping `p.query-text-line`.
#[must_use]
pub fn gemini_page(questions: &[&str]) -> Page {
    let mut dom = MemoryDom::new();
    let thread = conversation(&mut dom);
    let mut user_messages = Vec::new();
    for question in questions {
        let query = dom.add(thread, "div", &["query-text"], &[], None);
        dom.add(query, "p", &["query-text-line"], &[], Some(question));
        user_messages.push(query);
        dom.add(thread, "div", &["model-response-text"], &[], Some("Gemini answer."));
    }
    Page { dom, user_messages }
}

/// A host page that exposes nothing any locator recognizes.
#[must_use]
pub fn unrecognized_page() -> Page {
    let mut dom = MemoryDom::new();
    let thread = conversation(&mut dom);
    dom.add(thread, "div", &["bubble"], &[], Some("Hello there, how are you?"));
    Page {
        dom,
        user_messages: Vec::new(),
    }
}
