//! Site profile resolution gates the whole navigator.

use chatnav_core::{FrameContext, Guardian, NavigatorConfig, SiteVariant};
use chatnav_harness::{MemoryDom, Session, fixtures};

#[test]
fn supported_hosts_boot_exactly_one_variant() {
    let hosts = [
        ("claude.ai", SiteVariant::Claude),
        ("chatgpt.com", SiteVariant::ChatGpt),
        ("chat.openai.com", SiteVariant::ChatGpt),
        ("grok.com", SiteVariant::Grok),
        ("gemini.google.com", SiteVariant::Gemini),
    ];
    for (host, variant) in hosts {
        let guardian = Guardian::boot(host, FrameContext::TopLevel, NavigatorConfig::default())
            .expect("supported host");
        assert_eq!(guardian.profile().variant, variant, "{host}");
    }
}

#[test]
fn unsupported_hosts_leave_the_page_untouched() {
    for host in ["example.com", "news.ycombinator.com", "openai.com"] {
        let page = fixtures::claude_page(&["Is anybody there?"]);
        let before = format!("{:?}", page.dom);
        assert!(Session::boot(host, page.clone()).is_none(), "{host}");
        assert_eq!(format!("{:?}", page.dom), before);
    }
}

#[test]
fn install_is_deferred_until_body_exists() {
    let mut session = Session::boot_with(
        "grok.com",
        MemoryDom::without_body(),
        FrameContext::TopLevel,
        NavigatorConfig::default(),
    )
    .unwrap();
    assert_eq!(
        session.install(),
        Err(chatnav_core::InitError::BodyNotReady)
    );
    assert!(!session.guardian().is_installed());

    session.dom_mut().attach_body();
    session.install().unwrap();
    assert!(session.guardian().is_installed());
    assert_eq!(
        session.install(),
        Err(chatnav_core::InitError::AlreadyInstalled)
    );
    assert_eq!(session.dom().count_id("chatnav-toggle"), 1);
}
