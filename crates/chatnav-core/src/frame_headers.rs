#![forbid(unsafe_code)]

//! Response-header rules that allow the chat sites to load inside the
//! sidebar frame.
//!
//! These run upstream of the content script (in the extension's request
//! filter), never in the page. They remove `X-Frame-Options` and delete every
//! `frame-ancestors` directive from `Content-Security-Policy`, and apply only
//! to [`TARGET_URL_PATTERNS`].

use serde::{Deserialize, Serialize};

/// Match patterns for responses the rules apply to.
pub const TARGET_URL_PATTERNS: &[&str] = &[
    "*://claude.ai/*",
    "*://chatgpt.com/*",
    "*://chat.openai.com/*",
    "*://grok.com/*",
    "*://gemini.google.com/*",
];

const FRAME_OPTIONS: &str = "x-frame-options";
const CSP: &str = "content-security-policy";
const FRAME_ANCESTORS: &str = "frame-ancestors";

/// One HTTP response header, shaped like the browser's `webRequest` objects.
///
/// A header carries either a text `value` or raw `binaryValue` bytes; both
/// survive a serde round trip untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseHeader {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        rename = "binaryValue"
    )]
    pub binary_value: Option<Vec<u8>>,
}

impl ResponseHeader {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            binary_value: None,
        }
    }

    /// A header exposed only as raw bytes.
    #[must_use]
    pub fn binary(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            value: None,
            binary_value: Some(bytes.into()),
        }
    }
}

/// Strip framing blockers in place. Returns whether anything changed.
pub fn strip_frame_blockers(headers: &mut Vec<ResponseHeader>) -> bool {
    let before = headers.len();
    headers.retain(|header| !header.name.eq_ignore_ascii_case(FRAME_OPTIONS));
    let mut modified = headers.len() != before;

    for header in headers
        .iter_mut()
        .filter(|header| header.name.eq_ignore_ascii_case(CSP))
    {
        let Some(policy) = header.value.as_mut() else {
            continue;
        };
        let stripped = strip_frame_ancestors(policy);
        if stripped != *policy {
            *policy = stripped;
            modified = true;
        }
    }
    modified
}

/// Remove every `frame-ancestors <sources>` directive (with its trailing
/// `;`, if any) from a policy string. Keyword match is ASCII
/// case-insensitive.
#[must_use]
pub fn strip_frame_ancestors(policy: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with `policy`.
    let lower = policy.to_ascii_lowercase();
    let mut out = String::with_capacity(policy.len());
    let mut copied = 0;
    let mut search = 0;

    while let Some(rel) = lower[search..].find(FRAME_ANCESTORS) {
        let start = search + rel;
        let after = start + FRAME_ANCESTORS.len();
        match directive_len(&policy[after..]) {
            Some(len) => {
                out.push_str(&policy[copied..start]);
                copied = after + len;
                search = copied;
            }
            None => search = after,
        }
    }
    out.push_str(&policy[copied..]);
    out
}

/// Length of `\s+[^;]+(;|$)` at the start of `rest`, if it matches.
fn directive_len(rest: &str) -> Option<usize> {
    if !rest.chars().next()?.is_whitespace() {
        return None;
    }
    let end = rest.find(';').unwrap_or(rest.len());
    // At least one whitespace plus one source character.
    if rest[..end].chars().count() < 2 {
        return None;
    }
    Some(if end < rest.len() { end + 1 } else { end })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn removes_frame_options_header() {
        let mut headers = vec![
            ResponseHeader::new("X-Frame-Options", "DENY"),
            ResponseHeader::new("Content-Type", "text/html"),
        ];
        assert!(strip_frame_blockers(&mut headers));
        assert_eq!(
            headers,
            vec![ResponseHeader::new("Content-Type", "text/html")]
        );
    }

    #[test]
    fn removes_frame_ancestors_directive() {
        let mut headers = vec![ResponseHeader::new(
            "content-security-policy",
            "default-src 'self'; frame-ancestors 'none'; img-src *",
        )];
        assert!(strip_frame_blockers(&mut headers));
        assert_eq!(
            headers[0].value.as_deref(),
            Some("default-src 'self';  img-src *")
        );
    }

    #[test]
    fn trailing_directive_without_semicolon() {
        assert_eq!(
            strip_frame_ancestors("script-src 'self'; FRAME-ANCESTORS https://a.example"),
            "script-src 'self'; "
        );
    }

    #[test]
    fn every_occurrence_is_removed() {
        assert_eq!(
            strip_frame_ancestors("frame-ancestors 'self';frame-ancestors https://x;base-uri 'none'"),
            "base-uri 'none'"
        );
    }

    #[test]
    fn keyword_without_sources_is_left_alone() {
        assert_eq!(strip_frame_ancestors("frame-ancestors;"), "frame-ancestors;");
        assert_eq!(strip_frame_ancestors("frame-ancestors ;"), "frame-ancestors ;");
    }

    #[test]
    fn unrelated_headers_report_unmodified() {
        let mut headers = vec![
            ResponseHeader::new("Content-Security-Policy", "default-src 'self'"),
            ResponseHeader::new("Cache-Control", "no-store"),
        ];
        let original = headers.clone();
        assert!(!strip_frame_blockers(&mut headers));
        assert_eq!(headers, original);
    }

    #[test]
    fn binary_headers_survive_a_json_round_trip() {
        let json = r#"[{"name":"X-Frame-Options","value":"DENY"},{"name":"X-Bin","binaryValue":[1,2,3]},{"name":"Content-Security-Policy","value":"frame-ancestors 'none'; img-src *"}]"#;
        let mut headers: Vec<ResponseHeader> = serde_json::from_str(json).unwrap();
        assert_eq!(headers[1], ResponseHeader::binary("X-Bin", vec![1, 2, 3]));

        assert!(strip_frame_blockers(&mut headers));
        assert_eq!(
            serde_json::to_string(&headers).unwrap(),
            r#"[{"name":"X-Bin","binaryValue":[1,2,3]},{"name":"Content-Security-Policy","value":" img-src *"}]"#
        );
    }

    #[test]
    fn binary_csp_is_left_alone() {
        let mut headers = vec![ResponseHeader::binary("content-security-policy", b"x".to_vec())];
        assert!(!strip_frame_blockers(&mut headers));
        assert_eq!(headers[0].binary_value.as_deref(), Some(&b"x"[..]));
    }

    #[test]
    fn targets_every_known_site() {
        assert_eq!(TARGET_URL_PATTERNS.len(), 5);
        assert!(
            TARGET_URL_PATTERNS
                .iter()
                .all(|p| p.starts_with("*://") && p.ends_with("/*"))
        );
    }
}
