//! Escaping for markup text, attributes and CDATA payloads.

use std::borrow::Cow;

const CDATA_END: &str = "]]>";
const CDATA_END_SPLIT: &str = "]]]]><![CDATA[>";

/// Whether `c` may appear in an XML 1.0 document.
pub fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}

/// Escape character data (`&`, `<`, `>`).
pub fn escape_text(text: &str) -> Cow<'_, str> {
    escape_with(text, false)
}

/// Escape an attribute value (`&`, `<`, `>`, `"`).
pub fn escape_attribute(value: &str) -> Cow<'_, str> {
    escape_with(value, true)
}

fn escape_with(text: &str, quotes: bool) -> Cow<'_, str> {
    let needs_escape = text
        .chars()
        .any(|c| matches!(c, '&' | '<' | '>') || (quotes && c == '"') || !is_xml_char(c));
    if !needs_escape {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quotes => out.push_str("&quot;"),
            c if is_xml_char(c) => out.push(c),
            _ => {}
        }
    }
    Cow::Owned(out)
}

/// Make arbitrary text safe to place inside a CDATA section.
///
/// Every `]]>` is split across two CDATA sections and characters that XML
/// cannot carry are dropped, so a conforming parser reads back the same
/// text minus those characters.
pub fn guard_cdata(text: &str) -> Cow<'_, str> {
    let has_invalid = text.chars().any(|c| !is_xml_char(c));
    if !has_invalid && !text.contains(CDATA_END) {
        return Cow::Borrowed(text);
    }

    let cleaned: Cow<'_, str> = if has_invalid {
        Cow::Owned(text.chars().filter(|c| is_xml_char(*c)).collect())
    } else {
        Cow::Borrowed(text)
    };

    Cow::Owned(cleaned.replace(CDATA_END, CDATA_END_SPLIT))
}
