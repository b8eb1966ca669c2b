//! Attribute transplant from the reference element onto replacement
//! markup.
//!
//! Copies the recognized presentation attributes of the original host
//! element (the `<img>` being replaced) onto the root `<svg>` of the
//! sanitized markup, so classes, sizing and data hooks keep working once
//! the image becomes an inline node. `src` is renamed to `data-src` so
//! the root never acquires a conflicting loading attribute.

use quick_xml::{Reader, events::Event};

use crate::utils::html::escape_attr;

/// Reference attribute names copied onto the target root. `data-*` and
/// `aria-*` prefixed names are also recognized.
const MERGE_NAMES: &[&str] = &[
    "class", "style", "alt", "title", "width", "height", "id", "src",
];

/// Check whether a reference attribute participates in the merge.
fn is_merge_attribute(name: &str) -> bool {
    MERGE_NAMES.contains(&name) || name.starts_with("data-") || name.starts_with("aria-")
}

/// Merge reference attributes into the root element of `markup`.
///
/// Returns new markup; the input is never mutated. For each recognized
/// reference attribute: if the root already carries an attribute of the
/// same (possibly renamed) name, the first occurrence in document order
/// is replaced in place; otherwise the attribute is appended to the
/// opening tag. Values are escaped for attribute context on insertion.
///
/// Markup without an `<svg>` root is returned unchanged; by construction
/// the pipeline only passes sanitized markup here.
pub fn merge(reference: &[(String, String)], markup: &str) -> String {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().check_end_names = false;

    // Locate the root start tag and collect its attributes in document
    // order, keeping only the first occurrence of a duplicated name.
    let (root, self_closing) = loop {
        match reader.read_event() {
            Ok(Event::Start(elem)) if elem.name().as_ref() == b"svg" => break (elem, false),
            Ok(Event::Empty(elem)) if elem.name().as_ref() == b"svg" => break (elem, true),
            Ok(Event::Eof) | Err(_) => return markup.to_string(),
            Ok(_) => return markup.to_string(),
        }
    };

    let mut attrs: Vec<(String, String)> = Vec::new();
    for attr in root.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if attrs.iter().any(|(k, _)| *k == key) {
            continue;
        }
        let value = attr
            .unescape_value()
            .map(|v| v.into_owned())
            .unwrap_or_default();
        attrs.push((key, value));
    }

    for (name, value) in reference {
        if !is_merge_attribute(name) {
            continue;
        }
        let target = if name == "src" { "data-src" } else { name.as_str() };
        match attrs.iter_mut().find(|(k, _)| k == target) {
            Some(existing) => existing.1 = value.clone(),
            None => attrs.push((target.to_string(), value.clone())),
        }
    }

    // Serialize the rewritten opening tag and splice the untouched
    // remainder of the markup after it.
    let mut out = String::with_capacity(markup.len() + 64);
    out.push_str("<svg");
    for (key, value) in &attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    out.push_str(if self_closing { "/>" } else { ">" });

    let consumed = reader.buffer_position() as usize;
    out.push_str(&markup[consumed..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_merge_precedence() {
        let reference = attrs(&[("class", "a"), ("src", "http://x/y.svg")]);
        let out = merge(&reference, r#"<svg width="1"><path d="M0 0"/></svg>"#);
        assert!(out.contains(r#"class="a""#));
        assert!(out.contains(r#"data-src="http://x/y.svg""#));
        assert!(out.contains(r#"width="1""#));
        assert!(!out.contains(r#" src=""#));
        assert!(out.ends_with(r#"<path d="M0 0"/></svg>"#));
    }

    #[test]
    fn test_existing_attribute_replaced_in_place() {
        let reference = attrs(&[("width", "24")]);
        let out = merge(&reference, r#"<svg width="1" height="2"/>"#);
        assert_eq!(out, r#"<svg width="24" height="2"/>"#);
    }

    #[test]
    fn test_unrecognized_attributes_ignored() {
        let reference = attrs(&[("onclick", "evil()"), ("loading", "lazy"), ("class", "icon")]);
        let out = merge(&reference, "<svg/>");
        assert_eq!(out, r#"<svg class="icon"/>"#);
    }

    #[test]
    fn test_data_and_aria_prefixes_recognized() {
        let reference = attrs(&[("data-theme", "dark"), ("aria-hidden", "true")]);
        let out = merge(&reference, "<svg/>");
        assert!(out.contains(r#"data-theme="dark""#));
        assert!(out.contains(r#"aria-hidden="true""#));
    }

    #[test]
    fn test_values_escaped_on_insertion() {
        let reference = attrs(&[("alt", r#"say "hi" & <go>"#)]);
        let out = merge(&reference, "<svg/>");
        assert!(out.contains(r#"alt="say &quot;hi&quot; &amp; &lt;go&gt;""#));
    }

    #[test]
    fn test_no_root_returns_input_unchanged() {
        let reference = attrs(&[("class", "icon")]);
        assert_eq!(merge(&reference, "not markup"), "not markup");
        assert_eq!(merge(&reference, ""), "");
    }

    #[test]
    fn test_input_not_mutated_duplicate_root_attr() {
        // Duplicate names in the source root: first occurrence wins.
        let reference = attrs(&[("class", "b")]);
        let out = merge(&reference, r#"<svg class="x" class="y"/>"#);
        assert_eq!(out, r#"<svg class="b"/>"#);
    }
}
