//! Allow-list SVG sanitizer.
//!
//! A parse-filter-serialize pass over the markup event stream: only
//! elements in the allow-list survive, and for each surviving element
//! only its allowed attributes survive. Comments, processing
//! instructions, DOCTYPE, CDATA and everything inside a dropped element
//! are removed, not escaped-and-kept.
//!
//! Sanitizing already-sanitized output is a fixed point:
//! `sanitize(sanitize(x)) == sanitize(x)`.

pub mod allowlist;

use std::io::Cursor;

use quick_xml::{
    Reader, Writer,
    events::{BytesEnd, BytesStart, Event},
};
use rustc_hash::FxHashSet;

/// Sanitize raw markup against the static allow-list.
///
/// Returns the filtered markup, or an empty string when no recognizable
/// `<svg>` root survives filtering. The empty result is the defined
/// failure signal; callers treat it as "reject", never as an error.
pub fn sanitize(raw: &str) -> String {
    let mut reader = Reader::from_str(raw);
    reader.config_mut().check_end_names = false;

    let mut writer = Writer::new(Cursor::new(Vec::with_capacity(raw.len())));

    // Depth inside a dropped element (content dropped with it).
    let mut skip: usize = 0;
    // Names of currently open kept elements; an end tag is emitted only
    // when it matches the innermost one, so the output stays balanced.
    let mut open: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(elem)) => {
                if skip > 0 {
                    skip += 1;
                    continue;
                }
                let name = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
                match allowlist::attributes_for(&name) {
                    Some(allowed) => {
                        let filtered = filter_attributes(&elem, &name, allowed);
                        let _ = writer.write_event(Event::Start(filtered));
                        open.push(name);
                    }
                    None => skip = 1,
                }
            }
            Ok(Event::Empty(elem)) => {
                if skip > 0 {
                    continue;
                }
                let name = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
                if let Some(allowed) = allowlist::attributes_for(&name) {
                    let filtered = filter_attributes(&elem, &name, allowed);
                    let _ = writer.write_event(Event::Empty(filtered));
                }
            }
            Ok(Event::End(elem)) => {
                if skip > 0 {
                    skip -= 1;
                    continue;
                }
                let name = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
                // Stray and mismatched end tags are dropped; emitting one
                // would close the wrong open element.
                if open.last().is_some_and(|innermost| *innermost == name) {
                    let _ = writer.write_event(Event::End(BytesEnd::new(name)));
                    open.pop();
                }
            }
            // Comments, PIs, DOCTYPE, XML declarations and CDATA are
            // structural noise or script carriers; all dropped.
            Ok(Event::Comment(_))
            | Ok(Event::PI(_))
            | Ok(Event::DocType(_))
            | Ok(Event::Decl(_))
            | Ok(Event::CData(_)) => {}
            Ok(Event::Eof) => break,
            // Text and entity references inside kept content pass
            // through; anything outside a kept element is dropped.
            Ok(event) => {
                if skip == 0 && !open.is_empty() {
                    let _ = writer.write_event(event);
                }
            }
            // Malformed markup past this point cannot be trusted.
            Err(_) => return String::new(),
        }
    }

    // Elements left open at end of input get their close tags emitted.
    while let Some(name) = open.pop() {
        let _ = writer.write_event(Event::End(BytesEnd::new(name)));
    }

    let bytes = writer.into_inner().into_inner();
    let out = String::from_utf8(bytes).unwrap_or_default();

    // No recognizable SVG root after filtering -> defined failure signal.
    if !out.trim_start().starts_with("<svg") {
        return String::new();
    }
    out
}

/// Rebuild a start tag keeping only allowed, non-scripting attributes.
fn filter_attributes(
    elem: &BytesStart<'_>,
    name: &str,
    allowed: &FxHashSet<&'static str>,
) -> BytesStart<'static> {
    let mut out = BytesStart::new(name.to_string());

    for attr in elem.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if !allowlist::attribute_allowed(&key, allowed) {
            continue;
        }
        let Ok(value) = attr.unescape_value() else {
            continue;
        };
        if allowlist::value_blocked(&key, &value) {
            continue;
        }
        out.push_attribute((key.as_str(), value.as_ref()));
    }

    out
}
