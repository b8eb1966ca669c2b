//! Static element/attribute allow-list for SVG sanitization.
//!
//! Defined once at startup and shared by both sanitization paths (remote
//! fetch before caching, and user uploads before persistence) so both
//! trust the same safety contract. Anything not listed here is dropped by
//! the sanitizer, never escaped-and-kept.

use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::LazyLock;

/// Presentation attributes permitted on every allowed element.
const GLOBAL_ATTRIBUTES: &[&str] = &[
    "id",
    "class",
    "style",
    "lang",
    "tabindex",
    "role",
    "fill",
    "fill-opacity",
    "fill-rule",
    "stroke",
    "stroke-width",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-opacity",
    "opacity",
    "color",
    "display",
    "visibility",
    "transform",
    "clip-path",
    "clip-rule",
    "mask",
    "filter",
    "vector-effect",
    "xml:space",
];

/// Per-element attribute sets, beyond [`GLOBAL_ATTRIBUTES`].
static ELEMENTS: LazyLock<FxHashMap<&'static str, FxHashSet<&'static str>>> =
    LazyLock::new(|| {
        let mut map = FxHashMap::default();
        let mut insert = |tag: &'static str, attrs: &[&'static str]| {
            map.insert(tag, attrs.iter().copied().collect::<FxHashSet<_>>());
        };

        insert(
            "svg",
            &[
                "xmlns",
                "xmlns:xlink",
                "viewBox",
                "width",
                "height",
                "x",
                "y",
                "preserveAspectRatio",
                "version",
                "baseProfile",
            ],
        );
        insert("g", &[]);
        insert("defs", &[]);
        insert("title", &[]);
        insert("desc", &[]);
        insert("path", &["d", "pathLength"]);
        insert("circle", &["cx", "cy", "r"]);
        insert("ellipse", &["cx", "cy", "rx", "ry"]);
        insert("rect", &["x", "y", "width", "height", "rx", "ry"]);
        insert("line", &["x1", "y1", "x2", "y2"]);
        insert("polyline", &["points"]);
        insert("polygon", &["points"]);
        insert(
            "text",
            &[
                "x",
                "y",
                "dx",
                "dy",
                "rotate",
                "textLength",
                "lengthAdjust",
                "font-family",
                "font-size",
                "font-weight",
                "font-style",
                "text-anchor",
                "dominant-baseline",
                "letter-spacing",
                "word-spacing",
            ],
        );
        insert(
            "tspan",
            &[
                "x",
                "y",
                "dx",
                "dy",
                "rotate",
                "font-family",
                "font-size",
                "font-weight",
                "text-anchor",
            ],
        );
        insert(
            "textPath",
            &["href", "xlink:href", "startOffset", "method", "spacing"],
        );
        insert(
            "use",
            &["href", "xlink:href", "x", "y", "width", "height"],
        );
        insert(
            "symbol",
            &[
                "viewBox",
                "preserveAspectRatio",
                "x",
                "y",
                "width",
                "height",
                "refX",
                "refY",
            ],
        );
        insert(
            "linearGradient",
            &[
                "x1",
                "y1",
                "x2",
                "y2",
                "gradientUnits",
                "gradientTransform",
                "spreadMethod",
                "href",
                "xlink:href",
            ],
        );
        insert(
            "radialGradient",
            &[
                "cx",
                "cy",
                "r",
                "fx",
                "fy",
                "fr",
                "gradientUnits",
                "gradientTransform",
                "spreadMethod",
                "href",
                "xlink:href",
            ],
        );
        insert("stop", &["offset", "stop-color", "stop-opacity"]);
        insert("clipPath", &["clipPathUnits"]);
        insert(
            "mask",
            &["x", "y", "width", "height", "maskUnits", "maskContentUnits"],
        );
        insert(
            "pattern",
            &[
                "x",
                "y",
                "width",
                "height",
                "patternUnits",
                "patternContentUnits",
                "patternTransform",
                "viewBox",
                "preserveAspectRatio",
                "href",
                "xlink:href",
            ],
        );
        insert(
            "marker",
            &[
                "markerWidth",
                "markerHeight",
                "refX",
                "refY",
                "orient",
                "markerUnits",
                "viewBox",
                "preserveAspectRatio",
            ],
        );
        insert(
            "filter",
            &["x", "y", "width", "height", "filterUnits", "primitiveUnits"],
        );
        insert("feGaussianBlur", &["in", "stdDeviation", "result"]);
        insert("feOffset", &["in", "dx", "dy", "result"]);
        insert("feBlend", &["in", "in2", "mode", "result"]);
        insert("feColorMatrix", &["in", "type", "values", "result"]);
        insert("feFlood", &["flood-color", "flood-opacity", "result"]);
        insert(
            "feComposite",
            &["in", "in2", "operator", "k1", "k2", "k3", "k4", "result"],
        );
        insert("feMerge", &[]);
        insert("feMergeNode", &["in"]);
        insert(
            "feDropShadow",
            &["in", "dx", "dy", "stdDeviation", "flood-color", "flood-opacity", "result"],
        );

        map
    });

static GLOBAL: LazyLock<FxHashSet<&'static str>> =
    LazyLock::new(|| GLOBAL_ATTRIBUTES.iter().copied().collect());

/// Look up the per-element attribute set; `None` means the element is
/// not allowed at all.
#[inline]
pub fn attributes_for(tag: &str) -> Option<&'static FxHashSet<&'static str>> {
    ELEMENTS.get(tag)
}

/// Check whether attribute `name` is permitted on an element whose
/// per-element set is `element_attrs`.
///
/// Event-handler attributes (`on*`) are always rejected. `data-*` and
/// `aria-*` names are always accepted so merged presentation attributes
/// survive a re-sanitization pass.
pub fn attribute_allowed(name: &str, element_attrs: &FxHashSet<&'static str>) -> bool {
    let lower = name.to_ascii_lowercase();
    if lower.starts_with("on") {
        return false;
    }
    if lower.starts_with("data-") || lower.starts_with("aria-") {
        return true;
    }
    element_attrs.contains(name) || GLOBAL.contains(name)
}

/// Check whether an attribute value carries a scripting vector.
///
/// Scheme detection ignores embedded whitespace and control characters,
/// which browsers strip before resolving (`java\tscript:` still runs).
pub fn value_blocked(name: &str, value: &str) -> bool {
    let normalized: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    if normalized.starts_with("javascript:") || normalized.starts_with("vbscript:") {
        return true;
    }

    // Reference attributes must not smuggle documents in data: URIs.
    if (name == "href" || name == "xlink:href") && normalized.starts_with("data:") {
        return true;
    }

    false
}
