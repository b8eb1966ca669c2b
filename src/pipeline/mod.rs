//! Inline-SVG pipeline.
//!
//! Given a fragment of rendered host content, replaces each
//! `<img src="*.svg">` reference whose locator resolves to the site's
//! own origin with sanitized inline markup:
//!
//! ```text
//! fragment -> find references -> cache get
//!                                  | miss
//!                                  v
//!                         fetch -> sanitize -> cache put
//!                                  |
//!                                  v
//!                        attribute merge -> splice into fragment
//! ```
//!
//! Every failure is absorbed here and converted to "leave that reference
//! unchanged": a broken inline-SVG feature must never break the
//! surrounding content. Failures are logged, never cached.

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::cache::CacheStore;
use crate::fetch::{FetchError, Fetcher};
use crate::utils::hash;
use crate::{debug, log, merge, sanitize};

/// Why a single reference was left unchanged. Absorbed internally;
/// surfaces only in operator logs.
#[derive(Debug, Error)]
enum SkipReason {
    #[error("cross-origin locator rejected")]
    CrossOrigin,

    #[error("invalid locator: {0}")]
    BadLocator(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("sanitization produced empty output")]
    SanitizationEmpty,
}

/// Orchestrator wiring origin policy, cache store and fetcher together.
pub struct InlinePipeline<'a> {
    origin: &'a Url,
    ttl: Duration,
    store: &'a dyn CacheStore,
    fetcher: &'a Fetcher,
}

impl<'a> InlinePipeline<'a> {
    pub fn new(
        origin: &'a Url,
        ttl: Duration,
        store: &'a dyn CacheStore,
        fetcher: &'a Fetcher,
    ) -> Self {
        Self {
            origin,
            ttl,
            store,
            fetcher,
        }
    }

    /// Transform one fragment of host content.
    ///
    /// Pure text-to-text: returns either the unmodified fragment or one
    /// where image references were replaced by inline markup. Each
    /// qualifying reference is processed independently; a failure leaves
    /// only that reference unchanged.
    pub fn process(&self, fragment: &str) -> String {
        let Ok(dom) = tl::parse(fragment, tl::ParserOptions::default()) else {
            return fragment.to_string();
        };

        let mut out = fragment.to_string();
        let mut found = false;

        for handle in dom.nodes() {
            let Some(tag) = handle.as_tag() else {
                continue;
            };
            if tag.name().as_utf8_str() != "img" {
                continue;
            }

            // Reference element: attribute name/value pairs in document
            // order, as the merger sees them.
            let attrs: Vec<(String, String)> = tag
                .attributes()
                .iter()
                .map(|(k, v)| (k.to_string(), v.map(|v| v.to_string()).unwrap_or_default()))
                .collect();

            let Some(src) = attrs
                .iter()
                .find(|(k, _)| k == "src")
                .map(|(_, v)| v.clone())
            else {
                continue;
            };
            if !has_svg_suffix(&src) {
                continue;
            }
            found = true;

            match self.inline_markup(&src, &attrs) {
                Ok(markup) => {
                    let raw = tag.raw().as_utf8_str();
                    out = out.replacen(raw.as_ref(), &markup, 1);
                }
                Err(SkipReason::CrossOrigin) => {
                    debug!("inline"; "cross-origin reference left unchanged: {}", src);
                }
                Err(reason) => {
                    log!("inline"; "leaving {} unchanged: {}", src, reason);
                }
            }
        }

        if !found {
            debug!("inline"; "no SVG reference found in fragment");
        }
        out
    }

    /// Resolve one reference to merged inline markup.
    fn inline_markup(
        &self,
        src: &str,
        reference: &[(String, String)],
    ) -> Result<String, SkipReason> {
        let locator = self
            .origin
            .join(src)
            .map_err(|e| SkipReason::BadLocator(e.to_string()))?;

        // Trust boundary: only same-origin resources are inlined.
        if locator.host_str() != self.origin.host_str() {
            return Err(SkipReason::CrossOrigin);
        }

        let markup = match self.store.get(locator.as_str()) {
            Some(cached) => {
                debug!("cache"; "hit for {} ({})", locator, hash::fingerprint(locator.as_str()));
                cached
            }
            None => {
                let raw = self.fetcher.fetch(&locator)?;
                let sanitized = sanitize::sanitize(&raw);
                if sanitized.is_empty() {
                    // Never cached: the next invocation gets a fresh try.
                    return Err(SkipReason::SanitizationEmpty);
                }
                self.store.put(locator.as_str(), &sanitized, self.ttl);
                debug!("cache"; "stored {} ({} bytes)", locator, sanitized.len());
                sanitized
            }
        };

        Ok(merge::merge(reference, &markup))
    }
}

/// Check that a reference's `src` points at an SVG resource, ignoring
/// query string and fragment.
fn has_svg_suffix(src: &str) -> bool {
    let path = src.split(['?', '#']).next().unwrap_or(src);
    path.to_ascii_lowercase().ends_with(".svg")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{DEFAULT_TTL, MemoryStore};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    const ICON_SVG: &str =
        r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M0 0"/></svg>"#;

    /// Loopback server that counts requests; `fail_first` requests
    /// respond with 500 before it starts serving the body.
    fn serve_svg(body: &'static str, fail_first: usize) -> (u16, Arc<AtomicUsize>) {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let counter = Arc::new(AtomicUsize::new(0));
        let seen = counter.clone();
        thread::spawn(move || {
            for request in server.incoming_requests() {
                let n = seen.fetch_add(1, Ordering::SeqCst);
                let response = if n < fail_first {
                    tiny_http::Response::from_string("oops").with_status_code(500)
                } else {
                    tiny_http::Response::from_string(body)
                };
                let _ = request.respond(response);
            }
        });
        (port, counter)
    }

    fn fetcher() -> Fetcher {
        Fetcher::new(Duration::from_secs(5), false).unwrap()
    }

    #[test]
    fn test_end_to_end_inline() {
        let (port, _) = serve_svg(ICON_SVG, 0);
        let origin = Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap();
        let store = MemoryStore::new();
        let fetcher = fetcher();
        let pipeline = InlinePipeline::new(&origin, DEFAULT_TTL, &store, &fetcher);

        let fragment = format!(
            r#"<p>hi <img src="http://127.0.0.1:{port}/icon.svg" class="icon" width="24" height="24"> there</p>"#
        );
        let out = pipeline.process(&fragment);

        assert!(!out.contains("<img"));
        assert!(out.contains(r#"xmlns="http://www.w3.org/2000/svg""#));
        assert!(out.contains(r#"class="icon""#));
        assert!(out.contains(r#"width="24""#));
        assert!(out.contains(r#"height="24""#));
        assert!(out.contains(&format!(r#"data-src="http://127.0.0.1:{port}/icon.svg""#)));
        assert!(out.contains(r#"<path d="M0 0"/>"#));
        assert!(out.starts_with("<p>hi "));
        assert!(out.ends_with(" there</p>"));
    }

    #[test]
    fn test_relative_src_resolved_against_origin() {
        let (port, counter) = serve_svg(ICON_SVG, 0);
        let origin = Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap();
        let store = MemoryStore::new();
        let fetcher = fetcher();
        let pipeline = InlinePipeline::new(&origin, DEFAULT_TTL, &store, &fetcher);

        let out = pipeline.process(r#"<img src="/icons/a.svg">"#);
        assert!(out.contains("<svg"));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cross_origin_never_fetched() {
        let (port, counter) = serve_svg(ICON_SVG, 0);
        let origin = Url::parse("https://example.com/").unwrap();
        let store = MemoryStore::new();
        let fetcher = fetcher();
        let pipeline = InlinePipeline::new(&origin, DEFAULT_TTL, &store, &fetcher);

        let fragment = format!(r#"<img src="http://127.0.0.1:{port}/icon.svg">"#);
        let out = pipeline.process(&fragment);

        assert_eq!(out, fragment);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_no_reference_passthrough() {
        let origin = Url::parse("https://example.com/").unwrap();
        let store = MemoryStore::new();
        let fetcher = fetcher();
        let pipeline = InlinePipeline::new(&origin, DEFAULT_TTL, &store, &fetcher);

        for fragment in [
            "<p>no images here</p>",
            r#"<img src="/photo.png" class="x">"#,
            r#"<img alt="no src">"#,
            "",
        ] {
            assert_eq!(pipeline.process(fragment), fragment);
        }
    }

    #[test]
    fn test_cache_hit_skips_fetch() {
        let (port, counter) = serve_svg(ICON_SVG, 0);
        let origin = Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap();
        let store = MemoryStore::new();
        let fetcher = fetcher();
        let pipeline = InlinePipeline::new(&origin, DEFAULT_TTL, &store, &fetcher);

        let fragment = format!(r#"<img src="http://127.0.0.1:{port}/icon.svg">"#);
        pipeline.process(&fragment);
        pipeline.process(&fragment);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fetch_failure_unchanged_and_not_cached() {
        let (port, counter) = serve_svg(ICON_SVG, 1);
        let origin = Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap();
        let store = MemoryStore::new();
        let fetcher = fetcher();
        let pipeline = InlinePipeline::new(&origin, DEFAULT_TTL, &store, &fetcher);

        let fragment = format!(r#"<img src="http://127.0.0.1:{port}/icon.svg">"#);

        // First attempt hits the 500 and leaves the fragment unchanged.
        assert_eq!(pipeline.process(&fragment), fragment);

        // The failure was not cached: the next invocation refetches and
        // succeeds.
        let out = pipeline.process(&fragment);
        assert!(out.contains("<svg"));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_sanitization_empty_unchanged_and_not_cached() {
        let (port, counter) = serve_svg("<div>not svg at all</div>", 0);
        let origin = Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap();
        let store = MemoryStore::new();
        let fetcher = fetcher();
        let pipeline = InlinePipeline::new(&origin, DEFAULT_TTL, &store, &fetcher);

        let fragment = format!(r#"<img src="http://127.0.0.1:{port}/icon.svg">"#);
        assert_eq!(pipeline.process(&fragment), fragment);
        // Nothing cached; a retry fetches again.
        assert_eq!(pipeline.process(&fragment), fragment);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_multiple_references_processed_independently() {
        let (port, _) = serve_svg(ICON_SVG, 0);
        let origin = Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap();
        let store = MemoryStore::new();
        let fetcher = fetcher();
        let pipeline = InlinePipeline::new(&origin, DEFAULT_TTL, &store, &fetcher);

        let fragment =
            r#"<img src="/a.svg" class="a"><img src="https://other.example/b.svg"><img src="/c.svg" class="c">"#;
        let out = pipeline.process(fragment);
        assert!(out.contains(r#"class="a""#));
        assert!(out.contains(r#"class="c""#));
        // Cross-origin middle reference stays an <img>.
        assert!(out.contains(r#"<img src="https://other.example/b.svg">"#));
    }

    #[test]
    fn test_has_svg_suffix() {
        assert!(has_svg_suffix("/icon.svg"));
        assert!(has_svg_suffix("/ICON.SVG"));
        assert!(has_svg_suffix("/icon.svg?v=2"));
        assert!(has_svg_suffix("/icon.svg#frag"));
        assert!(!has_svg_suffix("/photo.png"));
        assert!(!has_svg_suffix("/svg"));
        assert!(!has_svg_suffix("/icon.svg.png"));
    }
}
