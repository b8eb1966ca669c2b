//! Cache key digests using BLAKE3.
//!
//! Cache keys must be a stable one-way digest of the resource locator:
//! the same locator always maps to the same key across processes, and the
//! key leaks nothing about the locator itself.
//!
//! # Usage
//!
//! ```ignore
//! use crate::utils::hash;
//!
//! let d = hash::digest("https://example.com/icon.svg"); // -> 64-char hex
//! let fp = hash::fingerprint("some content");           // -> "a1b2c3d4"
//! ```

/// Compute the full BLAKE3 digest of `data` as lowercase hex.
#[inline]
pub fn digest<T: AsRef<[u8]> + ?Sized>(data: &T) -> String {
    hex::encode(blake3::hash(data.as_ref()).as_bytes())
}

/// Short 8-char hex fingerprint, for log lines and display.
#[inline]
pub fn fingerprint<T: AsRef<[u8]> + ?Sized>(data: &T) -> String {
    digest(data)[..8].to_string()
}
