//! Byte-exact suffix matching for module names.
//!
//! Module names are compared as raw bytes: no path normalisation, no case
//! folding. A name shorter than the suffix never matches.

/// Returns `true` if `name` ends with `suffix`.
///
/// # Examples
/// ```
/// use elf_rebind::ends_with;
///
/// assert!(ends_with(b"libfoo.so.1", b"foo.so.1"));
/// assert!(!ends_with(b"bar.so", b"foo.so.1"));
/// ```
#[inline]
pub fn ends_with(name: &[u8], suffix: &[u8]) -> bool {
    name.len() >= suffix.len() && name[name.len() - suffix.len()..] == *suffix
}
