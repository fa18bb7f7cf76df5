use crate::{
    Lossy,
    error::{ResolveError, not_loaded_error, symbol_error},
};
use std::sync::Arc;

/// A trait for resolving a symbol inside a module that is already loaded.
///
/// The engine calls this once a rule has picked a replacement module. An
/// implementation must not load the module: rebinding only redirects into
/// mappings that already exist.
///
/// # Examples
///
/// Using a closure for tests or fixed tables:
/// ```rust
/// use elf_rebind::ModuleResolver;
///
/// let resolver = |path: &[u8], symbol: &[u8]| match (path, symbol) {
///     (b"/opt/libC.so", b"foo") => Some(0x2000usize),
///     _ => None,
/// };
/// assert_eq!(resolver.resolve(b"/opt/libC.so", b"foo"), Ok(0x2000));
/// assert!(resolver.resolve(b"/opt/libC.so", b"bar").is_err());
/// ```
pub trait ModuleResolver {
    /// Finds the address of `symbol` in the module loaded from `path`.
    ///
    /// # Returns
    /// * `Ok(addr)` - The symbol's address in the replacement module.
    /// * `Err(e)` - The module is not loaded or does not define the symbol.
    fn resolve(&self, path: &[u8], symbol: &[u8]) -> Result<usize, ResolveError>;
}

impl<F: ?Sized> ModuleResolver for F
where
    F: Fn(&[u8], &[u8]) -> Option<usize>,
{
    fn resolve(&self, path: &[u8], symbol: &[u8]) -> Result<usize, ResolveError> {
        self(path, symbol).ok_or_else(|| {
            symbol_error(
                Lossy(symbol).to_string(),
                Lossy(path).to_string(),
                "lookup returned nothing",
            )
        })
    }
}

impl<S: ModuleResolver + ?Sized> ModuleResolver for Arc<S> {
    fn resolve(&self, path: &[u8], symbol: &[u8]) -> Result<usize, ResolveError> {
        (**self).resolve(path, symbol)
    }
}

impl ModuleResolver for () {
    fn resolve(&self, path: &[u8], _symbol: &[u8]) -> Result<usize, ResolveError> {
        Err(not_loaded_error(Lossy(path).to_string(), "no resolver"))
    }
}
