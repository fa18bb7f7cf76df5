use crate::{
    Lossy,
    error::{ResolveError, not_loaded_error},
    resolver::ModuleResolver,
};

/// A resolver for targets without a dynamic loader. Nothing is ever loaded,
/// so every lookup fails and bindings keep their original address.
#[derive(Debug, Default, Clone, Copy)]
pub struct DlResolver;

impl ModuleResolver for DlResolver {
    fn resolve(&self, path: &[u8], _symbol: &[u8]) -> Result<usize, ResolveError> {
        Err(not_loaded_error(
            Lossy(path).to_string(),
            "no dynamic loader on this target",
        ))
    }
}
