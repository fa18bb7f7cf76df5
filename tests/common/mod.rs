#![allow(dead_code)]

use elf_rebind::{Engine, ModuleId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

pub const ORIGINAL: usize = 0x1000;
pub const REPLACEMENT: usize = 0x2000;

pub const SIMPLE_CONFIG: &str = "libA.so:\n  libB.so: /opt/libC.so\n";

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A resolver that knows a fixed table of `(path, symbol) -> address`.
pub fn table_resolver(
    entries: &[(&'static str, &'static str, usize)],
) -> Arc<impl Fn(&[u8], &[u8]) -> Option<usize> + Send + Sync + 'static> {
    let map: HashMap<(Vec<u8>, Vec<u8>), usize> = entries
        .iter()
        .map(|&(path, sym, addr)| ((path.as_bytes().to_vec(), sym.as_bytes().to_vec()), addr))
        .collect();
    Arc::new(move |path: &[u8], sym: &[u8]| map.get(&(path.to_vec(), sym.to_vec())).copied())
}

/// A resolver that records every call and never finds anything.
#[derive(Default)]
pub struct RecordingResolver {
    pub calls: RefCell<Vec<(Vec<u8>, Vec<u8>)>>,
}

impl elf_rebind::ModuleResolver for RecordingResolver {
    fn resolve(&self, path: &[u8], symbol: &[u8]) -> Result<usize, elf_rebind::ResolveError> {
        self.calls.borrow_mut().push((path.to_vec(), symbol.to_vec()));
        Err(elf_rebind::ResolveError::InvalidName)
    }
}

/// Replays a search followed by an open, returning the new module's id.
pub fn open(engine: &mut Engine, name: &str) -> ModuleId {
    engine.on_search(name.as_bytes());
    engine.on_open().0
}
