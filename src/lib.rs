//! # elf_rebind
//! A rule-driven symbol rebinding engine for the dynamic loader's auditing interface.
//! ## Usage
//! Rules are read from a two-level YAML mapping: referencing module suffix, then
//! defining module suffix, then the path of an already loaded module that should
//! supply the symbol instead.
//! ```yaml
//! libA.so:
//!   libB.so: /opt/libC.so
//! ```
//! The loader reports every module search and open to an [`Engine`], which assigns
//! each module a sequential id. When a symbol is bound between two modules whose
//! names match a rule, the engine re-resolves the symbol inside the replacement
//! module and hands that address back to the loader. Every failure path keeps the
//! address the loader chose on its own.
//!
//! The `rebind-audit` crate in this workspace exports the `la_*` entry points that
//! drive an [`Engine`] from `LD_AUDIT`.

mod config;
mod engine;
mod error;
mod flags;
mod os;
mod registry;
mod resolver;
mod rules;
mod suffix;

pub use engine::{BindRequest, Engine, INERT, negotiate};
pub use error::{ConfigError, Error, ResolveError};
pub use flags::AuditFlags;
pub use os::DlResolver;
pub use registry::{ModuleId, Registry};
pub use resolver::ModuleResolver;
pub use rules::{Rule, RuleSet, Target};
pub use suffix::ends_with;

/// Longest accepted replacement module path, in bytes.
pub const MAX_REPLACEMENT_PATH: usize = 999;

pub type Result<T> = std::result::Result<T, Error>;

/// Displays a module or symbol name that is not guaranteed to be UTF-8.
pub(crate) struct Lossy<'a>(pub(crate) &'a [u8]);

impl std::fmt::Display for Lossy<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.0))
    }
}
