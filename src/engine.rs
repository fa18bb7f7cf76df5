//! Bind interception
//!
//! The [`Engine`] owns the rule set and the module registry for the lifetime of
//! the process and answers the loader's three questions: what to do with a
//! search, which bindings of an opened module to report, and which address a
//! reported binding should use.

#[cfg(feature = "log")]
use crate::Lossy;
use crate::{
    Result,
    error::io_error,
    flags::AuditFlags,
    registry::{ModuleId, Registry},
    resolver::ModuleResolver,
    rules::RuleSet,
};
use delegate::delegate;
use std::path::Path;

/// The reply to the loader's version probe that makes it ignore the auditor.
pub const INERT: u32 = 0;

/// Answers the loader's version probe.
///
/// An engaged engine echoes the offered interface version back. Anything else
/// answers [`INERT`], which the loader documents as "ignore this auditor"; no
/// other value may be used for that, since the loader treats unexpected
/// replies as fatal.
#[inline]
pub fn negotiate(engaged: bool, offered: u32) -> u32 {
    if engaged { offered } else { INERT }
}

/// A symbol binding reported by the loader.
#[derive(Debug, Clone, Copy)]
pub struct BindRequest<'a> {
    /// Name of the symbol being bound.
    pub symbol: &'a [u8],
    /// Index of the symbol in the referencing module's symbol table.
    pub index: u32,
    /// Module that uses the symbol.
    pub referencer: ModuleId,
    /// Module the loader found the definition in.
    pub definer: ModuleId,
    /// Address the loader resolved the symbol to.
    pub address: usize,
}

impl<'a> BindRequest<'a> {
    #[inline]
    pub fn new(symbol: &'a [u8], referencer: ModuleId, definer: ModuleId, address: usize) -> Self {
        Self {
            symbol,
            index: 0,
            referencer,
            definer,
            address,
        }
    }

    /// Sets the symbol table index, used only for diagnostics.
    #[inline]
    pub fn with_index(mut self, index: u32) -> Self {
        self.index = index;
        self
    }
}

/// Rule store plus module registry, driven by the loader's callbacks.
///
/// One engine exists per process. Its callbacks must be invoked sequentially;
/// the engine relies on the loader to serialize them.
#[derive(Debug)]
pub struct Engine {
    rules: RuleSet,
    registry: Registry,
}

impl Engine {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            registry: Registry::new(),
        }
    }

    /// Builds an engine from the text of a configuration document.
    pub fn from_text(text: &[u8]) -> Result<Self> {
        let rules = RuleSet::parse(text)?;
        #[cfg(feature = "log")]
        log::info!("configuration parsed: {} rule(s)", rules.len());
        Ok(Self::new(rules))
    }

    /// Reads and parses the configuration file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        #[cfg(feature = "log")]
        log::info!("reading configuration from [{}]", path.display());
        let text = std::fs::read(path)
            .map_err(|err| io_error(format!("failure to open [{}]: {err}", path.display())))?;
        Self::from_text(&text)
    }

    /// Whether the loader should keep this auditor active.
    ///
    /// An engine without rules could never change a binding, so it behaves as
    /// if it were absent.
    #[inline]
    pub fn should_engage(&self) -> bool {
        !self.rules.is_empty()
    }

    #[inline]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    #[inline]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    delegate! {
        to self.registry {
            /// The name recorded for module `id`.
            pub fn name_of(&self, id: ModuleId) -> Option<&[u8]>;
        }
    }

    /// Records a module search. The name is returned unchanged; the engine
    /// observes searches but never redirects them.
    pub fn on_search<'a>(&mut self, name: &'a [u8]) -> &'a [u8] {
        #[cfg(feature = "log")]
        log::trace!("searching [{}]", Lossy(name));
        self.registry.on_search(name);
        name
    }

    /// Registers a newly opened module.
    ///
    /// Returns the module's id and the bindings of it the loader should
    /// report, derived from the name it was searched by.
    pub fn on_open(&mut self) -> (ModuleId, AuditFlags) {
        let id = self.registry.on_open();
        let flags = self
            .registry
            .name_of(id)
            .map_or(AuditFlags::empty(), |name| self.rules.audit_flags(name));
        #[cfg(feature = "log")]
        if let Some(name) = self.registry.name_of(id) {
            log::debug!(
                "will{} audit references {} [{}]",
                if flags.is_empty() { " not" } else { "" },
                flags.describe(),
                Lossy(name)
            );
        }
        (id, flags)
    }

    /// Picks the address a reported binding should use.
    ///
    /// The loader's address is kept when either module has no recorded name,
    /// when no rule matches the pair, or when the replacement module cannot
    /// supply the symbol. Only a matching rule with a successful resolution
    /// changes the binding.
    pub fn decide<R>(&self, bind: &BindRequest<'_>, resolver: &R) -> usize
    where
        R: ModuleResolver + ?Sized,
    {
        let Some(ref_name) = self.registry.name_of(bind.referencer) else {
            return bind.address;
        };
        let Some(def_name) = self.registry.name_of(bind.definer) else {
            return bind.address;
        };
        #[cfg(feature = "log")]
        log::trace!(
            "binding [{}] referenced from [{}] and defined in [{}]",
            Lossy(bind.symbol),
            Lossy(ref_name),
            Lossy(def_name)
        );
        let Some(replacement) = self.rules.find(ref_name, def_name) else {
            return bind.address;
        };
        #[cfg(feature = "log")]
        log::debug!(
            "[{}] ({}) referenced from module {} [{}] is bound to 0x{:x} from module {} [{}], rebinding into [{}]",
            Lossy(bind.symbol),
            bind.index,
            bind.referencer,
            Lossy(ref_name),
            bind.address,
            bind.definer,
            Lossy(def_name),
            Lossy(replacement)
        );
        match resolver.resolve(replacement, bind.symbol) {
            Ok(addr) => {
                #[cfg(feature = "log")]
                log::debug!("[{}] rebound to 0x{:x}", Lossy(bind.symbol), addr);
                addr
            }
            Err(_err) => {
                #[cfg(feature = "log")]
                log::warn!(
                    "{}, keeping [{}] at 0x{:x}",
                    _err,
                    Lossy(bind.symbol),
                    bind.address
                );
                bind.address
            }
        }
    }
}
