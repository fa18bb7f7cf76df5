//! Module identities
//!
//! The loader reports a module search and then, if the search succeeds, the
//! opened module. Neither event carries the other's data, so the registry keeps
//! the most recent search name in a single pending slot and moves it into the
//! module table when the next open arrives. The id handed out on open is the
//! module's index in that table; the loader stores it as the module's cookie
//! and passes it back on every bind.
//!
//! The registry assumes it is driven by one sequential callback stream. It does
//! no locking of its own.

#[cfg(feature = "log")]
use crate::Lossy;

/// Position of a module in the order it was opened, starting at 0.
pub type ModuleId = usize;

/// Append-only table of opened modules and the names they were searched by.
#[derive(Debug, Default)]
pub struct Registry {
    modules: Vec<Option<Box<[u8]>>>,
    pending: Option<Box<[u8]>>,
}

impl Registry {
    #[inline]
    pub const fn new() -> Self {
        Self {
            modules: Vec::new(),
            pending: None,
        }
    }

    /// Records `name` as the pending search.
    ///
    /// Returns the previous pending name if it was never consumed by an open;
    /// the latest search always wins.
    pub fn on_search(&mut self, name: &[u8]) -> Option<Box<[u8]>> {
        let displaced = self.pending.replace(name.into());
        if let Some(_old) = &displaced {
            #[cfg(feature = "log")]
            log::debug!(
                "pending search [{}] replaced by [{}] before any module was opened",
                Lossy(_old),
                Lossy(name)
            );
        }
        displaced
    }

    /// Assigns the next id to a newly opened module.
    ///
    /// The pending search, if any, becomes the module's name and the slot is
    /// cleared, so a following open without its own search gets no name.
    pub fn on_open(&mut self) -> ModuleId {
        let id = self.modules.len();
        let name = self.pending.take();
        #[cfg(feature = "log")]
        log::debug!(
            "module {} opened as [{}]",
            id,
            name.as_deref().map_or(Lossy(b"<no search>"), Lossy)
        );
        self.modules.push(name);
        id
    }

    /// The name recorded for `id`.
    ///
    /// `None` for ids that were never handed out and for modules opened
    /// without a search; rules never apply to either.
    #[inline]
    pub fn name_of(&self, id: ModuleId) -> Option<&[u8]> {
        self.modules.get(id)?.as_deref()
    }

    /// The search name waiting for the next open.
    #[inline]
    pub fn pending(&self) -> Option<&[u8]> {
        self.pending.as_deref()
    }

    /// Number of modules opened so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
