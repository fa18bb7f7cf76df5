use bitflags::bitflags;
use std::ffi::c_uint;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    /// Which symbol bindings of a freshly opened module the loader should report.
    ///
    /// The bit values are the `LA_FLG_*` constants of `<link.h>`.
    pub struct AuditFlags: c_uint {
        /// Report bindings whose definition lives in this module.
        const BIND_TO = 0x01;

        /// Report bindings referenced from this module.
        const BIND_FROM = 0x02;
    }
}

impl AuditFlags {
    #[cfg(feature = "log")]
    pub(crate) fn describe(self) -> &'static str {
        match (self.contains(Self::BIND_TO), self.contains(Self::BIND_FROM)) {
            (true, true) => "to and from",
            (true, false) => "to",
            (false, true) => "from",
            (false, false) => "to or from",
        }
    }
}
