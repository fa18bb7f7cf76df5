use crate::{
    Lossy,
    error::{ResolveError, not_loaded_error, symbol_error},
    resolver::ModuleResolver,
};
use libc::{RTLD_NOLOAD, RTLD_NOW, dlerror, dlsym};
use std::borrow::Cow;
#[cfg(all(target_os = "linux", target_env = "gnu"))]
use std::ffi::{c_char, c_int};
use std::ffi::{CStr, CString, c_void};

cfg_if::cfg_if! {
    if #[cfg(all(target_os = "linux", target_env = "gnu"))]{
        unsafe extern "C" {
            fn dlmopen(lmid: libc::c_long, filename: *const c_char, flags: c_int) -> *mut c_void;
        }

        /// Link-map namespace of the main program.
        const LM_ID_BASE: libc::c_long = 0;

        /// Opens an already loaded module without loading anything new.
        ///
        /// An auditing library lives in its own link-map namespace, so the
        /// lookup is aimed at the main program's namespace explicitly.
        unsafe fn open_noload(path: &CStr) -> *mut c_void {
            unsafe { dlmopen(LM_ID_BASE, path.as_ptr(), RTLD_NOW | RTLD_NOLOAD) }
        }
    }else {
        /// Opens an already loaded module without loading anything new.
        unsafe fn open_noload(path: &CStr) -> *mut c_void {
            unsafe { libc::dlopen(path.as_ptr(), RTLD_NOW | RTLD_NOLOAD) }
        }
    }
}

/// The pending `dlerror` message, or `default` if there is none.
///
/// glibc leaves no message when an `RTLD_NOLOAD` lookup finds nothing.
fn last_error(default: &'static str) -> Cow<'static, str> {
    let msg = unsafe { dlerror() };
    if msg.is_null() {
        Cow::Borrowed(default)
    } else {
        Cow::Owned(String::from_utf8_lossy(unsafe { CStr::from_ptr(msg) }.to_bytes()).into_owned())
    }
}

/// A resolver backed by the host's dynamic loader.
///
/// The module is looked up with `RTLD_NOLOAD`, so a module that is not mapped
/// yet is reported as [`ResolveError::ModuleNotLoaded`] instead of being loaded.
/// A module that is mapped but not yet initialized is accepted.
///
/// The handle obtained for a successful lookup is never closed: the returned
/// address is written into a binding site and must stay mapped.
#[derive(Debug, Default, Clone, Copy)]
pub struct DlResolver;

impl ModuleResolver for DlResolver {
    fn resolve(&self, path: &[u8], symbol: &[u8]) -> Result<usize, ResolveError> {
        let cpath = CString::new(path).map_err(|_| ResolveError::InvalidName)?;
        let csym = CString::new(symbol).map_err(|_| ResolveError::InvalidName)?;
        // Clear any stale message so the ones read below belong to these calls.
        unsafe { dlerror() };
        let handle = unsafe { open_noload(&cpath) };
        if handle.is_null() {
            return Err(not_loaded_error(
                Lossy(path).to_string(),
                last_error("not mapped in the main namespace (RTLD_NOLOAD)"),
            ));
        }
        let addr = unsafe { dlsym(handle, csym.as_ptr()) };
        if addr.is_null() {
            return Err(symbol_error(
                Lossy(symbol).to_string(),
                Lossy(path).to_string(),
                last_error("dlsym failed"),
            ));
        }
        Ok(addr as usize)
    }
}
