//! `LD_AUDIT` entry points for `elf_rebind`.
//!
//! ```sh
//! REBIND_AUDIT_CONFIG=rules.yaml LD_AUDIT=librebind_audit.so ./program
//! ```
//! `REBIND_AUDIT_LOG` sets the log filter (default `warn`).
//!
//! The loader calls `la_version` first. That call reads the configuration and
//! builds the process-wide engine; if anything goes wrong the auditor
//! answers [`INERT`](elf_rebind::INERT) and the loader never calls it again.
//! Every other entry point only forwards to the engine.

use elf_rebind::{BindRequest, DlResolver, Engine, ModuleResolver, negotiate};
use std::ffi::{CStr, OsStr, c_char, c_long, c_uint, c_void};
use std::sync::{Mutex, OnceLock, PoisonError};

const CONFIG_ENV: &str = "REBIND_AUDIT_CONFIG";
const LOG_ENV: &str = "REBIND_AUDIT_LOG";

static AUDITOR: OnceLock<Auditor> = OnceLock::new();

/// The engine behind the entry points, or nothing when the auditor is inactive.
#[derive(Debug, Default)]
struct Auditor {
    engine: Option<Mutex<Engine>>,
}

impl Auditor {
    fn from_env() -> Self {
        let _ = env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, "warn"))
            .try_init();
        let config = std::env::var_os(CONFIG_ENV);
        Self::load(config.as_deref())
    }

    fn load(config: Option<&OsStr>) -> Self {
        let Some(path) = config else {
            log::warn!("path to configuration file must be set using [{CONFIG_ENV}]");
            return Self::default();
        };
        let engine = match Engine::from_path(path) {
            Ok(engine) if engine.should_engage() => Some(Mutex::new(engine)),
            Ok(_) => {
                log::warn!("configuration has no rules, staying inactive");
                None
            }
            Err(err) => {
                log::warn!("{err}, staying inactive");
                None
            }
        };
        Self { engine }
    }

    /// Runs `f` on the engine, or returns `None` when the auditor is inactive.
    fn with_engine<T>(&self, f: impl FnOnce(&mut Engine) -> T) -> Option<T> {
        let engine = self.engine.as_ref()?;
        let mut guard = engine.lock().unwrap_or_else(PoisonError::into_inner);
        Some(f(&mut guard))
    }

    fn version(&self, offered: c_uint) -> c_uint {
        negotiate(self.engine.is_some(), offered)
    }

    unsafe fn search(&self, name: *const c_char) -> *mut c_char {
        if !name.is_null() {
            let bytes = unsafe { CStr::from_ptr(name) }.to_bytes();
            self.with_engine(|engine| {
                engine.on_search(bytes);
            });
        }
        name.cast_mut()
    }

    unsafe fn open(&self, cookie: *mut usize) -> c_uint {
        self.with_engine(|engine| {
            let (id, flags) = engine.on_open();
            if !cookie.is_null() {
                unsafe { cookie.write(id) };
            }
            flags.bits()
        })
        .unwrap_or(0)
    }

    /// Shared body of the 32- and 64-bit bind hooks.
    unsafe fn bind<R: ModuleResolver>(
        &self,
        value: usize,
        ndx: c_uint,
        refcook: *const usize,
        defcook: *const usize,
        symname: *const c_char,
        resolver: &R,
    ) -> usize {
        if refcook.is_null() || defcook.is_null() || symname.is_null() {
            return value;
        }
        let symbol = unsafe { CStr::from_ptr(symname) }.to_bytes();
        let bind = BindRequest::new(symbol, unsafe { *refcook }, unsafe { *defcook }, value)
            .with_index(ndx);
        self.with_engine(|engine| engine.decide(&bind, resolver))
            .unwrap_or(value)
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn la_version(version: c_uint) -> c_uint {
    AUDITOR.get_or_init(Auditor::from_env).version(version)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn la_objsearch(
    name: *const c_char,
    _cookie: *mut usize,
    _flag: c_uint,
) -> *mut c_char {
    match AUDITOR.get() {
        Some(auditor) => unsafe { auditor.search(name) },
        None => name.cast_mut(),
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn la_objopen(
    _map: *mut c_void,
    _lmid: c_long,
    cookie: *mut usize,
) -> c_uint {
    AUDITOR
        .get()
        .map_or(0, |auditor| unsafe { auditor.open(cookie) })
}

unsafe fn symbind(
    value: usize,
    ndx: c_uint,
    refcook: *const usize,
    defcook: *const usize,
    symname: *const c_char,
) -> usize {
    match AUDITOR.get() {
        Some(auditor) => unsafe {
            auditor.bind(value, ndx, refcook, defcook, symname, &DlResolver)
        },
        None => value,
    }
}

cfg_if::cfg_if! {
    if #[cfg(target_pointer_width = "64")]{
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn la_symbind64(
            sym: *mut libc::Elf64_Sym,
            ndx: c_uint,
            refcook: *mut usize,
            defcook: *mut usize,
            _flags: *mut c_uint,
            symname: *const c_char,
        ) -> usize {
            let value = unsafe { (*sym).st_value } as usize;
            unsafe { symbind(value, ndx, refcook, defcook, symname) }
        }
    }else {
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn la_symbind32(
            sym: *mut libc::Elf32_Sym,
            ndx: c_uint,
            refcook: *mut usize,
            defcook: *mut usize,
            _flags: *mut c_uint,
            symname: *const c_char,
        ) -> usize {
            let value = unsafe { (*sym).st_value } as usize;
            unsafe { symbind(value, ndx, refcook, defcook, symname) }
        }
    }
}
