use std::borrow::Cow;
use std::fmt::Display;

/// Error types used throughout the `elf_rebind` library.
#[derive(Debug)]
pub enum Error {
    /// An error occurred while reading the configuration file.
    Io {
        /// A descriptive message about the I/O error.
        msg: Cow<'static, str>,
    },

    /// The configuration document was rejected.
    ///
    /// Any configuration error leaves the engine inert for the whole process.
    Config(ConfigError),

    /// A replacement symbol could not be resolved.
    ///
    /// The engine never returns this to the host loader; it logs it and keeps
    /// the address the loader originally chose.
    Resolve(ResolveError),
}

/// Reasons a configuration document is rejected.
///
/// Checks run in document order and the first violation wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The text is not a well-formed YAML stream.
    Unparseable {
        /// Parser diagnostic.
        msg: Cow<'static, str>,
    },
    /// The stream contains no document at all.
    EmptyDocument,
    /// The root node is not a mapping.
    RootNotMapping,
    /// A root key is a mapping or a sequence.
    NonScalarKey,
    /// A root value is not a mapping.
    NestedValueNotMapping,
    /// A nested key or value is not a scalar.
    NonScalarNestedEntry,
    /// A key or value scalar is empty.
    ///
    /// An omitted value and a plain `~` count as empty. Other YAML null
    /// spellings such as `null` are ordinary names.
    EmptyScalar,
    /// A source suffix has no target entries.
    EmptyRule,
    /// A replacement path exceeds [`MAX_REPLACEMENT_PATH`](crate::MAX_REPLACEMENT_PATH).
    PathTooLong {
        /// Length of the offending path in bytes.
        len: usize,
    },
}

/// Reasons a live re-resolution against a replacement module fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The replacement module is not mapped into the process.
    ModuleNotLoaded {
        path: Cow<'static, str>,
        msg: Cow<'static, str>,
    },
    /// The replacement module does not export the symbol.
    SymbolNotFound {
        symbol: Cow<'static, str>,
        path: Cow<'static, str>,
        msg: Cow<'static, str>,
    },
    /// A path or symbol name contains an interior NUL byte.
    InvalidName,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Unparseable { msg } => write!(f, "cannot parse configuration: {msg}"),
            ConfigError::EmptyDocument => write!(f, "configuration contains no document"),
            ConfigError::RootNotMapping => write!(f, "root node must be a mapping"),
            ConfigError::NonScalarKey => write!(f, "all keys in root mapping must be scalar"),
            ConfigError::NestedValueNotMapping => {
                write!(f, "all values in root mapping must be mappings themselves")
            }
            ConfigError::NonScalarNestedEntry => {
                write!(f, "all keys and values in nested mapping must be scalar")
            }
            ConfigError::EmptyScalar => write!(f, "keys and values must not be empty"),
            ConfigError::EmptyRule => write!(f, "every source suffix needs at least one target"),
            ConfigError::PathTooLong { len } => write!(
                f,
                "replacement path is {len} bytes, the limit is {}",
                crate::MAX_REPLACEMENT_PATH
            ),
        }
    }
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::ModuleNotLoaded { path, msg } => {
                write!(f, "module [{path}] is not loaded: {msg}")
            }
            ResolveError::SymbolNotFound { symbol, path, msg } => {
                write!(f, "symbol [{symbol}] not found in [{path}]: {msg}")
            }
            ResolveError::InvalidName => write!(f, "name contains an interior NUL byte"),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io { msg } => write!(f, "I/O error: {msg}"),
            Error::Config(err) => write!(f, "Configuration error: {err}"),
            Error::Resolve(err) => write!(f, "Resolution error: {err}"),
        }
    }
}

impl std::error::Error for Error {}
impl std::error::Error for ConfigError {}
impl std::error::Error for ResolveError {}

impl From<ConfigError> for Error {
    fn from(value: ConfigError) -> Self {
        Error::Config(value)
    }
}

impl From<ResolveError> for Error {
    fn from(value: ResolveError) -> Self {
        Error::Resolve(value)
    }
}

/// Creates an I/O error with the specified message.
#[cold]
#[inline(never)]
pub(crate) fn io_error(msg: impl Into<Cow<'static, str>>) -> Error {
    Error::Io { msg: msg.into() }
}

/// Creates an unparseable-document error with the parser's diagnostic.
#[cold]
#[inline(never)]
pub(crate) fn parse_error(msg: impl Into<Cow<'static, str>>) -> ConfigError {
    ConfigError::Unparseable { msg: msg.into() }
}

/// Creates a module-not-loaded error.
#[cold]
#[inline(never)]
pub(crate) fn not_loaded_error(
    path: impl Into<Cow<'static, str>>,
    msg: impl Into<Cow<'static, str>>,
) -> ResolveError {
    ResolveError::ModuleNotLoaded {
        path: path.into(),
        msg: msg.into(),
    }
}

/// Creates a symbol-not-found error.
#[cold]
#[inline(never)]
pub(crate) fn symbol_error(
    symbol: impl Into<Cow<'static, str>>,
    path: impl Into<Cow<'static, str>>,
    msg: impl Into<Cow<'static, str>>,
) -> ResolveError {
    ResolveError::SymbolNotFound {
        symbol: symbol.into(),
        path: path.into(),
        msg: msg.into(),
    }
}
