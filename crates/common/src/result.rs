use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Everything that can go wrong once a fat pointer has been decoded and somebody tries to use it.
/// The codec itself is total, these all come from the memory access and runtime layers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Error)]
#[rustfmt::skip]
pub enum WasmErrorInner {
    /// while converting pointers and lengths between host and guest integer types we hit a value
    /// that doesn't fit, e.g. more than u32::MAX bytes headed into a wasm32 guest
    #[error("pointer or length does not fit in a wasm32 offset")]
    PointerMap,
    /// a decoded region reaches past the end of the guest's linear memory
    #[error("region {ptr}+{len} is outside of guest memory of {size} bytes")]
    OutOfBounds { ptr: u32, len: u32, size: u64 },
    /// the runtime refused to read or write bytes that passed our own bounds check
    #[error("failed to access guest memory")]
    Memory,
    /// a region that should hold a C string has no NUL byte in it
    #[error("region does not contain a NUL terminator")]
    MissingNulTerminator,
    /// bytes read out of a region were not valid utf-8
    #[error("region does not contain valid utf-8")]
    Utf8,
    /// something on the host side failed while servicing the guest
    #[error("host error: {0}")]
    Host(String),
    /// the guest reported or caused a failure
    #[error("guest error: {0}")]
    Guest(String),
    /// compiling or deserializing a module failed
    #[error("module build error: {0}")]
    ModuleBuild(String),
    /// the module compiled but could not be instantiated, e.g. it imports something the host
    /// doesn't provide
    #[error("instantiation error: {0}")]
    Instantiation(String),
    /// calling an exported guest function failed
    #[error("call error: {0}")]
    CallError(String),
    /// the call used up all of its metering points
    #[error("out of gas")]
    OutOfGas,
    /// a required export is missing or has the wrong signature
    #[error("export error: {0}")]
    Export(String),
    /// some piece of instance state was used before the instance bound it
    #[error("uninitialized: {0}")]
    Uninitialized(String),
}

impl From<std::num::TryFromIntError> for WasmErrorInner {
    fn from(_: std::num::TryFromIntError) -> Self {
        Self::PointerMap
    }
}

impl From<std::str::Utf8Error> for WasmErrorInner {
    fn from(_: std::str::Utf8Error) -> Self {
        Self::Utf8
    }
}

impl From<std::string::FromUtf8Error> for WasmErrorInner {
    fn from(_: std::string::FromUtf8Error) -> Self {
        Self::Utf8
    }
}

impl From<String> for WasmErrorInner {
    fn from(s: String) -> Self {
        Self::Host(s)
    }
}

/// Wraps a WasmErrorInner with a file and line number.
/// The easiest way to generate this is with the `wasm_error!` macro that will
/// insert the correct file/line and can create strings by forwarding args to
/// the `format!` macro.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Error)]
#[error("{error} ({file}:{line})")]
pub struct WasmError {
    pub file: String,
    pub line: u32,
    pub error: WasmErrorInner,
}

#[macro_export]
macro_rules! wasm_error {
    ($e:expr) => {
        $crate::WasmError {
            // file!() can mix path separators on windows so normalize it
            file: file!().replace('\\', "/").to_string(),
            line: line!(),
            error: $e.into(),
        }
    };
    ($($arg:tt)*) => {{
        $crate::wasm_error!(std::format!($($arg)*))
    }};
}
