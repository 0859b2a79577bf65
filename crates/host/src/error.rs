use fatptr_common::WasmError;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// A WasmError raised on the host.
///
/// wasmer wants host functions to fail with its own RuntimeError, which traps the guest and
/// surfaces to whoever called into the guest. Both types are foreign to this crate so the newtype
/// carries the conversion. The original WasmError can be recovered from the RuntimeError with
/// `RuntimeError::downcast::<WasmError>()`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Error)]
#[error("{0}")]
pub struct WasmHostError(pub WasmError);

impl From<WasmError> for WasmHostError {
    fn from(wasm_error: WasmError) -> WasmHostError {
        WasmHostError(wasm_error)
    }
}

impl From<WasmHostError> for wasmer::RuntimeError {
    fn from(wasm_error: WasmHostError) -> wasmer::RuntimeError {
        wasmer::RuntimeError::user(Box::new(wasm_error.0))
    }
}

#[macro_export]
macro_rules! wasm_host_error {
    ($e:expr) => {
        $crate::error::WasmHostError($crate::fatptr_common::wasm_error!($e))
    };
    ($($arg:tt)*) => {{
        $crate::wasm_host_error!(std::format!($($arg)*))
    }};
}
