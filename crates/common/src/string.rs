use crate::wasm_error;
use crate::WasmError;
use crate::WasmErrorInner;

/// Restore a String from bytes that hold a NUL terminated string.
/// Anything after the first NUL is ignored.
pub fn from_nul_terminated(bytes: &[u8]) -> Result<String, WasmError> {
    let end = bytes
        .iter()
        .position(|byte| *byte == 0)
        .ok_or_else(|| wasm_error!(WasmErrorInner::MissingNulTerminator))?;
    std::str::from_utf8(&bytes[..end])
        .map(String::from)
        .map_err(|e| wasm_error!(e))
}

/// The bytes a host hands to a guest for a string: the utf-8 bytes plus a trailing NUL.
pub fn to_nul_terminated(s: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(s.len() + 1);
    bytes.extend_from_slice(s.as_bytes());
    bytes.push(0);
    bytes
}
