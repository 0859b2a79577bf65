pub mod allocation;

pub use fatptr_common::*;
pub use paste;

#[cfg(target_arch = "wasm32")]
extern "C" {
    fn h_debug_log(ptr: GuestPtr, len: Len);
}

/// Declare host functions that return a FatPtr64 as an i64, the shape of `h_gen_id`.
///
/// For every name this declares the raw import and a safe `<name>_region()` wrapper that calls
/// it and decodes the result, e.g. `host_externs!(h_gen_id)` gives `h_gen_id_region()`.
#[macro_export]
macro_rules! host_externs {
    ( $( $func_name:ident ),* ) => {
        extern "C" {
            $( fn $func_name() -> i64; )*
        }

        $(
            $crate::paste::paste! {
                #[allow(dead_code)]
                fn [< $func_name _region >]() -> $crate::GuestRegion {
                    $crate::GuestRegion::from_i64(unsafe { $func_name() })
                }
            }
        )*
    };
}

/// Call a host function declared with `host_externs!` and decode what it returns.
#[macro_export]
macro_rules! host_region {
    ( $func_name:ident ) => {{
        $crate::GuestRegion::from_i64(unsafe { $func_name() })
    }};
}

/// Send a message to the host's debug log.
pub fn debug_log(message: &str) {
    #[cfg(target_arch = "wasm32")]
    unsafe {
        h_debug_log(message.as_ptr() as usize as GuestPtr, message.len() as Len);
    }
    #[cfg(not(target_arch = "wasm32"))]
    tracing::debug!(target: "fatptr::guest", "{}", message);
}

fn check_region(region: GuestRegion) -> Result<(), WasmError> {
    region.checked_range(allocation::memory_size())?;
    // rust slices can't start at address 0 even though wasm memory does
    if region.ptr() == 0 {
        return Err(wasm_error!(WasmErrorInner::Memory));
    }
    Ok(())
}

/// Borrow the bytes of a region of this guest's own linear memory.
///
/// The region is checked against the current memory size so a bogus fat pointer from the host
/// can't produce a slice past the end of memory.
///
/// # Safety
///
/// Nothing may write to the region while the returned slice is alive.
pub unsafe fn region_bytes<'a>(region: GuestRegion) -> Result<&'a [u8], WasmError> {
    if region.is_empty() {
        return Ok(&[]);
    }
    check_region(region)?;
    Ok(std::slice::from_raw_parts(
        region.ptr() as usize as *const u8,
        region.len() as usize,
    ))
}

/// Take ownership of bytes the host moved into the guest.
/// The allocation is freed when the returned vector drops.
///
/// # Safety
///
/// The region must be exactly an allocation made by `__fatptr_allocate` that has not been
/// consumed or deallocated yet, as is the case for everything a host function hands back.
pub unsafe fn consume_bytes(region: GuestRegion) -> Result<Vec<u8>, WasmError> {
    if region.is_empty() {
        return Ok(Vec::new());
    }
    check_region(region)?;
    tracing::trace!(ptr = region.ptr(), len = region.len(), "consume");
    Ok(Vec::from_raw_parts(
        region.ptr() as usize as *mut u8,
        region.len() as usize,
        region.len() as usize,
    ))
}

/// Take ownership of a NUL terminated string the host moved into the guest.
///
/// # Safety
///
/// Same as `consume_bytes`.
pub unsafe fn consume_c_string(region: GuestRegion) -> Result<String, WasmError> {
    string::from_nul_terminated(&consume_bytes(region)?)
}
