#[cfg(target_arch = "wasm32")]
use crate::GuestPtr;
#[cfg(target_arch = "wasm32")]
use crate::Len;

/// Allocate a length of zeroed bytes that won't be dropped by the allocator and return the
/// guest pointer to it so the host can write into it.
///
/// The allocation is a boxed slice so its capacity is exactly `len`, which is what lets the
/// guest later restore it as a `Vec<u8>` of the same length with `consume_bytes`.
#[cfg(target_arch = "wasm32")]
#[no_mangle]
pub extern "C" fn __fatptr_allocate(len: Len) -> GuestPtr {
    let bytes: Box<[u8]> = vec![0; len as usize].into_boxed_slice();
    Box::into_raw(bytes) as *mut u8 as GuestPtr
}

/// Restore an allocation so that it is dropped immediately.
/// This needs to be called on anything allocated above that the guest doesn't consume as the
/// allocator will never free the memory otherwise.
#[cfg(target_arch = "wasm32")]
#[no_mangle]
pub extern "C" fn __fatptr_deallocate(ptr: GuestPtr, len: Len) {
    if len == 0 {
        return;
    }
    let _: Box<[u8]> = unsafe {
        Box::from_raw(std::ptr::slice_from_raw_parts_mut(
            ptr as usize as *mut u8,
            len as usize,
        ))
    };
}

/// Bytes in a page of wasm linear memory.
pub const WASM_PAGE_SIZE: u64 = 65_536;

/// Current size of this guest's linear memory in bytes.
///
/// Off wasm there is no linear memory at all, so nothing but empty regions is ever in bounds.
pub fn memory_size() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        core::arch::wasm32::memory_size(0) as u64 * WASM_PAGE_SIZE
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        0
    }
}
