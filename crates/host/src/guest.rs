//! Reading and writing the guest's linear memory from the host.
//!
//! A naive host would take a guest pointer, add it to the host address of the start of guest
//! memory and copy bytes straight across. A bogus fat pointer from a buggy or malicious guest
//! would then point the host at its own memory. Instead every access here goes through wasmer's
//! MemoryView and every region is checked against the current size of the view first, so the
//! worst a bad region can do is fail with OutOfBounds.
//!
//! This is still not completely safe in the face of shared memory and threads.
use fatptr_common::string;
use fatptr_common::wasm_error;
use fatptr_common::GuestPtr;
use fatptr_common::GuestRegion;
use fatptr_common::Len;
use fatptr_common::WasmError;
use fatptr_common::WasmErrorInner;
use wasmer::AsStoreMut;
use wasmer::AsStoreRef;
use wasmer::Memory;

/// Current size of the guest's linear memory in bytes.
pub fn memory_size(store: &impl AsStoreRef, memory: &Memory) -> u64 {
    memory.view(&store).data_size()
}

/// Write a slice of bytes to the guest at `guest_ptr` and return the region written.
pub fn write_bytes(
    store: &mut impl AsStoreMut,
    memory: &Memory,
    guest_ptr: GuestPtr,
    slice: &[u8],
) -> Result<GuestRegion, WasmError> {
    let len: Len = slice
        .len()
        .try_into()
        .map_err(|_| wasm_error!(WasmErrorInner::PointerMap))?;
    let region = GuestRegion::new(guest_ptr, len);
    let view = memory.view(&store);
    let range = region.checked_range(view.data_size())?;
    #[cfg(feature = "debug_memory")]
    tracing::debug!(ptr = region.ptr(), len = region.len(), "write_bytes");
    view.write(range.start, slice)
        .map_err(|_| wasm_error!(WasmErrorInner::Memory))?;
    Ok(region)
}

/// Copy the bytes of a region out of the guest.
pub fn read_bytes(
    store: &impl AsStoreRef,
    memory: &Memory,
    region: GuestRegion,
) -> Result<Vec<u8>, WasmError> {
    let view = memory.view(&store);
    let range = region.checked_range(view.data_size())?;
    #[cfg(feature = "debug_memory")]
    tracing::debug!(ptr = region.ptr(), len = region.len(), "read_bytes");
    view.copy_range_to_vec(range)
        .map_err(|_| wasm_error!(WasmErrorInner::Memory))
}

/// Read a NUL terminated string out of a region of the guest.
/// The NUL must be inside the region, it is never searched for past the region's end.
pub fn read_c_string(
    store: &impl AsStoreRef,
    memory: &Memory,
    region: GuestRegion,
) -> Result<String, WasmError> {
    string::from_nul_terminated(&read_bytes(store, memory, region)?)
}
