pub mod fat_ptr;
pub mod region;
pub mod result;
pub mod string;

pub use fat_ptr::*;
pub use region::GuestRegion;
pub use result::*;

/// something like usize for wasm
/// wasm32 has a memory limit of 4GB so offsets and lengths fit in u32
///
/// the host needs to directly read and write to the guest's memory so we need a predictable number
/// of bytes to represent offsets and lengths, regardless of the `usize` of the host
pub type WasmSize = u32;

/// an offset into the guest's linear memory
/// this is _never_ a pointer into the host's address space
pub type GuestPtr = WasmSize;

/// a count of u8 bytes (not items)
pub type Len = WasmSize;
