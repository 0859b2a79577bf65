use crate::fat_ptr;
use crate::wasm_error;
use crate::FatPtr64;
use crate::GuestPtr;
use crate::Len;
use crate::WasmError;
use crate::WasmErrorInner;
use serde::Deserialize;
use serde::Serialize;
use std::ops::Range;

/// A decoded fat pointer: some bytes somewhere in a guest's linear memory.
///
/// A region is only a handle. It says nothing about whether the bytes exist, are initialized or
/// belong to the allocation it claims to describe. The only way to reach the bytes is through an
/// accessor that owns the memory (the host's memory view or the guest's own linear memory) and
/// checks the region against it first, see `checked_range`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GuestRegion {
    ptr: GuestPtr,
    len: Len,
}

impl GuestRegion {
    pub fn new(ptr: GuestPtr, len: Len) -> Self {
        Self { ptr, len }
    }

    pub fn ptr(&self) -> GuestPtr {
        self.ptr
    }

    pub fn len(&self) -> Len {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last byte. Computed in u64 so ptr + len can't overflow.
    pub fn end(&self) -> u64 {
        u64::from(self.ptr) + u64::from(self.len)
    }

    /// The byte range of this region in a memory of `memory_size` bytes, or OutOfBounds.
    pub fn checked_range(&self, memory_size: u64) -> Result<Range<u64>, WasmError> {
        if self.end() > memory_size {
            return Err(wasm_error!(WasmErrorInner::OutOfBounds {
                ptr: self.ptr,
                len: self.len,
                size: memory_size,
            }));
        }
        Ok(u64::from(self.ptr)..self.end())
    }

    pub fn to_fat_ptr(self) -> FatPtr64 {
        fat_ptr::encode64(self.ptr, self.len)
    }

    pub fn from_fat_ptr(combined: FatPtr64) -> Self {
        let (ptr, len) = fat_ptr::decode64(combined);
        Self { ptr, len }
    }

    /// For the wasm wire format where a FatPtr64 is an i64.
    pub fn from_i64(combined: i64) -> Self {
        let (ptr, len) = fat_ptr::decode_i64(combined);
        Self { ptr, len }
    }

    pub fn to_i64(self) -> i64 {
        fat_ptr::encode_i64(self.ptr, self.len)
    }
}

impl From<FatPtr64> for GuestRegion {
    fn from(combined: FatPtr64) -> Self {
        Self::from_fat_ptr(combined)
    }
}

impl From<GuestRegion> for FatPtr64 {
    fn from(region: GuestRegion) -> Self {
        region.to_fat_ptr()
    }
}

impl From<(GuestPtr, Len)> for GuestRegion {
    fn from((ptr, len): (GuestPtr, Len)) -> Self {
        Self { ptr, len }
    }
}

impl From<fat_ptr::FatPtr128Fields> for [GuestRegion; 2] {
    fn from(fields: fat_ptr::FatPtr128Fields) -> Self {
        [fields.first().into(), fields.second().into()]
    }
}
