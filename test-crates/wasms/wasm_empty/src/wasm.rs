// Links the guest library, so the allocator and memory are exported, but has no entry points.
pub use fatptr_guest::*;
