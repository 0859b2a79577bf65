use crate::config::HostConfig;
use crate::error::WasmHostError;
use crate::guest;
use crate::wasm_host_error;
use fatptr_common::GuestPtr;
use fatptr_common::GuestRegion;
use fatptr_common::Len;
use fatptr_common::WasmErrorInner;
use parking_lot::Mutex;
use std::sync::Arc;
use wasmer::AsStoreMut;
use wasmer::AsStoreRef;
use wasmer::Memory;
use wasmer::RuntimeError;
use wasmer::TypedFunction;

/// The state host functions see while a guest is calling them.
///
/// The guest exports are only known once the instance exists, which is after the imports
/// referencing this env were built, so they start as None and are bound by the contract runtime.
#[derive(Clone, Default)]
pub struct Env {
    pub memory: Option<Memory>,
    pub allocate: Option<TypedFunction<Len, GuestPtr>>,
    pub deallocate: Option<TypedFunction<(GuestPtr, Len), ()>>,
    pub id_bytes: usize,
    /// every id handed to the guest by h_gen_id, oldest first
    pub issued_ids: Arc<Mutex<Vec<String>>>,
    /// every message the guest sent to h_debug_log, oldest first
    pub debug_log: Arc<Mutex<Vec<String>>>,
}

impl Env {
    pub fn new(config: &HostConfig) -> Self {
        Self {
            id_bytes: config.id_bytes,
            ..Default::default()
        }
    }

    pub fn memory_ref(&self) -> Result<&Memory, WasmHostError> {
        self.memory
            .as_ref()
            .ok_or_else(|| wasm_host_error!(WasmErrorInner::Uninitialized("memory".into())))
    }

    fn allocate_ref(&self) -> Result<&TypedFunction<Len, GuestPtr>, WasmHostError> {
        self.allocate
            .as_ref()
            .ok_or_else(|| wasm_host_error!(WasmErrorInner::Uninitialized("allocate".into())))
    }

    fn deallocate_ref(&self) -> Result<&TypedFunction<(GuestPtr, Len), ()>, WasmHostError> {
        self.deallocate
            .as_ref()
            .ok_or_else(|| wasm_host_error!(WasmErrorInner::Uninitialized("deallocate".into())))
    }

    /// Have the guest allocate room for some bytes, copy them in and return where they went.
    /// The guest owns the allocation from here on.
    pub fn move_bytes_to_guest(
        &self,
        store: &mut impl AsStoreMut,
        bytes: &[u8],
    ) -> Result<GuestRegion, RuntimeError> {
        let len: Len = bytes
            .len()
            .try_into()
            .map_err(|_| wasm_host_error!(WasmErrorInner::PointerMap))?;
        let guest_ptr: GuestPtr = self
            .allocate_ref()?
            .call(&mut *store, len)
            .map_err(|e| wasm_host_error!(WasmErrorInner::CallError(e.to_string())))?;
        let region = guest::write_bytes(&mut *store, self.memory_ref()?, guest_ptr, bytes)
            .map_err(WasmHostError)?;
        Ok(region)
    }

    /// Copy a region out of the guest, leaving the guest's memory as it was.
    pub fn read_region(
        &self,
        store: &impl AsStoreRef,
        region: GuestRegion,
    ) -> Result<Vec<u8>, RuntimeError> {
        Ok(guest::read_bytes(store, self.memory_ref()?, region).map_err(WasmHostError)?)
    }

    /// Copy a region out of the guest then have the guest free it.
    /// Only valid for regions that are exactly one guest allocation.
    pub fn consume_region(
        &self,
        store: &mut impl AsStoreMut,
        region: GuestRegion,
    ) -> Result<Vec<u8>, RuntimeError> {
        let bytes = self.read_region(&*store, region)?;
        self.deallocate_ref()?
            .call(&mut *store, region.ptr(), region.len())
            .map_err(|e| wasm_host_error!(WasmErrorInner::CallError(e.to_string())))?;
        Ok(bytes)
    }

    pub fn issued_ids(&self) -> Vec<String> {
        self.issued_ids.lock().clone()
    }

    pub fn debug_log(&self) -> Vec<String> {
        self.debug_log.lock().clone()
    }
}
