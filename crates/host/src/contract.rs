//! Running guest contracts.
//!
//! A contract is any module that follows the calling convention: it exports its memory, the
//! `__fatptr_*` allocator and `() -> i32` entry points, and may import the host functions in
//! `crate::import`. Every entry point call gets a fresh metering budget.
use crate::config::HostConfig;
use crate::env::Env;
use crate::error::WasmHostError;
use crate::import::imports;
use crate::module::CacheKey;
use crate::module::ModuleBuilder;
use crate::module::ModuleCache;
use crate::wasm_host_error;
use fatptr_common::GuestPtr;
use fatptr_common::GuestRegion;
use fatptr_common::Len;
use fatptr_common::WasmError;
use fatptr_common::WasmErrorInner;
use wasmer::FunctionEnv;
use wasmer::Instance;
use wasmer::InstantiationError;
use wasmer::Module;
use wasmer::RuntimeError;
use wasmer::Store;
use wasmer_middlewares::metering::get_remaining_points;
use wasmer_middlewares::metering::set_remaining_points;
use wasmer_middlewares::metering::MeteringPoints;

pub const INITIALIZE: &str = "initialize";
pub const CREATE: &str = "create";
pub const ALLOCATE: &str = "__fatptr_allocate";
pub const DEALLOCATE: &str = "__fatptr_deallocate";
pub const MEMORY: &str = "memory";

/// An instantiated contract together with the store that owns its state.
pub struct ContractInstance {
    store: Store,
    instance: Instance,
    function_env: FunctionEnv<Env>,
    metering_limit: u64,
}

impl ContractInstance {
    /// Instantiate a module built by `builder`.
    ///
    /// The memory export is required. The allocator exports are only needed by host functions
    /// that move bytes into the guest, so a contract that never calls them can leave them out.
    pub fn new(
        builder: &ModuleBuilder,
        module: &Module,
        config: &HostConfig,
    ) -> Result<Self, RuntimeError> {
        let mut store = Store::new(builder.engine().clone());
        let function_env = FunctionEnv::new(&mut store, Env::new(config));
        let built_imports = imports(&mut store, &function_env);
        let instance = Instance::new(&mut store, module, &built_imports).map_err(|e| match e {
            // a trapping start function is a failed call like any other
            InstantiationError::Start(e) => {
                wasm_host_error!(WasmErrorInner::CallError(e.message()))
            }
            e => wasm_host_error!(WasmErrorInner::Instantiation(e.to_string())),
        })?;

        let memory = instance
            .exports
            .get_memory(MEMORY)
            .map_err(|e| wasm_host_error!(WasmErrorInner::Export(format!("{MEMORY}: {e}"))))?
            .clone();
        let allocate = instance
            .exports
            .get_typed_function::<Len, GuestPtr>(&store, ALLOCATE)
            .ok();
        let deallocate = instance
            .exports
            .get_typed_function::<(GuestPtr, Len), ()>(&store, DEALLOCATE)
            .ok();
        if allocate.is_none() || deallocate.is_none() {
            tracing::debug!("contract does not export the fatptr allocator");
        }

        {
            let env = function_env.as_mut(&mut store);
            env.memory = Some(memory);
            env.allocate = allocate;
            env.deallocate = deallocate;
        }

        // the engine's own limit may differ from this config's
        set_remaining_points(&mut store, &instance, config.metering_limit);

        Ok(Self {
            store,
            instance,
            function_env,
            metering_limit: config.metering_limit,
        })
    }

    /// Instantiate whatever the cache has for `key`, compiling `wasm` on a miss.
    pub fn from_cache(
        cache: &ModuleCache,
        key: CacheKey,
        wasm: &[u8],
        config: &HostConfig,
    ) -> Result<Self, RuntimeError> {
        let module = cache.get(key, wasm)?;
        Self::new(cache.builder(), &module, config)
    }

    pub fn initialize(&mut self) -> Result<i32, RuntimeError> {
        self.call_entry_point(INITIALIZE)
    }

    pub fn create(&mut self) -> Result<i32, RuntimeError> {
        self.call_entry_point(CREATE)
    }

    /// Call any `() -> i32` export with a full metering budget.
    ///
    /// Errors raised by host functions come back as the WasmError they were raised with, anything
    /// else that traps the guest is a CallError.
    pub fn call_entry_point(&mut self, name: &str) -> Result<i32, RuntimeError> {
        let entry_point = self
            .instance
            .exports
            .get_typed_function::<(), i32>(&self.store, name)
            .map_err(|e| wasm_host_error!(WasmErrorInner::Export(format!("{name}: {e}"))))?;

        tracing::info!(name, limit = self.metering_limit, "calling entry point");
        set_remaining_points(&mut self.store, &self.instance, self.metering_limit);
        let result = entry_point.call(&mut self.store);

        if let MeteringPoints::Exhausted = get_remaining_points(&mut self.store, &self.instance) {
            tracing::warn!(name, limit = self.metering_limit, "contract ran out of gas");
            return Err(wasm_host_error!(WasmErrorInner::OutOfGas).into());
        }

        result.map_err(|e| match e.downcast::<WasmError>() {
            Ok(wasm_error) => WasmHostError(wasm_error).into(),
            Err(e) => wasm_host_error!(WasmErrorInner::CallError(e.message())).into(),
        })
    }

    /// Points left over from the last entry point call, None if it ran out.
    pub fn remaining_points(&mut self) -> Option<u64> {
        match get_remaining_points(&mut self.store, &self.instance) {
            MeteringPoints::Remaining(points) => Some(points),
            MeteringPoints::Exhausted => None,
        }
    }

    pub fn env(&self) -> &Env {
        self.function_env.as_ref(&self.store)
    }

    pub fn issued_ids(&self) -> Vec<String> {
        self.env().issued_ids()
    }

    pub fn debug_log(&self) -> Vec<String> {
        self.env().debug_log()
    }

    /// Copy a region out of the contract's memory.
    pub fn read_region(&self, region: GuestRegion) -> Result<Vec<u8>, RuntimeError> {
        self.env().read_region(&self.store, region)
    }

    /// Copy a region out of the contract's memory then have the contract free it.
    pub fn consume_region(&mut self, region: GuestRegion) -> Result<Vec<u8>, RuntimeError> {
        let mut function_env_mut = self.function_env.clone().into_mut(&mut self.store);
        let (env, mut store) = function_env_mut.data_and_store_mut();
        env.consume_region(&mut store, region)
    }
}
