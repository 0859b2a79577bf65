//! Building and caching compiled wasm modules.
//!
//! Compiling wasm is slow compared to instantiating it, so compiled modules are kept in memory
//! by cache key and optionally serialized to the filesystem to survive restarts.
use crate::config::HostConfig;
use crate::wasm_host_error;
use bimap::BiMap;
use bytes::Bytes;
use fatptr_common::WasmErrorInner;
use parking_lot::RwLock;
use plru::MicroCache;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::debug;
use tracing::warn;
use wasmer::wasmparser;
use wasmer::CompilerConfig;
use wasmer::Cranelift;
use wasmer::Engine;
use wasmer::Module;
use wasmer::RuntimeError;
use wasmer_middlewares::Metering;

/// Modules are cached by the hash of their wasm, or whatever other 32 bytes identify them.
pub type CacheKey = [u8; 32];

/// Generate an engine with a wasm compiler and metering in place.
///
/// Every operator costs one point. The limit baked in here is only the initial value of the
/// metering globals, the contract runtime resets it before every call.
pub fn make_engine(metering_limit: u64) -> Engine {
    let cost_function = |_operator: &wasmparser::Operator| -> u64 { 1 };
    let metering = Arc::new(Metering::new(metering_limit, cost_function));

    let mut compiler = Cranelift::default();
    compiler.canonicalize_nans(true);
    compiler.push_middleware(metering);

    Engine::from(compiler)
}

/// Responsible for storing the wasmer Engine used to build wasmer Modules.
/// Stores for instances must be created on the same engine, see `engine()`.
#[derive(Clone, Debug)]
pub struct ModuleBuilder {
    engine: Engine,
}

impl ModuleBuilder {
    pub fn new(metering_limit: u64) -> Self {
        Self {
            engine: make_engine(metering_limit),
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn from_binary(&self, wasm: &[u8]) -> Result<Arc<Module>, RuntimeError> {
        let module = Module::from_binary(&self.engine, wasm)
            .map_err(|e| wasm_host_error!(WasmErrorInner::ModuleBuild(e.to_string())))?;
        debug!(bytes = wasm.len(), "compiled module");
        Ok(Arc::new(module))
    }

    pub fn from_serialized_module(
        &self,
        serialized_module: Bytes,
    ) -> Result<Arc<Module>, RuntimeError> {
        // only the artifact header is checked, the rest must come from our own serialize
        let module = unsafe { Module::deserialize(&self.engine, serialized_module) }
            .map_err(|e| wasm_host_error!(WasmErrorInner::ModuleBuild(e.to_string())))?;
        Ok(Arc::new(module))
    }
}

/// Number of compiled modules kept in memory, the width of a plru MicroCache.
pub const MODULE_CACHE_SLOTS: usize = 64;

/// Fixed number of compiled modules in memory.
///
/// Every hit touches the module's plru slot. Once the cache is full a new module takes a cold
/// slot and evicts whatever was in it, so modules in regular use stay cached.
#[derive(Default)]
pub struct InMemoryModuleCache {
    plru: MicroCache,
    key_map: BiMap<usize, CacheKey>,
    modules: HashMap<CacheKey, Arc<Module>>,
}

impl InMemoryModuleCache {
    pub fn get_item(&mut self, key: &CacheKey) -> Option<Arc<Module>> {
        let module = self.modules.get(key).cloned()?;
        if let Some(plru_key) = self.key_map.get_by_right(key) {
            self.plru.touch(*plru_key);
        }
        Some(module)
    }

    pub fn put_item(&mut self, key: CacheKey, module: Arc<Module>) {
        if let Some(plru_key) = self.key_map.get_by_right(&key) {
            self.plru.touch(*plru_key);
            self.modules.insert(key, module);
            return;
        }
        let plru_key = self.plru.replace();
        // if there is something in the cache in this plru slot already drop it
        if let Some((_, stale_key)) = self.key_map.remove_by_left(&plru_key) {
            debug!(key = hex::encode(stale_key), "evicting module");
            self.modules.remove(&stale_key);
        }
        self.plru.touch(plru_key);
        self.key_map.insert(plru_key, key);
        self.modules.insert(key, module);
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Compiled modules by cache key, in memory first then on the filesystem.
pub struct ModuleCache {
    builder: ModuleBuilder,
    pub filesystem_path: Option<PathBuf>,
    pub cache: RwLock<InMemoryModuleCache>,
}

impl ModuleCache {
    pub fn new(builder: ModuleBuilder, filesystem_path: Option<PathBuf>) -> Self {
        Self {
            builder,
            filesystem_path,
            cache: RwLock::new(InMemoryModuleCache::default()),
        }
    }

    pub fn from_config(config: &HostConfig) -> Self {
        Self::new(
            ModuleBuilder::new(config.metering_limit),
            config.cache_dir.clone(),
        )
    }

    pub fn builder(&self) -> &ModuleBuilder {
        &self.builder
    }

    fn module_path(&self, key: CacheKey) -> Option<PathBuf> {
        self.filesystem_path
            .as_ref()
            .map(|path| path.join(hex::encode(key)))
    }

    fn get_from_filesystem(&self, key: CacheKey) -> Option<Arc<Module>> {
        let path = self.module_path(key)?;
        let serialized_module = std::fs::read(&path).ok()?;
        match self
            .builder
            .from_serialized_module(Bytes::from(serialized_module))
        {
            Ok(module) => {
                debug!(?path, "loaded module from filesystem");
                Some(module)
            }
            Err(e) => {
                // a corrupt file would fail every time so drop it and rebuild
                warn!(?path, %e, "removing unreadable serialized module");
                if let Err(e) = std::fs::remove_file(&path) {
                    warn!(?path, %e, "could not remove serialized module");
                }
                None
            }
        }
    }

    fn add_to_filesystem(&self, key: CacheKey, module: &Module) {
        let (Some(dir), Some(path)) = (self.filesystem_path.as_ref(), self.module_path(key)) else {
            return;
        };
        let serialized_module = match module.serialize() {
            Ok(serialized_module) => serialized_module,
            Err(e) => {
                warn!(?path, %e, "could not serialize module");
                return;
            }
        };
        // other caches may share the directory, they must never see a partial artifact
        let written = NamedTempFile::new_in(dir).and_then(|mut file| {
            file.write_all(&serialized_module)?;
            file.persist(&path).map_err(|e| e.error)?;
            Ok(())
        });
        if let Err(e) = written {
            warn!(?path, %e, "could not write serialized module");
        }
    }

    /// The module for a key, compiling `wasm` only if neither memory nor the filesystem has it.
    pub fn get(&self, key: CacheKey, wasm: &[u8]) -> Result<Arc<Module>, RuntimeError> {
        if let Some(module) = self.cache.write().get_item(&key) {
            return Ok(module);
        }
        let module = match self.get_from_filesystem(key) {
            Some(module) => module,
            None => {
                let module = self.builder.from_binary(wasm)?;
                self.add_to_filesystem(key, &module);
                module
            }
        };
        self.cache.write().put_item(key, Arc::clone(&module));
        Ok(module)
    }
}
