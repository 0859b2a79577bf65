use fatptr_host::prelude::*;
use once_cell::sync::OnceCell;

pub enum TestWasm {
    Empty,
    Io,
    Token,
}

/// Shared by every test so each wasm is only compiled once per test run.
pub static MODULE_CACHE: OnceCell<ModuleCache> = OnceCell::new();

impl TestWasm {
    pub fn bytes(&self) -> &[u8] {
        match self {
            TestWasm::Empty => include_bytes!(concat!(
                env!("OUT_DIR"),
                "/wasm32-unknown-unknown/release/test_wasm_empty.wasm"
            )),
            TestWasm::Io => include_bytes!(concat!(
                env!("OUT_DIR"),
                "/wasm32-unknown-unknown/release/test_wasm_io.wasm"
            )),
            TestWasm::Token => include_bytes!(concat!(
                env!("OUT_DIR"),
                "/wasm32-unknown-unknown/release/test_wasm_token.wasm"
            )),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TestWasm::Empty => "empty",
            TestWasm::Io => "io",
            TestWasm::Token => "token",
        }
    }

    pub fn key(&self) -> CacheKey {
        match self {
            TestWasm::Empty => [1; 32],
            TestWasm::Io => [2; 32],
            TestWasm::Token => [3; 32],
        }
    }

    pub fn module_cache() -> &'static ModuleCache {
        MODULE_CACHE.get_or_init(|| ModuleCache::from_config(&HostConfig::default()))
    }

    pub fn instance(&self) -> ContractInstance {
        self.instance_with_config(&HostConfig::default())
    }

    /// Metering limits are set per call so any config can share the cached modules.
    pub fn instance_with_config(&self, config: &HostConfig) -> ContractInstance {
        ContractInstance::from_cache(Self::module_cache(), self.key(), self.bytes(), config)
            .unwrap()
    }
}
