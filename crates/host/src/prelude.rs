pub use crate::config::HostConfig;
pub use crate::contract::ContractInstance;
pub use crate::env::Env;
pub use crate::error::WasmHostError;
pub use crate::guest;
pub use crate::module::CacheKey;
pub use crate::module::ModuleBuilder;
pub use crate::module::ModuleCache;
pub use crate::wasm_host_error;
pub use fatptr_common::*;
pub use wasmer::AsStoreMut;
pub use wasmer::AsStoreRef;
pub use wasmer::Memory;
pub use wasmer::Module;
pub use wasmer::RuntimeError;
pub use wasmer::Store;
