use serde::Deserialize;
use serde::Serialize;
use std::path::PathBuf;

#[cfg(not(test))]
/// one hundred giga ops
pub const WASM_METERING_LIMIT: u64 = 100_000_000_000;

#[cfg(test)]
/// ten mega ops.
/// We don't want tests that loop forever to take minutes to run out of gas.
pub const WASM_METERING_LIMIT: u64 = 10_000_000;

/// Random bytes in every id handed out by `h_gen_id`, before hex encoding.
pub const DEFAULT_ID_BYTES: usize = 32;

/// Everything a host needs to know to build and run contracts.
/// Missing fields deserialize to their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// metering points available to every entry point call
    pub metering_limit: u64,
    /// where serialized modules are kept between runs, None for memory only
    pub cache_dir: Option<PathBuf>,
    /// random bytes in every id handed to a guest, before hex encoding
    pub id_bytes: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            metering_limit: WASM_METERING_LIMIT,
            cache_dir: None,
            id_bytes: DEFAULT_ID_BYTES,
        }
    }
}

impl HostConfig {
    pub fn with_metering_limit(mut self, metering_limit: u64) -> Self {
        self.metering_limit = metering_limit;
        self
    }

    pub fn with_cache_dir<P: Into<PathBuf>>(mut self, cache_dir: P) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    pub fn with_id_bytes(mut self, id_bytes: usize) -> Self {
        self.id_bytes = id_bytes;
        self
    }
}
