pub mod config;
pub mod contract;
pub mod env;
pub mod error;
pub mod guest;
pub mod import;
pub mod module;
pub mod prelude;

pub use fatptr_common;
