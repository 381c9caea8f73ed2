//! Dataset repository implementations.
//!
//! - `local`: a directory of CSV files on disk
//! - `memory`: in-memory datasets for tests and fixtures
//! - `http`: CSV files served over static HTTP (feature `http-repo`)
pub mod local;
pub mod memory;
#[cfg(feature = "http-repo")]
pub mod http;

pub use local::LocalRepository;
pub use memory::MemoryRepository;
#[cfg(feature = "http-repo")]
pub use http::HttpRepository;
