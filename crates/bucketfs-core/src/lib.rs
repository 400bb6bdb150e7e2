//! Filesystem-backed core of the bucketfs S3 gateway.
//!
//! One directory subtree per bucket under a configured data directory.
//! Object operations are direct filesystem I/O; the listing engine walks a
//! bucket's key space and groups results into objects and common prefixes
//! according to S3's prefix/delimiter pseudo-directory semantics.
//!
//! # Modules
//!
//! - [`config`] - gateway configuration loaded from environment variables
//! - [`store`] - object read/write/delete and prefix create/delete
//! - [`list`] - the prefix/delimiter listing engine
//! - [`gateway`] - async operation provider tying store and listing together

pub mod config;
pub mod gateway;
pub mod list;
pub mod store;

pub use config::GatewayConfig;
pub use gateway::Gateway;
pub use store::{FsStore, PutResult};
