//! DreamWeaver database crate - pluggable data backends.
//!
//! The `DatabaseOperations` contract, the local backend over the storage
//! repositories, the hosted backends, backend selection, and the data
//! manager and sync bookkeeping built on top of the active backend.

pub mod context;
pub mod factory;
pub mod local;
pub mod manager;
pub mod operations;
pub mod remote;
pub mod sync;

pub use context::DatabaseContext;
pub use factory::DatabaseFactory;
pub use local::LocalDatabase;
pub use manager::{DataManager, SleepStats};
pub use operations::{DatabaseOperations, Provider};
pub use remote::{FirebaseDatabase, RemoteEndpoint, SupabaseDatabase};
pub use sync::DataSync;
