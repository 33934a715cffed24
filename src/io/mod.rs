pub mod config_io;
pub mod kv_store;
pub mod lock;
pub mod persist;
