pub mod bootstrap;
pub mod state_store;
