pub mod task;
pub mod timer;
pub mod config;

pub use task::*;
pub use timer::*;
pub use config::*;
