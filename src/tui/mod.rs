pub mod app;
pub mod confirm;
pub mod drag;
pub mod geometry;
pub mod list_view;
pub mod render;
pub mod scheduler;
pub mod swipe;
pub mod theme;
pub mod timer_loop;

pub use app::run;
