pub mod app;
pub mod ax;
pub mod ax_cache;
