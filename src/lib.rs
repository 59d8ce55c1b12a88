pub mod api;
pub mod app;
pub mod config;
pub mod db;
pub mod models;
pub mod navigation;
pub mod repository;
pub mod state;
pub mod sync;
pub mod utils;

pub use app::App;
pub use config::Config;
