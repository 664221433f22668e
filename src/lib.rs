// src/lib.rs

pub mod analysis;
pub mod api;
pub mod config;
pub mod llm;
pub mod persona;
pub mod render;
pub mod state;

pub use api::http::create_router;
pub use config::RelayConfig;
pub use state::AppState;
