pub mod config;
pub mod engine;
pub mod history;
pub mod toppop;

pub use config::*;
pub use engine::*;
pub use history::*;
pub use toppop::*;
