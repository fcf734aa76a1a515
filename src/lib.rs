pub mod config;
pub mod models;
pub mod imaging;
pub mod seg;
pub mod web;
pub mod utils;

// 重新导出主要类型
pub use config::Config;
pub use seg::PredictionResult;
pub use utils::error::SegError;

pub type Result<T> = std::result::Result<T, SegError>;
