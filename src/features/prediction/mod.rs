pub mod client;
pub mod handler;
pub mod models;
pub mod payload;

// 对外导出路由构建函数，便于 lib.rs 引用
pub use client::ReplicateClient;
pub use handler::create_prediction_router;
