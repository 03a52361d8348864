//! HTTP Layer - 存活探针
//!
//! 托管平台通过 `GET /` 判断进程是否存活，没有其他接口

pub mod handlers;
pub mod routes;
pub mod server;

pub use routes::create_routes;
pub use server::{HttpServer, ServerConfig};
