pub mod dto;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod twiml;

pub use server::HttpServer;
