//! HTTP surface: the contact endpoint and a health probe.

mod server;
mod service;

pub use server::HttpServer;
pub use service::{contact_handler, health_handler, router, AppState};
