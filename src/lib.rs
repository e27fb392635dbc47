extern crate alloc;

pub mod config;
pub mod database;
pub mod error;
pub mod memory;
pub mod model;
pub mod router;
pub mod server;
pub mod store;
