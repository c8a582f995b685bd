pub mod handlers;
pub mod memory;
pub mod postgres;
pub mod rules;
pub mod service;
pub mod stats;
pub mod store;
