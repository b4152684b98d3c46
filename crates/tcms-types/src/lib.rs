pub mod config;
pub mod general;
