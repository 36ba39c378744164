pub mod config;
pub mod models;
pub mod parser;
pub mod render;
