// src/lib.rs
pub mod api;
pub mod banner;
pub mod config;
pub mod controller;
pub mod errors;
pub mod layout;
pub mod models;
pub mod page;
pub mod payload;
pub mod predictor;
pub mod render;
pub mod schema;
