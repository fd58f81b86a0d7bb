// src/api/handlers.rs
mod form;
mod health;

pub use form::{show_form, submit_form};
pub use health::health_check;
