// src/middleware/mod.rs
pub mod logging;
