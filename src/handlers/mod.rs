// src/handlers/mod.rs

pub mod resources;
pub mod results;
