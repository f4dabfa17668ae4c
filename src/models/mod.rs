// src/models/mod.rs

pub mod report;
pub mod resource;
pub mod result;
pub mod test;
