// src/core/mod.rs

pub mod accuracy;
pub mod cursor;
pub mod engine;
pub mod lesson;
pub mod matcher;
pub mod pipeline;
pub mod speech;
pub mod types;
pub mod typography;
