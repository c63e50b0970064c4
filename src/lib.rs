// src/lib.rs

pub mod config;
pub mod core;
pub mod dictionary;
pub mod error;
pub mod learning;
pub mod persistence;

pub use crate::config::UserSettings;
pub use crate::core::engine::{LessonEngine, LessonSummary, MarkupUpdate};
pub use crate::core::types::{LessonMaterial, MaterialItem, StrokeRecord};
pub use crate::dictionary::LayeredDictionary;
pub use crate::error::{Result, StenoError};
pub use crate::learning::FamiliarityStore;
