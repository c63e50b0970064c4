// src/dictionary/mod.rs
//! Layered steno dictionaries and phrase lookup.

pub mod layered;
pub mod lookup;

pub use layered::{IndexedOutline, LayeredDictionary, Namespace};
pub use lookup::{LookupCandidate, LookupResult, Misstrokes};
