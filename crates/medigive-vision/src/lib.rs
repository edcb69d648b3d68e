//! Boundary to the AI packaging-analysis service.
//!
//! The service looks at a photo of a medicine package and answers with a JSON
//! description of it. This crate builds the prompt, validates the answer
//! against a strict schema and applies the expiry fallback policy, so the core
//! only ever sees well-formed [`MedicineAnalysis`] values.

pub mod expiry;
pub mod extraction;
pub mod prompts;

pub use expiry::*;
pub use extraction::*;
pub use prompts::*;
