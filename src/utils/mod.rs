//! Utility modules shared across the pipeline.

pub mod hash;
pub mod html;
pub mod mime;
