// Core layer: catalog loading, prompt building, generation pipeline and its building blocks.

pub mod catalog;
pub mod engine;
pub mod pipeline;
pub mod prompt;
pub mod rate;
pub mod repair;
pub mod report;
pub mod retry;
pub mod upsert;

pub use crate::domain::ports::{ContentStore, Storage, TextGenerator};
pub use crate::utils::error::Result;
