pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod resolve;
pub mod utils;

pub use adapters::{generator::HttpTextGenerator, storage::LocalStorage, store::DocumentStore};
#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::GenerationConfig;
pub use core::engine::GenerationEngine;
pub use core::pipeline::{GenerationPipeline, PipelineOptions};
pub use resolve::{resolve, PageResolver};
pub use utils::error::{PagesError, Result};
