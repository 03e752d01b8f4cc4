pub mod config;
pub mod data;
pub mod features;
pub mod logging;
pub mod matching;
pub mod pipeline;
pub mod registration;

pub use features::*;
pub use matching::*;
pub use pipeline::*;
pub use registration::*;

pub type Result<T> = anyhow::Result<T>;
