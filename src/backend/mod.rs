//! Backend module - Provider trait, the two provider clients, and their helpers

pub mod arta;
pub mod pollinations;
pub mod ratio;
pub mod sleeper;
pub mod traits;

pub use traits::{GenerationRequest, ImageProvider, Model};
