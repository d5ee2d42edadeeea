//! Flight delay ML - классификатор задержек рейсов

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod preprocessing;
pub mod types;

pub use error::{DelayError, Result};
pub use models::{DelayClassifier, DelayModel};
pub use preprocessing::FeatureEncoder;
pub use types::*;
