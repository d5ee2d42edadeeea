/// Модуль предобработки данных

pub mod encoding;
pub mod temporal;

pub use encoding::{FeatureEncoder, FeatureKey, FEATURE_SCHEMA, N_FEATURES};
