/// ML модели

pub mod classifier;
pub mod delay;

pub use classifier::{ClassWeights, DelayClassifier, LogisticModel, LogisticParams};
pub use delay::DelayModel;
