pub mod classifier;
pub mod feature_builder;
pub mod normalizer;
pub mod predictor;

pub use classifier::*;
pub use feature_builder::*;
pub use normalizer::*;
pub use predictor::*;
