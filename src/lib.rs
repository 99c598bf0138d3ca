//! Insurance premium-category prediction service.
//!
//! Raw client attributes are validated into a [`UserProfile`], expanded into
//! model features, scored by an injected [`PremiumModel`] and remapped onto a
//! low/medium/high business tier.

pub mod city;
pub mod config;
pub mod features;
pub mod http;
pub mod model;
pub mod predictor;
pub mod types;
pub mod validate;

pub use city::{classify, normalize_city, CityTier};
pub use features::derive;
pub use model::{LinearModel, ModelError, PremiumModel};
pub use predictor::{PredictError, Predictor};
pub use types::{DerivedFeatures, FeatureRecord, PredictionResult, PremiumCategory, UserProfile};
pub use validate::{validate, validate_json, RawProfile, ValidationError};
