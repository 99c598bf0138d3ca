use std::sync::Arc;

use crate::city::CityTier;
use crate::features::derive;
use crate::model::{ModelError, PremiumModel};
use crate::types::{DerivedFeatures, FeatureRecord, LifestyleRisk, PremiumCategory, PredictionResult, UserProfile};

/// Income (lpa) above which a `basic` label is lifted to medium.
pub const BASIC_UPLIFT_INCOME: f64 = 10.0;
/// Income (lpa) above which a `premium` label becomes high.
pub const PREMIUM_HIGH_INCOME: f64 = 20.0;

#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("model returned no prediction")]
    EmptyPrediction,
}

/// Runs the derivation pipeline against an injected model.
#[derive(Clone)]
pub struct Predictor {
    model: Arc<dyn PremiumModel>,
    log_predictions: bool,
}

impl Predictor {
    pub fn new(model: Arc<dyn PremiumModel>) -> Self {
        Self {
            model,
            log_predictions: false,
        }
    }

    /// Log derived features and labels for every prediction at info level.
    pub fn with_prediction_logging(mut self, enabled: bool) -> Self {
        self.log_predictions = enabled;
        self
    }

    pub fn predict_category(&self, profile: &UserProfile) -> Result<PredictionResult, PredictError> {
        let features = derive(profile);
        let record = feature_record(profile, &features);

        let raw_label = self
            .model
            .predict(std::slice::from_ref(&record))?
            .into_iter()
            .next()
            .ok_or(PredictError::EmptyPrediction)?;

        let final_category = apply_business_rule(
            &raw_label,
            profile.income(),
            features.city_tier,
            features.lifestyle_risk,
        );

        if self.log_predictions {
            tracing::info!(
                "pred bmi={:.2} age_group={} risk={} city_tier={} income_lpa={} occupation={} raw={} final={}",
                record.bmi,
                record.age_group.as_str(),
                record.lifestyle_risk.as_str(),
                record.city_tier.as_u8(),
                record.income_lpa,
                record.occupation.as_str(),
                raw_label,
                final_category.as_str()
            );
        }

        Ok(PredictionResult {
            raw_label,
            final_category,
            description: describe(final_category),
        })
    }
}

pub fn feature_record(profile: &UserProfile, features: &DerivedFeatures) -> FeatureRecord {
    FeatureRecord {
        bmi: features.bmi,
        age_group: features.age_group,
        lifestyle_risk: features.lifestyle_risk,
        city_tier: features.city_tier,
        income_lpa: profile.income(),
        occupation: features.mapped_occupation,
    }
}

/// Map the model's two-class label onto the three business tiers.
/// `basic` can only yield low or medium; anything else is treated as
/// `premium` and can only yield medium or high.
pub fn apply_business_rule(
    raw_label: &str,
    income: f64,
    city_tier: CityTier,
    lifestyle_risk: LifestyleRisk,
) -> PremiumCategory {
    if raw_label.eq_ignore_ascii_case("basic") {
        if income > BASIC_UPLIFT_INCOME || city_tier == CityTier::Tier1 {
            PremiumCategory::Medium
        } else {
            PremiumCategory::Low
        }
    } else {
        if !raw_label.eq_ignore_ascii_case("premium") {
            tracing::warn!("unexpected model label {:?}, treating as premium", raw_label);
        }
        if lifestyle_risk == LifestyleRisk::High || income > PREMIUM_HIGH_INCOME {
            PremiumCategory::High
        } else {
            PremiumCategory::Medium
        }
    }
}

pub fn describe(category: PremiumCategory) -> String {
    format!(
        "Insurance premium category is predicted to be {}",
        category.as_str().to_uppercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::{validate, RawProfile};
    use std::sync::Mutex;

    /// Returns a fixed label and remembers what it was asked.
    struct Stub {
        label: &'static str,
        seen: Mutex<Vec<FeatureRecord>>,
        names: Vec<String>,
    }

    impl Stub {
        fn new(label: &'static str) -> Arc<Self> {
            Arc::new(Self {
                label,
                seen: Mutex::new(Vec::new()),
                names: Vec::new(),
            })
        }
    }

    impl PremiumModel for Stub {
        fn predict(&self, batch: &[FeatureRecord]) -> Result<Vec<String>, ModelError> {
            self.seen.lock().unwrap().extend_from_slice(batch);
            Ok(batch.iter().map(|_| self.label.to_string()).collect())
        }

        fn feature_names(&self) -> &[String] {
            &self.names
        }
    }

    struct Failing;

    impl PremiumModel for Failing {
        fn predict(&self, _batch: &[FeatureRecord]) -> Result<Vec<String>, ModelError> {
            Err(ModelError::UnknownCategory("occupation=astronaut".into()))
        }

        fn feature_names(&self) -> &[String] {
            &[]
        }
    }

    struct Silent;

    impl PremiumModel for Silent {
        fn predict(&self, _batch: &[FeatureRecord]) -> Result<Vec<String>, ModelError> {
            Ok(Vec::new())
        }

        fn feature_names(&self) -> &[String] {
            &[]
        }
    }

    fn profile(income: f64, city: &str, smoker: bool) -> UserProfile {
        validate(RawProfile {
            age: 35,
            weight: 70.0,
            height: 1.75,
            income,
            smoker,
            city: city.to_string(),
            occupation: "freelancer".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn business_rule_cases() {
        use LifestyleRisk::*;
        assert_eq!(apply_business_rule("basic", 15.0, CityTier::Tier2, Low), PremiumCategory::Medium);
        assert_eq!(apply_business_rule("basic", 5.0, CityTier::Tier3, Low), PremiumCategory::Low);
        assert_eq!(apply_business_rule("basic", 5.0, CityTier::Tier1, Low), PremiumCategory::Medium);
        assert_eq!(apply_business_rule("basic", 10.0, CityTier::Tier2, High), PremiumCategory::Low);
        assert_eq!(apply_business_rule("premium", 25.0, CityTier::Tier3, Low), PremiumCategory::High);
        assert_eq!(apply_business_rule("premium", 10.0, CityTier::Tier3, Low), PremiumCategory::Medium);
        assert_eq!(apply_business_rule("premium", 1.0, CityTier::Tier3, High), PremiumCategory::High);
        assert_eq!(apply_business_rule("premium", 20.0, CityTier::Tier1, Medium), PremiumCategory::Medium);
    }

    #[test]
    fn business_rule_ignores_label_case() {
        assert_eq!(
            apply_business_rule("BASIC", 5.0, CityTier::Tier3, LifestyleRisk::Low),
            PremiumCategory::Low
        );
        assert_eq!(
            apply_business_rule("Premium", 25.0, CityTier::Tier3, LifestyleRisk::Low),
            PremiumCategory::High
        );
    }

    #[test]
    fn basic_never_high_and_premium_never_low() {
        for income in [0.5, 10.0, 10.5, 20.0, 20.5, 99.0] {
            for tier in [CityTier::Tier1, CityTier::Tier2, CityTier::Tier3] {
                for risk in [LifestyleRisk::Low, LifestyleRisk::Medium, LifestyleRisk::High] {
                    assert_ne!(apply_business_rule("basic", income, tier, risk), PremiumCategory::High);
                    assert_ne!(apply_business_rule("premium", income, tier, risk), PremiumCategory::Low);
                }
            }
        }
    }

    #[test]
    fn orchestrator_sends_one_record_with_expected_fields() {
        let stub = Stub::new("premium");
        let predictor = Predictor::new(stub.clone());
        let res = predictor.predict_category(&profile(25.0, "delhi", false)).unwrap();

        assert_eq!(res.raw_label, "premium");
        assert_eq!(res.final_category, PremiumCategory::High);
        assert_eq!(res.description, "Insurance premium category is predicted to be HIGH");

        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].income_lpa, 25.0);
        assert_eq!(seen[0].city_tier, CityTier::Tier1);
        assert_eq!(seen[0].occupation, crate::types::ModelOccupation::SelfEmployed);
        assert_eq!(seen[0].bmi, 70.0 / (1.75 * 1.75));
    }

    #[test]
    fn orchestrator_applies_basic_rule() {
        let predictor = Predictor::new(Stub::new("basic")).with_prediction_logging(true);
        let low = predictor.predict_category(&profile(5.0, "Nowhere", false)).unwrap();
        assert_eq!(low.final_category, PremiumCategory::Low);
        assert_eq!(low.description, "Insurance premium category is predicted to be LOW");

        let medium = predictor.predict_category(&profile(15.0, "Jaipur", false)).unwrap();
        assert_eq!(medium.final_category, PremiumCategory::Medium);
    }

    #[test]
    fn model_failures_propagate() {
        let predictor = Predictor::new(Arc::new(Failing));
        let err = predictor.predict_category(&profile(5.0, "Pune", false)).unwrap_err();
        assert!(matches!(err, PredictError::Model(ModelError::UnknownCategory(_))));

        let predictor = Predictor::new(Arc::new(Silent));
        let err = predictor.predict_category(&profile(5.0, "Pune", false)).unwrap_err();
        assert!(matches!(err, PredictError::EmptyPrediction));
    }
}
