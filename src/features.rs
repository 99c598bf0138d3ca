use crate::city::classify;
use crate::types::{AgeGroup, DerivedFeatures, LifestyleRisk, ModelOccupation, Occupation, UserProfile};

pub const OBESE_BMI: f64 = 30.0;
pub const UNDERWEIGHT_BMI: f64 = 18.5;

/// Client occupation -> model occupation. `unemployed` has no model
/// category of its own and is grouped with `student`.
pub const OCCUPATION_MAP: [(&str, ModelOccupation); 7] = [
    ("government_job", ModelOccupation::GovernmentEmployee),
    ("private_job", ModelOccupation::PrivateEmployee),
    ("business_owner", ModelOccupation::SelfEmployed),
    ("freelancer", ModelOccupation::SelfEmployed),
    ("unemployed", ModelOccupation::Student),
    ("student", ModelOccupation::Student),
    ("retired", ModelOccupation::Retired),
];

/// Compute every derived feature from a validated profile.
pub fn derive(profile: &UserProfile) -> DerivedFeatures {
    let bmi = bmi(profile.weight(), profile.height());
    DerivedFeatures {
        bmi,
        lifestyle_risk: lifestyle_risk(profile.smoker(), bmi),
        age_group: age_group(profile.age()),
        city_tier: classify(profile.city()),
        mapped_occupation: map_occupation(profile.occupation()),
    }
}

pub fn bmi(weight_kg: f64, height_m: f64) -> f64 {
    weight_kg / (height_m * height_m)
}

/// Smoking or obesity wins over the underweight check.
pub fn lifestyle_risk(smoker: bool, bmi: f64) -> LifestyleRisk {
    if smoker || bmi > OBESE_BMI {
        LifestyleRisk::High
    } else if bmi < UNDERWEIGHT_BMI {
        LifestyleRisk::Medium
    } else {
        LifestyleRisk::Low
    }
}

pub fn age_group(age: u32) -> AgeGroup {
    match age {
        0..=24 => AgeGroup::Young,
        25..=48 => AgeGroup::Adult,
        49..=59 => AgeGroup::MiddleAged,
        _ => AgeGroup::Senior,
    }
}

pub fn map_occupation(occupation: Occupation) -> ModelOccupation {
    map_occupation_name(occupation.as_str())
}

/// Unrecognized names fall back to `private_employee`.
pub fn map_occupation_name(name: &str) -> ModelOccupation {
    OCCUPATION_MAP
        .iter()
        .find(|(k, _)| *k == name)
        .map(|(_, v)| *v)
        .unwrap_or(ModelOccupation::PrivateEmployee)
}
