use serde::{Deserialize, Serialize};

use crate::city::CityTier;

/// Occupation as submitted by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occupation {
    Retired,
    Freelancer,
    Student,
    GovernmentJob,
    BusinessOwner,
    Unemployed,
    PrivateJob,
}

impl Occupation {
    pub const ALL: [Occupation; 7] = [
        Occupation::Retired,
        Occupation::Freelancer,
        Occupation::Student,
        Occupation::GovernmentJob,
        Occupation::BusinessOwner,
        Occupation::Unemployed,
        Occupation::PrivateJob,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Occupation::Retired => "retired",
            Occupation::Freelancer => "freelancer",
            Occupation::Student => "student",
            Occupation::GovernmentJob => "government_job",
            Occupation::BusinessOwner => "business_owner",
            Occupation::Unemployed => "unemployed",
            Occupation::PrivateJob => "private_job",
        }
    }

    /// Exact match only, no case folding.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.as_str() == s)
    }
}

/// Occupation categories the model was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelOccupation {
    GovernmentEmployee,
    PrivateEmployee,
    SelfEmployed,
    Student,
    Retired,
}

impl ModelOccupation {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelOccupation::GovernmentEmployee => "government_employee",
            ModelOccupation::PrivateEmployee => "private_employee",
            ModelOccupation::SelfEmployed => "self_employed",
            ModelOccupation::Student => "student",
            ModelOccupation::Retired => "retired",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifestyleRisk {
    Low,
    Medium,
    High,
}

impl LifestyleRisk {
    pub fn as_str(self) -> &'static str {
        match self {
            LifestyleRisk::Low => "low",
            LifestyleRisk::Medium => "medium",
            LifestyleRisk::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    Young,
    Adult,
    MiddleAged,
    Senior,
}

impl AgeGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            AgeGroup::Young => "young",
            AgeGroup::Adult => "adult",
            AgeGroup::MiddleAged => "middle_aged",
            AgeGroup::Senior => "senior",
        }
    }
}

/// Business-facing premium tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PremiumCategory {
    Low,
    Medium,
    High,
}

impl PremiumCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            PremiumCategory::Low => "low",
            PremiumCategory::Medium => "medium",
            PremiumCategory::High => "high",
        }
    }
}

/// Validated client input. Only `validate::validate` builds one, so every
/// instance satisfies the range constraints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub(crate) age: u32,
    pub(crate) weight: f64,          // kg
    pub(crate) height: f64,          // meters
    pub(crate) income: f64,          // lakhs per annum
    pub(crate) smoker: bool,
    pub(crate) city: String,         // trimmed, title-cased
    pub(crate) occupation: Occupation,
}

impl UserProfile {
    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn income(&self) -> f64 {
        self.income
    }

    pub fn smoker(&self) -> bool {
        self.smoker
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn occupation(&self) -> Occupation {
        self.occupation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedFeatures {
    pub bmi: f64,
    pub lifestyle_risk: LifestyleRisk,
    pub age_group: AgeGroup,
    pub city_tier: CityTier,
    pub mapped_occupation: ModelOccupation,
}

/// One model input row. Field names are the column names the model expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureRecord {
    pub bmi: f64,
    pub age_group: AgeGroup,
    pub lifestyle_risk: LifestyleRisk,
    pub city_tier: CityTier,
    pub income_lpa: f64,
    pub occupation: ModelOccupation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub raw_label: String,            // model output, e.g. "basic" / "premium"
    pub final_category: PremiumCategory,
    pub description: String,
}
