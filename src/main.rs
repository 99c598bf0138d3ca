use anyhow::Context;
use premium_predictor::{
    city::CityTier,
    config::ServerConfig,
    http::{self, AppState},
    model::load_model,
    types::{AgeGroup, FeatureRecord, LifestyleRisk, ModelOccupation},
    Predictor,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = ServerConfig::from_env()?;
    tracing::info!("loading {:?} model from {}", cfg.backend, cfg.model_path.display());

    let mdl = load_model(cfg.backend, &cfg.model_path, &cfg.meta_path)
        .with_context(|| format!("failed to load model {}", cfg.model_path.display()))?;
    tracing::info!("loaded model; feat_list[{}]: {:?}", mdl.feature_names().len(), mdl.feature_names());

    // Warmup so an incompatible artifact fails here rather than on the first request
    let probe = FeatureRecord {
        bmi: 22.0,
        age_group: AgeGroup::Adult,
        lifestyle_risk: LifestyleRisk::Low,
        city_tier: CityTier::Tier2,
        income_lpa: 10.0,
        occupation: ModelOccupation::PrivateEmployee,
    };
    let label = mdl.predict(&[probe]).context("warmup prediction failed")?;
    tracing::info!("warmup predict ok: {:?}", label);

    let predictor = Predictor::new(mdl).with_prediction_logging(cfg.log_predictions);
    http::serve(cfg.addr, AppState::new(predictor)).await?;
    Ok(())
}
