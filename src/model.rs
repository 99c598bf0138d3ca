use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path, sync::Arc};

use crate::config::ModelBackend;
use crate::types::FeatureRecord;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid model artifact: {0}")]
    Artifact(String),

    #[error("feature length mismatch: got {got}, expected {expected}")]
    FeatureMismatch { got: usize, expected: usize },

    #[error("model has no column for {0}")]
    UnknownCategory(String),

    #[error("unexpected model output: {0}")]
    Output(String),

    #[error("feature {name} = {value} is not representable as f32")]
    NotRepresentable { name: String, value: f64 },

    #[error("{0} backend not compiled in (enable the `torch` feature)")]
    BackendUnavailable(&'static str),

    #[cfg(feature = "torch")]
    #[error("torch: {0}")]
    Torch(#[from] tch::TchError),
}

/// A pre-trained classifier. Loaded once and shared read-only across requests.
pub trait PremiumModel: Send + Sync {
    /// One label per input row, in order.
    fn predict(&self, batch: &[FeatureRecord]) -> Result<Vec<String>, ModelError>;

    /// Encoded column order the model was trained with.
    fn feature_names(&self) -> &[String];
}

// ---------- Feature encoding ----------

/// Flatten a record into named columns: numeric fields by name,
/// categorical fields one-hot as `field=value`.
pub fn flatten(record: &FeatureRecord) -> (HashMap<String, f64>, [String; 3]) {
    let categorical = [
        format!("age_group={}", record.age_group.as_str()),
        format!("lifestyle_risk={}", record.lifestyle_risk.as_str()),
        format!("occupation={}", record.occupation.as_str()),
    ];

    let mut cols = HashMap::with_capacity(6);
    cols.insert("bmi".to_string(), record.bmi);
    cols.insert("city_tier".to_string(), f64::from(record.city_tier.as_u8()));
    cols.insert("income_lpa".to_string(), record.income_lpa);
    for name in &categorical {
        cols.insert(name.clone(), 1.0);
    }
    (cols, categorical)
}

/// Order a record by `feat_list`. Columns the record lacks are 0.0; a
/// categorical value the model never saw is an error.
pub fn encode_row(record: &FeatureRecord, feat_list: &[String]) -> Result<Vec<f64>, ModelError> {
    let (cols, categorical) = flatten(record);
    if let Some(missing) = categorical.iter().find(|c| !feat_list.contains(c)) {
        return Err(ModelError::UnknownCategory(missing.clone()));
    }

    let mut v = Vec::with_capacity(feat_list.len());
    for k in feat_list {
        v.push(*cols.get(k).unwrap_or(&0.0));
    }
    Ok(v)
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ModelError> {
    let txt = fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&txt).map_err(|source| ModelError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Load the configured backend. `meta_path` is only read by the TorchScript backend.
pub fn load_model(
    backend: ModelBackend,
    model_path: &Path,
    meta_path: &Path,
) -> Result<Arc<dyn PremiumModel>, ModelError> {
    match backend {
        ModelBackend::Linear => Ok(Arc::new(LinearModel::load(model_path)?)),
        #[cfg(feature = "torch")]
        ModelBackend::Torch => Ok(Arc::new(TorchModel::load(model_path, meta_path)?)),
        #[cfg(not(feature = "torch"))]
        ModelBackend::Torch => {
            let _ = meta_path;
            Err(ModelError::BackendUnavailable("torch"))
        }
    }
}

// ---------- Linear backend ----------

#[derive(Debug, Clone, Deserialize)]
pub struct LinearArtifact {
    pub classes: Vec<String>,
    pub feat_list: Vec<String>,
    pub coef: Vec<f64>,
    pub intercept: f64,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    0.5
}

/// Binary logistic model read from a JSON artifact.
#[derive(Debug, Clone)]
pub struct LinearModel {
    art: LinearArtifact,
}

impl LinearModel {
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        Self::from_artifact(read_json(path)?)
    }

    pub fn from_artifact(art: LinearArtifact) -> Result<Self, ModelError> {
        if art.classes.len() != 2 {
            return Err(ModelError::Artifact(format!(
                "expected 2 classes, got {}",
                art.classes.len()
            )));
        }
        if art.coef.len() != art.feat_list.len() {
            return Err(ModelError::FeatureMismatch {
                got: art.coef.len(),
                expected: art.feat_list.len(),
            });
        }
        if !(0.0..=1.0).contains(&art.threshold) {
            return Err(ModelError::Artifact(format!(
                "threshold {} outside [0, 1]",
                art.threshold
            )));
        }
        Ok(Self { art })
    }

    /// Probability of `classes[1]`.
    pub fn positive_prob(&self, record: &FeatureRecord) -> Result<f64, ModelError> {
        let x = encode_row(record, &self.art.feat_list)?;
        let z = self
            .art
            .coef
            .iter()
            .zip(&x)
            .fold(self.art.intercept, |acc, (w, v)| acc + w * v);
        Ok(1.0 / (1.0 + (-z).exp()))
    }
}

impl PremiumModel for LinearModel {
    fn predict(&self, batch: &[FeatureRecord]) -> Result<Vec<String>, ModelError> {
        batch
            .iter()
            .map(|r| {
                let p = self.positive_prob(r)?;
                let idx = usize::from(p >= self.art.threshold);
                Ok(self.art.classes[idx].clone())
            })
            .collect()
    }

    fn feature_names(&self) -> &[String] {
        &self.art.feat_list
    }
}

// ---------- TorchScript backend ----------

#[cfg(feature = "torch")]
pub use torch::TorchModel;

#[cfg(feature = "torch")]
mod torch {
    use super::{encode_row, read_json, ModelError, PremiumModel};
    use crate::types::FeatureRecord;
    use serde::Deserialize;
    use std::path::Path;
    use tch::{kind::Kind, CModule, Device, Tensor};

    #[derive(Deserialize)]
    struct MetaJson {
        feat_list: Vec<String>,
        classes: Vec<String>,
        in_dim: Option<usize>,
    }

    /// TorchScript classifier producing `[batch, n_classes]` scores.
    pub struct TorchModel {
        model: CModule,
        device: Device,
        feat_list: Vec<String>,
        classes: Vec<String>,
    }

    impl TorchModel {
        pub fn load(model_path: &Path, meta_path: &Path) -> Result<Self, ModelError> {
            let device = Device::Cpu;
            let meta: MetaJson = read_json(meta_path)?;

            let in_dim = meta.in_dim.unwrap_or(meta.feat_list.len());
            if in_dim != meta.feat_list.len() {
                return Err(ModelError::FeatureMismatch {
                    got: meta.feat_list.len(),
                    expected: in_dim,
                });
            }

            let model = CModule::load_on_device(model_path, device)?;

            // Probe output shape with a dummy forward, expect [1, n_classes]
            let dummy = Tensor::zeros([1, in_dim as i64], (Kind::Float, device));
            let sz = model.forward_ts(&[dummy])?.size();
            if sz.len() != 2 || sz[0] != 1 || sz[1] != meta.classes.len() as i64 {
                return Err(ModelError::Output(format!(
                    "size {:?} for {} classes",
                    sz,
                    meta.classes.len()
                )));
            }

            Ok(Self {
                model,
                device,
                feat_list: meta.feat_list,
                classes: meta.classes,
            })
        }
    }

    impl PremiumModel for TorchModel {
        fn predict(&self, batch: &[FeatureRecord]) -> Result<Vec<String>, ModelError> {
            if batch.is_empty() {
                return Ok(Vec::new());
            }
            let in_dim = self.feat_list.len();
            let mut flat = Vec::with_capacity(batch.len() * in_dim);
            for r in batch {
                for (name, v) in self.feat_list.iter().zip(encode_row(r, &self.feat_list)?) {
                    let x = v as f32;
                    if !x.is_finite() {
                        return Err(ModelError::NotRepresentable {
                            name: name.clone(),
                            value: v,
                        });
                    }
                    flat.push(x);
                }
            }

            let input = Tensor::from_slice(&flat)
                .reshape([batch.len() as i64, in_dim as i64])
                .to_device(self.device);
            let idx = self.model.forward_ts(&[input])?.argmax(-1, false);

            (0..batch.len())
                .map(|i| {
                    let k = idx.int64_value(&[i as i64]) as usize;
                    self.classes
                        .get(k)
                        .cloned()
                        .ok_or_else(|| ModelError::Output(format!("class index {} out of range", k)))
                })
                .collect()
        }

        fn feature_names(&self) -> &[String] {
            &self.feat_list
        }
    }
}
