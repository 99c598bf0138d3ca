use std::{net::SocketAddr, path::PathBuf};

pub const DEFAULT_MODEL_FILE: &str = "models/premium_model.json";
pub const DEFAULT_META_FILE: &str = "models/meta.json";
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelBackend {
    Linear,
    Torch,
}

impl ModelBackend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Some(ModelBackend::Linear),
            "torch" | "torchscript" => Some(ModelBackend::Torch),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub model_path: PathBuf,
    pub meta_path: PathBuf,
    pub backend: ModelBackend,
    pub addr: SocketAddr,
    pub log_predictions: bool,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let model_path = std::env::var("MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| resolve_path(DEFAULT_MODEL_FILE));
        let meta_path = std::env::var("META_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| resolve_path(DEFAULT_META_FILE));

        let backend = match std::env::var("MODEL_BACKEND") {
            Ok(s) => ModelBackend::parse(&s)
                .ok_or_else(|| anyhow::anyhow!("unknown MODEL_BACKEND {:?}", s))?,
            Err(_) => ModelBackend::Linear,
        };

        let host = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

        let log_predictions = std::env::var("LOG_PRED").ok().as_deref() == Some("1");

        Ok(Self {
            model_path,
            meta_path,
            backend,
            addr,
            log_predictions,
        })
    }
}

/// Find `rel` relative to the working directory or next to the executable.
/// Falls back to `rel` itself so the loader reports the missing file.
pub fn resolve_path(rel: &str) -> PathBuf {
    let candidates = [
        PathBuf::from(rel),
        PathBuf::from(".").join(rel),
        {
            let mut p = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("."));
            p.pop(); // exe dir
            p.push(rel);
            p
        },
    ];

    for c in candidates {
        if c.exists() {
            return c;
        }
    }

    PathBuf::from(rel)
}
