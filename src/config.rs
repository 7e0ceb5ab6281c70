use std::path::PathBuf;

use anyhow::{Context, Result};

/// Runtime configuration read from the environment (and `.env`, if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub resources_dir: PathBuf,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            resources_dir: PathBuf::from(env_or("RESUME_SALARY_RESOURCES", "resources")?),
            rust_log: env_or("RUST_LOG", "info")?,
        })
    }

    /// Where `train` writes and `predict` reads the model unless told otherwise.
    pub fn default_model_path(&self) -> PathBuf {
        self.resources_dir.join("model.npz")
    }
}

fn env_or(key: &str, default: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(value) => Ok(value),
        Err(std::env::VarError::NotPresent) => Ok(default.to_string()),
        Err(e) => Err(e).with_context(|| format!("environment variable '{key}' is not valid UTF-8")),
    }
}
