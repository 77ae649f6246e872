use anyhow::{bail, Result};
use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 5000;

const DEFAULT_CLASSIFIER_MODEL: &str = "mentai/roberta-base-mental-health";
const DEFAULT_GENERATOR_MODEL: &str = "microsoft/Phi-3-mini-4k-instruct";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Classifier,
    Generator,
}

impl Backend {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "classifier" => Ok(Backend::Classifier),
            "generator" | "generative" => Ok(Backend::Generator),
            other => bail!(
                "unsupported MENTAI_BACKEND value '{other}' (expected 'classifier' or 'generator')"
            ),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Classifier => f.write_str("classifier"),
            Backend::Generator => f.write_str("generator"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend: Backend,
    pub model_id: String,
    pub model_dir: Option<PathBuf>,
    pub hub_token: Option<String>,
    pub device: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = dotenvy::var("MENTAI_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let backend = match dotenvy::var("MENTAI_BACKEND") {
            Ok(raw) => Backend::parse(&raw)?,
            Err(_) => Backend::Classifier,
        };

        let model_id = dotenvy::var("MENTAI_MODEL_ID")
            .unwrap_or_else(|_| default_model(backend).to_string());
        let model_dir = dotenvy::var("MENTAI_MODEL_DIR").ok().map(PathBuf::from);
        let hub_token = dotenvy::var("MENTAI_HF_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        let device = dotenvy::var("MENTAI_DEVICE").ok();

        // The generator's base model is gated on the hub.
        if backend == Backend::Generator && hub_token.is_none() && model_dir.is_none() {
            bail!("MENTAI_HF_TOKEN must be set for the generator backend");
        }

        Ok(Self {
            port,
            backend,
            model_id,
            model_dir,
            hub_token,
            device,
        })
    }
}

fn default_model(backend: Backend) -> &'static str {
    match backend {
        Backend::Classifier => DEFAULT_CLASSIFIER_MODEL,
        Backend::Generator => DEFAULT_GENERATOR_MODEL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_parse_accepts_known_values() {
        assert_eq!(Backend::parse("classifier").unwrap(), Backend::Classifier);
        assert_eq!(Backend::parse("Generator").unwrap(), Backend::Generator);
        assert_eq!(Backend::parse(" generative ").unwrap(), Backend::Generator);
    }

    #[test]
    fn backend_parse_rejects_unknown_values() {
        assert!(Backend::parse("llama").is_err());
        assert!(Backend::parse("").is_err());
    }

    #[test]
    fn each_backend_has_a_default_model() {
        assert_eq!(default_model(Backend::Classifier), DEFAULT_CLASSIFIER_MODEL);
        assert_eq!(default_model(Backend::Generator), DEFAULT_GENERATOR_MODEL);
    }
}
