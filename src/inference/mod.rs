pub mod classifier;
pub mod generator;

use anyhow::{anyhow, Result};
use candle::Device;
use tracing::{debug, warn};

use crate::config::{Backend, Config};
use crate::hub;
use crate::responder::labels::Label;

use classifier::SupportClassifier;
use generator::GenerativeLabeler;

/// The loaded model behind the `/predict` endpoint. Built once at startup
/// and shared read-only across requests.
pub struct InferenceService {
    backend: ServiceBackend,
}

enum ServiceBackend {
    Classifier(SupportClassifier),
    Generator(GenerativeLabeler),
}

impl InferenceService {
    pub fn from_config(config: &Config) -> Result<Self> {
        let device = build_device(config.device.as_deref())?;
        let snapshot = hub::resolve_snapshot(
            &config.model_id,
            config.hub_token.clone(),
            config.model_dir.clone(),
        )?;

        let backend = match config.backend {
            Backend::Classifier => {
                println!("🟦 Support classifier → {device:?}");
                ServiceBackend::Classifier(SupportClassifier::load(snapshot, device)?)
            }
            Backend::Generator => {
                println!("🐦 Generative labeler → {device:?}");
                ServiceBackend::Generator(GenerativeLabeler::load(snapshot, device)?)
            }
        };

        Ok(Self { backend })
    }

    /// Label for the input text: the canonical category from the classifier,
    /// or whatever short string the generative backend decodes.
    pub async fn label(&self, text: &str) -> Result<String> {
        match &self.backend {
            ServiceBackend::Classifier(model) => {
                let (idx, confidence) = model.classify(text)?;
                let label = Label::from_index(idx).unwrap_or(Label::Normal);
                debug!(%label, confidence, "classifier verdict");
                Ok(label.as_str().to_string())
            }
            ServiceBackend::Generator(model) => {
                let label = model.generate_label(text).await?;
                debug!(%label, "generated label");
                Ok(label)
            }
        }
    }
}

fn build_device(pref: Option<&str>) -> Result<Device> {
    let Some(value) = pref.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(Device::Cpu);
    };

    let lower = value.to_ascii_lowercase();
    if lower == "cpu" {
        Ok(Device::Cpu)
    } else if lower.starts_with("cuda") || lower.starts_with("gpu") {
        let ordinal = value
            .split(':')
            .nth(1)
            .and_then(|part| part.parse::<usize>().ok())
            .unwrap_or(0);
        Device::new_cuda(ordinal).map_err(|err| {
            anyhow!(
                "requested CUDA device {} but initialization failed: {err}. Build with the \
                 `cuda` feature and ensure CUDA libraries are available.",
                ordinal
            )
        })
    } else {
        warn!("unrecognized MENTAI_DEVICE value '{value}', defaulting to cpu");
        Ok(Device::Cpu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_defaults_to_cpu() {
        assert!(matches!(build_device(None).unwrap(), Device::Cpu));
        assert!(matches!(build_device(Some("")).unwrap(), Device::Cpu));
        assert!(matches!(build_device(Some("cpu")).unwrap(), Device::Cpu));
    }

    #[test]
    fn unrecognized_device_preference_falls_back_to_cpu() {
        assert!(matches!(
            build_device(Some("quantum")).unwrap(),
            Device::Cpu
        ));
    }
}
