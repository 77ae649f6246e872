use anyhow::{anyhow, Result};
use candle::{DType, Device, IndexOp, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::phi3::{Config as Phi3Config, Model as Phi3Model};
use tokenizers::Tokenizer;

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::sync::Mutex;

use crate::responder::labels::ALL_LABELS;

/// Labels are a handful of tokens at most; anything longer is rambling.
const MAX_LABEL_TOKENS: usize = 16;

// ---------------------------------------------------------
// Generic config wrapper: we forward raw JSON → Phi3Config
// ---------------------------------------------------------
#[derive(Debug, Clone, serde::Deserialize)]
pub struct LabelerConfig {
    #[serde(flatten)]
    inner: serde_json::Value,
}

struct LabelerModel {
    inner: Phi3Model,
}

impl LabelerModel {
    fn new(cfg: &LabelerConfig, vb: VarBuilder) -> candle::Result<Self> {
        let cfg: Phi3Config = serde_json::from_value(cfg.inner.clone())
            .map_err(|e| candle::Error::Msg(format!("Phi3 config parse error: {e}")))?;
        let model = Phi3Model::new(&cfg, vb)?;
        Ok(Self { inner: model })
    }

    fn forward(&mut self, x: &Tensor, pos: usize) -> candle::Result<Tensor> {
        self.inner.forward(x, pos)
    }

    fn clear_kv_cache(&mut self) {
        self.inner.clear_kv_cache();
    }
}

/// Generative labeling backend: prompts a small instruct model and treats
/// whatever it decodes as the label.
pub struct GenerativeLabeler {
    model: Arc<Mutex<LabelerModel>>,
    tokenizer: Arc<Tokenizer>,
    device: Device,
}

impl GenerativeLabeler {
    pub fn load(snapshot_dir: PathBuf, device: Device) -> Result<Self> {
        println!("📁 Labeler snapshot: {}", snapshot_dir.display());

        let tokenizer_path = snapshot_dir.join("tokenizer.json");
        let tokenizer = Arc::new(
            Tokenizer::from_file(&tokenizer_path)
                .map_err(|e| anyhow!("Labeler tokenizer error: {e}"))?,
        );

        let cfg: LabelerConfig = serde_json::from_slice(&fs::read(snapshot_dir.join("config.json"))?)?;

        let shards = weight_shards(&snapshot_dir)?;
        println!("📦 Labeler shards: {}", shards.len());

        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&shards, DType::F16, &device)? };
        let model = Arc::new(Mutex::new(LabelerModel::new(&cfg, vb)?));

        Ok(Self {
            model,
            tokenizer,
            device,
        })
    }

    /// Greedy-decode a short label for the input text. The decoded string is
    /// used verbatim (first line, lower-cased); table lookups downstream
    /// absorb anything the model invents.
    pub async fn generate_label(&self, text: &str) -> Result<String> {
        let prompt = label_prompt(text);
        let raw = self.generate_greedy(&prompt, MAX_LABEL_TOKENS).await?;
        let label = raw.lines().next().unwrap_or("").trim().to_lowercase();
        Ok(label)
    }

    async fn generate_greedy(&self, prompt: &str, max_new_tokens: usize) -> Result<String> {
        // Fresh KV cache for each job
        {
            let mut m = self.model.lock().await;
            m.clear_kv_cache();
        }

        let enc = self
            .tokenizer
            .encode(prompt, true)
            .map_err(|e| anyhow!("Labeler encode error: {e}"))?;

        let mut tokens = enc.get_ids().to_vec();
        let prompt_len = tokens.len();

        let eos = self
            .tokenizer
            .token_to_id("<|end|>")
            .or_else(|| self.tokenizer.token_to_id("<|endoftext|>"))
            .or_else(|| self.tokenizer.token_to_id("</s>"))
            .unwrap_or(u32::MAX);

        let mut pos = 0usize;

        for _ in 0..max_new_tokens {
            // first step: whole prompt; later: last token only
            let ctx: &[u32] = if pos == 0 {
                &tokens
            } else {
                std::slice::from_ref(tokens.last().unwrap())
            };

            let input = Tensor::new(ctx, &self.device)?.unsqueeze(0)?;

            let logits = {
                let mut m = self.model.lock().await;
                let out = m.forward(&input, pos)?;
                let seq_len = out.dim(1)?;
                out.i((0, seq_len - 1))?.to_dtype(DType::F32)?
            };

            pos += ctx.len();

            let next = argmax_u32(&logits)?.ok_or_else(|| anyhow!("labeler: empty logits"))?;
            if next == eos {
                break;
            }
            tokens.push(next);
        }

        let gen_slice = &tokens[prompt_len..];
        if gen_slice.is_empty() {
            return Ok(String::new());
        }

        let text = self
            .tokenizer
            .decode(gen_slice, true)
            .map_err(|e| anyhow!("Labeler decode error: {e}"))?;

        Ok(text)
    }
}

fn label_prompt(text: &str) -> String {
    let label_list = ALL_LABELS
        .iter()
        .map(|l| l.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "<|user|>\nClassify the following message into exactly ONE of these categories: \
         {label_list}.\nReply with only the category name.\n\nMessage: {text}<|end|>\n<|assistant|>\n"
    )
}

fn weight_shards(snapshot_dir: &Path) -> Result<Vec<PathBuf>> {
    let index_path = snapshot_dir.join("model.safetensors.index.json");
    if index_path.exists() {
        let index_json: serde_json::Value = serde_json::from_slice(&fs::read(&index_path)?)?;
        let mut shards = index_json["weight_map"]
            .as_object()
            .ok_or_else(|| anyhow!("weight_map is not an object in {}", index_path.display()))?
            .values()
            .map(|v| {
                let file = v
                    .as_str()
                    .ok_or_else(|| anyhow!("invalid shard entry in {}", index_path.display()))?;
                Ok(snapshot_dir.join(file))
            })
            .collect::<Result<Vec<_>>>()?;
        shards.sort();
        shards.dedup();
        return Ok(shards);
    }

    let single = snapshot_dir.join("model.safetensors");
    if single.exists() {
        return Ok(vec![single]);
    }
    Err(anyhow!(
        "no model weights found under {}",
        snapshot_dir.display()
    ))
}

/// Argmax over the last dimension, returning the token id.
fn argmax_u32(logits: &Tensor) -> Result<Option<u32>> {
    let v = logits.flatten_all()?.to_vec1::<f32>()?;
    if v.is_empty() {
        return Ok(None);
    }

    let mut max_idx = 0usize;
    let mut max_val = v[0];
    for (i, &val) in v.iter().enumerate().skip(1) {
        if val > max_val {
            max_val = val;
            max_idx = i;
        }
    }

    Ok(Some(max_idx as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_prompt_lists_every_category() {
        let prompt = label_prompt("I feel fine today");
        for label in ALL_LABELS {
            assert!(prompt.contains(label.as_str()));
        }
        assert!(prompt.contains("I feel fine today"));
        assert!(prompt.ends_with("<|assistant|>\n"));
    }
}
