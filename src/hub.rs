use anyhow::{anyhow, Context, Result};
use hf_hub::api::sync::ApiBuilder;
use std::fs;
use std::path::PathBuf;

/// Resolve the local snapshot directory for a model: an explicit directory
/// override, or the Hugging Face cache after fetching config, tokenizer and
/// weights.
pub fn resolve_snapshot(
    model_id: &str,
    token: Option<String>,
    local_dir: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(dir) = local_dir {
        if !dir.join("config.json").exists() {
            return Err(anyhow!("config.json not found under {}", dir.display()));
        }
        println!("📁 Using local model at: {}", dir.display());
        return Ok(dir);
    }

    println!("⬇️  Resolving {model_id} from the Hugging Face hub...");
    let api = ApiBuilder::new().with_token(token).build()?;
    let repo = api.model(model_id.to_string());

    let config_path = repo
        .get("config.json")
        .with_context(|| format!("failed to fetch config.json for {model_id}"))?;
    repo.get("tokenizer.json")
        .with_context(|| format!("failed to fetch tokenizer.json for {model_id}"))?;

    // Sharded checkpoints carry an index; single-file ones just the weights.
    if let Ok(index_path) = repo.get("model.safetensors.index.json") {
        let index_json: serde_json::Value = serde_json::from_slice(&fs::read(&index_path)?)?;
        let weight_map = index_json["weight_map"]
            .as_object()
            .ok_or_else(|| anyhow!("weight_map is not an object in {}", index_path.display()))?;

        let mut shard_names: Vec<&str> =
            weight_map.values().filter_map(|v| v.as_str()).collect();
        shard_names.sort_unstable();
        shard_names.dedup();

        println!("📦 Fetching {} weight shards", shard_names.len());
        for shard in shard_names {
            repo.get(shard)
                .with_context(|| format!("failed to fetch shard {shard} for {model_id}"))?;
        }
    } else {
        repo.get("model.safetensors")
            .with_context(|| format!("failed to fetch model.safetensors for {model_id}"))?;
    }

    let snapshot = config_path
        .parent()
        .ok_or_else(|| anyhow!("snapshot path has no parent: {}", config_path.display()))?;
    Ok(snapshot.to_path_buf())
}
