//! Model artifact resolution.
//!
//! A model needs three artifacts on disk before it can be constructed:
//! the architecture config, the tokenizer definition, and the safetensors
//! weights (one file, or several shards named by an index file). They are
//! resolved either from the host's work directory or, on fallback, from
//! the remote hub.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use hf_hub::api::sync::{Api, ApiBuilder};
use tracing::{debug, info};

use textvec_core::{EncoderError, EncoderResult};

/// Architecture configuration file name.
pub const CONFIG_FILE: &str = "config.json";
/// Tokenizer definition file name.
pub const TOKENIZER_FILE: &str = "tokenizer.json";
/// Single-file weights name.
pub const WEIGHTS_FILE: &str = "model.safetensors";
/// Shard index name for multi-file weights.
pub const WEIGHTS_INDEX_FILE: &str = "model.safetensors.index.json";

/// Resolved on-disk locations of one model's artifacts.
///
/// Paths are retained after loading so persistence can copy the exact
/// source files into the work directory.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    /// Architecture config (`config.json`).
    pub config: PathBuf,
    /// Tokenizer definition (`tokenizer.json`).
    pub tokenizer: PathBuf,
    /// Weight files, sorted; a single entry unless sharded.
    pub weights: Vec<PathBuf>,
    /// Shard index, present only for sharded weights.
    pub index: Option<PathBuf>,
}

impl ModelArtifacts {
    /// Resolve artifacts from a local directory (the work directory).
    ///
    /// Every artifact must already exist; any missing file is a load error
    /// so the caller can fall back to the remote hub.
    pub fn from_dir(dir: &Path) -> EncoderResult<Self> {
        debug!(dir = %dir.display(), "resolving model artifacts from directory");
        let config = existing(dir.join(CONFIG_FILE))?;
        let tokenizer = existing(dir.join(TOKENIZER_FILE))?;

        let index_path = dir.join(WEIGHTS_INDEX_FILE);
        if index_path.exists() {
            let weights = shard_files(&index_path, |name| existing(dir.join(name)))?;
            Ok(Self {
                config,
                tokenizer,
                weights,
                index: Some(index_path),
            })
        } else {
            let weights = vec![existing(dir.join(WEIGHTS_FILE))?];
            Ok(Self {
                config,
                tokenizer,
                weights,
                index: None,
            })
        }
    }

    /// Fetch artifacts from the remote hub, keyed by the pretrained
    /// weights identifier.
    ///
    /// Files already present in the hub cache are not re-downloaded. There
    /// is no fallback beyond this: a hub failure propagates to the caller.
    pub fn from_hub(hub_id: &str, cache_dir: Option<&Path>) -> EncoderResult<Self> {
        info!(hub_id, "fetching model artifacts from remote hub");
        let api = build_api(cache_dir)?;
        let repo = api.model(hub_id.to_string());

        let config = repo
            .get(CONFIG_FILE)
            .map_err(|e| EncoderError::ModelLoad(format!("{hub_id}/{CONFIG_FILE}: {e}")))?;
        let tokenizer = repo
            .get(TOKENIZER_FILE)
            .map_err(|e| EncoderError::ModelLoad(format!("{hub_id}/{TOKENIZER_FILE}: {e}")))?;

        match repo.get(WEIGHTS_FILE) {
            Ok(weights) => Ok(Self {
                config,
                tokenizer,
                weights: vec![weights],
                index: None,
            }),
            Err(single_err) => {
                // Sharded checkpoint: the index names the shard files.
                let index = repo.get(WEIGHTS_INDEX_FILE).map_err(|_| {
                    EncoderError::ModelLoad(format!(
                        "{hub_id}: no safetensors weights ({single_err})"
                    ))
                })?;
                let weights = shard_files(&index, |name| {
                    repo.get(name)
                        .map_err(|e| EncoderError::ModelLoad(format!("{hub_id}/{name}: {e}")))
                })?;
                Ok(Self {
                    config,
                    tokenizer,
                    weights,
                    index: Some(index),
                })
            }
        }
    }
}

fn build_api(cache_dir: Option<&Path>) -> EncoderResult<Api> {
    let api = match cache_dir {
        Some(dir) => ApiBuilder::new().with_cache_dir(dir.to_path_buf()).build(),
        None => Api::new(),
    };
    api.map_err(|e| EncoderError::ModelLoad(format!("hub api init failed: {e}")))
}

fn existing(path: PathBuf) -> EncoderResult<PathBuf> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(EncoderError::ModelLoad(format!(
            "missing artifact: {}",
            path.display()
        )))
    }
}

/// Read a `model.safetensors.index.json` and resolve its unique shard
/// names, sorted for a deterministic mmap order.
fn shard_files<F>(index_path: &Path, mut resolve: F) -> EncoderResult<Vec<PathBuf>>
where
    F: FnMut(&str) -> EncoderResult<PathBuf>,
{
    let index_str = fs::read_to_string(index_path)
        .map_err(|e| EncoderError::ModelLoad(format!("{}: {e}", index_path.display())))?;
    let index: serde_json::Value = serde_json::from_str(&index_str)
        .map_err(|e| EncoderError::ModelLoad(format!("failed to parse weight index: {e}")))?;

    let mut names: HashSet<String> = HashSet::new();
    if let Some(weight_map) = index.get("weight_map").and_then(|v| v.as_object()) {
        for filename in weight_map.values() {
            if let Some(f) = filename.as_str() {
                names.insert(f.to_string());
            }
        }
    }

    let mut names: Vec<String> = names.into_iter().collect();
    names.sort();

    if names.is_empty() {
        return Err(EncoderError::ModelLoad(format!(
            "weight index lists no files: {}",
            index_path.display()
        )));
    }

    names.iter().map(|name| resolve(name)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn touch(dir: &Path, name: &str, contents: &str) {
        let mut f = File::create(dir.join(name)).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn resolves_single_file_layout() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), CONFIG_FILE, "{}");
        touch(dir.path(), TOKENIZER_FILE, "{}");
        touch(dir.path(), WEIGHTS_FILE, "");

        let artifacts = ModelArtifacts::from_dir(dir.path()).unwrap();
        assert_eq!(artifacts.weights.len(), 1);
        assert!(artifacts.index.is_none());
        assert!(artifacts.config.ends_with(CONFIG_FILE));
    }

    #[test]
    fn resolves_sharded_layout_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), CONFIG_FILE, "{}");
        touch(dir.path(), TOKENIZER_FILE, "{}");
        touch(
            dir.path(),
            WEIGHTS_INDEX_FILE,
            r#"{"weight_map":{"a.w":"model-00002-of-00002.safetensors","b.w":"model-00001-of-00002.safetensors","c.w":"model-00001-of-00002.safetensors"}}"#,
        );
        touch(dir.path(), "model-00001-of-00002.safetensors", "");
        touch(dir.path(), "model-00002-of-00002.safetensors", "");

        let artifacts = ModelArtifacts::from_dir(dir.path()).unwrap();
        assert_eq!(artifacts.weights.len(), 2);
        assert!(artifacts.weights[0].ends_with("model-00001-of-00002.safetensors"));
        assert!(artifacts.weights[1].ends_with("model-00002-of-00002.safetensors"));
        assert!(artifacts.index.is_some());
    }

    #[test]
    fn missing_weights_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), CONFIG_FILE, "{}");
        touch(dir.path(), TOKENIZER_FILE, "{}");

        let err = ModelArtifacts::from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, EncoderError::ModelLoad(_)));
    }

    #[test]
    fn missing_directory_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("never-created");
        let err = ModelArtifacts::from_dir(&gone).unwrap_err();
        assert!(matches!(err, EncoderError::ModelLoad(_)));
    }

    #[test]
    fn empty_weight_index_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), CONFIG_FILE, "{}");
        touch(dir.path(), TOKENIZER_FILE, "{}");
        touch(dir.path(), WEIGHTS_INDEX_FILE, r#"{"weight_map":{}}"#);

        let err = ModelArtifacts::from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, EncoderError::ModelLoad(_)));
    }

    #[test]
    fn missing_shard_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), CONFIG_FILE, "{}");
        touch(dir.path(), TOKENIZER_FILE, "{}");
        touch(
            dir.path(),
            WEIGHTS_INDEX_FILE,
            r#"{"weight_map":{"a.w":"model-00001-of-00001.safetensors"}}"#,
        );

        let err = ModelArtifacts::from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, EncoderError::ModelLoad(_)));
    }
}
