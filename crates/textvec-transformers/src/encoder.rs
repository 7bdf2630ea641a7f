//! The transformer encoder plugin.
//!
//! [`TransformerEncoder`] adapts a pretrained transformer checkpoint into
//! the [`TextEncoder`] contract. Construction is cheap; the heavy work
//! happens in `initialize`, which resolves the model name against the
//! registry, loads artifacts from the work directory, and falls back to
//! the remote hub when the local load fails for any reason.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use candle_core::{Device, Tensor};
use parking_lot::RwLock;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info, trace, warn};

use textvec_core::{EmbeddingMatrix, EncoderError, EncoderResult, TextEncoder};

use crate::artifacts::{self, ModelArtifacts};
use crate::backend::ModelBackend;
use crate::config::{DeviceKind, EncoderConfig};
use crate::padding::pad_batch;
use crate::pooling;
use crate::registry::{ModelKind, ModelSpec};

/// Internal state: nothing before `initialize`, everything after.
enum EncoderState {
    Unloaded,
    Loaded {
        backend: ModelBackend,
        tokenizer: Box<Tokenizer>,
        device: Device,
        /// Source paths of the loaded artifacts, kept for `persist`.
        artifacts: ModelArtifacts,
    },
}

/// Pretrained transformer checkpoint exposed as a text encoder.
///
/// # Lifecycle
///
/// `new` stores configuration only. `initialize` (once) loads model and
/// tokenizer: work directory first, remote hub as the single fallback.
/// `encode` tokenizes, zero-pads to the longest sequence in the batch,
/// runs one forward pass and pools the hidden states. `persist` writes
/// the loaded artifacts into the work directory so the next process
/// initializes without network access.
///
/// # Thread Safety
///
/// The model/tokenizer pair is written once under the state lock and only
/// read afterwards; `AtomicBool` answers `is_initialized` without taking
/// the lock.
pub struct TransformerEncoder {
    config: EncoderConfig,
    state: RwLock<EncoderState>,
    loaded: AtomicBool,
}

impl TransformerEncoder {
    /// Create an encoder from configuration. No registry lookup, no I/O.
    pub fn new(config: EncoderConfig) -> EncoderResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: RwLock::new(EncoderState::Unloaded),
            loaded: AtomicBool::new(false),
        })
    }

    /// Create an encoder with the default configuration.
    pub fn with_defaults() -> EncoderResult<Self> {
        Self::new(EncoderConfig::default())
    }

    /// Whether `initialize` has completed.
    pub fn is_initialized(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    /// The configuration this encoder was constructed with.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    fn model_kind(&self) -> EncoderResult<ModelKind> {
        ModelKind::from_name(&self.config.model).ok_or_else(|| EncoderError::UnknownModel {
            name: self.config.model.clone(),
        })
    }

    fn resolve_device(&self) -> Device {
        match self.config.device {
            DeviceKind::Cpu => Device::Cpu,
            DeviceKind::Cuda(ordinal) => match Device::cuda_if_available(ordinal) {
                Ok(dev) if dev.is_cuda() => {
                    info!(ordinal, "CUDA device detected, using GPU");
                    dev
                }
                Ok(_) => {
                    warn!(ordinal, "CUDA requested but not available, using CPU");
                    Device::Cpu
                }
                Err(e) => {
                    warn!(ordinal, error = %e, "failed to initialize CUDA, using CPU");
                    Device::Cpu
                }
            },
        }
    }

    fn load_pair(
        &self,
        spec: &ModelSpec,
        arts: ModelArtifacts,
        device: &Device,
    ) -> EncoderResult<(ModelBackend, Tokenizer, ModelArtifacts)> {
        let backend = ModelBackend::load(spec.arch, &arts, device)?;
        let mut tokenizer = Tokenizer::from_file(&arts.tokenizer)
            .map_err(|e| EncoderError::ModelLoad(format!("failed to load tokenizer: {e}")))?;
        if self.config.truncate {
            tokenizer
                .with_truncation(Some(TruncationParams {
                    max_length: spec.max_tokens,
                    ..Default::default()
                }))
                .map_err(|e| {
                    EncoderError::ModelLoad(format!("failed to configure truncation: {e}"))
                })?;
        }
        Ok((backend, tokenizer, arts))
    }

    fn load_local(
        &self,
        spec: &ModelSpec,
        device: &Device,
    ) -> EncoderResult<(ModelBackend, Tokenizer, ModelArtifacts)> {
        let arts = ModelArtifacts::from_dir(&self.config.work_dir)?;
        self.load_pair(spec, arts, device)
    }

    fn load_remote(
        &self,
        spec: &ModelSpec,
        device: &Device,
    ) -> EncoderResult<(ModelBackend, Tokenizer, ModelArtifacts)> {
        let arts = ModelArtifacts::from_hub(spec.hub_id, self.config.hub_cache_dir.as_deref())?;
        self.load_pair(spec, arts, device)
    }
}

#[async_trait]
impl TextEncoder for TransformerEncoder {
    /// Resolve the model name and load the model/tokenizer pair.
    ///
    /// Any local-load failure is treated the same way: one warning, one
    /// retry against the default pretrained weights on the remote hub.
    /// A hub failure propagates unmodified.
    async fn initialize(&self) -> EncoderResult<()> {
        if self.is_initialized() {
            warn!(model = %self.config.model, "encoder already initialized, skipping");
            return Ok(());
        }

        // Lookup failure surfaces before any I/O is attempted.
        let spec = self.model_kind()?.spec();
        let device = self.resolve_device();
        info!(
            model = spec.name,
            hub_id = spec.hub_id,
            work_dir = %self.config.work_dir.display(),
            "initializing transformer encoder"
        );

        let (backend, tokenizer, arts) = match self.load_local(&spec, &device) {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!(
                    model = spec.name,
                    work_dir = %self.config.work_dir.display(),
                    error = %err,
                    "cannot load model/tokenizer from work directory, downloading from hub"
                );
                self.load_remote(&spec, &device)?
            }
        };

        info!(
            model = spec.name,
            arch = %backend.arch(),
            dimension = spec.dimension,
            "transformer encoder ready"
        );

        let mut state = self.state.write();
        *state = EncoderState::Loaded {
            backend,
            tokenizer: Box::new(tokenizer),
            device,
            artifacts: arts,
        };
        self.loaded.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn encode(&self, texts: &[String]) -> EncoderResult<EmbeddingMatrix> {
        if texts.is_empty() {
            return Err(EncoderError::EmptyInput);
        }

        let state = self.state.read();
        let EncoderState::Loaded {
            backend,
            tokenizer,
            device,
            ..
        } = &*state
        else {
            return Err(EncoderError::NotInitialized);
        };

        // Tokenize each input independently.
        let mut ids = Vec::with_capacity(texts.len());
        for text in texts {
            let encoding = tokenizer
                .encode(text.as_str(), true)
                .map_err(|e| EncoderError::Tokenization(e.to_string()))?;
            ids.push(encoding.get_ids().to_vec());
        }

        // Zero-pad to the longest sequence and stack into one batch.
        let (rows, width) = pad_batch(ids);
        let batch = rows.len();
        let flat: Vec<u32> = rows.into_iter().flatten().collect();
        let input_ids = Tensor::from_vec(flat, (batch, width), device)
            .map_err(|e| EncoderError::Inference(e.to_string()))?;
        debug!(batch, width, "running forward pass");

        let hidden = backend.forward(&input_ids)?;
        debug!(shape = ?hidden.shape(), "hidden states");
        trace!(?hidden, "raw hidden states");

        let pooled = pooling::pool(&hidden, self.config.pooling)
            .and_then(|rows| {
                if self.config.normalize {
                    pooling::l2_normalize(&rows)
                } else {
                    Ok(rows)
                }
            })
            .map_err(|e| EncoderError::Inference(e.to_string()))?;

        pooled
            .to_vec2::<f32>()
            .map_err(|e| EncoderError::Inference(e.to_string()))
    }

    /// Write the loaded model and tokenizer artifacts into the work
    /// directory, so a fresh process can initialize from it without any
    /// network fetch.
    async fn persist(&self) -> EncoderResult<()> {
        let state = self.state.read();
        let EncoderState::Loaded {
            tokenizer,
            artifacts: arts,
            ..
        } = &*state
        else {
            return Err(EncoderError::NotInitialized);
        };

        let dir = &self.config.work_dir;
        fs::create_dir_all(dir)?;

        // The live tokenizer serializes itself; config and weights are
        // copied from their resolved source files.
        tokenizer
            .save(dir.join(artifacts::TOKENIZER_FILE), false)
            .map_err(|e| EncoderError::Persist(format!("failed to save tokenizer: {e}")))?;
        copy_as(&arts.config, dir, artifacts::CONFIG_FILE)?;
        if let Some(index) = &arts.index {
            copy_as(index, dir, artifacts::WEIGHTS_INDEX_FILE)?;
            for shard in &arts.weights {
                let name = shard
                    .file_name()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| {
                        EncoderError::Persist(format!("unnameable shard: {}", shard.display()))
                    })?
                    .to_string();
                copy_as(shard, dir, &name)?;
            }
        } else {
            copy_as(&arts.weights[0], dir, artifacts::WEIGHTS_FILE)?;
        }

        info!(work_dir = %dir.display(), "persisted model artifacts");
        Ok(())
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }

    /// Output width per the registry; 0 when the configured name is not a
    /// registry member (initialization will fail in that case anyway).
    fn dimension(&self) -> usize {
        ModelKind::from_name(&self.config.model).map_or(0, |k| k.spec().dimension)
    }

    fn max_tokens(&self) -> usize {
        ModelKind::from_name(&self.config.model).map_or(0, |k| k.spec().max_tokens)
    }
}

fn copy_as(src: &Path, dir: &Path, name: &str) -> EncoderResult<()> {
    let dst = dir.join(name);
    // Persisting an encoder that was loaded from this work directory must
    // not copy a file onto itself.
    if same_file(src, &dst) {
        return Ok(());
    }
    fs::copy(src, &dst).map_err(|e| {
        EncoderError::Persist(format!(
            "failed to copy {} -> {}: {e}",
            src.display(),
            dst.display()
        ))
    })?;
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unknown_model_config(dir: &Path) -> EncoderConfig {
        EncoderConfig {
            model: "transfo-xl-wt103".to_string(),
            work_dir: dir.join("never-created"),
            ..Default::default()
        }
    }

    #[test]
    fn construction_stores_the_name_without_lookup() {
        // An out-of-registry name constructs fine; only initialize fails.
        let tmp = tempfile::tempdir().unwrap();
        let encoder = TransformerEncoder::new(unknown_model_config(tmp.path())).unwrap();
        assert_eq!(encoder.model_name(), "transfo-xl-wt103");
        assert!(!encoder.is_initialized());
    }

    #[tokio::test]
    async fn unsupported_name_fails_lookup_before_io() {
        let tmp = tempfile::tempdir().unwrap();
        let config = unknown_model_config(tmp.path());
        let work_dir = config.work_dir.clone();
        let encoder = TransformerEncoder::new(config).unwrap();

        let err = encoder.initialize().await.unwrap_err();
        assert!(matches!(err, EncoderError::UnknownModel { name } if name == "transfo-xl-wt103"));
        // Lookup failed before any filesystem access.
        assert!(!work_dir.exists());
        assert!(!encoder.is_initialized());
    }

    #[tokio::test]
    async fn encode_before_initialize_is_an_error() {
        let encoder = TransformerEncoder::with_defaults().unwrap();
        let err = encoder.encode(&["hello".to_string()]).await.unwrap_err();
        assert!(matches!(err, EncoderError::NotInitialized));
    }

    #[tokio::test]
    async fn persist_before_initialize_is_an_error() {
        let encoder = TransformerEncoder::with_defaults().unwrap();
        let err = encoder.persist().await.unwrap_err();
        assert!(matches!(err, EncoderError::NotInitialized));
    }

    #[tokio::test]
    async fn empty_batch_is_an_error() {
        let encoder = TransformerEncoder::with_defaults().unwrap();
        let err = encoder.encode(&[]).await.unwrap_err();
        assert!(matches!(err, EncoderError::EmptyInput));
    }

    #[test]
    fn capability_getters_answer_from_the_registry() {
        let encoder = TransformerEncoder::with_defaults().unwrap();
        assert_eq!(encoder.dimension(), 768);
        assert_eq!(encoder.max_tokens(), 512);

        let tmp = tempfile::tempdir().unwrap();
        let unknown = TransformerEncoder::new(unknown_model_config(tmp.path())).unwrap();
        assert_eq!(unknown.dimension(), 0);
        assert_eq!(unknown.max_tokens(), 0);
    }

    #[test]
    fn copy_as_skips_self_copy() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, "{\"a\":1}").unwrap();

        copy_as(&path, tmp.path(), "config.json").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"a\":1}");
    }
}
