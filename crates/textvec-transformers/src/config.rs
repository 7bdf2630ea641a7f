//! Encoder configuration.
//!
//! Fail-fast configuration in the usual shape: a `Default` suitable for
//! development, explicit `validate()`, optional TOML file loading, and
//! environment overrides applied last.
//!
//! # TOML Structure
//!
//! ```toml
//! model = "bert-base-uncased"
//! work_dir = "models/encoder"
//! device = "cpu"            # or "cuda:0"
//! pooling = "mean"          # or "cls"
//! normalize = false
//! truncate = true
//! ```

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use textvec_core::{EncoderError, EncoderResult};

use crate::pooling::Pooling;

/// Compute device selection, written as `cpu`, `cuda`, or `cuda:N`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum DeviceKind {
    /// CPU inference.
    #[default]
    Cpu,
    /// CUDA device by ordinal; degrades to CPU with a warning when the
    /// device is unavailable.
    Cuda(usize),
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda(ordinal) => write!(f, "cuda:{ordinal}"),
        }
    }
}

impl FromStr for DeviceKind {
    type Err = EncoderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cpu" => Ok(Self::Cpu),
            "cuda" => Ok(Self::Cuda(0)),
            other => other
                .strip_prefix("cuda:")
                .and_then(|ordinal| ordinal.parse().ok())
                .map(Self::Cuda)
                .ok_or_else(|| {
                    EncoderError::InvalidConfig(format!("unknown device '{other}'"))
                }),
        }
    }
}

impl From<DeviceKind> for String {
    fn from(kind: DeviceKind) -> Self {
        kind.to_string()
    }
}

impl TryFrom<String> for DeviceKind {
    type Error = EncoderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Configuration for [`TransformerEncoder`](crate::TransformerEncoder).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Registry key of the model to load. Membership is checked at
    /// initialization, not here.
    pub model: String,

    /// Work directory: preferred load source and persistence target.
    /// Owned by the host, not by the encoder.
    pub work_dir: PathBuf,

    /// Compute device.
    pub device: DeviceKind,

    /// How hidden-state sequences reduce to one row per input.
    pub pooling: Pooling,

    /// L2-normalize output rows.
    pub normalize: bool,

    /// Truncate inputs to the model's token limit. When off, over-long
    /// inputs fail inside the forward pass.
    pub truncate: bool,

    /// Root of the remote hub download cache. `None` uses the hub
    /// library's default location.
    pub hub_cache_dir: Option<PathBuf>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            model: "bert-base-uncased".to_string(),
            work_dir: PathBuf::from("models/encoder"),
            device: DeviceKind::Cpu,
            pooling: Pooling::Mean,
            normalize: false,
            truncate: true,
            hub_cache_dir: None,
        }
    }
}

impl EncoderConfig {
    /// Reject configurations that could never initialize.
    pub fn validate(&self) -> EncoderResult<()> {
        if self.model.trim().is_empty() {
            return Err(EncoderError::InvalidConfig(
                "model name must not be empty".to_string(),
            ));
        }
        if self.work_dir.as_os_str().is_empty() {
            return Err(EncoderError::InvalidConfig(
                "work_dir must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Load and validate a configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> EncoderResult<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| EncoderError::InvalidConfig(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `TEXTVEC_*` environment overrides on top of this
    /// configuration. Unset variables leave fields untouched; an
    /// unparseable device value is ignored with a debug log rather than
    /// silently selecting a different device.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = env::var("TEXTVEC_MODEL") {
            debug!(%model, "overriding model from TEXTVEC_MODEL");
            self.model = model;
        }
        if let Ok(dir) = env::var("TEXTVEC_WORK_DIR") {
            debug!(%dir, "overriding work_dir from TEXTVEC_WORK_DIR");
            self.work_dir = PathBuf::from(dir);
        }
        if let Ok(device) = env::var("TEXTVEC_DEVICE") {
            match device.parse::<DeviceKind>() {
                Ok(kind) => {
                    debug!(%device, "overriding device from TEXTVEC_DEVICE");
                    self.device = kind;
                }
                Err(_) => debug!(%device, "ignoring unparseable TEXTVEC_DEVICE"),
            }
        }
        if let Ok(dir) = env::var("TEXTVEC_HUB_CACHE") {
            debug!(%dir, "overriding hub_cache_dir from TEXTVEC_HUB_CACHE");
            self.hub_cache_dir = Some(PathBuf::from(dir));
        }
        self
    }
}
