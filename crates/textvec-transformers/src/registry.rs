//! The closed registry of supported pretrained configurations.
//!
//! Model selection is a fixed lookup table: each supported identifier maps
//! to exactly one (architecture class, default pretrained weights) pair.
//! Anything outside this set fails lookup before any I/O happens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use textvec_core::EncoderError;

/// Architecture classes the backend knows how to construct.
///
/// Each class corresponds to one Candle model/config pair; checkpoints that
/// share an architecture share a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelArch {
    /// BERT encoder with absolute position embeddings.
    Bert,
    /// Distilled BERT (no token type embeddings).
    DistilBert,
    /// Jina BERT v2 with ALiBi attention (long context).
    JinaBert,
}

impl fmt::Display for ModelArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bert => write!(f, "bert"),
            Self::DistilBert => write!(f, "distilbert"),
            Self::JinaBert => write!(f, "jina-bert"),
        }
    }
}

/// One row of the registry table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    /// Registry key used at construction time.
    pub name: &'static str,
    /// Default pretrained weights identifier on the remote hub.
    pub hub_id: &'static str,
    /// Architecture class used to construct the model.
    pub arch: ModelArch,
    /// Hidden width of the returned vectors.
    pub dimension: usize,
    /// Position embedding limit, used for tokenizer truncation.
    pub max_tokens: usize,
}

/// Identifies one of the seven supported pretrained configurations.
///
/// # Variants
///
/// | Variant | Hub checkpoint | Arch | Dim |
/// |---------|----------------|------|-----|
/// | BertBaseUncased | bert-base-uncased | Bert | 768 |
/// | AllMiniLmL6V2 | sentence-transformers/all-MiniLM-L6-v2 | Bert | 384 |
/// | AllMiniLmL12V2 | sentence-transformers/all-MiniLM-L12-v2 | Bert | 384 |
/// | BgeSmallEnV15 | BAAI/bge-small-en-v1.5 | Bert | 384 |
/// | BgeBaseEnV15 | BAAI/bge-base-en-v1.5 | Bert | 768 |
/// | DistilBertBaseUncased | distilbert-base-uncased | DistilBert | 768 |
/// | JinaEmbeddingsV2BaseEn | jinaai/jina-embeddings-v2-base-en | JinaBert | 768 |
///
/// # Example
///
/// ```rust
/// use textvec_transformers::ModelKind;
///
/// let kind = ModelKind::from_name("bert-base-uncased").unwrap();
/// assert_eq!(kind.spec().dimension, 768);
/// assert!(ModelKind::from_name("not-a-model").is_none());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    /// Original BERT base, uncased vocabulary. The default.
    #[default]
    #[serde(rename = "bert-base-uncased")]
    BertBaseUncased,
    /// 6-layer MiniLM sentence encoder.
    #[serde(rename = "all-minilm-l6-v2")]
    AllMiniLmL6V2,
    /// 12-layer MiniLM sentence encoder.
    #[serde(rename = "all-minilm-l12-v2")]
    AllMiniLmL12V2,
    /// BGE small English retrieval encoder.
    #[serde(rename = "bge-small-en-v1.5")]
    BgeSmallEnV15,
    /// BGE base English retrieval encoder.
    #[serde(rename = "bge-base-en-v1.5")]
    BgeBaseEnV15,
    /// Distilled BERT base, uncased vocabulary.
    #[serde(rename = "distilbert-base-uncased")]
    DistilBertBaseUncased,
    /// Jina v2 long-context English embedder.
    #[serde(rename = "jina-embeddings-v2-base-en")]
    JinaEmbeddingsV2BaseEn,
}

impl ModelKind {
    /// Resolve this kind to its registry row.
    #[must_use]
    pub const fn spec(self) -> ModelSpec {
        match self {
            Self::BertBaseUncased => ModelSpec {
                name: "bert-base-uncased",
                hub_id: "bert-base-uncased",
                arch: ModelArch::Bert,
                dimension: 768,
                max_tokens: 512,
            },
            Self::AllMiniLmL6V2 => ModelSpec {
                name: "all-minilm-l6-v2",
                hub_id: "sentence-transformers/all-MiniLM-L6-v2",
                arch: ModelArch::Bert,
                dimension: 384,
                max_tokens: 512,
            },
            Self::AllMiniLmL12V2 => ModelSpec {
                name: "all-minilm-l12-v2",
                hub_id: "sentence-transformers/all-MiniLM-L12-v2",
                arch: ModelArch::Bert,
                dimension: 384,
                max_tokens: 512,
            },
            Self::BgeSmallEnV15 => ModelSpec {
                name: "bge-small-en-v1.5",
                hub_id: "BAAI/bge-small-en-v1.5",
                arch: ModelArch::Bert,
                dimension: 384,
                max_tokens: 512,
            },
            Self::BgeBaseEnV15 => ModelSpec {
                name: "bge-base-en-v1.5",
                hub_id: "BAAI/bge-base-en-v1.5",
                arch: ModelArch::Bert,
                dimension: 768,
                max_tokens: 512,
            },
            Self::DistilBertBaseUncased => ModelSpec {
                name: "distilbert-base-uncased",
                hub_id: "distilbert-base-uncased",
                arch: ModelArch::DistilBert,
                dimension: 768,
                max_tokens: 512,
            },
            Self::JinaEmbeddingsV2BaseEn => ModelSpec {
                name: "jina-embeddings-v2-base-en",
                hub_id: "jinaai/jina-embeddings-v2-base-en",
                arch: ModelArch::JinaBert,
                dimension: 768,
                max_tokens: 8192,
            },
        }
    }

    /// Registry key for this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.spec().name
    }

    /// Look up a registry key. `None` means the name is outside the closed
    /// set; callers surface that as [`EncoderError::UnknownModel`].
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.name() == name)
    }

    /// All seven supported kinds, in table order.
    #[must_use]
    pub const fn all() -> &'static [ModelKind] {
        &[
            Self::BertBaseUncased,
            Self::AllMiniLmL6V2,
            Self::AllMiniLmL12V2,
            Self::BgeSmallEnV15,
            Self::BgeBaseEnV15,
            Self::DistilBertBaseUncased,
            Self::JinaEmbeddingsV2BaseEn,
        ]
    }
}

// Display writes the registry key so logs and CLI output round-trip with
// `FromStr`.
impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = EncoderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| EncoderError::UnknownModel {
            name: s.to_string(),
        })
    }
}
