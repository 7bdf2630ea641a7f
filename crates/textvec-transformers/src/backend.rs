//! Architecture-class dispatch over Candle models.
//!
//! Each registry entry names one of a closed set of architecture classes.
//! This module owns the mapping from class to concrete Candle model: how
//! its config parses, how its weights load, and how its forward pass is
//! invoked. Everything downstream sees a single `forward(input_ids)` that
//! yields the `[batch, seq, hidden]` hidden-state sequence.

use std::fs;

use candle_core::{DType, Device, Module, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use candle_transformers::models::distilbert::{Config as DistilBertConfig, DistilBertModel};
use candle_transformers::models::jina_bert::{
    BertModel as JinaBertModel, Config as JinaBertConfig,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use textvec_core::{EncoderError, EncoderResult};

use crate::artifacts::ModelArtifacts;
use crate::registry::ModelArch;

/// A constructed model, tagged by architecture class.
pub enum ModelBackend {
    Bert(BertModel),
    DistilBert(DistilBertModel),
    JinaBert(JinaBertModel),
}

impl ModelBackend {
    /// Build the model for `arch` from resolved artifacts.
    ///
    /// Weights are memory-mapped; the architecture config is parsed with
    /// the model's own serde definition, so a malformed `config.json`
    /// fails here rather than inside the forward pass.
    pub fn load(arch: ModelArch, artifacts: &ModelArtifacts, device: &Device) -> EncoderResult<Self> {
        debug!(%arch, files = artifacts.weights.len(), "loading model weights");
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&artifacts.weights, DType::F32, device).map_err(
                |e| EncoderError::ModelLoad(format!("failed to mmap safetensors: {e}")),
            )?
        };

        let backend = match arch {
            ModelArch::Bert => {
                let config: BertConfig = parse_config(artifacts)?;
                let model = BertModel::load(vb, &config)
                    .map_err(|e| EncoderError::ModelLoad(format!("bert: {e}")))?;
                Self::Bert(model)
            }
            ModelArch::DistilBert => {
                let config: DistilBertConfig = parse_config(artifacts)?;
                let model = DistilBertModel::load(vb, &config)
                    .map_err(|e| EncoderError::ModelLoad(format!("distilbert: {e}")))?;
                Self::DistilBert(model)
            }
            ModelArch::JinaBert => {
                let config: JinaBertConfig = parse_config(artifacts)?;
                let model = JinaBertModel::new(vb, &config)
                    .map_err(|e| EncoderError::ModelLoad(format!("jina-bert: {e}")))?;
                Self::JinaBert(model)
            }
        };
        Ok(backend)
    }

    /// Architecture class of this backend.
    pub fn arch(&self) -> ModelArch {
        match self {
            Self::Bert(_) => ModelArch::Bert,
            Self::DistilBert(_) => ModelArch::DistilBert,
            Self::JinaBert(_) => ModelArch::JinaBert,
        }
    }

    /// Run the forward pass over a `[batch, seq]` id tensor and return the
    /// `[batch, seq, hidden]` hidden-state sequence.
    ///
    /// No attention mask is constructed: padding ids attend like real
    /// tokens. DistilBert's signature requires a mask tensor, so it gets
    /// an all-zeros "mask nothing" tensor with the same semantics.
    pub fn forward(&self, input_ids: &Tensor) -> EncoderResult<Tensor> {
        self.forward_hidden(input_ids)
            .map_err(|e| EncoderError::Inference(e.to_string()))
    }

    fn forward_hidden(&self, input_ids: &Tensor) -> candle_core::Result<Tensor> {
        match self {
            Self::Bert(model) => {
                let token_type_ids = input_ids.zeros_like()?;
                model.forward(input_ids, &token_type_ids, None)
            }
            Self::DistilBert(model) => {
                let (_batch, seq_len) = input_ids.dims2()?;
                let mask = Tensor::zeros((seq_len, seq_len), DType::U8, input_ids.device())?;
                model.forward(input_ids, &mask)
            }
            Self::JinaBert(model) => model.forward(input_ids),
        }
    }
}

fn parse_config<C: DeserializeOwned>(artifacts: &ModelArtifacts) -> EncoderResult<C> {
    let config_str = fs::read_to_string(&artifacts.config)
        .map_err(|e| EncoderError::ModelLoad(format!("{}: {e}", artifacts.config.display())))?;
    serde_json::from_str(&config_str)
        .map_err(|e| EncoderError::ModelLoad(format!("failed to parse config.json: {e}")))
}
