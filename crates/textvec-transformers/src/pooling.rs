//! Reduction of hidden-state sequences to per-input vectors.
//!
//! The forward pass yields `[batch, seq, hidden]`; the plugin contract
//! promises one row per input. Pooling bridges the two. Because encoding
//! builds no attention mask, mean pooling averages padding positions along
//! with real tokens; that is the observed behavior of this encoder family,
//! kept as-is.

use candle_core::Tensor;
use serde::{Deserialize, Serialize};

/// How a hidden-state sequence becomes one vector per input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pooling {
    /// Mean over the sequence axis.
    #[default]
    Mean,
    /// First (classifier) token only.
    Cls,
}

/// Reduce `[batch, seq, hidden]` to `[batch, hidden]`.
pub(crate) fn pool(hidden: &Tensor, pooling: Pooling) -> candle_core::Result<Tensor> {
    match pooling {
        Pooling::Mean => hidden.mean(1),
        Pooling::Cls => hidden.narrow(1, 0, 1)?.squeeze(1),
    }
}

/// Scale each row to unit L2 norm.
pub(crate) fn l2_normalize(rows: &Tensor) -> candle_core::Result<Tensor> {
    rows.broadcast_div(&rows.sqr()?.sum_keepdim(1)?.sqrt()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    // [batch=2, seq=2, hidden=2]
    fn hidden() -> Tensor {
        Tensor::from_vec(
            vec![1.0f32, 2.0, 3.0, 4.0, 10.0, 20.0, 30.0, 40.0],
            (2, 2, 2),
            &Device::Cpu,
        )
        .unwrap()
    }

    fn assert_close(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-5, "{a} != {e}");
        }
    }

    #[test]
    fn mean_pool_averages_the_sequence_axis() {
        let pooled = pool(&hidden(), Pooling::Mean).unwrap();
        assert_eq!(pooled.dims(), &[2, 2]);
        let rows = pooled.to_vec2::<f32>().unwrap();
        assert_close(&rows[0], &[2.0, 3.0]);
        assert_close(&rows[1], &[20.0, 30.0]);
    }

    #[test]
    fn cls_pool_takes_the_first_token() {
        let pooled = pool(&hidden(), Pooling::Cls).unwrap();
        assert_eq!(pooled.dims(), &[2, 2]);
        let rows = pooled.to_vec2::<f32>().unwrap();
        assert_close(&rows[0], &[1.0, 2.0]);
        assert_close(&rows[1], &[10.0, 20.0]);
    }

    #[test]
    fn l2_normalize_yields_unit_rows() {
        let rows = Tensor::from_vec(vec![3.0f32, 4.0, 0.0, 5.0], (2, 2), &Device::Cpu).unwrap();
        let normalized = l2_normalize(&rows).unwrap().to_vec2::<f32>().unwrap();
        assert_close(&normalized[0], &[0.6, 0.8]);
        assert_close(&normalized[1], &[0.0, 1.0]);
        for row in &normalized {
            let norm: f32 = row.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn pooling_serde_round_trips() {
        let json = serde_json::to_string(&Pooling::Cls).unwrap();
        assert_eq!(json, "\"cls\"");
        let p: Pooling = serde_json::from_str("\"mean\"").unwrap();
        assert_eq!(p, Pooling::Mean);
    }
}
