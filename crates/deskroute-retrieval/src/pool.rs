//! Pooling and vector normalization

use candle_core::{DType, Tensor};
use deskroute_core::{Error, Result};

/// Attention-masked mean over the token axis followed by L2 normalization.
///
/// `hidden` is `[batch, tokens, hidden]`, `attention_mask` is `[batch, tokens]`;
/// the result is `[batch, hidden]`.
pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let pooled = (|| -> candle_core::Result<Tensor> {
        let mask = attention_mask
            .to_device(hidden.device())?
            .to_dtype(hidden.dtype())?;
        let mask_3d = mask.unsqueeze(2)?.broadcast_as(hidden.shape())?;
        let sum = (hidden * &mask_3d)?.sum(1)?;
        let lengths = mask.sum_keepdim(1)?.clamp(1.0, f64::MAX)?;
        let mean = sum.broadcast_div(&lengths)?;

        let eps = match hidden.dtype() {
            DType::F16 | DType::BF16 => 1e-6,
            _ => 1e-12,
        };
        let norm = (mean.sqr()?.sum_keepdim(1)?.sqrt()? + eps)?;
        mean.broadcast_div(&norm)
    })();

    pooled.map_err(|e| Error::embedding(format!("Pooling failed: {}", e)))
}

/// Scale `v` to unit length in place; zero vectors are left unchanged
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Dot product of two equal-length vectors
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
