use anyhow::{anyhow, Result};
use candle_core::{DType, Device, Tensor};
use tokenizers::Tokenizer;

/// Model inputs for one batch: token ids, token type ids and attention mask,
/// each `[B, T]`.
pub struct BatchInputs {
    pub input_ids: Tensor,
    pub token_type_ids: Tensor,
    pub attention_mask: Tensor,
}

/// Tokenize `texts`, truncating to `max_len` and right-padding with `pad_id`
/// to the longest sequence in the batch.
pub fn tokenize_batch(tokenizer: &Tokenizer, texts: &[String], max_len: usize, pad_id: u32, device: &Device) -> Result<BatchInputs> {
    let mut rows = Vec::with_capacity(texts.len());
    for text in texts {
        let enc = tokenizer.encode(text.as_str(), true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
        let mut ids = enc.get_ids().to_vec();
        let mut mask = enc.get_attention_mask().to_vec();
        ids.truncate(max_len);
        mask.truncate(max_len);
        rows.push((ids, mask));
    }
    let seq_len = rows.iter().map(|(ids, _)| ids.len()).max().unwrap_or(0).max(1);

    let mut flat_ids = Vec::with_capacity(rows.len() * seq_len);
    let mut flat_mask = Vec::with_capacity(rows.len() * seq_len);
    for (ids, mask) in rows {
        let pad = seq_len - ids.len();
        flat_ids.extend(ids.into_iter().chain(std::iter::repeat(pad_id).take(pad)));
        flat_mask.extend(mask.into_iter().chain(std::iter::repeat(0u32).take(pad)));
    }
    let shape = (texts.len(), seq_len);
    Ok(BatchInputs {
        input_ids: Tensor::from_vec(flat_ids, shape, device)?,
        token_type_ids: Tensor::zeros(shape, DType::U32, device)?,
        attention_mask: Tensor::from_vec(flat_mask, shape, device)?,
    })
}
