/*!
 * Stage adapters over the batch dispatcher.
 *
 * Each stage is a thin `BatchTransform` specialization: it renders a batch
 * into a prompt, calls the LLM collaborator, parses the response back into a
 * payload, and applies its stage-specific validation. Every dispatcher
 * guarantee (ordering, retry, reflect, cancellation) is inherited unchanged.
 */

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::dispatch::batch::Batch;
use crate::errors::BatchError;

pub mod optimize;
pub mod split;
pub mod translate;

pub use optimize::OptimizeStage;
pub use split::SplitStage;
pub use translate::TranslateStage;

/// Render a batch as the JSON object sent to the collaborator:
/// `{"12": "text", ...}` keyed by original document index.
pub(crate) fn batch_json(batch: &Batch) -> String {
    let mut object = Map::new();
    for segment in &batch.segments {
        object.insert(segment.index.to_string(), Value::String(segment.text.clone()));
    }
    Value::Object(object).to_string()
}

/// Render an index->text mapping as a JSON object with string keys
pub(crate) fn map_json(map: &BTreeMap<usize, String>) -> String {
    let mut object = Map::new();
    for (index, text) in map {
        object.insert(index.to_string(), Value::String(text.clone()));
    }
    Value::Object(object).to_string()
}

/// Strip a surrounding markdown code fence, which models add despite
/// instructions
pub(crate) fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening fence line.
    let inner = inner.find('\n').map(|i| &inner[i + 1..]).unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Parse a collaborator response into an index->text mapping.
///
/// Malformed JSON, non-object shapes, or non-numeric keys are validation
/// failures, which the dispatcher treats as retry-eligible.
pub(crate) fn parse_text_map(raw: &str) -> Result<BTreeMap<usize, String>, BatchError> {
    let body = strip_code_fences(raw);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| BatchError::Validation(format!("response is not valid JSON: {}", e)))?;

    let object = value.as_object()
        .ok_or_else(|| BatchError::Validation("response is not a JSON object".to_string()))?;

    let mut out = BTreeMap::new();
    for (key, value) in object {
        let index: usize = key.trim().parse()
            .map_err(|_| BatchError::Validation(format!("non-numeric segment key: {:?}", key)))?;
        let text = value.as_str()
            .ok_or_else(|| BatchError::Validation(format!("non-string value for segment {}", index)))?;
        if out.insert(index, text.to_string()).is_some() {
            return Err(BatchError::Validation(format!("duplicate result for segment {}", index)));
        }
    }

    Ok(out)
}

/// Parse a collaborator response into a list of sentences
pub(crate) fn parse_sentences(raw: &str) -> Result<Vec<String>, BatchError> {
    let body = strip_code_fences(raw);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| BatchError::Validation(format!("response is not valid JSON: {}", e)))?;

    let array = value.as_array()
        .ok_or_else(|| BatchError::Validation("response is not a JSON array".to_string()))?;

    let mut out = Vec::with_capacity(array.len());
    for item in array {
        let sentence = item.as_str()
            .ok_or_else(|| BatchError::Validation("non-string sentence in response".to_string()))?;
        if !sentence.trim().is_empty() {
            out.push(sentence.trim().to_string());
        }
    }

    if out.is_empty() {
        return Err(BatchError::Validation("response contained no sentences".to_string()));
    }

    Ok(out)
}

/// Require one non-empty string per submitted index. The dispatcher checks
/// cardinality again; stages use this to reject blank rewrites early.
pub(crate) fn require_non_empty(map: &BTreeMap<usize, String>) -> Result<(), BatchError> {
    for (index, text) in map {
        if text.trim().is_empty() {
            return Err(BatchError::Validation(format!("empty result for segment {}", index)));
        }
    }
    Ok(())
}
