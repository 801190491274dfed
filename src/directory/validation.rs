use crate::directory::model::NewInvestor;
use regex::Regex;
use std::sync::OnceLock;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name is required")]
    MissingName,
    #[error("type must not be blank")]
    BlankType,
    #[error("invalid state code: {0:?} (expected two uppercase letters)")]
    InvalidState(String),
    #[error("record {index}: {source}")]
    InBatch {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },
}

fn state_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{2}$").expect("state code pattern"))
}

/// 写入前的类型化校验：name 非空；type 若给出不能是空白；state 若给出必须是两位大写字母
pub fn validate_new_investor(inv: &NewInvestor) -> Result<(), ValidationError> {
    match inv.name.as_deref() {
        Some(name) if !name.trim().is_empty() => {}
        _ => return Err(ValidationError::MissingName),
    }
    if let Some(t) = inv.investor_type.as_deref() {
        if t.trim().is_empty() {
            return Err(ValidationError::BlankType);
        }
    }
    if let Some(state) = inv.state.as_deref() {
        if !state_code_re().is_match(state) {
            return Err(ValidationError::InvalidState(state.to_string()));
        }
    }
    Ok(())
}

pub fn validate_batch(batch: &[NewInvestor]) -> Result<(), ValidationError> {
    for (index, inv) in batch.iter().enumerate() {
        validate_new_investor(inv).map_err(|e| ValidationError::InBatch {
            index,
            source: Box::new(e),
        })?;
    }
    Ok(())
}
