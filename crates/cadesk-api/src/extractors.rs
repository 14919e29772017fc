//! JSON body helpers.
//!
//! Handlers take `Result<Json<T>, JsonRejection>` so decode failures come
//! back in the structured error body instead of axum's plain-text default.

use axum::extract::rejection::JsonRejection;
use axum::Json;
use cadesk_core::Validate;

use crate::error::AppError;

/// Unwrap a JSON body, mapping decode failures to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// [`extract_json`], then run the record's [`Validate`] rules.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate()?;
    Ok(value)
}
