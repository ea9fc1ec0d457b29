// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer token + user lookup). Protected
// handlers receive the resolved `CurrentUser` as a request extension and
// check capabilities before touching storage.

pub mod protected;
pub mod public;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use chrono::NaiveDate;
use serde_json::Value;

use crate::database::models::Entity;
use crate::error::ApiError;
use crate::validation::{self, Schema};

/// Raw request body; rejections are mapped to `INVALID_JSON` by [`payload`]
pub type JsonBody = Result<Json<Value>, JsonRejection>;

/// Unwrap a body that must be a JSON object
fn object(body: JsonBody) -> Result<Value, ApiError> {
    let Json(value) = body?;
    if !value.is_object() {
        return Err(ApiError::invalid_json("Request body must be a JSON object"));
    }
    Ok(value)
}

/// Validate and convert a request body into `T`
pub(crate) fn payload<T: Schema>(body: JsonBody) -> Result<T, ApiError> {
    Ok(validation::parse(object(body)?)?)
}

/// Like [`payload`], with `field` bound to a path parameter. A body that
/// names a different value for `field` is rejected.
pub(crate) fn payload_with<T: Schema>(body: JsonBody, field: &str, bound: &str) -> Result<T, ApiError> {
    let mut value = object(body)?;
    if let Some(map) = value.as_object_mut() {
        match map.get(field) {
            Some(Value::String(given)) if given != bound => {
                return Err(ApiError::invalid_field(field, "must match the path"));
            }
            _ => {
                map.insert(field.to_string(), Value::String(bound.to_string()));
            }
        }
    }
    Ok(validation::parse(value)?)
}

/// 404 for a missing row
pub(crate) fn found<T: Entity>(row: Option<T>, id: &str) -> Result<T, ApiError> {
    row.ok_or_else(|| ApiError::not_found(format!("{} {} not found", T::LABEL, id)))
}

pub(crate) fn path_date(field: &str, raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::invalid_field(field, "must be a calendar date (YYYY-MM-DD)"))
}
