// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! OCR request parsing

use serde_json::Value;

use crate::api::errors::ApiError;

/// Request for OCR processing
#[derive(Debug, Clone, PartialEq)]
pub struct OcrRequest {
    /// Base64-encoded image data, optionally a `data:` URL
    pub image: String,
}

impl OcrRequest {
    /// Parse a raw request body
    ///
    /// A body that is not a JSON object, or has no `image` key, counts as
    /// missing image data. An `image` that is present but not a string
    /// (including `null`) is an undecodable image.
    pub fn from_slice(body: &[u8]) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::MissingImage)?;

        match value.get("image") {
            None => Err(ApiError::MissingImage),
            Some(Value::String(image)) => Ok(Self {
                image: image.clone(),
            }),
            Some(_) => Err(ApiError::InvalidImage(
                "image field must be a base64 string".to_string(),
            )),
        }
    }
}
