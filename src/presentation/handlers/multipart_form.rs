use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use bytes::Bytes;

use super::error::ApiError;

/// The single file part of a form.
#[derive(Debug)]
pub struct FilePart {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// A multipart body read into memory: one named file part plus text fields.
#[derive(Debug, Default)]
pub struct MultipartForm {
    file: Option<FilePart>,
    fields: HashMap<String, String>,
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart, file_field: &str) -> Result<Self, ApiError> {
        let mut form = MultipartForm::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == file_field {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(multipart_error)?;
                form.file = Some(FilePart {
                    file_name,
                    content_type,
                    data,
                });
            } else {
                let value = field.text().await.map_err(multipart_error)?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    pub fn take_file(&mut self, field: &'static str) -> Result<FilePart, ApiError> {
        self.file.take().ok_or(ApiError::MissingField(field))
    }

    /// A text field, `None` when absent or blank.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn require(&self, field: &'static str) -> Result<&str, ApiError> {
        self.text(field).ok_or(ApiError::MissingField(field))
    }

    pub fn parse<T: FromStr>(&self, field: &'static str) -> Result<Option<T>, ApiError> {
        self.text(field)
            .map(|raw| {
                raw.parse::<T>()
                    .map_err(|_| ApiError::invalid(field, format!("'{}' is not a valid number", raw)))
            })
            .transpose()
    }

    pub fn flag(&self, field: &str) -> bool {
        matches!(self.text(field), Some(v) if v.eq_ignore_ascii_case("true") || v == "1")
    }
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(format!("Request body too large: {}", err.body_text()))
    } else {
        ApiError::invalid("body", format!("Failed to read multipart: {}", err.body_text()))
    }
}
