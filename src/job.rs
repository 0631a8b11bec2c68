//! # Job Normalizer
//!
//! Turns an inbound request into a validated [`PrintJob`].
//!
//! ## Mode Selection
//!
//! | `qr` field | `text` field | Result |
//! |------------|--------------|--------|
//! | absent | present | `TextOnly` |
//! | absent | absent | `InvalidRequest` |
//! | present, non-empty | present | `QrAndText` with that text |
//! | present, non-empty | absent or empty | `QrAndText`, text = qr |
//! | present, empty | any | `InvalidRequest` |
//!
//! Absence selects `TextOnly`, emptiness never does. A JSON `null` counts as
//! absent.
//!
//! ## Request Sources
//!
//! ```text
//! query has text/qr?  ── yes ──► Query
//!        │ no
//! body empty?         ── yes ──► Query (empty → InvalidRequest)
//!        │ no
//! application/json?   ── yes ──► Json
//!        │ no
//! a JSON object?      ── yes ──► Json
//!        │ no
//!        └──────────────────────► PlainText (TextOnly)
//! ```

use serde::Deserialize;
use serde_json::Value;

use crate::error::JobError;
use crate::format::{self, FormatOptions, TextValue};

/// Longest accepted query parameter value, matching the body size limit.
pub const MAX_QUERY_VALUE_BYTES: usize = 10 * 1024;

/// Layout mode of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobMode {
    /// QR code on the left half, text on the right half
    QrAndText,
    /// Text across the full paper width
    TextOnly,
}

/// Canonical, validated description of one print request.
///
/// The mode is derived from the presence of a QR payload, so a job can never
/// be `QrAndText` without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintJob {
    text: String,
    qr_payload: Option<String>,
}

impl PrintJob {
    /// Create a full-width text job.
    pub fn text_only(text: impl Into<String>) -> Result<Self, JobError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(JobError::InvalidRequest("\"text\" must not be empty".to_string()));
        }
        Ok(Self { text, qr_payload: None })
    }

    /// Create a QR + text job. Missing or blank text falls back to the QR
    /// payload.
    pub fn qr_and_text(qr: impl Into<String>, text: Option<String>) -> Result<Self, JobError> {
        let qr = qr.into();
        if qr.trim().is_empty() {
            return Err(JobError::InvalidRequest("\"qr\" must not be empty".to_string()));
        }
        let text = text
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| qr.clone());
        Ok(Self {
            text,
            qr_payload: Some(qr),
        })
    }

    pub fn mode(&self) -> JobMode {
        if self.qr_payload.is_some() {
            JobMode::QrAndText
        } else {
            JobMode::TextOnly
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn qr_payload(&self) -> Option<&str> {
        self.qr_payload.as_deref()
    }
}

/// URL query parameters of a print request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryParams {
    pub text: Option<String>,
    pub qr: Option<String>,
}

impl QueryParams {
    /// True when neither `text` nor `qr` was supplied.
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.qr.is_none()
    }
}

/// A request payload, classified by where its fields come from.
#[derive(Debug, Clone)]
pub enum JobRequest<'a> {
    Query(QueryParams),
    /// A JSON body, by content type or by shape
    Json(&'a [u8]),
    /// Any other body; printed verbatim
    PlainText(&'a [u8]),
}

impl<'a> JobRequest<'a> {
    /// Pick the request source: query parameters win when they carry `text`
    /// or `qr`, then a JSON body, then a raw body.
    ///
    /// A body without a JSON content type is still read as JSON when it is a
    /// well-formed object, as sent by `curl -d '{...}'`.
    pub fn select(query: QueryParams, content_type: Option<&str>, body: &'a [u8]) -> Self {
        if !query.is_empty() || body.is_empty() {
            return JobRequest::Query(query);
        }
        if content_type.is_some_and(is_json) || is_json_object(body) {
            JobRequest::Json(body)
        } else {
            JobRequest::PlainText(body)
        }
    }
}

fn is_json_object(body: &[u8]) -> bool {
    body.trim_ascii_start().starts_with(b"{")
        && serde_json::from_slice::<Value>(body).is_ok_and(|value| value.is_object())
}

fn is_json(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case("application/json")
        || essence.to_ascii_lowercase().ends_with("+json")
}

/// Builds [`PrintJob`]s from requests.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    format_options: FormatOptions,
}

impl Normalizer {
    pub fn new(format_options: FormatOptions) -> Self {
        Self { format_options }
    }

    /// Normalize any request source into a job.
    ///
    /// ## Errors
    ///
    /// - [`JobError::InvalidRequest`]: missing fields, empty `qr`, malformed
    ///   JSON, non-UTF-8 body
    /// - [`JobError::UnsupportedValue`]: structured `text` that cannot be
    ///   formatted
    pub fn normalize(&self, request: JobRequest<'_>) -> Result<PrintJob, JobError> {
        match request {
            JobRequest::Query(query) => self.normalize_query(query),
            JobRequest::Json(body) => {
                let value: Value = serde_json::from_slice(body)
                    .map_err(|e| JobError::InvalidRequest(format!("invalid JSON body: {}", e)))?;
                self.normalize_json(&value)
            }
            JobRequest::PlainText(body) => {
                let text = std::str::from_utf8(body)
                    .map_err(|_| JobError::InvalidRequest("body must be valid UTF-8".to_string()))?;
                PrintJob::text_only(text)
            }
        }
    }

    pub fn normalize_query(&self, query: QueryParams) -> Result<PrintJob, JobError> {
        for (name, value) in [("text", &query.text), ("qr", &query.qr)] {
            if value.as_ref().is_some_and(|v| v.len() > MAX_QUERY_VALUE_BYTES) {
                return Err(JobError::InvalidRequest(format!(
                    "query parameter \"{}\" is longer than {} bytes",
                    name, MAX_QUERY_VALUE_BYTES
                )));
            }
        }

        match query.qr {
            Some(qr) => PrintJob::qr_and_text(qr, query.text),
            None => match query.text {
                Some(text) => PrintJob::text_only(text),
                None => Err(missing_fields()),
            },
        }
    }

    /// Normalize a decoded JSON body. The top level must be an object.
    pub fn normalize_json(&self, value: &Value) -> Result<PrintJob, JobError> {
        let Value::Object(fields) = value else {
            return Err(JobError::InvalidRequest("JSON body must be an object".to_string()));
        };

        let text = fields.get("text").filter(|v| !v.is_null());
        let qr = fields.get("qr").filter(|v| !v.is_null());

        match qr {
            Some(qr) => {
                let qr = qr_from_json(qr)?;
                let text = text.map(|t| self.text_from_json(t)).transpose()?;
                PrintJob::qr_and_text(qr, text)
            }
            None => {
                let text = text.ok_or_else(missing_fields)?;
                PrintJob::text_only(self.text_from_json(text)?)
            }
        }
    }

    /// Strings pass through untouched; objects and arrays go through the
    /// text formatter.
    fn text_from_json(&self, value: &Value) -> Result<String, JobError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Object(_) | Value::Array(_) => {
                let formatted = format::format_value(&TextValue::from(value), &self.format_options)?;
                Ok(formatted.to_string())
            }
            scalar => Ok(scalar.to_string()),
        }
    }
}

fn qr_from_json(value: &Value) -> Result<String, JobError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(JobError::InvalidRequest("\"qr\" must be a string".to_string())),
    }
}

fn missing_fields() -> JobError {
    JobError::InvalidRequest("request must contain \"text\" and/or \"qr\"".to_string())
}

/// Normalize a request with default formatting options.
pub fn normalize(request: JobRequest<'_>) -> Result<PrintJob, JobError> {
    Normalizer::default().normalize(request)
}
