use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::{AppError, ErrorKind};

pub const MAX_URL_LENGTH: usize = 2048;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("invalid URL '{url}': {reason}")]
    Invalid { url: String, reason: String },
}

/// Absolute http(s) URL with a host and no embedded credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUrl(Url);

impl ValidatedUrl {
    pub fn new(url: &str) -> Result<Self, UrlError> {
        let invalid = |reason: &str| UrlError::Invalid {
            url: truncate_url(url),
            reason: reason.to_string(),
        };

        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(invalid("URL cannot be empty"));
        }
        if trimmed.len() > MAX_URL_LENGTH {
            return Err(invalid("URL exceeds maximum length"));
        }

        let parsed = Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid("only 'http' and 'https' are allowed"));
        }
        if parsed.host_str().is_none() {
            return Err(invalid("URL must have a host"));
        }
        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(invalid("credentials in URL are not allowed"));
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(invalid("base URL cannot carry a query or fragment"));
        }

        Ok(Self(parsed))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Appends percent-encoded path segments, ignoring a trailing slash on
    /// the base.
    #[must_use]
    pub fn join_segments(&self, segments: &[&str]) -> String {
        let mut url = self.0.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.into()
    }
}

fn truncate_url(url: &str) -> String {
    if url.len() <= 100 {
        return url.to_string();
    }
    let mut end = 100;
    while !url.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &url[..end])
}

/// Turns a transport outcome into the decoded body or an [`AppError`].
/// Non-2xx statuses are classified even when the transport reports them as
/// successful responses.
pub fn decode_json<T: DeserializeOwned>(
    result: crux_http::Result<crux_http::Response<T>>,
) -> Result<T, AppError> {
    match result {
        Ok(mut response) => {
            let status = u16::from(response.status());
            if !(200..300).contains(&status) {
                return Err(AppError::from_http_status(status, None));
            }
            response.take_body().ok_or_else(|| {
                AppError::new(ErrorKind::Deserialization, "Response body was empty")
                    .with_context("http_status", status.to_string())
            })
        }
        Err(e) => Err(transport_error(&e)),
    }
}

/// Like [`decode_json`] for requests whose body is not needed.
pub fn expect_success(
    result: crux_http::Result<crux_http::Response<Vec<u8>>>,
) -> Result<(), AppError> {
    match result {
        Ok(mut response) => {
            let status = u16::from(response.status());
            if (200..300).contains(&status) {
                Ok(())
            } else {
                let body = response.take_body();
                Err(AppError::from_http_status(status, body.as_deref()))
            }
        }
        Err(e) => Err(transport_error(&e)),
    }
}

fn transport_error(error: &impl std::fmt::Display) -> AppError {
    let text = error.to_string();
    // crux_http reports unsuccessful statuses as "HTTP error <code>: ..."
    if let Some(status) = status_from_message(&text) {
        return AppError::from_http_status(status, None).with_internal(text);
    }
    let kind = if text.to_lowercase().contains("timeout") {
        ErrorKind::Timeout
    } else {
        ErrorKind::Network
    };
    AppError::new(kind, "Request failed").with_internal(text)
}

fn status_from_message(text: &str) -> Option<u16> {
    let rest = text.strip_prefix("HTTP error ")?;
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok().filter(|s| (100..600).contains(s))
}
