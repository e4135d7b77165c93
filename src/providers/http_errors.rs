use anyhow::anyhow;
use reqwest::StatusCode;
use std::error::Error as StdError;
use std::io::ErrorKind;

const MAX_ERROR_BODY_CHARS: usize = 500;

/// Walks the source chain looking for an io error of `kind`, or a message that
/// mentions `needle` for transports that only stringify the cause.
fn error_chain_has(err: &(dyn StdError + 'static), kind: ErrorKind, needle: &str) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == kind
        {
            return true;
        }

        if source.to_string().to_ascii_lowercase().contains(needle) {
            return true;
        }

        current = source.source();
    }

    false
}

pub(crate) fn generation_request_error(
    err: reqwest::Error,
    api_url: &str,
    timeout_secs: u64,
) -> anyhow::Error {
    if err.is_timeout() || error_chain_has(&err, ErrorKind::TimedOut, "timed out") {
        return anyhow!(
            "Generation request timed out after {}s while calling '{}'. \
             Increase MODEL_TIMEOUT_SECS or try a smaller image.",
            timeout_secs,
            api_url
        );
    }

    if err.is_connect() {
        if error_chain_has(&err, ErrorKind::ConnectionRefused, "connection refused") {
            return anyhow!(
                "Connection refused by generation API at '{}'. Check MODEL_BASE_URL.",
                api_url
            );
        }

        return anyhow!(
            "Failed to connect to generation API at '{}'. \
             Check MODEL_BASE_URL and network connectivity.",
            api_url
        );
    }

    anyhow!("Failed to call generation API at '{}': {}", api_url, err)
}

pub(crate) fn generation_status_error(status: StatusCode, body: &str) -> anyhow::Error {
    let body = truncate_body(body);
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => anyhow!(
            "Generation request was rejected with status {}: {}. \
             Check that GOOGLE_API_KEY is valid for this model.",
            status,
            body
        ),
        _ => anyhow!("Generation request failed with status {}: {}", status, body),
    }
}

fn truncate_body(body: &str) -> &str {
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
