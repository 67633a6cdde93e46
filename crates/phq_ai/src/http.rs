use std::time::Duration;

use phq_core::error::AppError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// POST a JSON body and decode a JSON response, mapping every failure to `code`.
///
/// Transport failures, 429 and 5xx are marked retryable; nothing here retries.
pub(crate) fn post_json<Req, Resp>(
    url: &str,
    bearer: Option<&str>,
    body: &Req,
    timeout: Duration,
    code: &str,
) -> Result<Resp, AppError>
where
    Req: Serialize,
    Resp: DeserializeOwned,
{
    let payload = serde_json::to_value(body).map_err(|e| {
        AppError::new(code, "Failed to encode request").with_details(e.to_string())
    })?;

    let mut req = ureq::post(url).timeout(timeout);
    if let Some(key) = bearer {
        req = req.set("Authorization", &format!("Bearer {key}"));
    }

    match req.send_json(payload) {
        Ok(r) => r.into_json::<Resp>().map_err(|e| {
            AppError::new(code, "Failed to decode response")
                .with_details(format!("url={url}; err={e}"))
        }),
        Err(ureq::Error::Status(status, r)) => {
            let body = r.into_string().unwrap_or_default();
            let body: String = body.chars().take(500).collect();
            Err(AppError::new(code, "Request was rejected")
                .with_details(format!("url={url}; status={status}; body={body}"))
                .with_retryable(status == 429 || status >= 500))
        }
        Err(e) => Err(AppError::new(code, "Failed to call endpoint")
            .with_details(format!("url={url}; err={e}"))
            .with_retryable(true)),
    }
}
