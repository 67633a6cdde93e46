use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::AppError;

/// Current time as an RFC3339 UTC string, used to stamp persisted index artifacts.
pub fn now_rfc3339_utc() -> Result<String, AppError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| AppError::new("INDEX_TIME_FAILED", "Failed to format time").with_details(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::now_rfc3339_utc;

    #[test]
    fn formats_as_rfc3339_utc() {
        let ts = now_rfc3339_utc().expect("format");
        assert!(ts.ends_with('Z'), "expected UTC suffix: {ts}");
        assert!(ts.contains('T'));
    }
}
