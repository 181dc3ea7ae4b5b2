//! ISO-8601 helpers for the `xsd:dateTime` strings most services return.

use chrono::NaiveDateTime;

use crate::errors::{Result, SoapClientError};

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parse a UTC timestamp such as `2006-01-02T15:04:05Z`.
pub fn iso_to_datetime(iso: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(iso.trim(), ISO_FORMAT)
        .map_err(|e| SoapClientError::soap(format!("Invalid datetime '{iso}': {e}")))
}

pub fn format_datetime(datetime: &NaiveDateTime) -> String {
    datetime.format(ISO_FORMAT).to_string()
}
