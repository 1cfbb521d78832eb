use crate::error::{ParseDateSnafu, ParseGpaSnafu, PortalResult};
use jiff::civil::Date;
use regex::Regex;
use serde::Deserialize;
use snafu::ResultExt;
use std::sync::LazyLock;

pub mod job_posting;
pub mod member;
pub mod placement;
pub mod student;

#[derive(Deserialize, Default)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: String,
    pub status: Option<String>,
}

pub fn is_valid_email(email: &str) -> bool {
    static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
    });

    EMAIL_PATTERN.is_match(email)
}

///empty, or an absolute `http(s)` link, anything else never reaches an `href` or `src`
pub fn is_safe_url(url: &str) -> bool {
    let url = url.trim();
    if url.is_empty() {
        return true;
    }

    ["http://", "https://"].into_iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

///case-insensitive substring match across any of the given fields, an empty term matches everything
pub fn search_matches<'a>(term: &str, fields: impl IntoIterator<Item = &'a str>) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }

    fields
        .into_iter()
        .any(|field| field.to_lowercase().contains(&term))
}

///dates come from `<input type="date">`, so `YYYY-MM-DD` or nothing at all
pub fn parse_optional_date(s: &str) -> PortalResult<Option<Date>> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }

    s.parse()
        .map(Some)
        .context(ParseDateSnafu { original: s })
}

pub fn format_optional_date(date: Option<Date>) -> String {
    date.map(|date| date.to_string()).unwrap_or_default()
}

///blank means zero, and nothing is clamped: the input element bounds it, not us
pub fn parse_gpa(s: &str) -> PortalResult<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(0.0);
    }

    s.parse().context(ParseGpaSnafu { original: s })
}
