//! Turns raw list-query parameters into a typed [`CriteriaSet`].
//!
//! Pagination parameters are split off, absent values never become filters,
//! and `dateQuery`/`dateValue` fold into a single [`DatePredicate`] whose
//! timestamp the store binds as a parameter.

use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;
use std::collections::HashMap;

use crate::error::CriteriaError;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_COUNT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum DateOp {
    #[default]
    #[serde(rename = ">")]
    After,
    #[serde(rename = "<")]
    Before,
    #[serde(rename = "=")]
    Equal,
}

impl DateOp {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            ">" => Some(Self::After),
            "<" => Some(Self::Before),
            "=" => Some(Self::Equal),
            _ => None,
        }
    }

    /// SQL comparison operator. Only ever one of three fixed tokens.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::After => ">",
            Self::Before => "<",
            Self::Equal => "=",
        }
    }
}

/// `publication_date_start <op> value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatePredicate {
    pub op: DateOp,
    pub value: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListMode {
    #[default]
    Public,
    Admin,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PostFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DatePredicate>,
}

impl PostFilters {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub count: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            count: DEFAULT_COUNT,
        }
    }
}

impl Pagination {
    /// Reads `page` and `count`. Both are lenient: anything that is not a
    /// positive integer falls back to the default.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        Self {
            page: positive(params.get("page")).unwrap_or(DEFAULT_PAGE),
            count: positive(params.get("count")).unwrap_or(DEFAULT_COUNT),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriteriaSet {
    pub filters: PostFilters,
    pub mode: ListMode,
    pub page: u32,
    pub count: u32,
}

impl CriteriaSet {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            count: self.count,
        }
    }
}

impl Default for CriteriaSet {
    fn default() -> Self {
        Self {
            filters: PostFilters::default(),
            mode: ListMode::Public,
            page: DEFAULT_PAGE,
            count: DEFAULT_COUNT,
        }
    }
}

pub fn filter_criteria(params: &HashMap<String, String>) -> Result<CriteriaSet, CriteriaError> {
    let pagination = Pagination::from_params(params);
    let mut filters = PostFilters::default();

    if let Some(raw) = present(params, "enabled") {
        filters.enabled = Some(match raw {
            "1" | "true" => true,
            "0" | "false" => false,
            _ => return Err(invalid("enabled", raw)),
        });
    }

    filters.tag = token(params, "tag")?;
    filters.author = token(params, "author")?;

    // an operator alone carries no meaning, so it is dropped with its value absent
    if let Some(raw) = present(params, "dateValue") {
        let op = present(params, "dateQuery")
            .and_then(DateOp::parse)
            .unwrap_or_default();
        filters.date = Some(DatePredicate {
            op,
            value: parse_date_value(raw)?,
        });
    }

    let mode = match present(params, "mode") {
        Some("admin") => ListMode::Admin,
        _ => ListMode::Public,
    };

    Ok(CriteriaSet {
        filters,
        mode,
        page: pagination.page,
        count: pagination.count,
    })
}

/// Accepts `YYYY-MM-DDTHH:MM:SS` with an optional `Z`, `±HH:MM` or `±HHMM`
/// offset. Offset timestamps are normalised to UTC; naive ones are taken as UTC.
pub fn parse_date_value(raw: &str) -> Result<NaiveDateTime, CriteriaError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%:z", "%Y-%m-%dT%H:%M:%S%z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Ok(dt.naive_utc());
        }
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .map_err(|_| CriteriaError::MalformedDate(raw.to_string()))
}

fn present<'a>(params: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

fn token(params: &HashMap<String, String>, name: &'static str) -> Result<Option<String>, CriteriaError> {
    match present(params, name) {
        Some(raw) if raw.chars().any(char::is_whitespace) => Err(invalid(name, raw)),
        Some(raw) => Ok(Some(raw.to_string())),
        None => Ok(None),
    }
}

fn positive(raw: Option<&String>) -> Option<u32> {
    raw.and_then(|v| v.parse::<u32>().ok()).filter(|v| *v > 0)
}

fn invalid(name: &'static str, value: &str) -> CriteriaError {
    CriteriaError::InvalidParameter {
        name,
        value: value.to_string(),
    }
}
