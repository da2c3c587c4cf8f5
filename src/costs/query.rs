use crate::billing::{CostAndUsageRequest, CostMetric, Dimension, FilterExpression, Granularity};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Days covered by the default cost range
pub const DEFAULT_RANGE_DAYS: u64 = 30;

/// Days covered by the credits window
pub const CREDITS_WINDOW_DAYS: u64 = 365;

/// Record types excluded from the detail view
const NON_BILLABLE_RECORD_TYPES: [&str; 2] = ["Credit", "Refund"];

/// How detail results are broken down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupBy {
    Service,
    None,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Service => "SERVICE",
            GroupBy::None => "NONE",
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query string of `GET /api/costs`, before validation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostsQueryParams {
    pub start: Option<String>,
    pub end: Option<String>,
    pub granularity: Option<String>,
    pub group_by: Option<String>,
}

/// Field-level validation failures, keyed by parameter name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
            .collect();
        f.write_str(&fields.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// A validated cost query with defaults applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CostQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub granularity: Granularity,
    pub group_by: GroupBy,
}

impl CostQuery {
    /// Validate raw parameters. Missing `end` is `today`, missing `start`
    /// is 30 days before `today`.
    pub fn from_params(params: &CostsQueryParams, today: NaiveDate) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let end = parse_date_param("end", params.end.as_deref(), &mut errors).unwrap_or(Some(today));
        let start = parse_date_param("start", params.start.as_deref(), &mut errors)
            .unwrap_or_else(|| today.checked_sub_days(Days::new(DEFAULT_RANGE_DAYS)));

        let granularity = match params.granularity.as_deref() {
            None => Some(Granularity::Daily),
            Some("DAILY") => Some(Granularity::Daily),
            Some("MONTHLY") => Some(Granularity::Monthly),
            Some(_) => {
                errors.add("granularity", "must be one of DAILY, MONTHLY");
                None
            }
        };

        let group_by = match params.group_by.as_deref() {
            None => Some(GroupBy::Service),
            Some("SERVICE") => Some(GroupBy::Service),
            Some("NONE") => Some(GroupBy::None),
            Some(_) => {
                errors.add("groupBy", "must be one of SERVICE, NONE");
                None
            }
        };

        if let (Some(start), Some(end)) = (start, end) {
            if start >= end {
                // Report on the parameter the caller supplied
                if params.start.is_some() {
                    errors.add("start", "must be before end");
                } else {
                    errors.add(
                        "end",
                        format!(
                            "must be after the default start {} ({} days before today)",
                            start.format(DATE_FORMAT),
                            DEFAULT_RANGE_DAYS
                        ),
                    );
                }
            }
        }

        match (start, end, granularity, group_by) {
            (Some(start), Some(end), Some(granularity), Some(group_by)) if errors.is_empty() => {
                Ok(Self {
                    start,
                    end,
                    granularity,
                    group_by,
                })
            }
            _ => {
                if errors.is_empty() {
                    errors.add("start", "date out of range");
                }
                Err(errors)
            }
        }
    }

    /// Canonical cache key over all four query dimensions
    pub fn cache_key(&self) -> String {
        format!(
            "costs:{}:{}:{}:{}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT),
            self.granularity,
            self.group_by
        )
    }

    /// Detail query: all six metrics, billable record types only
    pub fn detail_request(&self) -> CostAndUsageRequest {
        CostAndUsageRequest {
            start: self.start,
            end: self.end,
            granularity: self.granularity,
            metrics: CostMetric::ALL.to_vec(),
            group_by: match self.group_by {
                GroupBy::Service => Some(Dimension::Service),
                GroupBy::None => None,
            },
            filter: Some(FilterExpression::record_types(&NON_BILLABLE_RECORD_TYPES).negate()),
        }
    }

    /// Monthly unblended cost per record type, unfiltered
    pub fn record_type_summary_request(&self) -> CostAndUsageRequest {
        CostAndUsageRequest {
            start: self.start,
            end: self.end,
            granularity: Granularity::Monthly,
            metrics: vec![CostMetric::UnblendedCost],
            group_by: Some(Dimension::RecordType),
            filter: None,
        }
    }
}

/// Trailing-year credits query, grouped by service
pub fn credits_request(today: NaiveDate) -> CostAndUsageRequest {
    CostAndUsageRequest {
        start: today
            .checked_sub_days(Days::new(CREDITS_WINDOW_DAYS))
            .unwrap_or(NaiveDate::MIN),
        end: today,
        granularity: Granularity::Monthly,
        metrics: vec![CostMetric::UnblendedCost],
        group_by: Some(Dimension::Service),
        filter: Some(FilterExpression::record_types(&["Credit"])),
    }
}

/// `None` when the parameter is absent; `Some(None)` when it is malformed
fn parse_date_param(
    field: &str,
    value: Option<&str>,
    errors: &mut ValidationErrors,
) -> Option<Option<NaiveDate>> {
    let value = value?;
    let parsed = is_iso_date(value)
        .then(|| NaiveDate::parse_from_str(value, DATE_FORMAT).ok())
        .flatten();
    if parsed.is_none() {
        errors.add(field, "must be a valid date in YYYY-MM-DD format");
    }
    Some(parsed)
}

/// Strict `YYYY-MM-DD` shape check; chrono alone accepts unpadded fields
fn is_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn params(start: Option<&str>, end: Option<&str>) -> CostsQueryParams {
        CostsQueryParams {
            start: start.map(str::to_string),
            end: end.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let query = CostQuery::from_params(&CostsQueryParams::default(), today()).unwrap();
        assert_eq!(query.end, today());
        assert_eq!(query.start, NaiveDate::from_ymd_opt(2024, 2, 14).unwrap());
        assert_eq!(query.start.format(DATE_FORMAT).to_string(), "2024-02-14");
        assert_eq!(query.granularity, Granularity::Daily);
        assert_eq!(query.group_by, GroupBy::Service);
    }

    #[test]
    fn test_explicit_values() {
        let query = CostQuery::from_params(
            &CostsQueryParams {
                start: Some("2024-01-01".to_string()),
                end: Some("2024-01-03".to_string()),
                granularity: Some("MONTHLY".to_string()),
                group_by: Some("NONE".to_string()),
            },
            today(),
        )
        .unwrap();
        assert_eq!(query.start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(query.end, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(query.granularity, Granularity::Monthly);
        assert_eq!(query.group_by, GroupBy::None);
    }

    #[test]
    fn test_validation_collects_every_field() {
        let errors = CostQuery::from_params(
            &CostsQueryParams {
                start: Some("2024-1-1".to_string()),
                end: Some("2024-02-30".to_string()),
                granularity: Some("HOURLY".to_string()),
                group_by: Some("service".to_string()),
            },
            today(),
        )
        .unwrap_err();

        assert!(errors.field("start").is_some());
        assert!(errors.field("end").is_some());
        assert!(errors.field("granularity").is_some());
        assert!(errors.field("groupBy").is_some());
    }

    #[test]
    fn test_start_must_precede_end() {
        let errors =
            CostQuery::from_params(&params(Some("2024-01-03"), Some("2024-01-03")), today())
                .unwrap_err();
        assert_eq!(
            errors.field("start"),
            Some(&["must be before end".to_string()][..])
        );

        assert!(CostQuery::from_params(&params(Some("2024-03-20"), None), today()).is_err());
    }

    #[test]
    fn test_end_before_default_start_reported_on_end() {
        let errors =
            CostQuery::from_params(&params(None, Some("2024-01-03")), today()).unwrap_err();

        assert!(errors.field("start").is_none());
        assert_eq!(
            errors.field("end"),
            Some(&["must be after the default start 2024-02-14 (30 days before today)".to_string()][..])
        );
    }

    #[test]
    fn test_cache_key_distinguishes_group_by() {
        let service = CostQuery::from_params(&CostsQueryParams::default(), today()).unwrap();
        let none = CostQuery {
            group_by: GroupBy::None,
            ..service
        };

        assert_eq!(service.cache_key(), "costs:2024-02-14:2024-03-15:DAILY:SERVICE");
        assert_ne!(service.cache_key(), none.cache_key());
    }

    #[test]
    fn test_detail_request_shape() {
        let query = CostQuery::from_params(&CostsQueryParams::default(), today()).unwrap();

        let detail = query.detail_request();
        assert_eq!(detail.metrics.len(), 6);
        assert_eq!(detail.group_by, Some(Dimension::Service));
        assert_eq!(
            detail.filter,
            Some(FilterExpression::Not(Box::new(FilterExpression::In {
                dimension: Dimension::RecordType,
                values: vec!["Credit".to_string(), "Refund".to_string()],
            })))
        );

        let ungrouped = CostQuery {
            group_by: GroupBy::None,
            ..query
        }
        .detail_request();
        assert_eq!(ungrouped.group_by, None);
    }

    #[test]
    fn test_summary_request_shape() {
        let query = CostQuery::from_params(&CostsQueryParams::default(), today()).unwrap();
        let summary = query.record_type_summary_request();

        assert_eq!(summary.granularity, Granularity::Monthly);
        assert_eq!(summary.metrics, vec![CostMetric::UnblendedCost]);
        assert_eq!(summary.group_by, Some(Dimension::RecordType));
        assert_eq!(summary.filter, None);
        assert_eq!((summary.start, summary.end), (query.start, query.end));
    }

    #[test]
    fn test_credits_request_window() {
        let request = credits_request(today());
        assert_eq!(request.end, today());
        assert_eq!(request.start, NaiveDate::from_ymd_opt(2023, 3, 16).unwrap());
        assert_eq!(request.filter, Some(FilterExpression::record_types(&["Credit"])));
        assert_eq!(request.group_by, Some(Dimension::Service));
    }
}
