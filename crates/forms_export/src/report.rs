use std::collections::HashMap;

use crate::error::ExportError;

/// Selector used when a request names no report.
pub const DEFAULT_REPORT_NAME: &str = "answers";

/// Which table a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportType {
    /// Static question specification sheet; never touches storage.
    Specification,
    /// Per-form session and demographic summary.
    AllData,
    /// Per-question answers. Selected by any unrecognized selector.
    Answers,
}

impl ReportType {
    pub fn parse(selector: &str) -> Self {
        match selector {
            "specification" => ReportType::Specification,
            "alldata" => ReportType::AllData,
            _ => ReportType::Answers,
        }
    }

    pub fn needs_storage(self) -> bool {
        !matches!(self, ReportType::Specification)
    }
}

/// An export request: optional inclusive submission-time bounds plus the
/// raw report selector, which also names the downloaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub from_date: Option<i64>,
    pub to_date: Option<i64>,
    pub report_name: String,
}

impl ExportRequest {
    pub fn new(report_name: impl Into<String>) -> Self {
        Self {
            from_date: None,
            to_date: None,
            report_name: report_name.into(),
        }
    }

    pub fn with_range(mut self, from_date: Option<i64>, to_date: Option<i64>) -> Self {
        self.from_date = from_date;
        self.to_date = to_date;
        self
    }

    /// Build a request from string parameters (`fromDate`, `toDate`, `type`).
    /// Empty values count as absent; a missing `type` selects the answers report.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ExportError> {
        let report_name = params
            .get("type")
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_REPORT_NAME);
        Ok(Self {
            from_date: parse_bound(params, "fromDate")?,
            to_date: parse_bound(params, "toDate")?,
            report_name: report_name.to_string(),
        })
    }

    pub fn report_type(&self) -> ReportType {
        ReportType::parse(&self.report_name)
    }

    pub fn filename(&self) -> String {
        format!("{}.csv", self.report_name)
    }
}

fn parse_bound(params: &HashMap<String, String>, name: &str) -> Result<Option<i64>, ExportError> {
    match params.get(name).map(|v| v.trim()) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ExportError::InvalidParameter {
                name: name.to_string(),
                value: raw.to_string(),
            }),
    }
}
