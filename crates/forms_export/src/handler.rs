use std::collections::HashMap;
use std::sync::Arc;

use chrono::FixedOffset;
use forms_core::QuestionCatalog;
use forms_store::{FilterExpression, FormStore, ScanRequest};
use tracing::{debug, error, info};

use crate::answers::AnswerTable;
use crate::error::ExportError;
use crate::report::{ExportRequest, ReportType};
use crate::response::ExportResponse;
use crate::specification::SpecificationTable;
use crate::summary::SummaryTable;

/// Serves CSV report downloads for the forms table.
///
/// The catalog and store are injected so the handler holds no ambient state;
/// every request works on its own snapshot of scanned records.
pub struct FormsCsvHandler {
    catalog: Arc<QuestionCatalog>,
    store: Arc<dyn FormStore>,
    table_name: String,
    summary: SummaryTable,
}

impl FormsCsvHandler {
    pub fn new(
        catalog: Arc<QuestionCatalog>,
        store: Arc<dyn FormStore>,
        table_name: impl Into<String>,
        summary_offset: FixedOffset,
    ) -> Self {
        Self {
            catalog,
            store,
            table_name: table_name.into(),
            summary: SummaryTable::new(summary_offset),
        }
    }

    /// Run an export. Every failure becomes a bare `500`.
    pub async fn handle(&self, request: &ExportRequest) -> ExportResponse {
        info!("Forms CSV export received (type={})", request.report_name);

        match self.export(request).await {
            Ok(csv) => {
                info!("Forms CSV export succeeded (type={})", request.report_name);
                ExportResponse::csv_attachment(&request.filename(), csv)
            }
            Err(e) => {
                error!("Forms CSV export failed (type={}): {e}", request.report_name);
                ExportResponse::server_error()
            }
        }
    }

    /// Parse raw request parameters, then [`handle`](Self::handle) them.
    pub async fn handle_params(&self, params: &HashMap<String, String>) -> ExportResponse {
        match ExportRequest::from_params(params) {
            Ok(request) => self.handle(&request).await,
            Err(e) => {
                error!("Forms CSV export rejected: {e}");
                ExportResponse::server_error()
            }
        }
    }

    /// Produce the CSV body for `request`.
    pub async fn export(&self, request: &ExportRequest) -> Result<String, ExportError> {
        let report = request.report_type();
        if !report.needs_storage() {
            return SpecificationTable::new(&self.catalog).build();
        }

        let forms = self.store.scan(&self.scan_request(request)).await?;
        debug!("Scanned {} forms for {:?} report", forms.len(), report);

        match report {
            ReportType::AllData => self.summary.build(&forms),
            _ => AnswerTable::new(&self.catalog).build(&forms),
        }
    }

    /// The storage scan issued for `request`.
    pub fn scan_request(&self, request: &ExportRequest) -> ScanRequest {
        ScanRequest::new(
            self.table_name.clone(),
            FilterExpression::timestamp_range(request.from_date, request.to_date),
        )
    }
}
