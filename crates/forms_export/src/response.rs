/// An HTTP-like response handed back to the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ExportResponse {
    pub const CONTENT_DISPOSITION: &'static str = "Content-Disposition";
    pub const CONTENT_TYPE: &'static str = "Content-Type";

    /// `200` with the CSV body offered as a file download.
    pub fn csv_attachment(filename: &str, body: String) -> Self {
        Self {
            status: 200,
            headers: vec![
                (
                    Self::CONTENT_DISPOSITION.to_string(),
                    format!("attachment; filename='{filename}'"),
                ),
                (Self::CONTENT_TYPE.to_string(), "text/csv".to_string()),
            ],
            body,
        }
    }

    /// Generic `500` with no detail.
    pub fn server_error() -> Self {
        Self {
            status: 500,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
