#[derive(Debug, thiserror::Error)]
pub enum ChartError {
	#[error("required element is missing from the page: {selector}")]
	MissingAnchor { selector: String },
	#[error("embedded dataset is malformed: {0}")]
	Dataset(#[from] serde_json::Error),
	#[error("invalid date in postings summary: {value}")]
	InvalidDate { value: String },
}

pub type Result<T> = std::result::Result<T, ChartError>;
