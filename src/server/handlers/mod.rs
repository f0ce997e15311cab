//! HTTP request handlers.

mod api;
mod contracts;
mod types;

pub use api::{health, root};
pub use contracts::{analyze_text, analyze_upload, generate_email, get_analysis, list_analyses};
pub use types::{AnalyzeResponse, EmailResponse};
