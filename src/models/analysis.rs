//! Contract analysis records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Clause categories the analysis prompt asks the model to use.
pub const CLAUSE_TYPES: &[&str] = &[
    "exclusivity",
    "usage_rights",
    "ip_ownership",
    "payment_terms",
    "revisions",
    "termination",
    "auto_renewal",
    "deliverables",
];

/// Traffic-light risk rating of a clause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Standard or safe.
    Green,
    /// Vague or negotiable.
    Yellow,
    /// High risk.
    Red,
    /// Anything else the model produced.
    #[default]
    #[serde(other)]
    Unrated,
}

impl RiskLevel {
    fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "green" => Self::Green,
            "yellow" => Self::Yellow,
            "red" => Self::Red,
            _ => Self::Unrated,
        }
    }

    /// Yellow and red clauses are worth negotiating.
    pub fn is_concerning(&self) -> bool {
        matches!(self, Self::Yellow | Self::Red)
    }
}

/// One contractual provision identified by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub clause_type: String,
    #[serde(default, deserialize_with = "lenient_risk_level")]
    pub risk_level: RiskLevel,
    #[serde(default, deserialize_with = "null_as_default")]
    pub original_text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub explanation: String,
    #[serde(default)]
    pub push_back: Option<String>,
    #[serde(default)]
    pub suggested_alternative: Option<String>,
}

/// Headline numbers for an analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_clauses: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub green_count: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub yellow_count: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub red_count: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub biggest_risk: String,
}

impl Summary {
    /// Count clauses per level, as the summary should report them.
    pub fn tally(clauses: &[Clause]) -> Self {
        let count = |level: RiskLevel| clauses.iter().filter(|c| c.risk_level == level).count() as u32;
        Self {
            total_clauses: clauses.len() as u32,
            green_count: count(RiskLevel::Green),
            yellow_count: count(RiskLevel::Yellow),
            red_count: count(RiskLevel::Red),
            biggest_risk: String::new(),
        }
    }

    /// Whether the reported counts agree with the clause list.
    pub fn matches_clauses(&self, clauses: &[Clause]) -> bool {
        let actual = Self::tally(clauses);
        self.total_clauses == actual.total_clauses
            && self.green_count == actual.green_count
            && self.yellow_count == actual.yellow_count
            && self.red_count == actual.red_count
    }
}

/// Structured risk report for a document judged to be a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractAnalysis {
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: Summary,
    #[serde(default, deserialize_with = "null_as_default")]
    pub clauses: Vec<Clause>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub next_steps: Vec<String>,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub contract_text_preview: String,
}

impl ContractAnalysis {
    /// Yellow and red clauses in their original order.
    pub fn concerning_clauses(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter().filter(|c| c.risk_level.is_concerning())
    }
}

/// Response produced when the upload is not a contract at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub not_a_contract: bool,
    pub prank_detected: bool,
    pub document_type: String,
    pub message: String,
    pub filename: String,
    pub suggestion: String,
}

/// Either outcome of the analysis pipeline.
///
/// Serialized without a tag; a rejection is recognised by its
/// `not_a_contract` / `document_type` fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Rejected(Rejection),
    Contract(ContractAnalysis),
}

impl AnalysisOutcome {
    pub fn filename(&self) -> &str {
        match self {
            Self::Rejected(r) => &r.filename,
            Self::Contract(a) => &a.filename,
        }
    }

    pub fn summary(&self) -> Option<&Summary> {
        match self {
            Self::Rejected(_) => None,
            Self::Contract(a) => Some(&a.summary),
        }
    }

    pub fn as_contract(&self) -> Option<&ContractAnalysis> {
        match self {
            Self::Contract(a) => Some(a),
            Self::Rejected(_) => None,
        }
    }
}

/// An outcome after it has been persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAnalysis {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub outcome: AnalysisOutcome,
}

impl StoredAnalysis {
    pub fn listing(&self) -> AnalysisListing {
        AnalysisListing {
            id: self.id.clone(),
            created_at: self.created_at,
            filename: self.outcome.filename().to_string(),
            summary: self.outcome.summary().cloned(),
        }
    }
}

/// Metadata-only view used when listing stored analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisListing {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
}

// Model replies are loosely typed: a null or odd-shaped field falls back
// instead of failing the whole reply.

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_risk_level<'de, D>(deserializer: D) -> Result<RiskLevel, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(label) => RiskLevel::from_label(&label),
        _ => RiskLevel::Unrated,
    })
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().map(|n| n as f64).or_else(|| n.as_f64()),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n.min(u32::MAX as f64) as u32)
        .unwrap_or(0))
}
