//! Domain models for contract analyses.

mod analysis;

pub use analysis::{
    AnalysisListing, AnalysisOutcome, Clause, ContractAnalysis, Rejection, RiskLevel,
    StoredAnalysis, Summary, CLAUSE_TYPES,
};
