//! Influract - contract analyzer for content creators.
//!
//! Extracts text from uploaded brand/creator contracts, asks a language model
//! for a clause-by-clause risk report, and stores the results for later
//! retrieval and negotiation email drafting.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod extract;
pub mod llm;
pub mod models;
pub mod rate_limit;
pub mod server;
pub mod store;
