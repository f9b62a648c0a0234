//! Ind AS trial balance mapper
//!
//! Classifies trial balance accounts into Ind AS Schedule III label paths
//! with a language model, confirmed by a reviewer and cached in SQLite.

pub mod ai_provider;
pub mod cache;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod ingest;
pub mod reconcile;
pub mod review;
