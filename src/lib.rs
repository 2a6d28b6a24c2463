//! Lintsweep - safety-gated batch lint remediation
//!
//! The pipeline: Collector -> Classifier -> Planner (consulting the rate
//! limiter) -> Executor (per batch) -> Ledger. The executor is the only
//! component that mutates source files, and it only does so inside a
//! snapshot/apply/validate transaction.

pub mod classifier;
pub mod cli;
pub mod collector;
pub mod config;
pub mod executor;
pub mod ledger;
pub mod models;
pub mod planner;
pub mod ratelimit;
pub mod reporters;
pub mod state;
pub mod tools;
