//! Inverted-index encoding benchmark harness
//!
//! Sweep-and-repeat orchestration around external, pre-built binaries: an
//! index builder, a query runner and a scan perftest are driven across a
//! fixed catalog of encoding variants under cold-cache conditions, and
//! their stdout lands in a predictable result-file naming scheme for
//! downstream analysis.

pub mod catalog;
pub mod config;
pub mod invoke;
pub mod report;
pub mod sweep;
