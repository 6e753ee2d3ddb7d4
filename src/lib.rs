pub mod abi;
pub mod constants;
pub mod dashboard;   // Snapshot orchestration
pub mod format;
pub mod plan;        // Allocation plan heuristic
pub mod rpc;
pub mod stats;
pub mod utils;
pub mod valuation;
