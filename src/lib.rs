//! src/lib.rs
// make public to other binaries (main, test)
pub mod authentication;
pub mod configuration;
pub mod domain;
pub mod forms;
pub mod middleware;
pub mod routes;
pub mod session_state;
pub mod startup;
pub mod storage;
pub mod telemetry;
pub mod utils;
