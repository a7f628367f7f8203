//! Library side of the mdpack binary, exposed for the end-to-end tests and
//! the xtask completion generator.
pub mod cli;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod report;
