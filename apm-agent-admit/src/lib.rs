//! Mutating admission webhook that injects an Elastic APM agent init container into Pods
//! annotated with `elastic-apm-agent: <agent>`.
pub mod config;
pub mod error;
pub mod mutate;
pub mod patch;
pub mod resolver;
pub mod review;
pub mod server;

pub use error::{AdmitError, Result};
