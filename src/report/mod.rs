//! Report module - metrics, model artifact and the run summary

pub mod metrics;
pub mod metrics_export;
pub mod model_export;
pub mod summary;

pub use metrics::*;
pub use metrics_export::*;
pub use model_export::*;
pub use summary::*;
