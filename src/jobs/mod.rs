//! Background jobs.
//!
//! - [`ModelScanJob`]: registers every mesh file in a model directory as a part.
//! - [`JobQueue`]: runs jobs off the request path on a tokio worker.

mod model_scan;
mod queue;

pub use model_scan::*;
pub use queue::*;
