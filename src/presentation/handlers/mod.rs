mod batches;
mod error_response;
mod health;
mod merge;

pub use batches::{
    ClipRequest, RetryResponse, StartBatchRequest, batch_progress_handler, retry_batch_handler,
    start_batch_handler,
};
pub use error_response::ErrorResponse;
pub use health::health_handler;
pub use merge::{MergeBody, MergeResponse, merge_handler};
