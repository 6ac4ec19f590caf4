pub mod http;
pub mod types;

pub use http::HttpTaskBackend;
pub use types::{StatusReport, SubmitRequest, SubmitResponse, TaskBackend};
