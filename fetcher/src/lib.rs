pub mod app;
pub mod buffer;
pub mod ingest;
pub mod model;
pub mod pipeline;
pub mod shutdown;
pub mod sink;

pub use app::App;
pub use pipeline::{Pipeline, PipelineHandle, PipelineSettings};
