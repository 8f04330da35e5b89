pub mod pipeline;
pub mod selector;

pub use pipeline::run_batch;
