// Rasterization of card faces.
// CPU-bound; the pipeline runs it inside tokio::task::spawn_blocking.

pub mod canvas;
pub mod composer;
pub mod regions;
pub mod text;

pub use composer::CardComposer;
