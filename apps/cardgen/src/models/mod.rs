pub mod card;
pub mod record;

pub use card::{Manifest, RenderedCard};
pub use record::Record;
