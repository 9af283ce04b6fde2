mod time;
mod writer;

pub use time::{RunContext, format_local, now_local};
pub use writer::ArtifactWriter;
