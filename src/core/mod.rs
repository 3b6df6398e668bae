pub mod extractor;
pub mod splitter;

pub use splitter::{FrameSplitter, SplitReport};
