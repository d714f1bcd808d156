// src/merge/mod.rs

pub mod coverage;
pub mod merger;
pub mod selector;

pub use coverage::CoverageBitmap;
pub use merger::{merge_fragments, AlignmentMerger, ReadProfile};
pub use selector::{select_fragments, FragmentSelection};
