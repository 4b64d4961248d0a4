#![forbid(unsafe_code)]

//! A double-ended queue built from fixed-size buckets.
//!
//! [`BucketDeque`] keeps its elements in heap blocks of `B` slots each,
//! reached through a circular index array of block handles. Pushing and
//! popping at either end is amortized O(1), indexing is O(1), and an element
//! never moves in memory while it is in the deque: when the index array fills
//! up it is doubled by moving the handles, and the blocks stay where they are.

pub mod bucketdeq;
mod ring;
mod store;


pub use bucketdeq::{BucketDeque, IntoIter};

/// Default number of elements per bucket.
pub const BUCKET_SIZE: usize = 512;
