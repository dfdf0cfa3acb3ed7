pub mod entry;
pub mod chunk;
pub mod aggregate;

pub use entry::{Entry, EntryPool};
pub use chunk::{Chunk, ChunkRange};
pub use aggregate::{HitList, MergedHits};
