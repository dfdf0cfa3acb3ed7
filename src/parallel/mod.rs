pub mod searcher;
pub mod receiver;

pub use searcher::{HitSink, Partition, PartitionSearcher};
pub use receiver::{chunk_channel, ChunkReceiver, MergeReport};
