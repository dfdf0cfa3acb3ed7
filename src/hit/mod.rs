pub mod record;
pub mod shard;

pub use record::{Domain, Hit, HitScores};
pub use shard::{DataShard, ShardRecord, TargetView};
