use serde::{Serialize, Deserialize};
use std::fmt;

/// Identifier of a searchable database object; the sort key for hits,
/// chunks and the merged hit list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl ObjectId {
    pub fn new(id: u64) -> Self {
        ObjectId(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Absolute distance between two ids, used to pick a scan direction.
    pub fn distance(&self, other: ObjectId) -> u64 {
        self.0.abs_diff(other.0)
    }
}

impl From<u64> for ObjectId {
    fn from(id: u64) -> Self {
        ObjectId(id)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
