use serde::{Serialize, Deserialize};
use crate::core::types::ObjectId;

/// One target record as stored in a loaded database partition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShardRecord {
    pub object_id: ObjectId,
    pub name: String,
    pub accession: String,
    pub description: String,
    pub sequence: Vec<u8>,
}

/// Read-only database partition that hits borrow their display fields from.
///
/// The shard outlives every hit list built over it; hits only ever hold
/// `TargetView`s into it, so tearing down a hit list never touches shard memory.
#[derive(Debug, Default)]
pub struct DataShard {
    records: Vec<ShardRecord>,
}

impl DataShard {
    pub fn new(mut records: Vec<ShardRecord>) -> Self {
        records.sort_by_key(|r| r.object_id);
        DataShard { records }
    }

    pub fn records(&self) -> &[ShardRecord] {
        &self.records
    }

    /// Borrow the display fields of the record at `index`.
    pub fn view(&self, index: usize) -> Option<TargetView<'_>> {
        self.records.get(index).map(TargetView::from_record)
    }

    /// Look up a record by object id.
    pub fn find(&self, id: ObjectId) -> Option<TargetView<'_>> {
        self.records
            .binary_search_by_key(&id, |r| r.object_id)
            .ok()
            .map(|i| TargetView::from_record(&self.records[i]))
    }
}

/// Borrowed view of a target's display fields.
///
/// Every field is a reference plus length into shard memory. Nothing here is
/// owned, so dropping a view can never release the underlying buffers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetView<'s> {
    pub name: &'s str,
    pub accession: &'s str,
    pub description: &'s str,
    pub sequence: &'s [u8],
}

impl<'s> TargetView<'s> {
    pub fn from_record(record: &'s ShardRecord) -> Self {
        TargetView {
            name: &record.name,
            accession: &record.accession,
            description: &record.description,
            sequence: &record.sequence,
        }
    }
}
