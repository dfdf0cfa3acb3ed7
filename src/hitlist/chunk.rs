use crate::core::error::Result;
use crate::core::types::ObjectId;
use crate::hit::record::Hit;
use crate::hitlist::entry::Entry;

/// Id range covered by a chunk, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    pub start_id: ObjectId,
    pub end_id: ObjectId,
    pub len: usize,
}

/// Sorted run of hits found by one worker while scanning one partition.
///
/// A chunk is private to its worker until it is handed to
/// [`HitList::merge_chunk`](crate::hitlist::HitList::merge_chunk), which
/// takes it by value. A merged chunk therefore can't be released twice.
#[derive(Debug, Default)]
pub struct Chunk<'s> {
    entries: Vec<Entry<'s>>,
    start_id: ObjectId,
    end_id: ObjectId,
}

impl<'s> Chunk<'s> {
    pub fn new() -> Self {
        Chunk {
            entries: Vec::new(),
            start_id: ObjectId::default(),
            end_id: ObjectId::default(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut chunk = Self::new();
        chunk.entries.try_reserve_exact(capacity)?;
        Ok(chunk)
    }

    /// Attach `entry` after the current tail.
    ///
    /// Workers scan partitions in ascending id order, so the entry's id must be
    /// at least `end_id`. This is checked in debug builds only.
    pub fn append(&mut self, entry: Entry<'s>) -> Result<()> {
        debug_assert!(
            self.entries.is_empty() || entry.object_id() >= self.end_id,
            "chunk append out of order: {} after {}",
            entry.object_id(),
            self.end_id
        );
        self.entries.try_reserve(1)?;
        let id = entry.object_id();
        if self.entries.is_empty() {
            self.start_id = id;
        }
        self.end_id = id;
        self.entries.push(entry);
        Ok(())
    }

    pub fn push_hit(&mut self, hit: Hit<'s>) -> Result<()> {
        self.append(Entry::from_hit(hit))
    }

    /// First and last object id, or `None` while the chunk is empty.
    pub fn bounds(&self) -> Option<(ObjectId, ObjectId)> {
        if self.entries.is_empty() {
            None
        } else {
            Some((self.start_id, self.end_id))
        }
    }

    pub fn range(&self) -> Option<ChunkRange> {
        self.bounds().map(|(start_id, end_id)| ChunkRange {
            start_id,
            end_id,
            len: self.entries.len(),
        })
    }

    pub fn entries(&self) -> &[Entry<'s>] {
        &self.entries
    }

    pub fn first(&self) -> Option<&Entry<'s>> {
        self.entries.first()
    }

    pub fn hits(&self) -> impl Iterator<Item = &Hit<'s>> {
        self.entries.iter().map(Entry::hit)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hand the entry run to a hit list without copying it.
    pub(crate) fn into_entries(self) -> Vec<Entry<'s>> {
        self.entries
    }

    /// Release an unmerged chunk and every entry it owns.
    pub fn release(self) -> usize {
        self.entries.into_iter().map(Entry::release).sum()
    }
}
