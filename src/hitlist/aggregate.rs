use parking_lot::Mutex;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::ObjectId;
use crate::hit::record::Hit;
use crate::hitlist::chunk::{Chunk, ChunkRange};
use crate::hitlist::entry::Entry;

/// A merged chunk: its entry run plus links to its neighbours in id order.
#[derive(Debug)]
struct ChunkNode<'s> {
    entries: Vec<Entry<'s>>,
    start_id: ObjectId,
    end_id: ObjectId,
    prev: Option<usize>,
    next: Option<usize>,
}

impl ChunkNode<'_> {
    fn range(&self) -> ChunkRange {
        ChunkRange {
            start_id: self.start_id,
            end_id: self.end_id,
            len: self.entries.len(),
        }
    }
}

/// Where a new chunk goes: between `prev` and `next`.
#[derive(Debug, Clone, Copy)]
struct Splice {
    prev: Option<usize>,
    next: Option<usize>,
    from_tail: bool,
    steps: usize,
}

/// Chunk arena linked in ascending id order.
///
/// Nodes are stored in merge order and addressed by index; `head`/`tail` and
/// each node's `prev`/`next` give the sorted order. Reading the nodes from
/// `head` and concatenating their entries yields the global hit sequence.
#[derive(Debug, Default)]
struct ChunkLinks<'s> {
    nodes: Vec<ChunkNode<'s>>,
    head: Option<usize>,
    tail: Option<usize>,
    start_id: ObjectId,
    end_id: ObjectId,
    entry_count: usize,
}

impl<'s> ChunkLinks<'s> {
    /// Find the insertion point for `[start, end]`, scanning from whichever
    /// end of the chunk list is numerically closer.
    fn locate(&self, start: ObjectId, end: ObjectId) -> Result<Splice> {
        let from_tail = start.distance(self.start_id) > end.distance(self.end_id);
        let mut steps = 0;

        // prev is the last chunk whose start_id <= start
        let prev = if from_tail {
            let mut cursor = self.tail;
            while let Some(i) = cursor {
                steps += 1;
                if self.nodes[i].start_id <= start {
                    break;
                }
                cursor = self.nodes[i].prev;
            }
            cursor
        } else {
            let mut cursor = self.head;
            let mut last = None;
            while let Some(i) = cursor {
                steps += 1;
                if self.nodes[i].start_id > start {
                    break;
                }
                last = Some(i);
                cursor = self.nodes[i].next;
            }
            last
        };
        let next = match prev {
            Some(p) => self.nodes[p].next,
            None => self.head,
        };

        if let Some(p) = prev {
            if self.nodes[p].end_id >= start {
                return Err(overlap(start, end, self.nodes[p].range()));
            }
        }
        if let Some(n) = next {
            if end >= self.nodes[n].start_id {
                return Err(overlap(start, end, self.nodes[n].range()));
            }
        }

        Ok(Splice { prev, next, from_tail, steps })
    }

    fn link(&mut self, entries: Vec<Entry<'s>>, start_id: ObjectId, end_id: ObjectId, at: Splice) {
        let index = self.nodes.len();
        let count = entries.len();
        self.nodes.push(ChunkNode {
            entries,
            start_id,
            end_id,
            prev: at.prev,
            next: at.next,
        });

        match at.prev {
            Some(p) => self.nodes[p].next = Some(index),
            None => self.head = Some(index),
        }
        match at.next {
            Some(n) => self.nodes[n].prev = Some(index),
            None => self.tail = Some(index),
        }

        if self.entry_count == 0 || start_id < self.start_id {
            self.start_id = start_id;
        }
        if self.entry_count == 0 || end_id > self.end_id {
            self.end_id = end_id;
        }
        self.entry_count += count;
    }

    fn bounds(&self) -> Option<(ObjectId, ObjectId)> {
        self.head.map(|_| (self.start_id, self.end_id))
    }
}

fn overlap(start: ObjectId, end: ObjectId, existing: ChunkRange) -> Error {
    Error::new(
        ErrorKind::OverlappingRange,
        format!(
            "chunk [{}, {}] overlaps merged chunk [{}, {}]",
            start, end, existing.start_id, existing.end_id
        ),
    )
}

/// Shared, lock-protected hit list that workers merge their chunks into.
///
/// This is the merge-phase handle. Reading the merged hits requires
/// [`finish`](HitList::finish), which consumes the list, so no reader can
/// observe it while a merge is still possible.
#[derive(Debug, Default)]
pub struct HitList<'s> {
    inner: Mutex<ChunkLinks<'s>>,
}

impl<'s> HitList<'s> {
    pub fn new() -> Self {
        HitList {
            inner: Mutex::new(ChunkLinks::default()),
        }
    }

    /// Splice `chunk` into the list at its id position.
    ///
    /// Fails with `OverlappingRange` if the chunk's id range intersects an
    /// already merged chunk; the list is left untouched in that case. Merging
    /// an empty chunk is a no-op.
    pub fn merge_chunk(&self, chunk: Chunk<'s>) -> Result<()> {
        let Some((start_id, end_id)) = chunk.bounds() else {
            return Ok(());
        };

        let mut links = self.inner.lock();
        let at = match links.locate(start_id, end_id) {
            Ok(at) => at,
            Err(e) => {
                tracing::warn!(start = start_id.0, end = end_id.0, error = %e, "rejected chunk merge");
                return Err(e);
            }
        };
        links.nodes.try_reserve(1)?;

        let len = chunk.len();
        links.link(chunk.into_entries(), start_id, end_id, at);
        tracing::debug!(
            start = start_id.0,
            end = end_id.0,
            hits = len,
            from_tail = at.from_tail,
            steps = at.steps,
            chunks = links.nodes.len(),
            "merged chunk"
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entry_count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn chunk_count(&self) -> usize {
        self.inner.lock().nodes.len()
    }

    /// Lowest and highest merged object id.
    pub fn bounds(&self) -> Option<(ObjectId, ObjectId)> {
        self.inner.lock().bounds()
    }

    /// End the merge phase and hand back the read-only result.
    pub fn finish(self) -> MergedHits<'s> {
        MergedHits {
            links: self.inner.into_inner(),
        }
    }

    /// Tear down the list and every hit in it.
    pub fn release(self) -> usize {
        self.finish().release()
    }
}

/// Finished hit list: globally sorted by object id, no longer mutable.
#[derive(Debug, Default)]
pub struct MergedHits<'s> {
    links: ChunkLinks<'s>,
}

impl<'s> MergedHits<'s> {
    pub fn len(&self) -> usize {
        self.links.entry_count
    }

    pub fn is_empty(&self) -> bool {
        self.links.entry_count == 0
    }

    pub fn chunk_count(&self) -> usize {
        self.links.nodes.len()
    }

    pub fn bounds(&self) -> Option<(ObjectId, ObjectId)> {
        self.links.bounds()
    }

    pub fn first(&self) -> Option<&Hit<'s>> {
        self.iter().next()
    }

    pub fn last(&self) -> Option<&Hit<'s>> {
        self.links
            .tail
            .and_then(|t| self.links.nodes[t].entries.last())
            .map(Entry::hit)
    }

    /// Hits in ascending object id order.
    pub fn iter(&self) -> Hits<'_, 's> {
        Hits {
            nodes: &self.links.nodes,
            next_chunk: self.links.head,
            current: Default::default(),
        }
    }

    /// Merged chunk ranges in ascending order.
    pub fn chunks(&self) -> impl Iterator<Item = ChunkRange> + '_ {
        let nodes = &self.links.nodes;
        std::iter::successors(self.links.head, move |&i| nodes[i].next).map(move |i| nodes[i].range())
    }

    /// Consume the list, yielding hits in ascending order.
    pub fn into_hits(self) -> Vec<Hit<'s>> {
        let mut order = Vec::with_capacity(self.links.nodes.len());
        let mut cursor = self.links.head;
        while let Some(i) = cursor {
            order.push(i);
            cursor = self.links.nodes[i].next;
        }

        let mut runs: Vec<Option<Vec<Entry<'s>>>> =
            self.links.nodes.into_iter().map(|n| Some(n.entries)).collect();
        let mut hits = Vec::with_capacity(self.links.entry_count);
        for i in order {
            if let Some(run) = runs[i].take() {
                hits.extend(run.into_iter().map(Entry::into_hit));
            }
        }
        hits
    }

    /// Tear down the list. Chunk bookkeeping goes first, then each entry is
    /// released exactly once.
    pub fn release(self) -> usize {
        let mut released = 0;
        for node in self.links.nodes {
            let ChunkNode { entries, .. } = node;
            released += entries.into_iter().map(Entry::release).sum::<usize>();
        }
        tracing::debug!(released, "released hit list");
        released
    }
}

impl<'a, 's> IntoIterator for &'a MergedHits<'s> {
    type Item = &'a Hit<'s>;
    type IntoIter = Hits<'a, 's>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over merged hits, walking chunks by their links.
pub struct Hits<'a, 's> {
    nodes: &'a [ChunkNode<'s>],
    next_chunk: Option<usize>,
    current: std::slice::Iter<'a, Entry<'s>>,
}

impl<'a, 's> Iterator for Hits<'a, 's> {
    type Item = &'a Hit<'s>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.current.next() {
                return Some(entry.hit());
            }
            let i = self.next_chunk?;
            self.current = self.nodes[i].entries.iter();
            self.next_chunk = self.nodes[i].next;
        }
    }
}
