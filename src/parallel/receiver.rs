use crossbeam::channel::{bounded, Receiver, Sender};
use crate::core::error::{ErrorKind, Result};
use crate::hitlist::aggregate::HitList;
use crate::hitlist::chunk::{Chunk, ChunkRange};

/// Outcome of draining a chunk channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub merged: usize,
    pub hits: usize,
    pub empty: usize,
    pub rejected: Vec<ChunkRange>,
}

/// Create a bounded channel for handing finished chunks to a merging node.
pub fn chunk_channel<'s>(capacity: usize) -> (Sender<Chunk<'s>>, ChunkReceiver<'s>) {
    let (sender, receiver) = bounded(capacity);
    (sender, ChunkReceiver { receiver })
}

/// Receiving end that merges chunks produced elsewhere, e.g. by another
/// machine after a transport layer has rebuilt them.
pub struct ChunkReceiver<'s> {
    receiver: Receiver<Chunk<'s>>,
}

impl<'s> ChunkReceiver<'s> {
    /// Merge every chunk until all senders hang up.
    ///
    /// Chunks whose range overlaps one already merged are dropped and listed
    /// in the report; any other failure stops the drain.
    pub fn drain_into(&self, list: &HitList<'s>) -> Result<MergeReport> {
        let mut report = MergeReport::default();
        for chunk in self.receiver.iter() {
            let Some(range) = chunk.range() else {
                report.empty += 1;
                continue;
            };
            match list.merge_chunk(chunk) {
                Ok(()) => {
                    report.merged += 1;
                    report.hits += range.len;
                }
                Err(e) if e.kind() == ErrorKind::OverlappingRange => report.rejected.push(range),
                Err(e) => return Err(e),
            }
        }
        tracing::debug!(
            merged = report.merged,
            hits = report.hits,
            rejected = report.rejected.len(),
            "chunk channel drained"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use crate::core::types::ObjectId;
    use crate::hit::record::Hit;

    fn chunk(ids: impl IntoIterator<Item = u64>) -> Chunk<'static> {
        let mut chunk = Chunk::new();
        for id in ids {
            chunk.push_hit(Hit::new(ObjectId(id), Default::default())).unwrap();
        }
        chunk
    }

    #[test]
    fn drains_chunks_from_several_senders() {
        let (sender, receiver) = chunk_channel(2);
        let list = HitList::new();

        let report = thread::scope(|s| {
            for node in 0..4u64 {
                let sender = sender.clone();
                s.spawn(move || {
                    for part in 0..5u64 {
                        let base = (part * 4 + node) * 100;
                        sender.send(chunk(base..base + 10)).unwrap();
                    }
                });
            }
            drop(sender);
            receiver.drain_into(&list).unwrap()
        });

        assert_eq!(report.merged, 20);
        assert_eq!(report.hits, 200);
        assert!(report.rejected.is_empty());
        let hits = list.finish();
        let ids: Vec<u64> = hits.iter().map(|h| h.object_id.0).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn overlapping_chunks_are_reported_not_fatal() {
        let (sender, receiver) = chunk_channel(8);
        sender.send(chunk(1..=5)).unwrap();
        sender.send(chunk(3..=8)).unwrap();
        sender.send(Chunk::new()).unwrap();
        sender.send(chunk(6..=10)).unwrap();
        drop(sender);

        let list = HitList::new();
        let report = receiver.drain_into(&list).unwrap();
        assert_eq!(report.merged, 2);
        assert_eq!(report.empty, 1);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].start_id, ObjectId(3));
        assert_eq!(list.len(), 10);
    }
}
