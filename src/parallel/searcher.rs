use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::ObjectId;
use crate::hit::record::Hit;
use crate::hitlist::aggregate::{HitList, MergedHits};
use crate::hitlist::chunk::Chunk;
use crate::hitlist::entry::EntryPool;

/// Inclusive object id range of one database region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub start_id: ObjectId,
    pub end_id: ObjectId,
}

impl Partition {
    pub fn new(start_id: ObjectId, end_id: ObjectId) -> Self {
        Partition { start_id, end_id }
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.start_id <= id && id <= self.end_id
    }

    /// Split `[start, end]` into at most `count` contiguous partitions of
    /// near-equal size.
    pub fn split(start: ObjectId, end: ObjectId, count: usize) -> Vec<Partition> {
        if end < start || count == 0 {
            return Vec::new();
        }
        // u128 so the full [0, u64::MAX] range has a representable length
        let total = u128::from(end.0 - start.0) + 1;
        let count = (count as u128).min(total);
        let base = total / count;
        let extra = total % count;

        let mut partitions = Vec::with_capacity(count as usize);
        let mut next = u128::from(start.0);
        for i in 0..count {
            let last = next + base + u128::from(i < extra) - 1;
            // every bound lies within [start, end], so it fits in u64
            partitions.push(Partition::new(ObjectId(next as u64), ObjectId(last as u64)));
            next = last + 1;
        }
        partitions
    }
}

/// A worker's private collector for one partition.
pub struct HitSink<'p, 's> {
    pool: &'p mut EntryPool<'s>,
    chunk: Chunk<'s>,
    partition: Partition,
}

impl<'p, 's> HitSink<'p, 's> {
    pub fn new(pool: &'p mut EntryPool<'s>, partition: Partition) -> Self {
        HitSink {
            pool,
            chunk: Chunk::new(),
            partition,
        }
    }

    /// Record a hit. Hits must arrive in ascending object id order and lie
    /// inside the partition being scanned.
    pub fn push(&mut self, hit: Hit<'s>) -> Result<()> {
        debug_assert!(
            self.partition.contains(hit.object_id),
            "hit {} outside partition [{}, {}]",
            hit.object_id,
            self.partition.start_id,
            self.partition.end_id
        );
        let entry = self.pool.wrap(hit)?;
        self.chunk.append(entry)
    }

    pub fn into_chunk(self) -> Chunk<'s> {
        self.chunk
    }
}

/// Runs a scan over many partitions in parallel and merges every worker's
/// chunk into one hit list.
pub struct PartitionSearcher {
    pub workers: usize,
    pub pool_size: usize,
    pub progress: Arc<AtomicUsize>,
    thread_pool: rayon::ThreadPool,
}

impl PartitionSearcher {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("hitmerge-worker-{}", i))
            .build()
            .map_err(|e| Error::new(ErrorKind::InvalidArgument, format!("cannot start worker pool: {}", e)))?;

        Ok(PartitionSearcher {
            workers: config.workers,
            pool_size: config.pool_size,
            progress: Arc::new(AtomicUsize::new(0)),
            thread_pool,
        })
    }

    /// Number of partitions finished by the current or last search.
    pub fn get_progress(&self) -> usize {
        self.progress.load(Ordering::Relaxed)
    }

    /// Scan every partition with `scan` and merge the results.
    ///
    /// Each worker keeps its own entry pool and fills a private chunk per
    /// partition; only the final splice takes the hit list lock. The merge
    /// phase ends when every partition is done, so the returned hits are
    /// safe to read.
    pub fn search<'s, F>(&self, partitions: &[Partition], scan: F) -> Result<MergedHits<'s>>
    where
        F: Fn(&Partition, &mut HitSink<'_, 's>) -> Result<()> + Sync,
    {
        self.progress.store(0, Ordering::Relaxed);
        let list = HitList::new();
        let pool_size = self.pool_size;

        self.thread_pool.install(|| {
            partitions.par_iter().try_for_each_init(
                || EntryPool::new(pool_size),
                |pool, partition| -> Result<()> {
                    let pool = pool.as_mut().map_err(|e| e.clone())?;
                    let mut sink = HitSink::new(pool, *partition);
                    scan(partition, &mut sink)?;
                    list.merge_chunk(sink.into_chunk())?;

                    let done = self.progress.fetch_add(1, Ordering::Relaxed) + 1;
                    tracing::trace!(done, total = partitions.len(), "partition merged");
                    Ok(())
                },
            )
        })?;

        let hits = list.finish();
        tracing::info!(
            partitions = partitions.len(),
            hits = hits.len(),
            chunks = hits.chunk_count(),
            "search merge complete"
        );
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn searcher(workers: usize) -> PartitionSearcher {
        let config = Config { workers, pool_size: 4, ..Config::default() };
        PartitionSearcher::new(&config).unwrap()
    }

    #[test]
    fn split_covers_range_without_gaps() {
        let parts = Partition::split(ObjectId(1), ObjectId(10), 3);
        assert_eq!(
            parts,
            vec![
                Partition::new(ObjectId(1), ObjectId(4)),
                Partition::new(ObjectId(5), ObjectId(7)),
                Partition::new(ObjectId(8), ObjectId(10)),
            ]
        );
        assert_eq!(Partition::split(ObjectId(5), ObjectId(6), 10).len(), 2);
        assert!(Partition::split(ObjectId(6), ObjectId(5), 2).is_empty());
    }

    #[test]
    fn split_reaches_the_top_of_the_id_space() {
        let top = u64::MAX;
        assert_eq!(
            Partition::split(ObjectId(top - 9), ObjectId(top), 2),
            vec![
                Partition::new(ObjectId(top - 9), ObjectId(top - 5)),
                Partition::new(ObjectId(top - 4), ObjectId(top)),
            ]
        );
        assert_eq!(
            Partition::split(ObjectId(top), ObjectId(top), 3),
            vec![Partition::new(ObjectId(top), ObjectId(top))]
        );
    }

    #[test]
    fn split_full_id_space() {
        let parts = Partition::split(ObjectId(0), ObjectId(u64::MAX), 4);
        let quarter = 1u64 << 62;
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], Partition::new(ObjectId(0), ObjectId(quarter - 1)));
        assert_eq!(parts[3], Partition::new(ObjectId(3 * quarter), ObjectId(u64::MAX)));
        assert!(parts.windows(2).all(|w| w[0].end_id.0 + 1 == w[1].start_id.0));
    }

    #[test]
    fn pool_allocation_error_keeps_its_cause() {
        let config = Config { workers: 1, pool_size: usize::MAX, ..Config::default() };
        let searcher = PartitionSearcher::new(&config).unwrap();
        let partitions = Partition::split(ObjectId(0), ObjectId(9), 1);
        let err = searcher.search(&partitions, |_p, _sink| Ok(())).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfMemory);
        assert!(err.context.contains("capacity"), "unexpected context: {}", err.context);
    }

    #[test]
    fn search_merges_every_partition_in_order() {
        let searcher = searcher(4);
        let partitions = Partition::split(ObjectId(0), ObjectId(999), 37);
        let hits = searcher
            .search(&partitions, |p, sink| {
                for id in p.start_id.0..=p.end_id.0 {
                    if id % 7 == 0 {
                        sink.push(Hit::new(ObjectId(id), Default::default()))?;
                    }
                }
                Ok(())
            })
            .unwrap();

        let ids: Vec<u64> = hits.iter().map(|h| h.object_id.0).collect();
        let expected: Vec<u64> = (0..1000).filter(|id| id % 7 == 0).collect();
        assert_eq!(ids, expected);
        assert_eq!(searcher.get_progress(), 37);
    }

    #[test]
    fn scan_error_is_returned() {
        let searcher = searcher(2);
        let partitions = Partition::split(ObjectId(0), ObjectId(99), 4);
        let result = searcher.search(&partitions, |p, _sink| {
            if p.start_id.0 == 50 {
                Err(Error::new(ErrorKind::InvalidArgument, "bad partition".to_string()))
            } else {
                Ok(())
            }
        });
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn overlapping_partitions_are_rejected() {
        let searcher = searcher(1);
        let partitions = vec![
            Partition::new(ObjectId(0), ObjectId(10)),
            Partition::new(ObjectId(5), ObjectId(15)),
        ];
        let result = searcher.search(&partitions, |p, sink| {
            sink.push(Hit::new(p.start_id, Default::default()))?;
            sink.push(Hit::new(p.end_id, Default::default()))
        });
        assert_eq!(result.unwrap_err().kind(), ErrorKind::OverlappingRange);
    }
}
