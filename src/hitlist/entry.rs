use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::types::ObjectId;
use crate::hit::record::Hit;

/// A slot holding one hit on its way from a worker into a hit list.
///
/// Ordering is carried by position: an entry's neighbours are the entries
/// next to it in its chunk, and chunks are linked inside the hit list.
#[derive(Debug, Default)]
pub struct Entry<'s> {
    hit: Hit<'s>,
}

impl<'s> Entry<'s> {
    /// Create an entry with a zero-initialized hit.
    pub fn new() -> Self {
        Entry { hit: Hit::default() }
    }

    pub fn from_hit(hit: Hit<'s>) -> Self {
        Entry { hit }
    }

    pub fn object_id(&self) -> ObjectId {
        self.hit.object_id
    }

    pub fn hit(&self) -> &Hit<'s> {
        &self.hit
    }

    pub fn hit_mut(&mut self) -> &mut Hit<'s> {
        &mut self.hit
    }

    pub fn into_hit(self) -> Hit<'s> {
        self.hit
    }

    /// Tear the entry down. Only the hit's owned scores and domains are
    /// freed; its target view is a borrow into the shard and is left alone.
    pub fn release(self) -> usize {
        let Hit { scores, domains, .. } = self.hit;
        drop(scores);
        drop(domains);
        1
    }
}

/// Free list of pre-allocated entries so workers don't allocate per hit.
///
/// The pool allocates in batches of `batch_size`; when it runs dry, `take`
/// allocates another batch.
#[derive(Debug)]
pub struct EntryPool<'s> {
    free: Vec<Entry<'s>>,
    batch_size: usize,
    allocated: usize,
}

impl<'s> EntryPool<'s> {
    /// Allocate a pool holding `num_entries` empty entries.
    pub fn new(num_entries: usize) -> Result<Self> {
        let mut pool = EntryPool {
            free: Vec::new(),
            batch_size: num_entries.max(1),
            allocated: 0,
        };
        pool.refill(num_entries)?;
        Ok(pool)
    }

    pub fn with_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Self::new(config.pool_size)
    }

    fn refill(&mut self, count: usize) -> Result<()> {
        self.free.try_reserve_exact(count)?;
        self.free.extend((0..count).map(|_| Entry::new()));
        self.allocated += count;
        tracing::trace!(count, allocated = self.allocated, "entry pool refilled");
        Ok(())
    }

    /// Pull an empty entry, allocating another batch if the pool is empty.
    pub fn take(&mut self) -> Result<Entry<'s>> {
        if self.free.is_empty() {
            self.refill(self.batch_size)?;
        }
        // refill guarantees at least one free entry
        Ok(self.free.pop().unwrap_or_default())
    }

    /// Take an entry and fill it with `hit`.
    pub fn wrap(&mut self, hit: Hit<'s>) -> Result<Entry<'s>> {
        let mut entry = self.take()?;
        *entry.hit_mut() = hit;
        Ok(entry)
    }

    /// Return an unused entry to the free list.
    pub fn recycle(&mut self, mut entry: Entry<'s>) {
        entry.hit_mut().reset();
        self.free.push(entry);
    }

    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Total entries this pool has ever allocated.
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    /// Release every entry still on the free list.
    pub fn release(self) -> usize {
        self.free.into_iter().map(Entry::release).sum()
    }
}
