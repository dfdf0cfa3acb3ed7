pub mod core;
pub mod hit;
pub mod hitlist;
pub mod report;
pub mod parallel;

/*
┌──────────────────────────────────────────────────────────────────────────────┐
│                            HITMERGE DATA FLOW                                │
└──────────────────────────────────────────────────────────────────────────────┘

  DataShard (read-only, owned elsewhere)
      │  TargetView<'s>  (borrowed name / accession / description / sequence)
      ▼
  worker ──► EntryPool<'s> ──► Entry<'s> { Hit<'s> } ──► Chunk<'s>   (private, unlocked)
                                                            │
                                                            │ merge_chunk (Mutex, O(#chunks) scan,
                                                            │              O(1) splice)
                                                            ▼
  HitList<'s>  ── Mutex<ChunkLinks> ─────────────────────────────────────────────┐
  │  nodes: [ChunkNode]  (arena, merge order)                                    │
  │  head ─► [1..5] ◄─► [6..10] ◄─► [11..15] ◄─ tail        (ascending links)   │
  │  start_id / end_id / entry_count                                             │
  └──────────────────────────────────────────────────────────────────────────────┘
      │ finish(self)   (merge phase ends; lock consumed)
      ▼
  MergedHits<'s> ──► iter() / chunks() / max_*_length() / emit_tabular()
*/
