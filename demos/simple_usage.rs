use hitmerge::core::config::Config;
use hitmerge::core::error::Result;
use hitmerge::core::types::ObjectId;
use hitmerge::hit::{DataShard, Domain, Hit, ShardRecord};
use hitmerge::parallel::{Partition, PartitionSearcher};
use std::io::stdout;

fn main() -> Result<()> {
    // A small database partition standing in for a loaded shard
    let records = (0..200u64)
        .map(|id| ShardRecord {
            object_id: ObjectId(id),
            name: format!("target_{:03}", id),
            accession: format!("PF{:05}.1", id),
            description: format!("synthetic protein {}", id),
            sequence: b"MSTNPKPQRKTKRNTNRRPQDVKFPGG".to_vec(),
        })
        .collect();
    let shard = DataShard::new(records);

    let config = Config { workers: 4, ..Config::default() };
    let searcher = PartitionSearcher::new(&config)?;
    let partitions = Partition::split(ObjectId(0), ObjectId(199), 8);

    println!("Searching {} partitions with {} workers", partitions.len(), config.workers);
    let hits = searcher.search(&partitions, |partition, sink| {
        for id in partition.start_id.0..=partition.end_id.0 {
            if id % 17 != 0 {
                continue;
            }
            let Some(target) = shard.find(ObjectId(id)) else { continue };
            let mut hit = Hit::new(ObjectId(id), target);
            hit.scores.score = 20.0 + (id % 13) as f32;
            hit.scores.pre_score = hit.scores.score + 0.4;
            hit.scores.ln_p = -(id as f64) / 4.0 - 5.0;
            hit.scores.n_expected = 1.0;
            hit.scores.n_regions = 1;
            hit.scores.n_envelopes = 1;
            hit.scores.n_reported = 1;
            hit.scores.n_included = 1;
            hit.domains.push(Domain {
                ienv: 1,
                jenv: 27,
                iali: 2,
                jali: 25,
                hmm_from: 1,
                hmm_to: 24,
                bit_score: hit.scores.score - 0.5,
                ln_p: hit.scores.ln_p + 0.5,
                is_reported: true,
                is_included: true,
                ..Default::default()
            });
            sink.push(hit)?;
        }
        Ok(())
    })?;

    println!("Merged {} hits in {} chunks", hits.len(), hits.chunk_count());
    hits.emit_tabular(&mut stdout().lock(), "demo_query", "-", 200.0, true)?;
    Ok(())
}
