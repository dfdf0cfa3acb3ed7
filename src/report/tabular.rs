use std::io::Write;
use crate::core::error::Result;
use crate::hit::record::Hit;
use crate::hitlist::aggregate::MergedHits;
use crate::report::format::format_general;

const MIN_NAME_WIDTH: usize = 20;
const MIN_ACCESSION_WIDTH: usize = 10;

/// Column widths for one per-target table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabularLayout {
    pub target_name: usize,
    pub target_accession: usize,
    pub query_name: usize,
    pub query_accession: usize,
}

impl TabularLayout {
    pub fn new(hits: &MergedHits, query_name: &str, query_accession: &str) -> Self {
        TabularLayout {
            target_name: hits.max_name_length().max(MIN_NAME_WIDTH),
            target_accession: hits.max_accession_length().max(MIN_ACCESSION_WIDTH),
            query_name: query_name.chars().count().max(MIN_NAME_WIDTH),
            query_accession: query_accession.chars().count().max(MIN_ACCESSION_WIDTH),
        }
    }

    pub fn header(&self) -> String {
        format!(
            "#{:<tn$} {:<ta$} {:<qn$} {:<qa$} {:>9} {:>6} {:>5} {:>9} {:>6} {:>5} {:>5} {:>3} {:>3} {:>3} {:>3} {:>3} {:>3} {:>3} {}",
            " target name", "accession", "query name", "accession",
            "E-value", "score", "bias", "E-value", "score", "bias",
            "exp", "reg", "clu", "ov", "env", "dom", "rep", "inc",
            "description of target",
            tn = self.target_name - 1,
            ta = self.target_accession,
            qn = self.query_name,
            qa = self.query_accession,
        )
    }

    pub fn row(&self, hit: &Hit, query_name: &str, query_accession: &str, z: f64) -> String {
        let s = &hit.scores;
        let best = match hit.best_domain() {
            Some(d) => format!(
                "{:>9} {:>6.1} {:>5.1}",
                format_general((d.ln_p).exp() * z, 2),
                d.bit_score,
                d.dom_bias
            ),
            None => format!("{:>9} {:>6} {:>5}", "-", "-", "-"),
        };
        format!(
            "{:<tn$} {:<ta$} {:<qn$} {:<qa$} {:>9} {:>6.1} {:>5.1} {} {:>5.1} {:>3} {:>3} {:>3} {:>3} {:>3} {:>3} {:>3} {}",
            or_dash(hit.name()),
            or_dash(hit.accession()),
            query_name,
            or_dash(query_accession),
            format_general(hit.evalue(z), 2),
            s.score,
            hit.bias(),
            best,
            s.n_expected,
            s.n_regions,
            s.n_clustered,
            s.n_overlaps,
            s.n_envelopes,
            hit.domains.len(),
            s.n_reported,
            s.n_included,
            or_dash(hit.description()),
            tn = self.target_name,
            ta = self.target_accession,
            qn = self.query_name,
            qa = self.query_accession,
        )
    }
}

fn or_dash(text: &str) -> &str {
    if text.is_empty() { "-" } else { text }
}

/// Write one line per hit, in ascending object id order, as a
/// whitespace-aligned table that can be concatenated across queries.
///
/// `z` is the effective database size used for E-values. A failed write is
/// returned as `ErrorKind::Write`; lines already written stay written.
pub fn emit_tabular<W: Write>(
    sink: &mut W,
    query_name: &str,
    query_accession: &str,
    hits: &MergedHits,
    z: f64,
    show_header: bool,
) -> Result<()> {
    let layout = TabularLayout::new(hits, query_name, query_accession);
    if show_header {
        writeln!(sink, "{}", layout.header())?;
    }
    for hit in hits {
        writeln!(sink, "{}", layout.row(hit, query_name, query_accession, z))?;
    }
    Ok(())
}

impl MergedHits<'_> {
    pub fn emit_tabular<W: Write>(
        &self,
        sink: &mut W,
        query_name: &str,
        query_accession: &str,
        z: f64,
        show_header: bool,
    ) -> Result<()> {
        emit_tabular(sink, query_name, query_accession, self, z, show_header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use crate::core::error::ErrorKind;
    use crate::core::types::ObjectId;
    use crate::hit::record::Domain;
    use crate::hit::shard::{DataShard, ShardRecord, TargetView};
    use crate::hitlist::{Chunk, HitList};

    fn shard() -> DataShard {
        let records = (1..=3)
            .map(|i| ShardRecord {
                object_id: ObjectId(i * 10),
                name: format!("target{}", i),
                accession: if i == 2 { String::new() } else { format!("ACC{}", i) },
                description: format!("protein {}", i),
                sequence: Vec::new(),
            })
            .collect();
        DataShard::new(records)
    }

    fn merged(shard: &DataShard) -> MergedHits<'_> {
        let list = HitList::new();
        // merge out of order so emission order comes from the list, not the caller
        for i in [2usize, 0, 1] {
            let record = &shard.records()[i];
            let mut hit = Hit::new(record.object_id, shard.view(i).unwrap());
            hit.scores.score = 50.0 + i as f32;
            hit.scores.pre_score = 51.0 + i as f32;
            hit.scores.ln_p = (1e-10f64).ln();
            hit.domains.push(Domain { bit_score: 49.5, ln_p: (1e-9f64).ln(), ..Default::default() });
            let mut chunk = Chunk::new();
            chunk.push_hit(hit).unwrap();
            list.merge_chunk(chunk).unwrap();
        }
        list.finish()
    }

    struct FullSink {
        accepted: usize,
        written: Vec<u8>,
    }

    impl Write for FullSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.accepted == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "no space left on device"));
            }
            self.accepted -= 1;
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn empty_list_with_header_writes_only_header() {
        let hits = HitList::new().finish();
        let mut out = Vec::new();
        emit_tabular(&mut out, "query", "QACC", &hits, 1.0, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("# target name"));
    }

    #[test]
    fn empty_list_without_header_writes_nothing() {
        let hits = HitList::new().finish();
        let mut out = Vec::new();
        emit_tabular(&mut out, "query", "QACC", &hits, 1.0, false).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn one_row_per_hit_in_ascending_order() {
        let shard = shard();
        let hits = merged(&shard);
        let mut out = Vec::new();
        hits.emit_tabular(&mut out, "myquery", "", 1000.0, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        let names: Vec<&str> = text.lines().map(|l| l.split_whitespace().next().unwrap()).collect();
        assert_eq!(names, vec!["target1", "target2", "target3"]);
    }

    #[test]
    fn row_columns() {
        let shard = shard();
        let hits = merged(&shard);
        let mut out = Vec::new();
        emit_tabular(&mut out, "myquery", "Q1", &hits, 1000.0, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        let second: Vec<&str> = text.lines().nth(2).unwrap().split_whitespace().collect();
        assert_eq!(second[0], "target2");
        assert_eq!(second[1], "-");
        assert_eq!(second[2], "myquery");
        assert_eq!(second[3], "Q1");
        assert_eq!(second[4], "1e-07");
        assert_eq!(second[5], "51.0");
        assert_eq!(second[6], "1.0");
        assert_eq!(second[7], "1e-06");
        assert_eq!(second[8], "49.5");
        assert_eq!(&second[second.len() - 2..], &["protein", "2"]);
    }

    fn bare_hit_row(hit: Hit<'_>) -> Vec<String> {
        let list = HitList::new();
        let mut chunk = Chunk::new();
        chunk.push_hit(hit).unwrap();
        list.merge_chunk(chunk).unwrap();
        let hits = list.finish();
        let layout = TabularLayout::new(&hits, "q", "QA");
        let row = layout.row(hits.first().unwrap(), "q", "QA", 1.0);
        row.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn empty_target_name_renders_as_dash() {
        let mut hit = Hit::new(ObjectId(1), Default::default());
        hit.domains.push(Domain { bit_score: 12.0, ..Default::default() });
        let cols = bare_hit_row(hit);
        assert_eq!(cols.len(), 19);
        assert_eq!(cols[0], "-");
        assert_eq!(cols[1], "-");
        assert_eq!(cols[2], "q");
        assert_eq!(cols[3], "QA");
        assert_eq!(cols[8], "12.0");
    }

    #[test]
    fn hit_without_domains_dashes_best_domain_columns() {
        let name = String::from("lonely");
        let mut hit = Hit::new(ObjectId(4), TargetView { name: &name, ..Default::default() });
        hit.scores.score = 30.0;
        hit.scores.pre_score = 30.5;
        let cols = bare_hit_row(hit);
        assert_eq!(cols.len(), 19);
        assert_eq!(cols[0], "lonely");
        assert_eq!(cols[5], "30.0");
        assert_eq!(cols[6], "0.5");
        assert_eq!(&cols[7..10], &["-", "-", "-"]);
        assert_eq!(cols[15], "0");
    }

    #[test]
    fn columns_align_to_longest_name() {
        let shard = shard();
        let hits = merged(&shard);
        let layout = TabularLayout::new(&hits, "q", "");
        assert_eq!(layout.target_name, 20);
        assert_eq!(layout.query_accession, 10);
        let header = layout.header();
        let row = layout.row(hits.first().unwrap(), "q", "", 1.0);
        assert_eq!(header.find(" accession"), row.find(" ACC1"));
    }

    #[test]
    fn sink_failure_is_a_write_error_and_keeps_prior_lines() {
        let shard = shard();
        let hits = merged(&shard);
        let mut sink = FullSink { accepted: 1, written: Vec::new() };
        let err = emit_tabular(&mut sink, "q", "", &hits, 1.0, true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Write);
        assert!(!sink.written.is_empty());
    }
}
