use crate::core::types::ObjectId;
use crate::hit::shard::TargetView;

/// Per-target scores, all owned by the hit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HitScores {
    pub score: f32,       // Bit score of the full sequence
    pub pre_score: f32,   // Bit score before null2 correction
    pub sum_score: f32,   // Bit score summed over domains
    pub ln_p: f64,
    pub pre_ln_p: f64,
    pub sum_ln_p: f64,
    pub n_expected: f32,  // Posterior expected number of domains
    pub n_regions: u32,
    pub n_clustered: u32,
    pub n_overlaps: u32,
    pub n_envelopes: u32,
    pub n_reported: u32,
    pub n_included: u32,
    pub best_domain: usize,
}

/// One domain annotation on a hit. Coordinates are 1-based and inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Domain {
    pub ienv: u64,
    pub jenv: u64,
    pub iali: u64,
    pub jali: u64,
    pub hmm_from: u64,
    pub hmm_to: u64,
    pub bit_score: f32,
    pub dom_bias: f32,
    pub ln_p: f64,
    pub is_reported: bool,
    pub is_included: bool,
}

impl Domain {
    fn coordinates(&self) -> [u64; 6] {
        [self.ienv, self.jenv, self.iali, self.jali, self.hmm_from, self.hmm_to]
    }
}

/// A search hit against one database object.
///
/// Provenance is split by type: `target` borrows from the data shard for the
/// lifetime `'s` and is never released here, while `scores` and `domains`
/// belong to the hit and are dropped with it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hit<'s> {
    pub object_id: ObjectId,
    pub target: TargetView<'s>,
    pub scores: HitScores,
    pub domains: Vec<Domain>,
}

impl<'s> Hit<'s> {
    pub fn new(object_id: ObjectId, target: TargetView<'s>) -> Self {
        Hit {
            object_id,
            target,
            ..Default::default()
        }
    }

    pub fn name(&self) -> &'s str {
        self.target.name
    }

    pub fn accession(&self) -> &'s str {
        self.target.accession
    }

    pub fn description(&self) -> &'s str {
        self.target.description
    }

    /// Full-sequence E-value given the effective database size `z`.
    pub fn evalue(&self, z: f64) -> f64 {
        self.scores.ln_p.exp() * z
    }

    /// Composition bias correction in bits.
    pub fn bias(&self) -> f32 {
        self.scores.pre_score - self.scores.score
    }

    pub fn best_domain(&self) -> Option<&Domain> {
        self.domains.get(self.scores.best_domain)
    }

    /// Widest decimal rendering of any domain coordinate on this hit.
    pub fn max_position_length(&self) -> usize {
        self.domains
            .iter()
            .flat_map(|d| d.coordinates())
            .map(decimal_width)
            .max()
            .unwrap_or(0)
    }

    /// Return to the zero-initialized state, dropping owned domain data and
    /// forgetting the shard view.
    pub fn reset(&mut self) {
        self.object_id = ObjectId::default();
        self.target = TargetView::default();
        self.scores = HitScores::default();
        self.domains.clear();
    }
}

fn decimal_width(value: u64) -> usize {
    value.checked_ilog10().map_or(1, |d| d as usize + 1)
}
