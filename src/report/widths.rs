use crate::hitlist::aggregate::MergedHits;

/// Column width helpers. All lengths are in characters; an empty list
/// reports 0.
impl MergedHits<'_> {
    pub fn max_name_length(&self) -> usize {
        self.iter().map(|h| h.name().chars().count()).max().unwrap_or(0)
    }

    pub fn max_accession_length(&self) -> usize {
        self.iter().map(|h| h.accession().chars().count()).max().unwrap_or(0)
    }

    /// Widest decimal rendering of any domain coordinate across all hits.
    pub fn max_position_length(&self) -> usize {
        self.iter().map(|h| h.max_position_length()).max().unwrap_or(0)
    }
}
