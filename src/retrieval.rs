//! Top-1 retrieval over N secret-shared documents: a score phase built on
//! the Beaver dot product (`beaver.rs`), followed by a binary search over
//! score thresholds built on the Cmp protocol (`cmp.rs`) that narrows a
//! public interval of candidate score values round by round, then a
//! finalization step that selects the one document whose score falls in
//! the narrowed interval.
//!
//! Each binary-search round deals exactly one shared `CmpKey` and evaluates
//! it against every document's score (in parallel across documents), rather
//! than dealing one key per document or per pairwise comparison: comparing a
//! secret-shared score `s` to a round's public threshold `mid` reduces to
//! testing the sign of `s - mid`, using the same interval-membership test
//! Cmp already computes, with `x_l = 0` and `x_r = p/2` fixed for every
//! round (only the mask `r` and the public `mid` folded into the diff vary).
//! Summing every document's indicator share (locally, then across parties)
//! gives the count of documents scoring at or above `mid`, which is enough
//! to halve the candidate interval without revealing any individual score.
//!
//! Finalization runs one more Cmp instance, this time testing interval
//! membership directly against the narrowed `[lo, hi)` (no diff needed,
//! since the bounds themselves are now public), and combines each
//! document's indicator with its (score, index) pair via the Beaver
//! kernel's `elementwise_mul`: since exactly one document's score lies in
//! the final interval, the weighted sum across all documents reconstructs
//! to exactly that document's shares.
//!
//! Round count is `ceil(log2(n_docs))` (this crate does not hardcode the
//! reference's under-counted constant); the initial score-domain bound is
//! sized so that many rounds fully resolve it.

use log::{info, trace, warn};
use rayon::prelude::*;

use crate::beaver::{self, Triple};
use crate::cmp::{self, CmpKey};
use crate::config::PRIME;
use crate::field::FieldElement;
use crate::prg::PrgContext;

/// Exclusive upper bound of the field's "positive half", used to interpret a
/// masked difference as a signed integer when comparing a score to a
/// threshold.
const HALF: u64 = PRIME / 2;

/// Number of binary-search rounds needed to narrow the score interval:
/// `ceil(log2(n_docs))`. Panics if `n_docs == 0`.
pub fn steps_for(n_docs: usize) -> u32 {
    assert!(n_docs > 0, "retrieval needs at least one document");
    if n_docs == 1 {
        return 0;
    }
    usize::BITS - (n_docs - 1).leading_zeros()
}

/// One party's share of a single candidate document: its score and its index,
/// kept paired so the final select moves them together.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub score: FieldElement,
    pub index: FieldElement,
}

impl Candidate {
    pub fn new(score: FieldElement, index: FieldElement) -> Self {
        Self { score, index }
    }
}

/// Per-round correlated randomness: a single Cmp key, shared across every
/// document's comparison against that round's threshold. The interval
/// `(0, p/2)` is fixed; only the mask varies per round.
pub struct ThresholdMaterial {
    cmp_key: CmpKey,
}

/// Dealer-side setup for one binary-search round. One `CmpKey` is dealt and
/// evaluated against all documents, not one per document.
pub fn deal_threshold(ctx: &PrgContext) -> (ThresholdMaterial, ThresholdMaterial) {
    let (cmp0, cmp1) = cmp::deal(ctx, FieldElement::ZERO, FieldElement::from_u64(HALF));
    (ThresholdMaterial { cmp_key: cmp0 }, ThresholdMaterial { cmp_key: cmp1 })
}

/// Evaluate one round's shared threshold key against every document's score,
/// in parallel, returning each document's (unrevealed) local indicator
/// share. Only party 0 folds the public `mid` into its share of the
/// difference, so the two parties' diff shares still sum to `score - mid`.
///
/// `reveal_z` models the one-round "publish this document's share of `z`,
/// receive the other party's" exchange the Cmp mask needs, indexed by
/// document so a real transport can batch or route per document.
pub fn eval_threshold(
    ctx: &PrgContext,
    party_id: u8,
    scores: &[FieldElement],
    mid: u64,
    material: &ThresholdMaterial,
    reveal_z: impl Fn(usize, FieldElement) -> FieldElement + Sync,
) -> Vec<FieldElement> {
    let mid = FieldElement::from_u64(mid);
    scores
        .par_iter()
        .enumerate()
        .map(|(j, &score)| {
            let diff = if party_id == 0 { score - mid } else { score };
            let z_share = material.cmp_key.mask_share(diff);
            let z = z_share + reveal_z(j, z_share);
            cmp::eval(ctx, party_id, &material.cmp_key, z)
        })
        .collect()
}

/// Sum a party's local indicator shares into its share of the round's
/// aggregate count. The caller reveals and sums both parties' counts to
/// learn how many documents scored at or above `mid`.
pub fn local_count(indicators: &[FieldElement]) -> FieldElement {
    indicators.iter().copied().sum()
}

/// Narrow `[lo, hi)` given the revealed count of documents scoring at or
/// above this round's `mid`: if any document qualified, the winner lies in
/// `[mid, hi)`, otherwise it lies in `[lo, mid)`. Logs the round's interval
/// at `info!` and warns if `count` falls outside `[0, n_docs]`, a symptom of
/// a prior misuse (a non-additively-shared score, a stale key) rather than
/// something this loop can itself recover from.
pub fn narrow(round: u32, lo: u64, hi: u64, mid: u64, count: u64, n_docs: usize) -> (u64, u64) {
    info!("retrieval round {}: interval [{}, {}), mid {}", round, lo, hi, mid);
    if count as usize > n_docs {
        warn!("retrieval round {}: indicator count {} exceeds n_docs {}", round, count, n_docs);
    }
    if count > 0 {
        (mid, hi)
    } else {
        (lo, mid)
    }
}

/// The midpoint of `[lo, hi)` used as the next round's threshold.
pub fn midpoint(lo: u64, hi: u64) -> u64 {
    lo + (hi - lo) / 2
}

/// Per-document correlated randomness for finalization: a single Cmp key
/// testing membership in the narrowed interval, shared across every
/// document, plus one dimension-2 Beaver triple per document for the
/// oblivious select (each triple is consumed by exactly one document's
/// multiplication, so it cannot be shared the way the Cmp key is).
pub struct SelectMaterial {
    cmp_key: CmpKey,
    mux_triples: Vec<Triple>,
}

/// Dealer-side setup for finalization: one Cmp key testing `[lo, hi)`
/// membership, plus one fresh mux triple per document.
pub fn deal_select(ctx: &PrgContext, lo: u64, hi: u64, n_docs: usize) -> (SelectMaterial, SelectMaterial) {
    let (cmp0, cmp1) = cmp::deal(ctx, FieldElement::from_u64(lo), FieldElement::from_u64(hi));
    let mut triples0 = Vec::with_capacity(n_docs);
    let mut triples1 = Vec::with_capacity(n_docs);
    for _ in 0..n_docs {
        let (t0, t1) = Triple::deal(2);
        triples0.push(t0);
        triples1.push(t1);
    }
    (
        SelectMaterial { cmp_key: cmp0, mux_triples: triples0 },
        SelectMaterial { cmp_key: cmp1, mux_triples: triples1 },
    )
}

/// Select the one candidate whose score lies in the narrowed interval:
/// evaluates the shared membership key against every candidate in parallel,
/// multiplies each candidate's indicator against its (score, index) pair,
/// and sums the results. Exactly one candidate's indicator reconstructs to
/// `1`, so the sum reconstructs to that candidate's shares.
pub fn select_winner(
    ctx: &PrgContext,
    party_id: u8,
    candidates: &[Candidate],
    material: &SelectMaterial,
    reveal_z: impl Fn(usize, FieldElement) -> FieldElement + Sync,
    reveal_mux: impl Fn(usize, Vec<FieldElement>, Vec<FieldElement>) -> (Vec<FieldElement>, Vec<FieldElement>) + Sync,
) -> Candidate {
    assert_eq!(candidates.len(), material.mux_triples.len(), "one mux triple per candidate");
    trace!("select_winner: {} candidates, party {}", candidates.len(), party_id);

    let contributions: Vec<(FieldElement, FieldElement)> = candidates
        .par_iter()
        .zip(material.mux_triples.par_iter())
        .enumerate()
        .map(|(j, (candidate, triple))| {
            let z_share = material.cmp_key.mask_share(candidate.score);
            let z = z_share + reveal_z(j, z_share);
            let indicator = cmp::eval(ctx, party_id, &material.cmp_key, z);

            let selected = beaver::elementwise_mul(
                party_id,
                &[indicator, indicator],
                &[candidate.score, candidate.index],
                triple,
                |d, e| reveal_mux(j, d, e),
            );
            (selected[0], selected[1])
        })
        .collect();

    Candidate {
        score: contributions.iter().map(|(s, _)| *s).sum(),
        index: contributions.iter().map(|(_, i)| *i).sum(),
    }
}

/// Session parameters for top-1 retrieval over `n_docs` documents of `dim`
/// features each.
pub struct RetrievalSession {
    n_docs: usize,
    dim: usize,
    steps: u32,
}

impl RetrievalSession {
    pub fn new(n_docs: usize, dim: usize) -> Self {
        Self {
            n_docs,
            dim,
            steps: steps_for(n_docs),
        }
    }

    pub fn n_docs(&self) -> usize {
        self.n_docs
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// `ceil(log2(n_docs))`, the number of binary-search rounds this session runs.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// The public score-domain bound a fresh session assumes: `[0, 2^(steps+1))`.
    /// Doubling the width that `steps` rounds of halving would need to reach
    /// width 1 is a deliberate convention, not a cryptographic guarantee for
    /// arbitrary score magnitudes — see DESIGN.md.
    pub fn initial_bound(&self) -> (u64, u64) {
        (0, 1u64.checked_shl(self.steps + 1).unwrap_or(u64::MAX))
    }

    /// Score phase: one Beaver dot product per document, each
    /// against a fresh triple, partitioned across documents in parallel.
    pub fn score_phase(
        &self,
        party_id: u8,
        docs: &[Vec<FieldElement>],
        query: &[FieldElement],
        triples: &[Triple],
        reveal: impl Fn(usize, Vec<FieldElement>, Vec<FieldElement>) -> (Vec<FieldElement>, Vec<FieldElement>) + Sync,
    ) -> Vec<FieldElement> {
        assert_eq!(docs.len(), self.n_docs, "expected one vector per document");
        assert_eq!(triples.len(), self.n_docs, "expected one fresh triple per document");
        assert_eq!(query.len(), self.dim, "query dimension mismatch");
        trace!("score_phase: {} documents, dim {}, party {}", self.n_docs, self.dim, party_id);

        docs.par_iter()
            .zip(triples.par_iter())
            .enumerate()
            .map(|(j, (doc, triple))| {
                assert_eq!(doc.len(), self.dim, "document dimension mismatch");
                beaver::dot_product(party_id, doc, query, triple, |d, e| reveal(j, d, e))
            })
            .collect()
    }
}
