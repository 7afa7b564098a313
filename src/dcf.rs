//! Distributed Comparison Function: `Dcf::gen`/`Dcf::eval`, the FSS scheme whose
//! two key halves evaluate to additive shares of a comparison indicator.
//!
//! Grounded on the reference crate's tree-walk DPF construction (`dpf/two_key.rs`):
//! both build a key as a seed plus one correction word per level of the input
//! domain, and evaluate by re-descending the tree bit by bit, applying each level's
//! correction conditionally on a running control bit. The reference's DPF shares a
//! point function over an XOR group; this DCF shares a *comparison* function over
//! the additive group G, so besides the seed/control correction the reference
//! construction uses, each level also carries a group-valued correction that
//! steers the running sum onto β exactly on the side of α selected by `direction`.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::bits::Bits;
use crate::config::LAMBDA;
use crate::field::FieldElement;
use crate::group::GroupElement;
use crate::prg::PrgContext;

/// Which side of `alpha` carries the non-zero payload.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub enum Direction {
    LessThan,
    GreaterThan,
}

/// The non-zero point of a point function: threshold `alpha` and payload `beta`.
#[derive(Clone, Copy, Debug)]
pub struct Point {
    pub alpha: Bits,
    pub beta: GroupElement,
}

impl Point {
    pub fn new(alpha: Bits, beta: GroupElement) -> Self {
        Self { alpha, beta }
    }
}

/// A `Point` plus the direction tag selecting which side of `alpha` carries `beta`.
#[derive(Clone, Copy, Debug)]
pub struct CmpFunc {
    pub point: Point,
    pub direction: Direction,
}

impl CmpFunc {
    pub fn new(point: Point, direction: Direction) -> Self {
        Self { point, direction }
    }
}

/// One level's correction: a seed mask forcing the "losing" branch's seed and
/// control bit to coincide across parties, and a pair of group payloads (one per
/// branch, the non-selected branch's payload always zero) steering the running
/// sum.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct CorrectionWord {
    seed_cw: [u8; LAMBDA],
    tcw_left: bool,
    tcw_right: bool,
    vcw_left: GroupElement,
    vcw_right: GroupElement,
}

/// One party's half of a DCF, produced by [`Dcf::gen`] and consumed any number of
/// times by [`Dcf::eval`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Key {
    seed: [u8; LAMBDA],
    width: u32,
    cws: Vec<CorrectionWord>,
    /// Final correction applied only on the exceptional leaf `x == alpha`, fixing
    /// up whatever residual the keep-path accumulated along the way.
    cw_np1: GroupElement,
}

fn seed_as_group(seed: &[u8; LAMBDA]) -> GroupElement {
    let mut low = [0u8; 8];
    low.copy_from_slice(&seed[..8]);
    GroupElement::from_field(FieldElement::from_u64(u64::from_le_bytes(low)))
}

fn xor_seed(a: &[u8; LAMBDA], b: &[u8; LAMBDA]) -> [u8; LAMBDA] {
    let mut out = [0u8; LAMBDA];
    for i in 0..LAMBDA {
        out[i] = a[i] ^ b[i];
    }
    out
}

/// Distributed Comparison Function: stateless, carries no data of its own.
pub struct Dcf;

impl Dcf {
    /// Build a key pair for `cmp_func`, starting each party from its own caller-
    /// supplied fresh seed (seeds are external
    /// inputs, not internally sampled, keeping `gen` a pure function of its args).
    pub fn gen(ctx: &PrgContext, cmp_func: CmpFunc, seed0: [u8; LAMBDA], seed1: [u8; LAMBDA]) -> (Key, Key) {
        let alpha = cmp_func.point.alpha;
        let beta = cmp_func.point.beta;
        let n = alpha.width();
        trace!("Dcf::gen n={} direction={:?}", n, cmp_func.direction);

        let mut cur0 = seed0;
        let mut cur1 = seed1;
        let mut t0 = false;
        let mut t1 = true;
        let mut running = GroupElement::zero();
        let mut cws = Vec::with_capacity(n as usize);

        for i in 0..n {
            let alpha_i = alpha.bit(i);
            let exp0 = ctx.expand(&cur0);
            let exp1 = ctx.expand(&cur1);

            // `keep` is the branch matching alpha's bit at this level (the path Gen
            // itself continues down); `lose` is the branch that diverges from alpha.
            let (lose_s0, lose_c0, lose_s1, lose_c1, keep_s0, keep_c0, keep_s1, keep_c1, lose_is_left);
            if alpha_i {
                lose_s0 = exp0.seed0;
                lose_c0 = exp0.control0;
                lose_s1 = exp1.seed0;
                lose_c1 = exp1.control0;
                keep_s0 = exp0.seed1;
                keep_c0 = exp0.control1;
                keep_s1 = exp1.seed1;
                keep_c1 = exp1.control1;
                lose_is_left = true;
            } else {
                lose_s0 = exp0.seed1;
                lose_c0 = exp0.control1;
                lose_s1 = exp1.seed1;
                lose_c1 = exp1.control1;
                keep_s0 = exp0.seed0;
                keep_c0 = exp0.control0;
                keep_s1 = exp1.seed0;
                keep_c1 = exp1.control0;
                lose_is_left = false;
            }

            let seed_cw = xor_seed(&lose_s0, &lose_s1);
            let tcw_lose = lose_c0 ^ lose_c1;
            let tcw_keep = keep_c0 ^ keep_c1 ^ true;

            // Which side the direction wants to carry beta, if Eval diverges here.
            let target = match cmp_func.direction {
                Direction::LessThan => alpha_i,
                Direction::GreaterThan => !alpha_i,
            };
            let target_value = if target { beta } else { GroupElement::zero() };

            let d_lose = seed_as_group(&lose_s0) - seed_as_group(&lose_s1);
            let vcw_lose = if t0 {
                target_value - running - d_lose
            } else {
                -(target_value - running - d_lose)
            };

            let (tcw_left, tcw_right, vcw_left, vcw_right) = if lose_is_left {
                (tcw_lose, tcw_keep, vcw_lose, GroupElement::zero())
            } else {
                (tcw_keep, tcw_lose, GroupElement::zero(), vcw_lose)
            };

            cws.push(CorrectionWord {
                seed_cw,
                tcw_left,
                tcw_right,
                vcw_left,
                vcw_right,
            });

            // Advance both parties along the keep path, applying the correction
            // conditionally on each party's current control bit.
            let mut next0 = keep_s0;
            let mut next_c0 = keep_c0;
            if t0 {
                next0 = xor_seed(&next0, &seed_cw);
                next_c0 ^= tcw_keep;
            }
            let mut next1 = keep_s1;
            let mut next_c1 = keep_c1;
            if t1 {
                next1 = xor_seed(&next1, &seed_cw);
                next_c1 ^= tcw_keep;
            }

            running = running + (seed_as_group(&keep_s0) - seed_as_group(&keep_s1));

            cur0 = next0;
            t0 = next_c0;
            cur1 = next1;
            t1 = next_c1;
        }

        let cw_np1 = if t0 { -running } else { running };

        let key0 = Key {
            seed: seed0,
            width: n,
            cws: cws.clone(),
            cw_np1,
        };
        let key1 = Key {
            seed: seed1,
            width: n,
            cws,
            cw_np1,
        };
        (key0, key1)
    }

    /// Evaluate `key` (held by `party_id`) at `x`, returning that party's additive
    /// share of `f(x)`.
    pub fn eval(ctx: &PrgContext, party_id: u8, key: &Key, x: Bits) -> GroupElement {
        assert_eq!(x.width(), key.width, "input bit width must match the key's domain width");
        assert!(party_id == 0 || party_id == 1, "party id must be 0 or 1");

        let mut seed = key.seed;
        let mut control = party_id == 1;
        let mut acc = GroupElement::zero();

        for i in 0..key.width {
            let bit = x.bit(i);
            let exp = ctx.expand(&seed);
            let cw = &key.cws[i as usize];

            let (raw_seed, raw_control, vcw, tcw) = if bit {
                (exp.seed1, exp.control1, cw.vcw_right, cw.tcw_right)
            } else {
                (exp.seed0, exp.control0, cw.vcw_left, cw.tcw_left)
            };

            acc = acc + seed_as_group(&raw_seed);
            if control {
                acc = acc + vcw;
            }

            let mut next_seed = raw_seed;
            let mut next_control = raw_control;
            if control {
                next_seed = xor_seed(&next_seed, &cw.seed_cw);
                next_control ^= tcw;
            }

            seed = next_seed;
            control = next_control;
        }

        if control {
            acc = acc + key.cw_np1;
        }

        if party_id == 1 {
            acc = -acc;
        }
        acc
    }
}
