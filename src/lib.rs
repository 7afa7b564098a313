#![allow(dead_code)] // for now
#[macro_use]
mod algebra;
#[macro_use]
mod util;

mod beaver;
mod bits;
mod cmp;
mod config;
mod dcf;
mod field;
mod group;
mod prg;
mod retrieval;

pub use algebra::{Field, Group};
pub use beaver::{dot_product, elementwise_mul, Triple};
pub use bits::Bits;
pub use cmp::{deal as cmp_deal, eval as cmp_eval, gen as cmp_gen, CmpKey};
pub use config::{ALPHA_BITS, LAMBDA, PRIME};
pub use dcf::{CmpFunc, Dcf, Direction, Key as DcfKey, Point};
pub use field::FieldElement;
pub use group::GroupElement;
pub use prg::{Expansion, PrgContext, KEY_MATERIAL_LEN};
pub use retrieval::{
    deal_select, deal_threshold, eval_threshold, local_count, midpoint, narrow, select_winner, steps_for,
    Candidate, RetrievalSession, SelectMaterial, ThresholdMaterial,
};
pub use util::Sampleable;
