//! Beaver-triple dot product: a secret-shared inner product of two vectors using
//! precomputed multiplication triples.
//!
//! Grounded on the reference crate's `sharing.rs` additive-sharing machinery: both
//! rely on `Group`/`Field` share-recover-by-summing semantics; this module adds the
//! mask-reveal-reconstruct step the reference's generic `Shareable` trait doesn't
//! itself need, since multiplication (unlike addition) isn't linear in the shares.

use log::trace;

use crate::algebra::Group;
use crate::field::FieldElement;
use crate::util::Sampleable;

/// A precomputed multiplication triple: `z = x * y` componentwise, split into two
/// additive shares. Produced by a trusted dealer, consumed exactly once.
#[derive(Clone, Debug)]
pub struct Triple {
    pub x: Vec<FieldElement>,
    pub y: Vec<FieldElement>,
    pub z: Vec<FieldElement>,
}

impl Triple {
    /// Sample a fresh, correlated pair of triple shares of dimension `dim`.
    pub fn deal(dim: usize) -> (Triple, Triple) {
        let x: Vec<_> = (0..dim).map(|_| FieldElement::sample()).collect();
        let y: Vec<_> = (0..dim).map(|_| FieldElement::sample()).collect();
        let z: Vec<_> = x.iter().zip(&y).map(|(&a, &b)| a * b).collect();

        let x0: Vec<_> = (0..dim).map(|_| FieldElement::sample()).collect();
        let y0: Vec<_> = (0..dim).map(|_| FieldElement::sample()).collect();
        let z0: Vec<_> = (0..dim).map(|_| FieldElement::sample()).collect();

        let x1: Vec<_> = x.iter().zip(&x0).map(|(&a, &b)| a - b).collect();
        let y1: Vec<_> = y.iter().zip(&y0).map(|(&a, &b)| a - b).collect();
        let z1: Vec<_> = z.iter().zip(&z0).map(|(&a, &b)| a - b).collect();

        (Triple { x: x0, y: y0, z: z0 }, Triple { x: x1, y: y1, z: z1 })
    }

    fn dim(&self) -> usize {
        self.x.len()
    }
}

/// Per-party elementwise-multiply kernel: each party holds its shares of `a`,
/// `b`, and a fresh `Triple`, and the two parties' local output shares sum,
/// componentwise, to `a .* b`. This is the core per-element kernel; the
/// dot product is just its sum.
///
/// `party_id` selects the party that adds the `d_k * e_k` cross term, and
/// `reveal` is the caller's "publish d, e and receive the other party's shares"
/// step, modeled as a closure so the core stays transport-agnostic (network
/// out-of-scope network transport).
pub fn elementwise_mul(
    party_id: u8,
    a_share: &[FieldElement],
    b_share: &[FieldElement],
    triple: &Triple,
    reveal: impl FnOnce(Vec<FieldElement>, Vec<FieldElement>) -> (Vec<FieldElement>, Vec<FieldElement>),
) -> Vec<FieldElement> {
    assert_eq!(a_share.len(), b_share.len(), "a and b shares must have the same dimension");
    assert_eq!(a_share.len(), triple.dim(), "triple dimension must match vector dimension");
    trace!("elementwise_mul dim={} party={}", a_share.len(), party_id);

    let d_share: Vec<_> = a_share.iter().zip(&triple.x).map(|(&a, &x)| a - x).collect();
    let e_share: Vec<_> = b_share.iter().zip(&triple.y).map(|(&b, &y)| b - y).collect();

    let (other_d, other_e) = reveal(d_share.clone(), e_share.clone());
    let d: Vec<_> = d_share.iter().zip(&other_d).map(|(&a, &b)| a + b).collect();
    let e: Vec<_> = e_share.iter().zip(&other_e).map(|(&a, &b)| a + b).collect();

    let is_master = party_id == 1;
    (0..triple.dim())
        .map(|k| {
            let mut c_k = triple.z[k] + e[k] * triple.x[k] + d[k] * triple.y[k];
            if is_master {
                c_k += d[k] * e[k];
            }
            c_k
        })
        .collect()
}

/// Secret-shared inner product: the elementwise product of `a` and `b`, summed.
pub fn dot_product(
    party_id: u8,
    a_share: &[FieldElement],
    b_share: &[FieldElement],
    triple: &Triple,
    reveal: impl FnOnce(Vec<FieldElement>, Vec<FieldElement>) -> (Vec<FieldElement>, Vec<FieldElement>),
) -> FieldElement {
    elementwise_mul(party_id, a_share, b_share, triple, reveal)
        .into_iter()
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn share_vec(values: &[u64]) -> (Vec<FieldElement>, Vec<FieldElement>) {
        let full: Vec<_> = values.iter().map(|&v| FieldElement::from_u64(v)).collect();
        let share0: Vec<_> = (0..full.len()).map(|_| FieldElement::sample()).collect();
        let share1: Vec<_> = full.iter().zip(&share0).map(|(&v, &s0)| v - s0).collect();
        (share0, share1)
    }

    #[test]
    fn dot_product_of_literal_vectors() {
        let (a0, a1) = share_vec(&[1, 2, 3, 4]);
        let (b0, b1) = share_vec(&[5, 6, 7, 8]);
        let (t0, t1) = Triple::deal(4);
        let d0 = a0.iter().zip(&t0.x).map(|(&a, &x)| a - x).collect::<Vec<_>>();
        let e0 = b0.iter().zip(&t0.y).map(|(&b, &y)| b - y).collect::<Vec<_>>();
        let d1 = a1.iter().zip(&t1.x).map(|(&a, &x)| a - x).collect::<Vec<_>>();
        let e1 = b1.iter().zip(&t1.y).map(|(&b, &y)| b - y).collect::<Vec<_>>();

        let s0 = dot_product(0, &a0, &b0, &t0, |_, _| (d1.clone(), e1.clone()));
        let s1 = dot_product(1, &a1, &b1, &t1, |_, _| (d0.clone(), e0.clone()));
        assert_eq!((s0 + s1).to_u64(), 70);
    }

    #[test]
    fn dot_product_wraps_at_prime() {
        let (a0, a1) = share_vec(&[crate::config::PRIME - 1]);
        let (b0, b1) = share_vec(&[crate::config::PRIME - 1]);
        let (t0, t1) = Triple::deal(1);

        let d0 = a0.iter().zip(&t0.x).map(|(&a, &x)| a - x).collect::<Vec<_>>();
        let e0 = b0.iter().zip(&t0.y).map(|(&b, &y)| b - y).collect::<Vec<_>>();
        let d1 = a1.iter().zip(&t1.x).map(|(&a, &x)| a - x).collect::<Vec<_>>();
        let e1 = b1.iter().zip(&t1.y).map(|(&b, &y)| b - y).collect::<Vec<_>>();

        let s0 = dot_product(0, &a0, &b0, &t0, |_, _| (d1.clone(), e1.clone()));
        let s1 = dot_product(1, &a1, &b1, &t1, |_, _| (d0.clone(), e0.clone()));
        assert_eq!((s0 + s1).to_u64(), 1);
    }
}
