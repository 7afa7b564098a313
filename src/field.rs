//! The fixed prime field F_p, p = 18446744073709551557 (the largest prime below 2^64).
//!
//! Unlike a library meant to support arbitrary moduli, this field's prime is
//! fixed by the cryptographic design, so there's exactly one `FieldElement`
//! type, backed by a `u64` with 128-bit-accumulator arithmetic — the same
//! trick the reference C source uses with `unsigned __int128`.

use std::convert::TryFrom;
use std::iter::Sum;
use std::ops;

use rand::distributions::{Distribution, Standard};
use rand::Rng;

use crate::algebra::{Field, Group};
use crate::config::PRIME;
use crate::util::Sampleable;

/// An element of F_p, canonically represented as the unique integer in `[0, p)`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub struct FieldElement {
    inner: u64,
}

impl FieldElement {
    pub const ZERO: FieldElement = FieldElement { inner: 0 };
    pub const ONE: FieldElement = FieldElement { inner: 1 };

    /// Reduce an arbitrary `u64` into canonical form.
    pub fn from_u64(value: u64) -> Self {
        let inner = if value >= PRIME { value - PRIME } else { value };
        Self { inner }
    }

    pub fn to_u64(self) -> u64 {
        self.inner
    }
}

impl TryFrom<u64> for FieldElement {
    type Error = ();

    fn try_from(value: u64) -> Result<Self, ()> {
        if value >= PRIME {
            return Err(());
        }
        Ok(Self { inner: value })
    }
}

impl Group for FieldElement {
    fn zero() -> Self {
        Self::ZERO
    }
}

impl Field for FieldElement {
    fn one() -> Self {
        Self::ONE
    }

    fn mul_invert(&self) -> Self {
        if self.inner == 0 {
            panic!("zero has no multiplicative inverse");
        }
        // Fermat's little theorem: a^(p-2) = a^-1 mod p, since p is prime.
        pow_mod(self.inner, PRIME - 2)
    }
}

impl ops::Mul for FieldElement {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let product = (self.inner as u128) * (rhs.inner as u128);
        Self::from_u64((product % (PRIME as u128)) as u64)
    }
}

fn pow_mod(base: u64, mut exp: u64) -> FieldElement {
    let mut acc: u128 = 1;
    let mut base = base as u128 % PRIME as u128;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = (acc * base) % PRIME as u128;
        }
        base = (base * base) % PRIME as u128;
        exp >>= 1;
    }
    FieldElement::from_u64(acc as u64)
}

impl ops::Add for FieldElement {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let sum = (self.inner as u128) + (rhs.inner as u128);
        Self::from_u64((sum % (PRIME as u128)) as u64)
    }
}

impl ops::AddAssign for FieldElement {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl ops::Sub for FieldElement {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl ops::Neg for FieldElement {
    type Output = Self;

    fn neg(self) -> Self {
        if self.inner == 0 {
            self
        } else {
            Self {
                inner: PRIME - self.inner,
            }
        }
    }
}

impl Sum for FieldElement {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), ops::Add::add)
    }
}

impl Sampleable for FieldElement {
    type Seed = <rand::rngs::StdRng as rand::SeedableRng>::Seed;

    fn sample() -> Self {
        rand::thread_rng().sample(Standard)
    }

    fn sample_many_from_seed(seed: &Self::Seed, n: usize) -> Vec<Self> {
        use rand::SeedableRng;
        let mut rng = rand::rngs::StdRng::from_seed(*seed);
        (0..n).map(|_| rng.sample(Standard)).collect()
    }
}

impl Distribution<FieldElement> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> FieldElement {
        // Rejection sampling keeps the distribution exactly uniform over [0, p).
        loop {
            let candidate: u64 = rng.gen();
            if candidate < PRIME {
                return FieldElement { inner: candidate };
            }
        }
    }
}

#[cfg(any(test, feature = "testing"))]
use proptest::prelude::*;

#[cfg(any(test, feature = "testing"))]
impl Arbitrary for FieldElement {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (0..PRIME).prop_map(FieldElement::from_u64).boxed()
    }
}
