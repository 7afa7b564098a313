//! The DCF payload group G: a λ-byte buffer whose low 8 bytes carry a canonical
//! [`FieldElement`] and whose upper bytes are zero-padded.
//!
//! This oversized layout exists because DCF correction words are consumed as
//! generic λ-byte blocks by the PRG, and the group algebra must act on the same
//! buffer shape.

use std::ops;

use serde::{Deserialize, Serialize};

use crate::algebra::Group as GroupTrait;
use crate::config::LAMBDA;
use crate::field::FieldElement;

/// An element of G: `FieldElement` padded to λ bytes.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, Serialize, Deserialize, Default)]
pub struct GroupElement(FieldElement);

impl GroupElement {
    pub const ZERO: GroupElement = GroupElement(FieldElement::ZERO);

    pub fn from_field(value: FieldElement) -> Self {
        Self(value)
    }

    pub fn field(self) -> FieldElement {
        self.0
    }

    /// Build a group element from a λ-byte buffer (little-endian, low 8 bytes hold
    /// the field element). Panics in debug builds if the upper bytes are non-zero —
    /// that's treated as an operational no-op in release.
    pub fn from_canonical_bytes(bytes: [u8; LAMBDA]) -> Self {
        debug_assert!(
            bytes[8..LAMBDA].iter().all(|&b| b == 0),
            "group element upper bytes must be zero"
        );
        let mut low = [0u8; 8];
        low.copy_from_slice(&bytes[..8]);
        Self(FieldElement::from_u64(u64::from_le_bytes(low)))
    }

    /// Serialize to the canonical λ-byte buffer: low 8 bytes the field element,
    /// upper bytes zeroed.
    pub fn to_canonical_bytes(self) -> [u8; LAMBDA] {
        let mut out = [0u8; LAMBDA];
        out[..8].copy_from_slice(&self.0.to_u64().to_le_bytes());
        out
    }
}

impl GroupTrait for GroupElement {
    fn zero() -> Self {
        Self::ZERO
    }
}

impl ops::Add for GroupElement {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl ops::Sub for GroupElement {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl ops::Neg for GroupElement {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

#[cfg(any(test, feature = "testing"))]
use proptest::prelude::*;

#[cfg(any(test, feature = "testing"))]
impl Arbitrary for GroupElement {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        any::<FieldElement>().prop_map(GroupElement::from_field).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::check_group_laws;

    check_group_laws!(GroupElement);

    #[test]
    fn canonicalizes_upper_bytes_on_write() {
        let g = GroupElement::from_field(FieldElement::from_u64(42));
        let bytes = g.to_canonical_bytes();
        assert!(bytes[8..LAMBDA].iter().all(|&b| b == 0));
    }

    #[test]
    fn byte_roundtrip() {
        let g = GroupElement::from_field(FieldElement::from_u64(123456789));
        let bytes = g.to_canonical_bytes();
        assert_eq!(GroupElement::from_canonical_bytes(bytes), g);
    }

    #[test]
    fn add_then_negate_is_zero() {
        let g = GroupElement::from_field(FieldElement::from_u64(9001));
        assert_eq!(g + (-g), GroupElement::zero());
    }
}
