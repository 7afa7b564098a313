// use crate::prg::aes::AESSeed;

pub trait Sampleable {
    type Seed;

    /// generates a new random group element
    fn sample() -> Self;

    fn sample_from_seed(seed: &Self::Seed) -> Self
    where
        Self: Sized,
    {
        Self::sample_many_from_seed(seed, 1)
            .pop()
            .expect("Should have (exactly) one seed")
    }

    fn sample_many_from_seed(seed: &Self::Seed, n: usize) -> Vec<Self>
    where
        Self: Sized;
}

#[cfg(test)]
macro_rules! check_sampleable {
    ($type:ty) => {
        mod sampleable {
            #![allow(unused_imports)]
            use super::*;
            use proptest::prelude::*;
            use std::iter::repeat_with;
            #[test]
            fn test_not_deterministic() {
                use std::collections::HashSet;
                let elements: HashSet<_> = repeat_with(<$type>::sample).take(10).collect();
                assert!(
                    elements.len() > 1,
                    "Many random elements should not all be the same."
                );
            }

            proptest! {
                #[test]
                fn test_from_seed_deterministic(seed: <$type as Sampleable>::Seed) {
                    prop_assert_eq!(
                        <$type as Sampleable>::sample_from_seed(&seed),
                        <$type as Sampleable>::sample_from_seed(&seed)
                    );
                }

                #[test]
                fn test_many_from_seed_deterministic(seed: <$type as Sampleable>::Seed, n in 0..20usize) {
                    prop_assert_eq!(
                        <$type as Sampleable>::sample_many_from_seed(&seed, n),
                        <$type as Sampleable>::sample_many_from_seed(&seed, n)
                    );
                }

                #[test]
                fn test_many_from_seed_correct_count(seed: <$type as Sampleable>::Seed, n in 0..20usize) {
                    prop_assert_eq!(
                        <$type as Sampleable>::sample_many_from_seed(&seed, n).len(),
                        n
                    );
                }
            }
        }
    };
}

#[cfg(test)]
pub(crate) use check_sampleable;
