//! Monte-Carlo estimation of per-node output bias.
//!
//! For every node, approximate the probability of a true output under
//! uniformly random independent primary inputs. No oracle is involved:
//! the graph is simply evaluated on sampled assignments. The pass is
//! deterministic: identical `(sample_size, seed)` reproduce bit-identical
//! tables across runs and platforms, so rendered diffs stay comparable.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::aig::error::ConfigError;
use crate::{Aig, NodeId};

/// Per-node true/false counters over one sampling run.
///
/// For every node `true_count + false_count == sample_size`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisbalanceTable {
    sample_size: u32,
    /// `(true_count, false_count)` per node id (dense, index `id - 1`).
    counts: Vec<(u32, u32)>,
}

impl DisbalanceTable {
    pub fn get_sample_size(&self) -> u32 {
        self.sample_size
    }

    /// `(true_count, false_count)` of a node.
    pub fn get_counts(&self, id: NodeId) -> Option<(u32, u32)> {
        if id == 0 {
            return None;
        }
        self.counts.get(id as usize - 1).copied()
    }

    /// Fraction of sampled assignments on which the node was true.
    ///
    /// Derived on demand for visualization coloring; never persisted.
    pub fn saturation(&self, id: NodeId) -> Option<f64> {
        let (t, f) = self.get_counts(id)?;
        Some(t as f64 / (t + f) as f64)
    }

    /// Entries in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, (u32, u32))> + '_ {
        self.counts
            .iter()
            .enumerate()
            .map(|(index, &counts)| (index as NodeId + 1, counts))
    }
}

/// Estimates, per node, the probability of a true output under uniformly
/// random inputs, over `sample_size` trials of a generator seeded with
/// `seed`.
pub fn estimate_disbalance(
    aig: &Aig,
    sample_size: u32,
    seed: u64,
) -> Result<DisbalanceTable, ConfigError> {
    if sample_size == 0 {
        return Err(ConfigError::NonPositiveSampleSize(sample_size));
    }

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut counts = vec![(0u32, 0u32); aig.get_max_index() as usize];
    let mut input_values = vec![false; aig.get_inputs().len()];
    let mut values = vec![false; aig.get_max_index() as usize + 1];

    for _ in 0..sample_size {
        for value in input_values.iter_mut() {
            *value = rng.gen_bool(0.5);
        }
        aig.evaluate_into(&input_values, &mut values);
        for (slot, &value) in counts.iter_mut().zip(&values[1..]) {
            if value {
                slot.0 += 1;
            } else {
                slot.1 += 1;
            }
        }
    }

    Ok(DisbalanceTable {
        sample_size,
        counts,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Ref;

    fn and_of_two() -> Aig {
        Aig::new(
            3,
            vec![1, 2],
            vec![Ref::positive(3)],
            vec![(3, Ref::positive(1), Ref::positive(2))],
        )
        .unwrap()
    }

    #[test]
    fn zero_sample_size_is_rejected() {
        let aig = and_of_two();
        assert!(matches!(
            estimate_disbalance(&aig, 0, 42),
            Err(ConfigError::NonPositiveSampleSize(0))
        ));
    }

    #[test]
    fn counts_sum_to_sample_size() {
        let aig = and_of_two();
        let table = estimate_disbalance(&aig, 1000, 7).unwrap();
        for (_, (t, f)) in table.iter() {
            assert_eq!(t + f, 1000);
        }
        assert_eq!(table.get_counts(0), None);
        assert_eq!(table.get_counts(4), None);
    }

    #[test]
    fn estimates_match_expected_bias() {
        let aig = and_of_two();
        let table = estimate_disbalance(&aig, 10000, 42).unwrap();

        // Inputs are balanced, the AND of two inputs is true a quarter of
        // the time.
        for id in [1, 2] {
            let s = table.saturation(id).unwrap();
            assert!((0.45..=0.55).contains(&s), "input {} saturation {}", id, s);
        }
        let s = table.saturation(3).unwrap();
        assert!((0.2..=0.3).contains(&s), "gate saturation {}", s);
    }

    #[test]
    fn same_seed_reproduces_identical_tables() {
        let aig = and_of_two();
        let a = estimate_disbalance(&aig, 10000, 42).unwrap();
        let b = estimate_disbalance(&aig, 10000, 42).unwrap();
        assert_eq!(a, b);
    }
}
