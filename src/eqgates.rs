//! Search for AND gates computing the identical Boolean function of the
//! primary inputs.
//!
//! Truth-table enumeration is infeasible past a handful of inputs, so
//! candidate pairs are settled by a satisfiability oracle instead: the two
//! gate cones are Tseitin-encoded (once, memoized, see [`crate::cnf`]),
//! an XOR literal `d` is introduced over the pair, and the oracle solves
//! under the single assumption `d`. UNSAT proves no input assignment can
//! distinguish the gates; SAT yields a concrete counter-example.
//!
//! Testing all pairs would be quadratic, so gates are first bucketed by a
//! cheap structural signature: their output bits over a battery of random
//! input patterns. Truly equivalent gates agree on every pattern, so no
//! equivalence is ever missed; a same-signature pair that is in fact
//! distinguishable just costs one refuting oracle call.

use std::collections::HashMap;

use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::cnf::{Encoder, add_xor};
use crate::oracle::{Oracle, OracleError, SolveResult};
use crate::{Aig, NodeId};

/// Tuning knobs for the search.
#[derive(Debug, Clone)]
pub struct EqGatesOptions {
    /// Number of random input patterns in the structural signature.
    ///
    /// More patterns mean fewer wasted oracle calls on distinguishable
    /// gates at extra simulation cost; the right value is workload
    /// dependent. 0 disables pruning and sends every gate pair to the
    /// oracle.
    pub signature_patterns: usize,
    /// Seed of the signature pattern generator.
    pub signature_seed: u64,
}

impl Default for EqGatesOptions {
    fn default() -> Self {
        EqGatesOptions {
            signature_patterns: 32,
            signature_seed: 1,
        }
    }
}

/// Outcome of [`search_eq_gates`].
///
/// Purely an annotation for downstream rendering: the graph itself is
/// never rewritten or merged.
#[derive(Debug, Clone, Default)]
pub struct EqGatesResult {
    /// Ids of gates proven equivalent to some earlier gate, ascending.
    pub eq_ids: Vec<NodeId>,
    /// Proven classes (representative first), each with at least two members.
    pub classes: Vec<Vec<NodeId>>,
    /// Number of oracle solve calls issued.
    pub sat_calls: usize,
    /// Number of candidate batches dropped after an oracle contradiction.
    pub aborted_batches: usize,
}

/// Buckets the AND gates by signature. Each batch holds at least two
/// same-signature gates in ascending id order; batches are ordered by
/// their first gate so the search is deterministic.
fn signature_batches(aig: &Aig, options: &EqGatesOptions) -> Vec<Vec<NodeId>> {
    let and_ids = aig.get_ands();
    let words = options.signature_patterns.div_ceil(64).max(1);
    let mut signatures = vec![vec![0u64; words]; and_ids.len()];

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(options.signature_seed);
    let mut input_values = vec![false; aig.get_inputs().len()];
    let mut values = vec![false; aig.get_max_index() as usize + 1];
    for pattern in 0..options.signature_patterns {
        for value in input_values.iter_mut() {
            *value = rng.gen_bool(0.5);
        }
        aig.evaluate_into(&input_values, &mut values);
        for (signature, &id) in signatures.iter_mut().zip(and_ids) {
            if values[id as usize] {
                signature[pattern / 64] |= 1 << (pattern % 64);
            }
        }
    }

    let mut buckets: HashMap<Vec<u64>, Vec<NodeId>> = HashMap::new();
    for (signature, &id) in signatures.into_iter().zip(and_ids) {
        buckets.entry(signature).or_default().push(id);
    }

    let mut batches: Vec<Vec<NodeId>> = buckets
        .into_values()
        .filter(|bucket| bucket.len() > 1)
        .collect();
    for batch in &mut batches {
        batch.sort_unstable();
    }
    batches.sort_unstable_by_key(|batch| batch[0]);
    batches
}

/// Settles one candidate pair with a single solve under assumption.
/// Ok(true) means the gates are proven equivalent.
fn test_pair(
    aig: &Aig,
    oracle: &mut dyn Oracle,
    encoder: &mut Encoder,
    a: NodeId,
    b: NodeId,
    sat_calls: &mut usize,
) -> Result<bool, OracleError> {
    let lit_a = encoder.literal_of(aig, oracle, a)?;
    let lit_b = encoder.literal_of(aig, oracle, b)?;
    let d = add_xor(oracle, lit_a, lit_b)?;

    *sat_calls += 1;
    match oracle.solve(&[d]) {
        SolveResult::Unsat => Ok(true),
        SolveResult::Sat => {
            if log::log_enabled!(log::Level::Debug) {
                // The model is a concrete distinguishing assignment. Inputs
                // outside both cones are unconstrained and read as false.
                let cex: Vec<bool> = aig
                    .get_inputs()
                    .iter()
                    .map(|&id| {
                        encoder
                            .lookup(id)
                            .map(|lit| oracle.value_of(lit))
                            .unwrap_or(false)
                    })
                    .collect();
                debug!("gates {} and {} differ under inputs {:?}", a, b, cex);
            }
            Ok(false)
        }
        SolveResult::Unknown => {
            debug!("solve inconclusive for gates {} and {}", a, b);
            Ok(false)
        }
    }
}

/// Finds gates computing identical functions, using the given oracle.
///
/// The oracle session is used for this one search: clauses accumulate
/// monotonically across candidates and are never re-added, which is what
/// makes the pass cheap on graphs with many candidates. A hard
/// contradiction reported by the oracle aborts the affected batch with a
/// logged diagnostic; the remaining batches still run.
pub fn search_eq_gates(
    aig: &Aig,
    oracle: &mut dyn Oracle,
    options: &EqGatesOptions,
) -> EqGatesResult {
    let batches = signature_batches(aig, options);
    let mut encoder = Encoder::new(aig);
    let mut result = EqGatesResult::default();

    for batch in batches {
        // classes[k][0] is the representative of the k-th distinct function
        // seen so far in this batch.
        let mut classes: Vec<Vec<NodeId>> = Vec::new();
        'candidates: for (index, &candidate) in batch.iter().enumerate() {
            for class in classes.iter_mut() {
                match test_pair(aig, oracle, &mut encoder, class[0], candidate, &mut result.sat_calls) {
                    Ok(true) => {
                        class.push(candidate);
                        result.eq_ids.push(candidate);
                        continue 'candidates;
                    }
                    Ok(false) => (),
                    Err(OracleError) => {
                        warn!(
                            "oracle state is unsatisfiable, skipping {} remaining candidates",
                            batch.len() - index
                        );
                        result.aborted_batches += 1;
                        break 'candidates;
                    }
                }
            }
            classes.push(vec![candidate]);
        }
        // Classes proven before an abort are still reported.
        for class in classes {
            if class.len() > 1 {
                result.classes.push(class);
            }
        }
    }

    result.eq_ids.sort_unstable();
    info!(
        "equivalence search: {} gates equivalent to an earlier gate, {} classes, {} solve calls",
        result.eq_ids.len(),
        result.classes.len(),
        result.sat_calls
    );
    result
}
