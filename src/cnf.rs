//! Tseitin translation of AIG nodes into oracle clauses.
//!
//! Every node is encoded into the oracle at most once per session, memoized
//! by node id: however many candidate pairs reference it afterwards, the
//! cost is paid a single time. For a gate literal `g` with operand literals
//! `l` and `r` the clauses are `(!g | l)`, `(!g | r)` and `(g | !l | !r)`.
//!
//! The constant node never occupies an oracle variable. References to it
//! fold away instead: clauses containing a true literal are dropped
//! entirely, false literals are removed from their clause. This is handled
//! by the internal `LitRes` resolution.

use std::collections::HashSet;
use std::ops::Not;

use crate::oracle::{Lit, Oracle, OracleError};
use crate::{Aig, AigNode, NodeId, Ref};

/// Literal resolution of a reference: either a real oracle literal or a
/// folded-away constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LitRes {
    False,
    True,
    Lit(Lit),
}

impl Not for LitRes {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            LitRes::False => LitRes::True,
            LitRes::True => LitRes::False,
            LitRes::Lit(lit) => LitRes::Lit(!lit),
        }
    }
}

/// Returns the real clause once `True` and `False` literals are folded.
/// `None` means the clause is trivially satisfied and must not be emitted.
fn fold_clause(lits: &[LitRes]) -> Option<Vec<Lit>> {
    let mut literals = Vec::with_capacity(lits.len());
    for &lit_res in lits {
        match lit_res {
            LitRes::True => return None,
            LitRes::False => (),
            LitRes::Lit(lit) => literals.push(lit),
        }
    }
    // Gate clauses always carry the gate literal itself.
    debug_assert!(!literals.is_empty());
    Some(literals)
}

fn emit(oracle: &mut dyn Oracle, lits: &[LitRes]) -> Result<(), OracleError> {
    if let Some(clause) = fold_clause(lits) {
        if !oracle.add_clause(&clause) {
            return Err(OracleError);
        }
    }
    Ok(())
}

/// Translates the nodes of one graph into one oracle session.
///
/// An encoder is bound to the graph it was created for and must only ever
/// be used with a single oracle: the memo table maps node ids to literals
/// of that session.
pub struct Encoder {
    /// Memoized oracle literal per node id (dense, indexed by id).
    lits: Vec<Option<Lit>>,
}

impl Encoder {
    pub fn new(aig: &Aig) -> Self {
        Encoder {
            lits: vec![None; aig.get_max_index() as usize + 1],
        }
    }

    /// The already-assigned literal for a node, if its cone was encoded.
    pub fn lookup(&self, id: NodeId) -> Option<Lit> {
        self.lits[id as usize]
    }

    /// Oracle literal for node `id`, encoding its cone on first use.
    ///
    /// The not-yet-encoded part of the cone is collected iteratively and
    /// emitted in ascending id order, so operands are always translated
    /// before the gates using them.
    pub fn literal_of(
        &mut self,
        aig: &Aig,
        oracle: &mut dyn Oracle,
        id: NodeId,
    ) -> Result<Lit, OracleError> {
        if let Some(lit) = self.lits[id as usize] {
            return Ok(lit);
        }

        let mut cone = Vec::new();
        let mut stack = vec![id];
        let mut seen = HashSet::from([id]);
        while let Some(n) = stack.pop() {
            cone.push(n);
            if let Some(AigNode::And { left, right, .. }) = aig.get_node(n) {
                for operand in [left, right] {
                    let oid = operand.get_id();
                    if !operand.is_constant()
                        && self.lits[oid as usize].is_none()
                        && seen.insert(oid)
                    {
                        stack.push(oid);
                    }
                }
            }
        }
        cone.sort_unstable();

        for &n in &cone {
            let node = aig.get_node(n).expect("cone members are valid node ids");
            match *node {
                AigNode::Input(_) => {
                    // Inputs only need a variable, no clauses.
                    self.lits[n as usize] = Some(oracle.allocate_literal());
                }
                AigNode::And { left, right, .. } => {
                    let l = self.resolve(left);
                    let r = self.resolve(right);
                    let lit = oracle.allocate_literal();
                    let g = LitRes::Lit(lit);
                    emit(oracle, &[!g, l])?;
                    emit(oracle, &[!g, r])?;
                    emit(oracle, &[g, !l, !r])?;
                    self.lits[n as usize] = Some(lit);
                }
            }
        }

        Ok(self.lits[id as usize].expect("cone encoding covers the requested node"))
    }

    /// Resolves an operand reference against the memo table. Operands of a
    /// gate being encoded have always been translated already.
    fn resolve(&self, operand: Ref) -> LitRes {
        let lit = if operand.is_constant() {
            LitRes::False
        } else {
            let id = operand.get_id();
            LitRes::Lit(self.lits[id as usize].expect("operands precede their gate"))
        };
        if operand.is_negated() { !lit } else { lit }
    }
}

/// Introduces a fresh literal `d` constrained by `d <=> (a XOR b)`.
///
/// Solving under the assumption `d` then asks whether `a` and `b` can ever
/// disagree.
pub fn add_xor(oracle: &mut dyn Oracle, a: Lit, b: Lit) -> Result<Lit, OracleError> {
    let d = oracle.allocate_literal();
    for clause in [[!a, !b, !d], [a, b, !d], [a, !b, d], [!a, b, d]] {
        if !oracle.add_clause(&clause) {
            return Err(OracleError);
        }
    }
    Ok(d)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::oracle::{SolveResult, VarisatOracle};

    #[test]
    fn not_lit_res_test() {
        assert_eq!(!LitRes::False, LitRes::True);
        assert_eq!(!LitRes::True, LitRes::False);
        let lit = Lit::from_var(1);
        assert_eq!(!LitRes::Lit(lit), LitRes::Lit(!lit));
    }

    #[test]
    fn fold_clause_test() {
        let l1 = LitRes::Lit(Lit::from_var(1));
        let l2 = LitRes::Lit(Lit::from_var(2));

        assert!(fold_clause(&[LitRes::True, l1]).is_none());
        assert!(fold_clause(&[l1, LitRes::False, LitRes::True]).is_none());
        assert_eq!(
            fold_clause(&[l1, LitRes::False, l2]).unwrap(),
            vec![Lit::from_var(1), Lit::from_var(2)]
        );
    }

    #[test]
    fn encode_and_gate() {
        let aig = Aig::new(
            3,
            vec![1, 2],
            vec![Ref::positive(3)],
            vec![(3, Ref::positive(1), Ref::positive(2))],
        )
        .unwrap();

        let mut oracle = VarisatOracle::new();
        let mut encoder = Encoder::new(&aig);
        let g = encoder.literal_of(&aig, &mut oracle, 3).unwrap();
        let a = encoder.lookup(1).unwrap();
        let b = encoder.lookup(2).unwrap();

        // g forces both operands true.
        assert_eq!(oracle.solve(&[g]), SolveResult::Sat);
        assert!(oracle.value_of(a));
        assert!(oracle.value_of(b));
        assert_eq!(oracle.solve(&[g, !a]), SolveResult::Unsat);
        // Both operands true force g.
        assert_eq!(oracle.solve(&[a, b, !g]), SolveResult::Unsat);
    }

    #[test]
    fn encode_is_memoized() {
        let aig = Aig::new(
            3,
            vec![1, 2],
            vec![Ref::positive(3)],
            vec![(3, Ref::positive(1), Ref::positive(2))],
        )
        .unwrap();

        let mut oracle = VarisatOracle::new();
        let mut encoder = Encoder::new(&aig);
        let first = encoder.literal_of(&aig, &mut oracle, 3).unwrap();
        let again = encoder.literal_of(&aig, &mut oracle, 3).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn encode_constant_operand() {
        // 2 = AND(true, 1) behaves as input 1; 3 = AND(false, 2) is constant false.
        let aig = Aig::new(
            3,
            vec![1],
            vec![Ref::positive(3)],
            vec![
                (2, Ref::TRUE, Ref::positive(1)),
                (3, Ref::FALSE, Ref::positive(2)),
            ],
        )
        .unwrap();

        let mut oracle = VarisatOracle::new();
        let mut encoder = Encoder::new(&aig);

        let g2 = encoder.literal_of(&aig, &mut oracle, 2).unwrap();
        let x = encoder.lookup(1).unwrap();
        assert_eq!(oracle.solve(&[g2, !x]), SolveResult::Unsat);
        assert_eq!(oracle.solve(&[!g2, x]), SolveResult::Unsat);

        let g3 = encoder.literal_of(&aig, &mut oracle, 3).unwrap();
        assert_eq!(oracle.solve(&[g3]), SolveResult::Unsat);
        assert_eq!(oracle.solve(&[!g3]), SolveResult::Sat);
    }

    #[test]
    fn add_xor_test() {
        let mut oracle = VarisatOracle::new();
        let a = oracle.allocate_literal();
        let b = oracle.allocate_literal();
        let d = add_xor(&mut oracle, a, b).unwrap();

        assert_eq!(oracle.solve(&[a, b, d]), SolveResult::Unsat);
        assert_eq!(oracle.solve(&[!a, !b, d]), SolveResult::Unsat);
        assert_eq!(oracle.solve(&[a, !b, !d]), SolveResult::Unsat);
        assert_eq!(oracle.solve(&[a, !b, d]), SolveResult::Sat);
    }
}
