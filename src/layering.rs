//! Render-rank assignment from the graph structure.
//!
//! Inputs sit on layer 0 and every gate one past its deepest operand.
//! Because operands always precede their gate in id order, a single forward
//! pass over the arena suffices; no search is needed.

use crate::{Aig, AigNode, NodeId};

/// Rank assignment mode for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayerMode {
    /// Rank nodes by their depth layer.
    #[default]
    ByDepth,
    /// Degenerate mode: all non-input nodes share a single rank.
    SingleRank,
}

/// A dense table of render layers, indexed by node id.
///
/// Both modes are served from the same table; switching modes never
/// re-derives the graph.
#[derive(Debug, Clone)]
pub struct Layering {
    mode: LayerMode,
    /// Depth layer per id; slot 0 (the constant) stays on layer 0.
    layers: Vec<u32>,
}

impl Layering {
    pub fn new(aig: &Aig, mode: LayerMode) -> Self {
        let mut layers = vec![0u32; aig.get_max_index() as usize + 1];
        for node in aig.nodes() {
            if let AigNode::And { id, left, right } = *node {
                let l = layers[left.get_id() as usize];
                let r = layers[right.get_id() as usize];
                layers[id as usize] = 1 + l.max(r);
            }
        }
        Layering { mode, layers }
    }

    pub fn get_mode(&self) -> LayerMode {
        self.mode
    }

    /// Depth layer of a node, independent of the configured mode.
    pub fn layer(&self, id: NodeId) -> u32 {
        self.layers[id as usize]
    }

    /// Render rank of a node under the configured mode.
    pub fn rank(&self, id: NodeId) -> u32 {
        match self.mode {
            LayerMode::ByDepth => self.layer(id),
            LayerMode::SingleRank => self.layer(id).min(1),
        }
    }

    /// Highest render rank in the graph.
    pub fn max_rank(&self) -> u32 {
        let deepest = self.layers.iter().copied().max().unwrap_or(0);
        match self.mode {
            LayerMode::ByDepth => deepest,
            LayerMode::SingleRank => deepest.min(1),
        }
    }

    /// Node ids grouped by render rank, ascending, for `rank=same` emission.
    pub fn rank_groups(&self, aig: &Aig) -> Vec<Vec<NodeId>> {
        let mut groups = vec![Vec::new(); self.max_rank() as usize + 1];
        for node in aig.nodes() {
            let id = node.get_id();
            groups[self.rank(id) as usize].push(id);
        }
        groups
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Ref;

    fn chain() -> Aig {
        // 4 = AND(1, 2), 5 = AND(4, 3), 6 = AND(5, 1)
        Aig::new(
            6,
            vec![1, 2, 3],
            vec![Ref::positive(6)],
            vec![
                (4, Ref::positive(1), Ref::positive(2)),
                (5, Ref::positive(4), !Ref::positive(3)),
                (6, Ref::positive(5), Ref::positive(1)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn layers_by_depth() {
        let aig = chain();
        let layering = Layering::new(&aig, LayerMode::ByDepth);

        assert_eq!(layering.layer(1), 0);
        assert_eq!(layering.layer(2), 0);
        assert_eq!(layering.layer(3), 0);
        assert_eq!(layering.layer(4), 1);
        assert_eq!(layering.layer(5), 2);
        assert_eq!(layering.layer(6), 3);
        assert_eq!(layering.max_rank(), 3);

        assert_eq!(
            layering.rank_groups(&aig),
            vec![vec![1, 2, 3], vec![4], vec![5], vec![6]]
        );
    }

    #[test]
    fn layers_single_rank() {
        let aig = chain();
        let layering = Layering::new(&aig, LayerMode::SingleRank);

        // Depth is still available unchanged...
        assert_eq!(layering.layer(6), 3);
        // ...but every gate renders on rank 1.
        for id in [4, 5, 6] {
            assert_eq!(layering.rank(id), 1);
        }
        for id in [1, 2, 3] {
            assert_eq!(layering.rank(id), 0);
        }
        assert_eq!(layering.max_rank(), 1);
        assert_eq!(
            layering.rank_groups(&aig),
            vec![vec![1, 2, 3], vec![4, 5, 6]]
        );
    }

    #[test]
    fn inputs_only() {
        let aig = Aig::new(2, vec![1, 2], vec![Ref::positive(1)], vec![]).unwrap();
        let layering = Layering::new(&aig, LayerMode::ByDepth);
        assert_eq!(layering.max_rank(), 0);
        assert_eq!(layering.rank_groups(&aig), vec![vec![1, 2]]);
    }
}
