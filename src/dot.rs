//! Export of an analyzed AIG to the Graphviz dot format.
//!
//! ```rust
//! use aigviz::Aig;
//! use aigviz::dot::{Annotations, GraphvizStyle, aig_to_dot};
//! use aigviz::layering::{LayerMode, Layering};
//!
//! let aig = Aig::from_ascii_str("aag 3 2 0 1 1\n2\n4\n6\n6 2 4\n").unwrap();
//! let layering = Layering::new(&aig, LayerMode::ByDepth);
//! let annotations = Annotations {
//!     layering: Some(&layering),
//!     ..Annotations::default()
//! };
//! println!("{}", aig_to_dot(&aig, &GraphvizStyle::default(), &annotations));
//! ```
//!
//! You can then render the graph using the DOT engine.
//!
//! The rendering is purely formatting: it consumes the immutable graph
//! plus the derived layering, equivalence and disbalance annotations and
//! emits text.

use std::{fmt::Display, ops::Add};

use crate::disbalance::DisbalanceTable;
use crate::layering::Layering;
use crate::{Aig, AigNode, NodeId, Ref};

// Definining default global style.
const DEFAULT_RANKDIR: &str = "BT";

// Defining default style for nodes.
const DEFAULT_CONST_NODE_FORMAT: &str = "[shape=point, label=\"GND\", width=1.5]";
const DEFAULT_INPUT_NODE_FORMAT: &str = "[shape=box]";
const DEFAULT_AND_NODE_FORMAT: &str = "[shape=circle]";
/// See https://stackoverflow.com/questions/50822798/how-to-use-graphviz-to-draw-a-node-pointed-by-an-arrow.
const DEFAULT_OUTPUT_NODE_FORMAT: &str = "[shape=none, height=.0, width=.0]";
/// Attributes marking gates proven equivalent to an earlier gate.
const DEFAULT_EQ_NODE_ATTRS: &str = "peripheries=2, color=blue";

// Defining default style for edges.
const DEFAULT_EDGE_ALL_FORMAT: &str = "[arrowsize=0.3]";
const DEFAULT_EDGE_COMPLEMENT_FORMAT: &str = "[headlabel=\"●\", labelangle=.0, labeldistance=1.5]";
const DEFAULT_EDGE_OUTPUT_FORMAT: &str = "[arrowhead=none]";

// Saturation-to-fill parameters: red below the midpoint, green above,
// with a cubic falloff on the alpha channel.
const SATURATION_MIDPOINT: f64 = 0.25;
const SATURATION_POWER: i32 = 3;

/// String containing the graphviz node style (you must manually include square brackets).
#[derive(Debug, Clone)]
pub struct GraphvizNodeStyle(String);

impl Display for GraphvizNodeStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// String containing the graphviz edge style (you must manually include square brackets).
#[derive(Debug, Clone)]
pub struct GraphvizEdgeStyle(String);

impl Display for GraphvizEdgeStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for GraphvizEdgeStyle {
    fn default() -> Self {
        GraphvizEdgeStyle("".to_string())
    }
}

impl Add for GraphvizEdgeStyle {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        GraphvizEdgeStyle(format!("{}{}", self.0, rhs.0))
    }
}

/// Parameters for Graphviz rendering.
///
/// ### Nodes
/// The following nodes can be styled:
/// - the constant node (emitted only when referenced)
/// - primary inputs
/// - AND gates
/// - outputs (by default, invisible nodes just to get an arrow).
///
/// ### Edges
/// Edge styles are additive. All edges carry the `edge_all` style, plus
/// `edge_complement` when the reference is negated and `edge_output` when
/// it feeds an artificial output node.
pub struct GraphvizStyle {
    // Global
    rankdir: String,

    // Nodes
    constant: GraphvizNodeStyle,
    input: GraphvizNodeStyle,
    and: GraphvizNodeStyle,
    output: GraphvizNodeStyle,
    /// Extra attributes (no brackets) merged into equivalent-gate decls.
    eq_attrs: String,

    // Edges
    edge_all: GraphvizEdgeStyle,
    edge_complement: GraphvizEdgeStyle,
    edge_output: GraphvizEdgeStyle,
}

impl Default for GraphvizStyle {
    fn default() -> Self {
        GraphvizStyle {
            rankdir: DEFAULT_RANKDIR.to_string(),

            constant: GraphvizNodeStyle(DEFAULT_CONST_NODE_FORMAT.to_string()),
            input: GraphvizNodeStyle(DEFAULT_INPUT_NODE_FORMAT.to_string()),
            and: GraphvizNodeStyle(DEFAULT_AND_NODE_FORMAT.to_string()),
            output: GraphvizNodeStyle(DEFAULT_OUTPUT_NODE_FORMAT.to_string()),
            eq_attrs: DEFAULT_EQ_NODE_ATTRS.to_string(),

            edge_all: GraphvizEdgeStyle(DEFAULT_EDGE_ALL_FORMAT.to_string()),
            edge_complement: GraphvizEdgeStyle(DEFAULT_EDGE_COMPLEMENT_FORMAT.to_string()),
            edge_output: GraphvizEdgeStyle(DEFAULT_EDGE_OUTPUT_FORMAT.to_string()),
        }
    }
}

/// Derived analysis results decorating the rendering. All optional.
#[derive(Default)]
pub struct Annotations<'a> {
    /// Rank assignment; emitted as `rank=same` groups when present.
    pub layering: Option<&'a Layering>,
    /// Gates proven equivalent to an earlier gate.
    pub eq_ids: &'a [NodeId],
    /// Per-node bias counters; emitted as labels and saturation fill.
    pub disbalance: Option<&'a DisbalanceTable>,
}

fn alpha_hex(x: f64) -> String {
    format!("{:02x}", (((x * 256.0).round()) as u32).min(255))
}

/// Fill attributes for a saturation score in `0.0..=1.0`.
fn saturation_fill(saturation: f64) -> String {
    let (base, strength) = if saturation > SATURATION_MIDPOINT {
        (
            "#00ff00",
            ((saturation - SATURATION_MIDPOINT) / (1.0 - SATURATION_MIDPOINT))
                .powi(SATURATION_POWER),
        )
    } else {
        (
            "#ff0000",
            ((SATURATION_MIDPOINT - saturation) / SATURATION_MIDPOINT).powi(SATURATION_POWER),
        )
    };
    format!("style=filled, fillcolor=\"{}{}\"", base, alpha_hex(strength))
}

fn edge_decl(from: Ref, to: String, to_output: bool, style: &GraphvizStyle) -> String {
    let mut edge_style = GraphvizEdgeStyle::default();
    if from.is_negated() {
        edge_style = edge_style + style.edge_complement.clone();
    }
    if to_output {
        edge_style = edge_style + style.edge_output.clone();
    }
    format!("{} -> {} {}\n", from.get_id(), to, edge_style)
}

/// Returns a DOT representation of the AIG and its annotations.
pub fn aig_to_dot(aig: &Aig, style: &GraphvizStyle, annotations: &Annotations) -> String {
    let mut decl_edges = String::new();

    // Creating different subgraphs for node declarations.
    let mut decl_const_optional = "".to_string();
    let mut decl_inputs = format!("subgraph inputs {{\n node {}\n", style.input);
    let mut decl_outputs = format!("subgraph outputs {{\n node {}\n", style.output);
    let mut decl_ands = format!("subgraph ands {{\n node {}\n", style.and);

    // The constant is only drawn when something references it.
    let constant_referenced = aig.get_outputs().iter().any(|output| output.is_constant())
        || aig.nodes().any(|node| {
            node.get_operands()
                .is_some_and(|(left, right)| left.is_constant() || right.is_constant())
        });
    if constant_referenced {
        decl_const_optional = format!("0 {}\n", style.constant);
    }

    // Adding artificial output nodes to point to.
    for (index, output) in aig.get_outputs().iter().enumerate() {
        let output_id = format!("o{}", index);
        decl_outputs.push_str(&format!("{} [label=\"o{}\"]\n", output_id, 1 + index));
        decl_edges.push_str(&edge_decl(*output, output_id, true, style));
    }

    // Node declarations in id order, annotated when requested.
    for node in aig.nodes() {
        let id = node.get_id();
        let saturation = annotations
            .disbalance
            .and_then(|table| table.saturation(id));
        let mut attrs = String::new();
        if let Some(s) = saturation {
            attrs = format!(", {}", saturation_fill(s));
        }

        match *node {
            AigNode::Input(_) => {
                let label = match saturation {
                    Some(s) => format!("i{}:{:.3}", id, s),
                    None => format!("i{}", id),
                };
                decl_inputs.push_str(&format!("{} [label=\"{}\"{}]\n", id, label, attrs));
            }
            AigNode::And { left, right, .. } => {
                if annotations.eq_ids.contains(&id) {
                    attrs.push_str(&format!(", {}", style.eq_attrs));
                }
                let label = match saturation {
                    Some(s) => format!("\\N:{:.3}", s),
                    None => "".to_string(),
                };
                decl_ands.push_str(&format!("{} [label=\"{}\"{}]\n", id, label, attrs));
                for operand in [left, right] {
                    decl_edges.push_str(&edge_decl(operand, id.to_string(), false, style));
                }
            }
        }
    }

    // Rank constraints from the layering.
    let mut decl_ranks = String::new();
    if let Some(layering) = annotations.layering {
        for group in layering.rank_groups(aig) {
            if group.is_empty() {
                continue;
            }
            decl_ranks.push_str("{ rank=same; ");
            for id in group {
                decl_ranks.push_str(&format!("{}; ", id));
            }
            decl_ranks.push_str("}\n");
        }
    }

    // Concatenating everything together.
    format!(
        "
strict digraph {{
    rankdir=\"{}\"
    edge {}
    {}
    {}
    }}
    {}
    }}
    {}
    }}
    {}
    {}
}}",
        style.rankdir,
        style.edge_all,
        decl_const_optional,
        decl_inputs,
        decl_ands,
        decl_outputs,
        decl_ranks,
        decl_edges
    )
}
