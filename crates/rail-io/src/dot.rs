//! Graphviz topology exporter.
//!
//! Renders the network as an undirected graph: one node per junction, one
//! edge per segment or platform between its endpoint junctions.  Platforms
//! are labelled `id:NAME` in blue so stations stand out.

use std::fmt::Write;

use rail_core::JunctionId;
use rail_net::{Network, TrackKind};

/// Render the whole topology as a Graphviz `graph`.
pub fn render_dot(network: &Network, graph_name: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "graph {graph_name} {{graph [pad=\"0.25\", nodesep=\"0.5\", ranksep=\"1.0\"];"
    );

    // Lower triangle (diagonal included) so every edge appears exactly once.
    let n = network.topology.junction_count();
    for i in 0..n {
        for j in 0..=i {
            for &track in network.topology.between(JunctionId(i as u32), JunctionId(j as u32)) {
                let t = network.track(track);
                match &t.kind {
                    TrackKind::Platform { name, .. } => {
                        let _ = writeln!(
                            out,
                            "\t{i} -- {j} [label=\"{}:{}\", color=blue]",
                            t.id.0, name
                        );
                    }
                    _ => {
                        let _ = writeln!(out, "\t{i} -- {j} [label={}]", t.id.0);
                    }
                }
            }
        }
    }

    out.push_str("}\n");
    out
}
