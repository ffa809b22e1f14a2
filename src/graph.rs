/*!

  Analyses over the wiring of a circuit.

*/

use crate::circuit::{Circuit, GateRef, InputPort};
#[cfg(feature = "graph")]
use crate::circuit::Connection;
use crate::error::Result;
#[cfg(feature = "graph")]
use petgraph::graph::DiGraph;
use std::collections::HashMap;
use std::rc::Rc;

/// A common trait of analyses than can be performed on a circuit.
/// An analysis becomes stale when the circuit is rewired or grows.
pub trait Analysis<'a>
where
    Self: Sized + 'a,
{
    /// Construct the analysis to the current state of the circuit.
    fn build(circuit: &'a Rc<Circuit>) -> Result<Self>;
}

/// A table that maps each gate to the inputs its output drives
pub struct FanOutTable<'a> {
    // A reference to the underlying circuit
    _circuit: &'a Rc<Circuit>,
    // Maps a gate to the inputs it drives, in connection order
    fan_out: HashMap<GateRef, Vec<InputPort>>,
}

impl FanOutTable<'_> {
    /// Returns an iterator to the inputs driven by `gate`.
    pub fn get_users(&self, gate: &GateRef) -> impl Iterator<Item = InputPort> {
        self.fan_out
            .get(gate)
            .into_iter()
            .flat_map(|users| users.iter().cloned())
    }

    /// Returns the number of inputs driven by `gate`
    pub fn fan_out(&self, gate: &GateRef) -> usize {
        self.fan_out.get(gate).map_or(0, Vec::len)
    }

    /// Returns `true` if the output of `gate` drives anything
    pub fn has_users(&self, gate: &GateRef) -> bool {
        self.fan_out(gate) > 0
    }
}

impl<'a> Analysis<'a> for FanOutTable<'a> {
    fn build(circuit: &'a Rc<Circuit>) -> Result<Self> {
        let mut fan_out: HashMap<GateRef, Vec<InputPort>> = HashMap::new();

        for c in circuit.connections() {
            fan_out
                .entry(c.src().owner().clone())
                .or_default()
                .push(c.target());
        }

        Ok(FanOutTable {
            _circuit: circuit,
            fan_out,
        })
    }
}

/// Returns a petgraph representation of the circuit as a directed multi-graph.
/// Nodes are gates in construction order, edges are connections.
#[cfg(feature = "graph")]
pub struct MultiDiGraph<'a> {
    _circuit: &'a Rc<Circuit>,
    graph: DiGraph<GateRef, Connection>,
}

#[cfg(feature = "graph")]
impl MultiDiGraph<'_> {
    /// Return a reference to the graph constructed by this analysis
    pub fn get_graph(&self) -> &DiGraph<GateRef, Connection> {
        &self.graph
    }
}

#[cfg(feature = "graph")]
impl<'a> Analysis<'a> for MultiDiGraph<'a> {
    fn build(circuit: &'a Rc<Circuit>) -> Result<Self> {
        let mut graph = DiGraph::new();

        // Gate ids and node indices coincide
        let nodes = circuit
            .objects()
            .map(|g| graph.add_node(g))
            .collect::<Vec<_>>();

        for connection in circuit.connections() {
            let s_id = nodes[connection.src().owner().id().index()];
            let t_id = nodes[connection.target().owner().id().index()];
            graph.add_edge(s_id, t_id, connection);
        }

        Ok(Self {
            _circuit: circuit,
            graph,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateKind;

    fn half_adder() -> Rc<Circuit> {
        let circuit = Circuit::new("half_adder".to_string());
        let split_a = circuit.insert_gate(GateKind::Not, "split_a".into());
        let sum = circuit.insert_gate(GateKind::Xor, "sum".into());
        let carry = circuit.insert_gate(GateKind::And, "carry".into());

        split_a.output().connect(&sum.input(0).unwrap()).unwrap();
        split_a.output().connect(&carry.input(0).unwrap()).unwrap();
        circuit
    }

    #[test]
    fn fanout_table() {
        let circuit = half_adder();
        let analysis = circuit.get_analysis::<FanOutTable>();
        assert!(analysis.is_ok());
        let analysis = analysis.unwrap();

        let split = circuit.find_gate("split_a").unwrap();
        assert_eq!(analysis.fan_out(&split), 2);
        let users: Vec<_> = analysis
            .get_users(&split)
            .map(|i| i.owner().get_name())
            .collect();
        assert_eq!(users, vec!["sum", "carry"]);

        for name in ["sum", "carry"] {
            let gate = circuit.find_gate(name).unwrap();
            assert!(!analysis.has_users(&gate), "{name} drives nothing");
        }
    }

    #[cfg(feature = "graph")]
    #[test]
    fn multi_di_graph() {
        let circuit = half_adder();
        let analysis = circuit.get_analysis::<MultiDiGraph>().unwrap();
        let graph = analysis.get_graph();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        for edge in graph.edge_weights() {
            assert_eq!(edge.src().owner().get_name(), "split_a");
        }
    }
}
