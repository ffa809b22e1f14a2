/*!

  Gate kinds, their evaluation rules, and the gate record stored in a circuit.

*/

use crate::terminal::{Input, Output};
use crate::truth_table::TruthTable;

/// Scales the squared component count of a gate into its cost
pub const COST_MULTIPLIER: u64 = 10;

/// The index of a gate within the circuit that owns it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct GateId(usize);

impl GateId {
    /// Wraps a raw arena index
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw arena index
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for GateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The closed set of gates the simulator knows how to evaluate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub enum GateKind {
    /// Unary negation
    Not,
    /// Binary conjunction
    And,
    /// Binary disjunction
    Or,
    /// Binary exclusive-or
    Xor,
}

impl GateKind {
    /// Every kind, unary first
    pub const ALL: [GateKind; 4] = [GateKind::Not, GateKind::And, GateKind::Or, GateKind::Xor];

    /// Returns the number of inputs of the gate
    pub fn arity(&self) -> usize {
        match self {
            GateKind::Not => 1,
            GateKind::And | GateKind::Or | GateKind::Xor => 2,
        }
    }

    /// Returns `true` for single-input gates
    pub fn is_unary(&self) -> bool {
        self.arity() == 1
    }

    /// Returns the number of components the gate is built from: its terminals
    pub fn num_components(&self) -> u64 {
        self.arity() as u64 + 1
    }

    /// Returns the construction cost of one gate of this kind
    pub fn cost(&self) -> u64 {
        COST_MULTIPLIER * self.num_components().pow(2)
    }

    /// Applies the rule of this kind to `inputs`.
    ///
    /// Returns [None] if any input is unset or the number of inputs does not match the arity.
    pub fn apply(&self, inputs: &[Option<bool>]) -> Option<bool> {
        let values = inputs.iter().copied().collect::<Option<Vec<bool>>>()?;
        match (self, values.as_slice()) {
            (GateKind::Not, [a]) => Some(!a),
            (GateKind::And, [a, b]) => Some(*a && *b),
            (GateKind::Or, [a, b]) => Some(*a || *b),
            (GateKind::Xor, [a, b]) => Some(a != b),
            _ => None,
        }
    }

    /// Returns the full truth table of this kind
    pub fn truth_table(&self) -> TruthTable {
        TruthTable::from_fn(self.arity(), |row| {
            let inputs = row.iter().map(|b| Some(*b)).collect::<Vec<_>>();
            self.apply(&inputs).unwrap_or(false)
        })
    }
}

impl std::fmt::Display for GateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GateKind::Not => "NOT",
            GateKind::And => "AND",
            GateKind::Or => "OR",
            GateKind::Xor => "XOR",
        };
        f.write_str(name)
    }
}

/// A gate as stored in a circuit.
///
/// The name, kind, terminals and cost are fixed when the circuit builds the gate.
/// Only terminal values and the registry link change afterwards.
#[derive(Debug, Clone)]
pub struct Gate {
    name: String,
    kind: GateKind,
    inputs: Vec<Input>,
    output: Output,
    cost: u64,
    next: Option<GateId>,
}

impl Gate {
    /// Builds the terminals, then freezes the cost. Registration is up to the circuit.
    pub(crate) fn new(id: GateId, kind: GateKind, name: String) -> Self {
        let inputs = (0..kind.arity()).map(|_| Input::new(id)).collect();
        let output = Output::new();
        Self {
            name,
            kind,
            inputs,
            output,
            cost: kind.cost(),
            next: None,
        }
    }

    /// Rebuilds a gate from stored parts, skipping the cascade
    #[cfg(feature = "serde")]
    pub(crate) fn restore(
        name: String,
        kind: GateKind,
        inputs: Vec<Input>,
        output: Output,
        next: Option<GateId>,
    ) -> Self {
        Self {
            name,
            kind,
            inputs,
            output,
            cost: kind.cost(),
            next,
        }
    }

    /// Returns the name of the gate
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the kind of the gate
    pub fn kind(&self) -> GateKind {
        self.kind
    }

    /// Returns the inputs in slot order
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    /// Returns the input at `slot`, if the gate has one
    pub fn input(&self, slot: usize) -> Option<&Input> {
        self.inputs.get(slot)
    }

    pub(crate) fn input_mut(&mut self, slot: usize) -> Option<&mut Input> {
        self.inputs.get_mut(slot)
    }

    /// Returns the output terminal
    pub fn output(&self) -> &Output {
        &self.output
    }

    pub(crate) fn output_mut(&mut self) -> &mut Output {
        &mut self.output
    }

    /// Returns the cost frozen at construction
    pub fn cost(&self) -> u64 {
        self.cost
    }

    /// Returns the next gate in the registry list
    pub fn next(&self) -> Option<GateId> {
        self.next
    }

    pub(crate) fn link(&mut self, next: Option<GateId>) {
        self.next = next;
    }

    /// Computes the output from the current inputs. [None] while any input is unset.
    pub fn evaluate(&self) -> Option<bool> {
        let values = self.inputs.iter().map(Input::value).collect::<Vec<_>>();
        self.kind.apply(&values)
    }
}

impl std::fmt::Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LogicGate {}: ", self.name)?;
        if let [input] = self.inputs.as_slice() {
            write!(f, "input={input}, ")?;
        } else {
            for (i, input) in self.inputs.iter().enumerate() {
                write!(f, "input{i}={input}, ")?;
            }
        }
        write!(f, "output={}", self.output)
    }
}
