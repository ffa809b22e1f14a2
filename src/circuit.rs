/*!

  API for a circuit: an arena of gates, the registry list threaded through them,
  and the push-based cascade that keeps terminal values consistent.

*/

use crate::{
    error::{Error, Result},
    gate::{Gate, GateId, GateKind},
    graph::Analysis,
    terminal::{InputPin, Truthy},
};
use std::{
    cell::{Cell, Ref, RefCell},
    rc::Rc,
};
use tracing::{debug, trace};

/// A circuit owns its gates and links them into a registry list, newest first.
///
/// Values propagate synchronously: writing an input evaluates its gate, a gate that
/// produces a value writes its output, and an output writes every input connected to it,
/// depth-first in connection order. There is no cycle detection, so an output fed back
/// into one of its own ancestors recurses without bound.
#[derive(Debug)]
pub struct Circuit {
    /// The name of the circuit
    name: String,
    /// Every gate, indexed by [GateId] in construction order
    gates: RefCell<Vec<Gate>>,
    /// Head of the registry list
    top: Cell<Option<GateId>>,
}

impl Circuit {
    /// Creates a new, empty circuit with the given name
    pub fn new(name: String) -> Rc<Self> {
        Rc::new(Self {
            name,
            gates: RefCell::new(Vec::new()),
            top: Cell::new(None),
        })
    }

    /// Attempts to reclaim the circuit, returning [Some] if no handles are left.
    pub fn reclaim(self: Rc<Self>) -> Option<Self> {
        Rc::try_unwrap(self).ok()
    }

    /// Returns the name of the circuit
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Builds a gate of `kind`, freezes its cost, and registers it with this circuit.
    pub fn insert_gate(self: &Rc<Self>, kind: GateKind, name: String) -> GateRef {
        let id = {
            let mut gates = self.gates.borrow_mut();
            let id = GateId::new(gates.len());
            gates.push(Gate::new(id, kind, name));
            id
        };
        self.register(id);
        debug!(circuit = %self.name, gate = %id, %kind, "inserted gate");
        GateRef::new(self.clone(), id)
    }

    /// Prepends `id` to the registry list.
    fn register(&self, id: GateId) {
        self.gates.borrow_mut()[id.index()].link(self.top.get());
        self.top.set(Some(id));
    }

    /// Returns the most recently registered gate
    pub fn top(self: &Rc<Self>) -> Option<GateRef> {
        self.top.get().map(|id| GateRef::new(self.clone(), id))
    }

    /// Returns the number of gates in the circuit
    pub fn len(&self) -> usize {
        self.gates.borrow().len()
    }

    /// Returns `true` if no gate was ever inserted
    pub fn is_empty(&self) -> bool {
        self.gates.borrow().is_empty()
    }

    /// Returns a handle to the gate at `id`, if it exists
    pub fn get_gate(self: &Rc<Self>, id: GateId) -> Option<GateRef> {
        (id.index() < self.len()).then(|| GateRef::new(self.clone(), id))
    }

    /// Returns the most recently registered gate called `name`
    pub fn find_gate(self: &Rc<Self>, name: &str) -> Option<GateRef> {
        self.gates().find(|g| g.get_name() == name)
    }

    /// Sums the frozen cost of every registered gate.
    ///
    /// The list is walked from the top on every call, so the result tracks membership.
    pub fn total_cost(&self) -> u64 {
        self.registry().map(|id| self.gate(id).cost()).sum()
    }

    /// Construct an analysis of the current state of the circuit
    pub fn get_analysis<'a, A: Analysis<'a>>(self: &'a Rc<Self>) -> Result<A> {
        A::build(self)
    }

    /// Borrows the gate at `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this circuit.
    pub fn gate(&self, id: GateId) -> Ref<'_, Gate> {
        Ref::map(self.gates.borrow(), |gates| &gates[id.index()])
    }

    /// Walks the registry list from the top.
    pub(crate) fn registry(&self) -> iter::RegistryIter<'_> {
        iter::RegistryIter::new(self)
    }

    /// Stores `value` on `pin` and evaluates the owning gate.
    fn drive_input(&self, pin: InputPin, value: impl Truthy) {
        let value = {
            let mut gates = self.gates.borrow_mut();
            let input = gates[pin.gate.index()]
                .input_mut(pin.slot)
                .expect("input pins are validated when their port is made");
            input.store(value)
        };
        trace!(%pin, value, "input driven");
        self.evaluate(pin.gate);
    }

    /// Stores `value` on the output of `id` and drives every connected input.
    fn drive_output(&self, id: GateId, value: impl Truthy) {
        let (value, fan_out) = {
            let mut gates = self.gates.borrow_mut();
            let output = gates[id.index()].output_mut();
            let value = output.store(value);
            (value, output.connections().to_vec())
        };
        trace!(gate = %id, value, fan_out = fan_out.len(), "output driven");
        for pin in fan_out {
            self.drive_input(pin, value);
        }
    }

    /// Recomputes the output of `id`. A gate with an unset input keeps its output.
    fn evaluate(&self, id: GateId) {
        let result = self.gate(id).evaluate();
        match result {
            Some(value) => self.drive_output(id, value),
            None => trace!(gate = %id, "inputs incomplete, output held"),
        }
    }

    /// Adds `pin` to the fan-out of `src` and pushes the current value, if there is one.
    fn connect(&self, src: GateId, pin: InputPin) {
        let (added, value) = {
            let mut gates = self.gates.borrow_mut();
            let output = gates[src.index()].output_mut();
            (output.attach(pin), output.value())
        };
        if added {
            debug!(circuit = %self.name, from = %src, to = %pin, "connected");
        }
        if let Some(value) = value {
            self.drive_input(pin, value);
        }
    }
}

impl std::fmt::Display for Circuit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for id in self.registry() {
            writeln!(f, "{}", self.gate(id))?;
        }
        Ok(())
    }
}

/// A handle to a gate in a circuit
#[derive(Debug, Clone)]
pub struct GateRef {
    circuit: Rc<Circuit>,
    id: GateId,
}

impl PartialEq for GateRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.circuit, &other.circuit) && self.id == other.id
    }
}

impl Eq for GateRef {}

impl std::hash::Hash for GateRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.circuit).hash(state);
        self.id.hash(state);
    }
}

impl GateRef {
    fn new(circuit: Rc<Circuit>, id: GateId) -> Self {
        Self { circuit, id }
    }

    /// Returns the index of the gate in its circuit
    pub fn id(&self) -> GateId {
        self.id
    }

    /// Returns the circuit the gate belongs to
    pub fn circuit(&self) -> &Rc<Circuit> {
        &self.circuit
    }

    /// Borrows the underlying gate
    pub fn get(&self) -> Ref<'_, Gate> {
        self.circuit.gate(self.id)
    }

    /// Returns the name of the gate
    pub fn get_name(&self) -> String {
        self.get().name().to_string()
    }

    /// Returns the kind of the gate
    pub fn kind(&self) -> GateKind {
        self.get().kind()
    }

    /// Returns the cost frozen at construction
    pub fn cost(&self) -> u64 {
        self.get().cost()
    }

    /// Returns the gate registered just before this one
    pub fn next(&self) -> Option<Self> {
        self.get()
            .next()
            .map(|id| Self::new(self.circuit.clone(), id))
    }

    /// Returns the number of input ports
    pub fn get_num_input_ports(&self) -> usize {
        self.kind().arity()
    }

    /// Returns the input port at `slot`
    pub fn input(&self, slot: usize) -> Result<InputPort> {
        let arity = self.get_num_input_ports();
        if slot >= arity {
            return Err(Error::NoSuchInput {
                gate: self.get_name(),
                slot,
                arity,
            });
        }
        Ok(InputPort {
            gate: self.clone(),
            slot,
        })
    }

    /// Returns every input port in slot order
    pub fn inputs(&self) -> impl Iterator<Item = InputPort> {
        let gate = self.clone();
        (0..self.get_num_input_ports()).map(move |slot| InputPort {
            gate: gate.clone(),
            slot,
        })
    }

    /// Returns the output port
    pub fn output(&self) -> OutputPort {
        OutputPort { gate: self.clone() }
    }

    /// Sets input `slot` and runs the resulting cascade
    pub fn set_input(&self, slot: usize, value: impl Truthy) -> Result<()> {
        self.input(slot)?.set_value(value);
        Ok(())
    }

    /// Returns the output value, or [None] while it is unset
    pub fn get_output(&self) -> Option<bool> {
        self.get().output().value()
    }

    /// Re-evaluates the gate from its current inputs.
    /// Inputs trigger this themselves; calling it directly is harmless.
    pub fn evaluate(&self) {
        self.circuit.evaluate(self.id);
    }

    /// Returns `true` if every input holds a value
    pub fn is_fully_driven(&self) -> bool {
        self.get().inputs().iter().all(|i| i.value().is_some())
    }
}

impl std::fmt::Display for GateRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&*self.get(), f)
    }
}

/// Represent the input port of a gate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputPort {
    gate: GateRef,
    slot: usize,
}

impl InputPort {
    /// Returns the gate that owns this input
    pub fn owner(&self) -> &GateRef {
        &self.gate
    }

    /// Returns the position of the input on its gate
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Returns the address of this input within the circuit
    pub fn pin(&self) -> InputPin {
        InputPin::new(self.gate.id, self.slot)
    }

    /// Returns the value, or [None] if nothing has been written yet
    pub fn value(&self) -> Option<bool> {
        self.gate
            .get()
            .input(self.slot)
            .and_then(|input| input.value())
    }

    /// Returns the value, or [Error::UnsetValue] if nothing has been written yet
    pub fn try_value(&self) -> Result<bool> {
        self.value().ok_or_else(|| Error::UnsetValue {
            terminal: self.to_string(),
        })
    }

    /// Writes the truthiness of `value` and re-evaluates the owning gate.
    /// The whole cascade has finished when this returns.
    pub fn set_value(&self, value: impl Truthy) {
        self.gate.circuit.drive_input(self.pin(), value);
    }

    /// Connects this input to be driven by `output`
    pub fn connect(&self, output: &OutputPort) -> Result<()> {
        output.connect(self)
    }

    /// Returns the outputs currently driving this input, in gate order
    pub fn drivers(&self) -> Vec<OutputPort> {
        let pin = self.pin();
        let circuit = &self.gate.circuit;
        (0..circuit.len())
            .map(GateId::new)
            .filter(|id| circuit.gate(*id).output().drives(&pin))
            .map(|id| OutputPort {
                gate: GateRef::new(circuit.clone(), id),
            })
            .collect()
    }
}

impl std::fmt::Display for InputPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let gate = self.gate.get();
        if gate.kind().is_unary() {
            write!(f, "{}.input", gate.name())
        } else {
            write!(f, "{}.input{}", gate.name(), self.slot)
        }
    }
}

/// Represent the output port of a gate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OutputPort {
    gate: GateRef,
}

impl OutputPort {
    /// Returns the gate that owns this output
    pub fn owner(&self) -> &GateRef {
        &self.gate
    }

    /// Returns the value, or [None] if nothing has been written yet
    pub fn value(&self) -> Option<bool> {
        self.gate.get_output()
    }

    /// Returns the value, or [Error::UnsetValue] if nothing has been written yet
    pub fn try_value(&self) -> Result<bool> {
        self.value().ok_or_else(|| Error::UnsetValue {
            terminal: self.to_string(),
        })
    }

    /// Writes the truthiness of `value` and drives every connected input in connection order.
    pub fn set_value(&self, value: impl Truthy) {
        self.gate.circuit.drive_output(self.gate.id, value);
    }

    /// Connects this output to `input`.
    ///
    /// Connecting twice is a no-op. If the output already holds a value it is pushed
    /// into `input` straight away.
    pub fn connect(&self, input: &InputPort) -> Result<()> {
        if !Rc::ptr_eq(&self.gate.circuit, &input.gate.circuit) {
            return Err(Error::ForeignCircuit {
                output: self.to_string(),
                input: input.to_string(),
            });
        }
        self.gate.circuit.connect(self.gate.id, input.pin());
        Ok(())
    }

    /// Returns the inputs driven by this output, in connection order
    pub fn connections(&self) -> Vec<InputPort> {
        let pins = self.gate.get().output().connections().to_vec();
        pins.into_iter()
            .map(|pin| InputPort {
                gate: GateRef::new(self.gate.circuit.clone(), pin.gate),
                slot: pin.slot,
            })
            .collect()
    }
}

impl std::fmt::Display for OutputPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.output", self.gate.get().name())
    }
}

/// A connection from a gate output to a gate input
#[derive(Debug, Clone)]
pub struct Connection {
    src: OutputPort,
    target: InputPort,
}

impl Connection {
    /// Returns the driving output
    pub fn src(&self) -> OutputPort {
        self.src.clone()
    }

    /// Returns the driven input
    pub fn target(&self) -> InputPort {
        self.target.clone()
    }
}

impl std::fmt::Display for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.src, self.target)
    }
}

/// Iterators over the gates and connections of a circuit
pub mod iter {
    use super::{Circuit, Connection, GateRef, InputPort, OutputPort};
    use crate::gate::GateId;
    use std::rc::Rc;

    /// Follows the registry links from the top of the list
    #[derive(Debug)]
    pub struct RegistryIter<'a> {
        circuit: &'a Circuit,
        current: Option<GateId>,
    }

    impl<'a> RegistryIter<'a> {
        pub(crate) fn new(circuit: &'a Circuit) -> Self {
            Self {
                circuit,
                current: circuit.top.get(),
            }
        }
    }

    impl Iterator for RegistryIter<'_> {
        type Item = GateId;

        fn next(&mut self) -> Option<Self::Item> {
            let id = self.current?;
            self.current = self.circuit.gate(id).next();
            Some(id)
        }
    }

    /// Yields every connection, by source gate in construction order, then by connection order
    #[derive(Debug)]
    pub struct ConnectionIter {
        circuit: Rc<Circuit>,
        gate: usize,
        pos: usize,
    }

    impl ConnectionIter {
        pub(crate) fn new(circuit: Rc<Circuit>) -> Self {
            Self {
                circuit,
                gate: 0,
                pos: 0,
            }
        }
    }

    impl Iterator for ConnectionIter {
        type Item = Connection;

        fn next(&mut self) -> Option<Self::Item> {
            while self.gate < self.circuit.len() {
                let id = GateId::new(self.gate);
                let pin = self
                    .circuit
                    .gate(id)
                    .output()
                    .connections()
                    .get(self.pos)
                    .copied();
                match pin {
                    Some(pin) => {
                        self.pos += 1;
                        return Some(Connection {
                            src: OutputPort {
                                gate: GateRef::new(self.circuit.clone(), id),
                            },
                            target: InputPort {
                                gate: GateRef::new(self.circuit.clone(), pin.gate),
                                slot: pin.slot,
                            },
                        });
                    }
                    None => {
                        self.gate += 1;
                        self.pos = 0;
                    }
                }
            }
            None
        }
    }
}

impl Circuit {
    /// Returns the gates in registry order: most recently inserted first
    pub fn gates(self: &Rc<Self>) -> impl Iterator<Item = GateRef> {
        let ids = self.registry().collect::<Vec<_>>();
        let circuit = self.clone();
        ids.into_iter().map(move |id| GateRef::new(circuit.clone(), id))
    }

    /// Returns the gates in construction order
    pub fn objects(self: &Rc<Self>) -> impl Iterator<Item = GateRef> {
        let circuit = self.clone();
        (0..self.len()).map(move |i| GateRef::new(circuit.clone(), GateId::new(i)))
    }

    /// Returns every output-to-input connection
    pub fn connections(self: &Rc<Self>) -> iter::ConnectionIter {
        iter::ConnectionIter::new(self.clone())
    }
}

#[cfg(feature = "serde")]
/// Serde support for circuits
pub mod serde {
    use super::Circuit;
    use crate::{
        error::{Error, Result},
        gate::{Gate, GateId, GateKind},
        terminal::{Input, InputPin, Output},
    };
    use bitvec::vec::BitVec;
    use serde::{Deserialize, Serialize};
    use std::{cell::Cell, cell::RefCell, rc::Rc};

    #[derive(Debug, Serialize, Deserialize)]
    struct SerdeGate {
        /// The name of the gate
        name: String,
        /// The kind of the gate; its cost follows from this
        kind: GateKind,
        /// Input values in slot order
        inputs: Vec<Option<bool>>,
        /// The output value
        output: Option<bool>,
        /// Driven inputs in connection order
        connections: Vec<InputPin>,
        /// The registry link
        next: Option<GateId>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct SerdeCircuit {
        /// The name of the circuit
        name: String,
        /// The gates in construction order
        gates: Vec<SerdeGate>,
        /// Head of the registry list
        top: Option<GateId>,
    }

    impl From<&Circuit> for SerdeCircuit {
        fn from(value: &Circuit) -> Self {
            let gates = value
                .gates
                .borrow()
                .iter()
                .map(|g| SerdeGate {
                    name: g.name().to_string(),
                    kind: g.kind(),
                    inputs: g.inputs().iter().map(Input::value).collect(),
                    output: g.output().value(),
                    connections: g.output().connections().to_vec(),
                    next: g.next(),
                })
                .collect();
            SerdeCircuit {
                name: value.name.clone(),
                gates,
                top: value.top.get(),
            }
        }
    }

    impl SerdeCircuit {
        /// Checks indices and arities, then rebuilds the arena without running any cascade.
        fn into_circuit(self) -> Result<Rc<Circuit>> {
            let len = self.gates.len();
            let in_range = |id: &GateId| id.index() < len;
            if !self.top.iter().all(in_range) {
                return Err(Error::Malformed("registry top out of range".to_string()));
            }
            let arities = self
                .gates
                .iter()
                .map(|g| g.kind.arity())
                .collect::<Vec<_>>();

            let mut gates = Vec::with_capacity(len);
            for (i, g) in self.gates.into_iter().enumerate() {
                if g.inputs.len() != g.kind.arity() {
                    return Err(Error::Malformed(format!(
                        "gate {} has {} inputs, {} expects {}",
                        g.name,
                        g.inputs.len(),
                        g.kind,
                        g.kind.arity()
                    )));
                }
                if !g.next.iter().all(in_range) {
                    return Err(Error::Malformed(format!(
                        "gate {} links past the end of the registry",
                        g.name
                    )));
                }
                let id = GateId::new(i);
                let inputs = g
                    .inputs
                    .iter()
                    .map(|v| {
                        let mut input = Input::new(id);
                        if let Some(v) = v {
                            input.store(*v);
                        }
                        input
                    })
                    .collect();
                let mut output = Output::new();
                if let Some(v) = g.output {
                    output.store(v);
                }
                for pin in g.connections {
                    if !in_range(&pin.gate) || pin.slot >= arities[pin.gate.index()] {
                        return Err(Error::Malformed(format!(
                            "gate {} drives missing input {}",
                            g.name, pin
                        )));
                    }
                    output.attach(pin);
                }
                gates.push(Gate::restore(g.name, g.kind, inputs, output, g.next));
            }
            check_registry(self.top, &gates)?;

            Ok(Rc::new(Circuit {
                name: self.name,
                gates: RefCell::new(gates),
                top: Cell::new(self.top),
            }))
        }
    }

    /// The registry must be a simple list from `top` that holds every gate exactly once.
    fn check_registry(top: Option<GateId>, gates: &[Gate]) -> Result<()> {
        let mut visited: BitVec = BitVec::repeat(false, gates.len());
        let mut cursor = top;
        while let Some(id) = cursor {
            let gate = &gates[id.index()];
            if visited[id.index()] {
                return Err(Error::Malformed(format!(
                    "registry reaches gate {} twice",
                    gate.name()
                )));
            }
            visited.set(id.index(), true);
            cursor = gate.next();
        }
        let walked = visited.count_ones();
        if walked != gates.len() {
            return Err(Error::Malformed(format!(
                "registry links {} of {} gates",
                walked,
                gates.len()
            )));
        }
        Ok(())
    }

    /// Serialize the circuit state into the writer.
    pub fn circuit_serialize(circuit: &Circuit, writer: impl std::io::Write) -> Result<()> {
        let sobj: SerdeCircuit = circuit.into();
        serde_json::to_writer_pretty(writer, &sobj)?;
        Ok(())
    }

    /// Deserialize a circuit from the reader. Terminal values are restored as stored.
    pub fn circuit_deserialize(reader: impl std::io::Read) -> Result<Rc<Circuit>> {
        let sobj: SerdeCircuit = serde_json::from_reader(reader)?;
        sobj.into_circuit()
    }
}
