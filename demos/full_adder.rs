use signal_net::circuit::{Circuit, GateRef};
use signal_net::gate::GateKind;
use std::rc::Rc;

/// The gates of a one-bit full adder.
/// `a`, `b` and `cin` list the gate inputs each adder input fans out to.
struct FullAdder {
    a: Vec<(GateRef, usize)>,
    b: Vec<(GateRef, usize)>,
    cin: Vec<(GateRef, usize)>,
    sum: GateRef,
    cout: GateRef,
}

fn full_adder(circuit: &Rc<Circuit>) -> FullAdder {
    let xor_ab = circuit.insert_gate(GateKind::Xor, "xor_ab".into());
    let xor_sum = circuit.insert_gate(GateKind::Xor, "xor_sum".into());
    let and_ab = circuit.insert_gate(GateKind::And, "and_ab".into());
    let and_cin = circuit.insert_gate(GateKind::And, "and_cin".into());
    let or_cout = circuit.insert_gate(GateKind::Or, "or_cout".into());

    let wire = |from: &GateRef, to: &GateRef, slot: usize| {
        from.output().connect(&to.input(slot).unwrap()).unwrap();
    };
    wire(&xor_ab, &xor_sum, 0);
    wire(&xor_ab, &and_cin, 0);
    wire(&and_ab, &or_cout, 0);
    wire(&and_cin, &or_cout, 1);

    FullAdder {
        a: vec![(xor_ab.clone(), 0), (and_ab.clone(), 0)],
        b: vec![(xor_ab, 1), (and_ab, 1)],
        cin: vec![(xor_sum.clone(), 1), (and_cin, 1)],
        sum: xor_sum,
        cout: or_cout,
    }
}

fn drive(targets: &[(GateRef, usize)], value: bool) {
    for (gate, slot) in targets {
        gate.set_input(*slot, value).unwrap();
    }
}

fn main() {
    let circuit = Circuit::new("full_adder".to_string());
    let fa = full_adder(&circuit);

    drive(&fa.a, true);
    drive(&fa.b, false);
    drive(&fa.cin, true);

    print!("{circuit}");
    println!(
        "sum={:?} cout={:?} cost={}",
        fa.sum.get_output(),
        fa.cout.get_output(),
        circuit.total_cost()
    );
}
