use signal_net::circuit::Circuit;
use signal_net::gate::GateKind;

fn main() {
    let circuit = Circuit::new("example".to_string());

    // An AND gate feeding an inverter
    let and = circuit.insert_gate(GateKind::And, "and".into());
    let not = circuit.insert_gate(GateKind::Not, "not".into());
    and.output().connect(&not.input(0).unwrap()).unwrap();

    and.set_input(0, true).unwrap();
    // Only one input so far, nothing has propagated
    assert_eq!(not.get_output(), None);

    and.set_input(1, false).unwrap();
    assert_eq!(and.get_output(), Some(false));
    assert_eq!(not.get_output(), Some(true));

    // Print the circuit, newest gate first
    print!("{circuit}");
    println!("Total cost: {}", circuit.total_cost());
}
