use signal_net::assert_display_eq;
use signal_net::circuit::{Circuit, GateRef};
use signal_net::error::Error;
use signal_net::gate::GateKind;
use signal_net::terminal::NO_VALUE;
use std::rc::Rc;

fn not_chain() -> (Rc<Circuit>, GateRef, GateRef) {
    let circuit = Circuit::new("not_chain".to_string());
    let not1 = circuit.insert_gate(GateKind::Not, "not1".into());
    let not2 = circuit.insert_gate(GateKind::Not, "not2".into());
    not1.output().connect(&not2.input(0).unwrap()).unwrap();
    (circuit, not1, not2)
}

fn and_not() -> (Rc<Circuit>, GateRef, GateRef) {
    let circuit = Circuit::new("and_not".to_string());
    let and = circuit.insert_gate(GateKind::And, "and".into());
    let not = circuit.insert_gate(GateKind::Not, "not".into());
    and.output().connect(&not.input(0).unwrap()).unwrap();
    (circuit, and, not)
}

#[test]
fn test_fresh_terminals() {
    let circuit = Circuit::new("fresh".to_string());
    for kind in GateKind::ALL {
        let gate = circuit.insert_gate(kind, kind.to_string());
        assert_eq!(gate.get_output(), None);
        assert!(gate.inputs().all(|i| i.value().is_none()));
        assert!(!gate.is_fully_driven());
    }
}

#[test]
fn test_unset_is_not_false() {
    let circuit = Circuit::new("unset".to_string());
    let not = circuit.insert_gate(GateKind::Not, "not".into());
    let input = not.input(0).unwrap();

    assert!(matches!(input.try_value(), Err(Error::UnsetValue { .. })));
    let err = not.output().try_value().unwrap_err();
    assert_eq!(err.to_string(), "not.output has no value");

    input.set_value(true);
    assert_eq!(input.try_value().unwrap(), true);
    assert_eq!(not.output().try_value().unwrap(), false);
}

#[test]
fn test_values_are_normalized() {
    let circuit = Circuit::new("truthy".to_string());
    let not = circuit.insert_gate(GateKind::Not, "not".into());
    let input = not.input(0).unwrap();

    input.set_value(1);
    assert_eq!(input.value(), Some(true));
    assert_eq!(not.get_output(), Some(false));

    input.set_value("");
    assert_eq!(input.value(), Some(false));
    assert_eq!(not.get_output(), Some(true));

    not.output().set_value(Some("x"));
    assert_eq!(not.get_output(), Some(true));
}

#[test]
fn test_partial_inputs_hold_output() {
    let circuit = Circuit::new("partial".to_string());
    for kind in [GateKind::And, GateKind::Or, GateKind::Xor] {
        let gate = circuit.insert_gate(kind, kind.to_string());
        gate.set_input(0, true).unwrap();
        assert_eq!(gate.get_output(), None, "{kind} evaluated with one input");
        gate.evaluate();
        assert_eq!(gate.get_output(), None);
        gate.set_input(1, true).unwrap();
        assert!(gate.get_output().is_some());
    }
}

#[test]
fn test_not_not() {
    let (_circuit, not1, not2) = not_chain();
    assert_eq!(not2.get_output(), None);

    not1.set_input(0, false).unwrap();
    assert_eq!(not1.get_output(), Some(true));
    assert_eq!(not2.input(0).unwrap().value(), Some(true));
    assert_eq!(not2.get_output(), Some(false));

    not1.set_input(0, true).unwrap();
    assert_eq!(not2.get_output(), Some(true));
}

#[test]
fn test_and_not() {
    let (_circuit, and, not) = and_not();

    and.set_input(0, true).unwrap();
    assert_eq!(not.get_output(), None);
    and.set_input(1, false).unwrap();
    assert_eq!(and.get_output(), Some(false));
    assert_eq!(not.get_output(), Some(true));

    and.set_input(1, true).unwrap();
    assert_eq!(and.get_output(), Some(true));
    assert_eq!(not.get_output(), Some(false));
}

#[test]
fn test_connect_is_idempotent() {
    let (_circuit, and, not) = and_not();
    let input = not.input(0).unwrap();
    and.output().connect(&input).unwrap();
    input.connect(&and.output()).unwrap();

    let connections = and.output().connections();
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0], input);
    assert_eq!(input.drivers(), vec![and.output()]);
}

#[test]
fn test_connect_pushes_held_value() {
    let circuit = Circuit::new("late_connect".to_string());
    let src = circuit.insert_gate(GateKind::Not, "src".into());
    let dst = circuit.insert_gate(GateKind::Not, "dst".into());

    src.set_input(0, true).unwrap();
    assert_eq!(dst.get_output(), None);

    src.output().connect(&dst.input(0).unwrap()).unwrap();
    assert_eq!(dst.input(0).unwrap().value(), Some(false));
    assert_eq!(dst.get_output(), Some(true));
}

#[test]
fn test_connect_before_value_pushes_nothing() {
    let (_circuit, and, not) = and_not();
    assert_eq!(not.input(0).unwrap().value(), None);
    assert_eq!(and.get_output(), None);
}

#[test]
fn test_fan_out_in_connection_order() {
    let circuit = Circuit::new("fan_out".to_string());
    let src = circuit.insert_gate(GateKind::Not, "src".into());
    let sinks: Vec<_> = (0..3)
        .map(|i| circuit.insert_gate(GateKind::Not, format!("sink_{i}")))
        .collect();
    for sink in sinks.iter().rev() {
        src.output().connect(&sink.input(0).unwrap()).unwrap();
    }

    let order: Vec<_> = src
        .output()
        .connections()
        .iter()
        .map(|i| i.owner().get_name())
        .collect();
    assert_eq!(order, vec!["sink_2", "sink_1", "sink_0"]);

    src.set_input(0, false).unwrap();
    assert!(sinks.iter().all(|s| s.get_output() == Some(false)));
}

#[test]
fn test_output_set_directly_drives_inputs() {
    let (_circuit, and, not) = and_not();
    and.output().set_value(true);
    assert_eq!(not.get_output(), Some(false));
    // The AND gate's inputs were never touched
    assert!(!and.is_fully_driven());
}

#[test]
fn test_display() {
    let (circuit, and, not) = and_not();
    assert_eq!(
        and.to_string(),
        format!("LogicGate and: input0={NO_VALUE}, input1={NO_VALUE}, output={NO_VALUE}")
    );

    and.set_input(0, true).unwrap();
    and.set_input(1, true).unwrap();
    assert_eq!(not.to_string(), "LogicGate not: input=true, output=false");
    assert_display_eq!(
        circuit.to_string(),
        "LogicGate not: input=true, output=false
         LogicGate and: input0=true, input1=true, output=true"
    );
}

#[test]
fn test_ports_display() {
    let (_circuit, and, not) = and_not();
    assert_eq!(and.input(1).unwrap().to_string(), "and.input1");
    assert_eq!(not.input(0).unwrap().to_string(), "not.input");
    assert_eq!(and.output().to_string(), "and.output");

    let err = and.input(2).unwrap_err();
    assert_eq!(err.to_string(), "gate and has no input 2 (it has 2)");
}

#[test]
fn test_connections_iter() {
    let (circuit, and, not) = and_not();
    let connections: Vec<_> = circuit.connections().collect();
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0].src(), and.output());
    assert_eq!(connections[0].target(), not.input(0).unwrap());
    assert_eq!(connections[0].to_string(), "and.output -> not.input");
}
