use signal_net::circuit::Circuit;
use signal_net::gate::GateKind;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// Collects the `pin` of every "input driven" event, in emission order.
#[derive(Clone, Default)]
struct DrivenPins(Arc<Mutex<Vec<String>>>);

#[derive(Default)]
struct PinField(Option<String>);

impl Visit for PinField {
    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        if field.name() == "pin" {
            self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S: Subscriber> Layer<S> for DrivenPins {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut pin = PinField::default();
        event.record(&mut pin);
        if let Some(pin) = pin.0 {
            self.0.lock().unwrap().push(pin);
        }
    }
}

#[test]
fn test_fan_out_is_depth_first() {
    let circuit = Circuit::new("depth_first".to_string());
    let src = circuit.insert_gate(GateKind::Not, "src".into());
    let a = circuit.insert_gate(GateKind::Not, "a".into());
    let b = circuit.insert_gate(GateKind::And, "b".into());
    let a2 = circuit.insert_gate(GateKind::Not, "a2".into());

    // src feeds a first, then b. a's cascade reaches b through a2.
    src.output().connect(&a.input(0).unwrap()).unwrap();
    src.output().connect(&b.input(1).unwrap()).unwrap();
    a.output().connect(&a2.input(0).unwrap()).unwrap();
    a2.output().connect(&b.input(0).unwrap()).unwrap();

    let pins = DrivenPins::default();
    let subscriber = tracing_subscriber::registry().with(pins.clone());
    tracing::subscriber::with_default(subscriber, || src.set_input(0, false).unwrap());

    let expected: Vec<String> = [(&src, 0), (&a, 0), (&a2, 0), (&b, 0), (&b, 1)]
        .into_iter()
        .map(|(g, slot)| g.input(slot).unwrap().pin().to_string())
        .collect();
    assert_eq!(*pins.0.lock().unwrap(), expected);

    // a2 fills b.input0 before src reaches b.input1
    assert_eq!(b.input(0).unwrap().value(), Some(true));
    assert_eq!(b.get_output(), Some(true));
}

#[test]
fn test_sibling_sees_earlier_sibling_cascade() {
    let circuit = Circuit::new("siblings".to_string());
    let src = circuit.insert_gate(GateKind::Not, "src".into());
    let a = circuit.insert_gate(GateKind::Not, "a".into());
    let b = circuit.insert_gate(GateKind::Xor, "b".into());

    // b.input0 is filled by a's cascade before src reaches b.input1
    src.output().connect(&a.input(0).unwrap()).unwrap();
    a.output().connect(&b.input(0).unwrap()).unwrap();
    src.output().connect(&b.input(1).unwrap()).unwrap();

    let pins = DrivenPins::default();
    let subscriber = tracing_subscriber::registry().with(pins.clone());
    tracing::subscriber::with_default(subscriber, || src.set_input(0, true).unwrap());

    let expected: Vec<String> = [(&src, 0), (&a, 0), (&b, 0), (&b, 1)]
        .into_iter()
        .map(|(g, slot)| g.input(slot).unwrap().pin().to_string())
        .collect();
    assert_eq!(*pins.0.lock().unwrap(), expected);
    assert_eq!(b.get_output(), Some(true));
}
