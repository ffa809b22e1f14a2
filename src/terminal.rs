/*!

  Boolean terminals: the input and output cells of a gate.

  A terminal starts out unset and is normalized to a strict `bool` on every write.
  Writes that may be coerced from other values go through [Truthy].

*/

use crate::gate::GateId;

/// Rendered in place of a value for terminals that were never set
pub const NO_VALUE: &str = "(no value)";

/// Conversion of arbitrary values into a strict boolean by truthiness.
///
/// Zero numbers, empty strings, empty collections, `None` and `false` are falsy.
/// Everything else is truthy.
pub trait Truthy {
    /// Returns the truthiness of `self`
    fn truthy(&self) -> bool;
}

impl Truthy for bool {
    fn truthy(&self) -> bool {
        *self
    }
}

macro_rules! truthy_int {
    ($($t:ty),*) => {
        $(
            impl Truthy for $t {
                fn truthy(&self) -> bool {
                    *self != 0
                }
            }
        )*
    };
}

truthy_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl Truthy for f32 {
    fn truthy(&self) -> bool {
        *self != 0.0
    }
}

impl Truthy for f64 {
    fn truthy(&self) -> bool {
        *self != 0.0
    }
}

impl Truthy for str {
    fn truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for String {
    fn truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Truthy for [T] {
    fn truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Truthy for Vec<T> {
    fn truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl<T: Truthy> Truthy for Option<T> {
    fn truthy(&self) -> bool {
        self.as_ref().is_some_and(|v| v.truthy())
    }
}

impl<T: Truthy + ?Sized> Truthy for &T {
    fn truthy(&self) -> bool {
        (**self).truthy()
    }
}

/// The address of an input terminal within a circuit: a gate and one of its slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct InputPin {
    /// The gate that owns the input
    pub gate: GateId,
    /// The position of the input on the gate
    pub slot: usize,
}

impl InputPin {
    /// Creates the address of input `slot` on `gate`
    pub fn new(gate: GateId, slot: usize) -> Self {
        Self { gate, slot }
    }
}

impl std::fmt::Display for InputPin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.gate, self.slot)
    }
}

/// Writes `value` or the [NO_VALUE] placeholder
fn fmt_value(value: Option<bool>, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match value {
        Some(v) => write!(f, "{v}"),
        None => f.write_str(NO_VALUE),
    }
}

/// An input terminal. It knows the gate it belongs to by index.
#[derive(Debug, Clone)]
pub struct Input {
    value: Option<bool>,
    owner: GateId,
}

impl Input {
    pub(crate) fn new(owner: GateId) -> Self {
        Self { value: None, owner }
    }

    /// Returns the value, or [None] if the input was never set
    pub fn value(&self) -> Option<bool> {
        self.value
    }

    /// Returns the gate this input belongs to
    pub fn owner(&self) -> GateId {
        self.owner
    }

    /// Stores a value without evaluating the owner. Evaluation is driven by the circuit.
    pub(crate) fn store(&mut self, value: impl Truthy) -> bool {
        let value = value.truthy();
        self.value = Some(value);
        value
    }
}

impl std::fmt::Display for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt_value(self.value, f)
    }
}

/// An output terminal and the list of inputs it drives, in connection order
#[derive(Debug, Clone, Default)]
pub struct Output {
    value: Option<bool>,
    connections: Vec<InputPin>,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the value, or [None] if the output was never set
    pub fn value(&self) -> Option<bool> {
        self.value
    }

    /// Returns the driven inputs in the order they were connected
    pub fn connections(&self) -> &[InputPin] {
        &self.connections
    }

    /// Returns `true` if `pin` is driven by this output
    pub fn drives(&self, pin: &InputPin) -> bool {
        self.connections.contains(pin)
    }

    pub(crate) fn store(&mut self, value: impl Truthy) -> bool {
        let value = value.truthy();
        self.value = Some(value);
        value
    }

    /// Adds `pin` to the connection list. Returns `false` if it was already there.
    pub(crate) fn attach(&mut self, pin: InputPin) -> bool {
        if self.drives(&pin) {
            return false;
        }
        self.connections.push(pin);
        true
    }
}

impl std::fmt::Display for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fmt_value(self.value, f)
    }
}
