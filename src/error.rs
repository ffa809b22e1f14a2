/*!

  Errors raised by the circuit API.

*/

/// The ways a circuit operation can be refused.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A terminal was read before any value reached it
    #[error("{terminal} has no value")]
    UnsetValue {
        /// The terminal that was read
        terminal: String,
    },
    /// An input slot that the gate does not have
    #[error("gate {gate} has no input {slot} (it has {arity})")]
    NoSuchInput {
        /// Name of the gate
        gate: String,
        /// The slot that was requested
        slot: usize,
        /// The number of inputs the gate actually has
        arity: usize,
    },
    /// The two terminals of a connection live in different circuits
    #[error("cannot connect {output} to {input}: terminals belong to different circuits")]
    ForeignCircuit {
        /// The driving output
        output: String,
        /// The input that was to be driven
        input: String,
    },
    /// A serialized circuit is structurally invalid
    #[cfg(feature = "serde")]
    #[error("malformed circuit: {0}")]
    Malformed(String),
    /// A serialized circuit could not be read or written
    #[cfg(feature = "serde")]
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Shorthand for results in this crate
pub type Result<T> = std::result::Result<T, Error>;
