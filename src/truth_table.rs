/*!

  Truth tables for gate kinds, stored as bit vectors.

*/

use bitvec::vec::BitVec;

/// The output of a boolean function for every assignment of its inputs.
///
/// Row `r` assigns bit `i` of `r` to input `i`, so input 0 is the least significant.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
pub struct TruthTable {
    arity: usize,
    bits: BitVec,
}

impl TruthTable {
    /// Tabulates `f` over all `2^arity` input rows
    pub fn from_fn(arity: usize, f: impl Fn(&[bool]) -> bool) -> Self {
        let bits = (0..1usize << arity)
            .map(|r| f(&Self::row(arity, r)))
            .collect::<BitVec>();
        Self { arity, bits }
    }

    /// Returns the input assignment of row `r`
    pub fn row(arity: usize, r: usize) -> Vec<bool> {
        (0..arity).map(|i| (r >> i) & 1 == 1).collect()
    }

    /// Returns the number of inputs
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Returns the output bits, one per row
    pub fn bits(&self) -> &BitVec {
        &self.bits
    }

    /// Looks up the output for `inputs`, or [None] if their count is not the arity
    pub fn lookup(&self, inputs: &[bool]) -> Option<bool> {
        if inputs.len() != self.arity {
            return None;
        }
        let r = inputs
            .iter()
            .enumerate()
            .fold(0usize, |acc, (i, b)| acc | (usize::from(*b) << i));
        self.bits.get(r).map(|b| *b)
    }
}

impl std::fmt::Display for TruthTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}'b{}",
            self.bits.len(),
            self.bits
                .iter()
                .rev()
                .map(|b| if *b { '1' } else { '0' })
                .collect::<String>()
        )
    }
}
