use crate::ofdm_error::OfdmError;
use crate::ofdm_parameters::get_cyclic_prefix_length;
use crate::symbol_matrix::SymbolMatrix;
use num::complex::Complex64;

/// Prepends the tail of each OFDM symbol to its front.
///
/// # Diagram
/// ```text
/// | Symbol with prefix          |
/// | TAIL | HEAD ........... TAIL |
/// ```
#[derive(Debug, Clone)]
pub struct CyclicPrefixer {
    nb_fft: usize,
    nb_cyclic_prefix: usize,
}

impl CyclicPrefixer {
    pub fn new(nb_fft: usize, guard_fraction: f64) -> Result<Self, OfdmError> {
        let nb_cyclic_prefix = get_cyclic_prefix_length(nb_fft, guard_fraction)?;
        Ok(Self { nb_fft, nb_cyclic_prefix })
    }

    pub fn nb_cyclic_prefix(&self) -> usize {
        self.nb_cyclic_prefix
    }

    pub fn nb_symbol_period(&self) -> usize {
        self.nb_fft + self.nb_cyclic_prefix
    }

    pub fn add_prefix(&self, signal: &SymbolMatrix<Complex64>) -> SymbolMatrix<Complex64> {
        assert!(
            signal.nb_rows() == self.nb_fft,
            "Signal has {} samples per symbol but expected {}", signal.nb_rows(), self.nb_fft,
        );

        let nb_prefix = self.nb_cyclic_prefix;
        SymbolMatrix::from_columns_of(signal, self.nb_symbol_period(), |_, x, y| {
            // The prefix is copied from the same symbol, never from its neighbour
            let (prefix, body) = y.split_at_mut(nb_prefix);
            prefix.copy_from_slice(&x[self.nb_fft-nb_prefix..]);
            body.copy_from_slice(x);
        })
    }
}
