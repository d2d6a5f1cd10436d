use crate::ofdm_parameters::OfdmParameters;
use crate::symbol_matrix::SymbolMatrix;
use num::complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

/// Converts each OFDM symbol from its centred spectrum to time domain samples.
/// The inverse FFT is planned once and can be shared between threads.
pub struct SpectrumToTimeTransformer {
    nb_fft: usize,
    sample_period: f64,
    ifft: Arc<dyn Fft<f64>>,
}

impl SpectrumToTimeTransformer {
    pub fn new(params: &OfdmParameters) -> Self {
        Self::with_sample_period(params.nb_fft, params.sample_period)
    }

    pub fn with_sample_period(nb_fft: usize, sample_period: f64) -> Self {
        assert!(nb_fft > 1, "FFT must have more than one bin");
        let mut planner = FftPlanner::new();
        let ifft = planner.plan_fft_inverse(nb_fft);
        Self { nb_fft, sample_period, ifft }
    }

    /// Sample instants [0, Ts, 2Ts, ..., (N-1)Ts] of one OFDM symbol.
    pub fn timebase(&self) -> Vec<f64> {
        (0..self.nb_fft)
            .map(|i| (i as f64) * self.sample_period)
            .collect()
    }

    /// Returns the timebase and the time domain signal for every column of the spectrum.
    /// Each column is reordered from a centred spectrum so the centre bin becomes bin 0, then inverse transformed.
    pub fn to_time_domain(&self, spectrum: &SymbolMatrix<Complex64>) -> (Vec<f64>, SymbolMatrix<Complex64>) {
        assert!(
            spectrum.nb_rows() == self.nb_fft,
            "Spectrum has {} rows but FFT has {} bins", spectrum.nb_rows(), self.nb_fft,
        );

        let mut scratch = vec![Complex64::default(); self.ifft.get_inplace_scratch_len()];
        // rustfft does not normalise, so scale by 1/N to match the usual inverse DFT definition
        let scale = 1.0 / (self.nb_fft as f64);

        let signal = SymbolMatrix::from_columns_of(spectrum, self.nb_fft, |_, x, y| {
            ifft_shift(x, y);
            self.ifft.process_with_scratch(y, &mut scratch);
            for value in y.iter_mut() {
                *value *= scale;
            }
        });

        (self.timebase(), signal)
    }
}

/// Moves the centre bin (index N/2) to index 0 so a centred spectrum is in standard DFT bin order.
pub fn ifft_shift<T: Copy>(x: &[T], y: &mut [T]) {
    assert!(x.len() == y.len());
    let n = x.len();
    let m = n/2;
    for i in 0..n {
        y[i] = x[(i+m) % n];
    }
}
