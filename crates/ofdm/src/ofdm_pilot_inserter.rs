use crate::ofdm_error::OfdmError;
use crate::symbol_matrix::{SymbolMatrix, span_slice};
use num::complex::Complex64;

/// The FFT bins that hold pilots, in strictly ascending order.
/// One pilot is placed at each edge of the FFT and the rest are clustered just below and at the centre bin.
///
/// # Diagram
/// For an FFT of length N with 4 pilots:
/// ```text
/// | P | data ... | P | P | data ... | P |
/// | 0 |          |N/2-1|N/2|        |N-1|
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PilotPlan {
    nb_fft: usize,
    indices: Vec<usize>,
}

impl PilotPlan {
    pub fn new(nb_fft: usize, nb_pilots: usize) -> Result<Self, OfdmError> {
        if nb_pilots < 2 {
            return Err(OfdmError::InvalidPilotCount { nb_pilots, nb_fft });
        }
        if nb_fft <= nb_pilots {
            return Err(OfdmError::InvalidFftSize { nb_fft, nb_pilots });
        }

        let centre = nb_fft/2;
        let nb_centre_pilots = nb_pilots-2;
        // The clustered pilots occupy centre-k for k in 0..nb_centre_pilots and must stay above bin 0
        if nb_centre_pilots > centre {
            return Err(OfdmError::InvalidPilotCount { nb_pilots, nb_fft });
        }

        let mut indices = Vec::with_capacity(nb_pilots);
        indices.push(0);
        indices.extend((0..nb_centre_pilots).rev().map(|k| centre-k));
        indices.push(nb_fft-1);

        if !indices.windows(2).all(|w| w[0] < w[1]) {
            return Err(OfdmError::InvalidPilotCount { nb_pilots, nb_fft });
        }

        Ok(Self { nb_fft, indices })
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn nb_fft(&self) -> usize {
        self.nb_fft
    }

    pub fn is_pilot(&self, fft_bin: usize) -> bool {
        self.indices.binary_search(&fft_bin).is_ok()
    }
}

/// Expands each column of data carriers to the full FFT width by placing pilots at the planned bins.
#[derive(Debug, Clone)]
pub struct PilotInserter {
    plan: PilotPlan,
    pilot_value: Complex64,
}

impl PilotInserter {
    pub fn new(plan: PilotPlan, pilot_value: Complex64) -> Self {
        Self { plan, pilot_value }
    }

    pub fn plan(&self) -> &PilotPlan {
        &self.plan
    }

    /// Returns a matrix with nb_fft rows where the pilot bins hold the pilot value
    /// and the remaining bins hold the data carriers in their original order.
    pub fn insert_pilots(&self, mapped: &SymbolMatrix<Complex64>) -> SymbolMatrix<Complex64> {
        let nb_fft = self.plan.nb_fft();
        assert!(
            mapped.nb_rows() + self.plan.len() == nb_fft,
            "Expected {} data carriers but got {}", nb_fft - self.plan.len(), mapped.nb_rows(),
        );

        SymbolMatrix::from_columns_of(mapped, nb_fft, |_, x, y| self.fill_column(x, y))
    }

    fn fill_column(&self, data: &[Complex64], y: &mut [Complex64]) {
        // Copy the run of data carriers between each pair of pilots
        // This gives the same result as inserting each pilot in ascending order
        let mut data_index = 0;
        let mut fft_index = 0;
        for &pilot_index in self.plan.indices() {
            let length = pilot_index - fft_index;
            y[span_slice(fft_index, length)].copy_from_slice(&data[span_slice(data_index, length)]);
            y[pilot_index] = self.pilot_value;
            data_index += length;
            fft_index = pilot_index+1;
        }
        let length = y.len() - fft_index;
        y[span_slice(fft_index, length)].copy_from_slice(&data[span_slice(data_index, length)]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plan_for_32_bins() {
        let plan = PilotPlan::new(32, 4).unwrap();
        assert_eq!(plan.indices(), &[0, 15, 16, 31]);
        assert!(plan.is_pilot(15));
        assert!(!plan.is_pilot(14));
    }

    #[test]
    fn edge_only_plan() {
        let plan = PilotPlan::new(8, 2).unwrap();
        assert_eq!(plan.indices(), &[0, 7]);
    }

    #[test]
    fn plan_is_deterministic() {
        assert_eq!(PilotPlan::new(64, 6).unwrap(), PilotPlan::new(64, 6).unwrap());
        assert_eq!(PilotPlan::new(64, 6).unwrap().indices(), &[0, 29, 30, 31, 32, 63]);
    }

    #[test]
    fn rejects_invalid_pilot_counts() {
        assert_eq!(PilotPlan::new(32, 1), Err(OfdmError::InvalidPilotCount { nb_pilots: 1, nb_fft: 32 }));
        assert_eq!(PilotPlan::new(32, 0), Err(OfdmError::InvalidPilotCount { nb_pilots: 0, nb_fft: 32 }));
        // Centre cluster would reach bin 0
        assert!(matches!(PilotPlan::new(8, 7), Err(OfdmError::InvalidPilotCount { .. })));
        assert!(PilotPlan::new(8, 6).is_ok());
        assert!(matches!(PilotPlan::new(4, 4), Err(OfdmError::InvalidFftSize { .. })));
    }

    #[test]
    fn matches_sequential_insertion() {
        let plan = PilotPlan::new(16, 4).unwrap();
        let pilot = Complex64::new(0.5, -0.5);
        let inserter = PilotInserter::new(plan.clone(), pilot);

        let nb_data = 16 - 4;
        let data: Vec<Complex64> = (0..nb_data*2).map(|i| Complex64::new(i as f64 + 1.0, 0.0)).collect();
        let mapped = SymbolMatrix::from_column_major(data, nb_data);
        let full = inserter.insert_pilots(&mapped);
        assert_eq!(full.shape(), (16, 2));

        for col in 0..mapped.nb_cols() {
            let mut expected = mapped.column(col).to_vec();
            for &index in plan.indices() {
                expected.insert(index, pilot);
            }
            assert_eq!(full.column(col), expected.as_slice());
        }
    }

    #[test]
    fn null_pilots_are_silent() {
        let plan = PilotPlan::new(32, 4).unwrap();
        let inserter = PilotInserter::new(plan, Complex64::new(0.0, 0.0));
        let mapped = SymbolMatrix::from_column_major(vec![Complex64::new(1.0, 0.0); 28], 28);
        let full = inserter.insert_pilots(&mapped);
        for (i, x) in full.column(0).iter().enumerate() {
            let expected = if [0, 15, 16, 31].contains(&i) { 0.0 } else { 1.0 };
            assert_eq!(x.re, expected, "bin {}", i);
        }
    }
}
