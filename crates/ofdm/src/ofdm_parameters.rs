use crate::ofdm_constellation::ModulationScheme;
use crate::ofdm_error::OfdmError;
use crate::ofdm_pilot_inserter::PilotPlan;
use num::complex::Complex64;

/// Order in which a group of bits is read into a symbol index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitOrder {
    /// The first bit of a group is the most significant bit of the symbol index.
    #[default]
    MsbFirst,
    /// The first bit of a group is the least significant bit of the symbol index.
    LsbFirst,
}

#[derive(Debug, Clone)]
pub struct OfdmModulatorSettings {
    /// Number of pilot carriers. One sits at each edge of the FFT and the rest are clustered around the centre bin.
    pub nb_pilots: usize,
    /// Fraction of the FFT length that is copied from the tail of each OFDM symbol to its front.
    /// Values at or below 0 disable the cyclic prefix.
    pub guard_fraction: f64,
    /// How groups of bits are read into symbol indices.
    pub bit_order: BitOrder,
    /// Value placed on every pilot carrier. Null pilots by default.
    pub pilot_value: Complex64,
}

impl Default for OfdmModulatorSettings {
    fn default() -> Self {
        Self {
            nb_pilots: 4,
            guard_fraction: 0.125,
            bit_order: BitOrder::MsbFirst,
            pilot_value: Complex64::new(0.0, 0.0),
        }
    }
}

/// Describes the structure of a transmitted OFDM symbol.
/// The FFT bins are split into data carriers and pilot carriers, and each symbol is extended by a cyclic prefix.
///
/// # Diagram
/// ```text
/// | OFDM symbol            |
/// | PREFIX | FFT           |
/// | ~IG*N  | N samples     |
/// ```
///
/// Each OFDM symbol carries (N - pilots) data carriers with bits_per_symbol bits each.
#[derive(Debug, Clone, PartialEq)]
pub struct OfdmParameters {
    /// Number of FFT bins.
    pub nb_fft: usize,
    /// Number of pilot carriers.
    pub nb_pilots: usize,
    /// Number of FFT bins that carry data.
    pub nb_data_carriers: usize,
    /// Duration of cyclic prefix in OFDM symbol.
    pub nb_cyclic_prefix: usize,
    /// Duration of OFDM symbol including the cyclic prefix.
    pub nb_symbol_period: usize,
    /// Number of message bits carried by one OFDM symbol.
    pub nb_bits_per_ofdm_symbol: usize,
    /// Channel half bandwidth in Hz.
    pub bandwidth: f64,
    /// Spacing between neighbouring carriers in Hz.
    pub frequency_spacing: f64,
    /// Time between consecutive output samples in seconds.
    pub sample_period: f64,
    /// Fraction of the FFT length used for the cyclic prefix.
    pub guard_fraction: f64,
    /// Constellation used on every data carrier.
    pub modulation: ModulationScheme,
    /// How groups of bits are read into symbol indices.
    pub bit_order: BitOrder,
    /// Value placed on every pilot carrier.
    pub pilot_value: Complex64,
    /// Ascending FFT bins that hold pilots.
    pub pilot_plan: PilotPlan,
}

impl OfdmParameters {
    /// Creates all derived parameters for OFDM from a required subset.
    pub fn new(
        nb_fft: usize,
        bandwidth: f64,
        modulation: ModulationScheme,
        settings: &OfdmModulatorSettings,
    ) -> Result<Self, OfdmError>
    {
        let nb_pilots = settings.nb_pilots;
        if nb_fft <= 1 || !nb_fft.is_power_of_two() || nb_fft <= nb_pilots {
            return Err(OfdmError::InvalidFftSize { nb_fft, nb_pilots });
        }
        if !bandwidth.is_finite() || bandwidth <= 0.0 {
            return Err(OfdmError::InvalidBandwidth(bandwidth));
        }
        let nb_cyclic_prefix = get_cyclic_prefix_length(nb_fft, settings.guard_fraction)?;
        let pilot_plan = PilotPlan::new(nb_fft, nb_pilots)?;

        let nb_data_carriers = nb_fft - nb_pilots;
        let nb_bits_per_ofdm_symbol = nb_data_carriers * modulation.bits_per_symbol();
        let nb_symbol_period = nb_fft + nb_cyclic_prefix;
        let frequency_spacing = 2.0*bandwidth / ((nb_fft-1) as f64);
        let sample_period = 1.0 / ((nb_fft as f64) * frequency_spacing);

        Ok(Self {
            nb_fft,
            nb_pilots,
            nb_data_carriers,
            nb_cyclic_prefix,
            nb_symbol_period,
            nb_bits_per_ofdm_symbol,
            bandwidth,
            frequency_spacing,
            sample_period,
            guard_fraction: settings.guard_fraction,
            modulation,
            bit_order: settings.bit_order,
            pilot_value: settings.pilot_value,
            pilot_plan,
        })
    }

    /// The settings these parameters were created from.
    pub fn settings(&self) -> OfdmModulatorSettings {
        OfdmModulatorSettings {
            nb_pilots: self.nb_pilots,
            guard_fraction: self.guard_fraction,
            bit_order: self.bit_order,
            pilot_value: self.pilot_value,
        }
    }

    /// Recreates the derived parameters and checks they agree with the stored ones.
    /// Catches parameters whose fields were edited after construction.
    pub fn validate(&self) -> Result<(), OfdmError> {
        let expected = Self::new(self.nb_fft, self.bandwidth, self.modulation, &self.settings())?;
        let field = if expected.nb_data_carriers != self.nb_data_carriers {
            "nb_data_carriers"
        } else if expected.nb_cyclic_prefix != self.nb_cyclic_prefix {
            "nb_cyclic_prefix"
        } else if expected.nb_symbol_period != self.nb_symbol_period {
            "nb_symbol_period"
        } else if expected.nb_bits_per_ofdm_symbol != self.nb_bits_per_ofdm_symbol {
            "nb_bits_per_ofdm_symbol"
        } else if expected.frequency_spacing != self.frequency_spacing {
            "frequency_spacing"
        } else if expected.sample_period != self.sample_period {
            "sample_period"
        } else if expected.pilot_plan != self.pilot_plan {
            "pilot_plan"
        } else {
            return Ok(());
        };
        Err(OfdmError::InconsistentParameters(field))
    }

    pub fn bits_per_symbol(&self) -> usize {
        self.modulation.bits_per_symbol()
    }

    pub fn sample_rate(&self) -> f64 {
        1.0 / self.sample_period
    }

    /// Number of output samples produced for a number of OFDM symbols.
    pub fn nb_output_samples(&self, nb_symbols: usize) -> usize {
        nb_symbols * self.nb_symbol_period
    }
}

/// Number of samples copied into the cyclic prefix: floor(nb_fft * guard_fraction).
/// Fractions at or below 0 give no prefix, fractions at or above 1 are rejected.
pub fn get_cyclic_prefix_length(nb_fft: usize, guard_fraction: f64) -> Result<usize, OfdmError> {
    if guard_fraction.is_nan() || guard_fraction >= 1.0 {
        return Err(OfdmError::InvalidGuardInterval(guard_fraction));
    }
    if guard_fraction <= 0.0 {
        return Ok(0);
    }
    Ok(((nb_fft as f64) * guard_fraction).floor() as usize)
}
