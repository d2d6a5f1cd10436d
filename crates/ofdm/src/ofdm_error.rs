/// Broad classification of an [`OfdmError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The modulator was constructed with invalid parameters. Always fatal.
    Configuration,
    /// The guard interval fraction is outside of [0,1).
    GuardInterval,
    /// The message length does not fill a whole number of OFDM symbols.
    /// Recoverable by padding or correcting the message length.
    MessageSize,
    /// The message contains values that are not bits.
    Message,
}

/// Possible errors when constructing or running the OFDM modulator.
#[derive(Debug, Clone, PartialEq)]
pub enum OfdmError {
    /// FFT size is not a power of two, is not above one, or cannot hold the pilots.
    InvalidFftSize { nb_fft: usize, nb_pilots: usize },
    /// The pilot plan would contain fewer than two or duplicate indices.
    InvalidPilotCount { nb_pilots: usize, nb_fft: usize },
    /// Channel half bandwidth must be positive and finite.
    InvalidBandwidth(f64),
    /// Modulation scheme name is not recognised.
    InvalidModulationScheme(String),
    /// Guard interval fraction must be below 1.
    InvalidGuardInterval(f64),
    /// A derived parameter does not agree with the parameters it is derived from.
    InconsistentParameters(&'static str),
    /// Message length is not a multiple of the bits carried by one OFDM symbol.
    MessageSizeMismatch { length: usize, block_size: usize },
    /// Message entry is not a 0 or 1.
    InvalidBit { index: usize, value: u8 },
}

impl OfdmError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OfdmError::InvalidFftSize { .. }
            | OfdmError::InvalidPilotCount { .. }
            | OfdmError::InvalidBandwidth(_)
            | OfdmError::InvalidModulationScheme(_)
            | OfdmError::InconsistentParameters(_) => ErrorKind::Configuration,
            OfdmError::InvalidGuardInterval(_) => ErrorKind::GuardInterval,
            OfdmError::MessageSizeMismatch { .. } => ErrorKind::MessageSize,
            OfdmError::InvalidBit { .. } => ErrorKind::Message,
        }
    }

    pub fn is_configuration_error(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}

impl std::fmt::Display for OfdmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OfdmError::InvalidFftSize { nb_fft, nb_pilots } => write!(
                f,
                "FFT size {} must be a power of two greater than 1 and the pilot count {}",
                nb_fft, nb_pilots
            ),
            OfdmError::InvalidPilotCount { nb_pilots, nb_fft } => write!(
                f,
                "pilot count {} does not give distinct pilot indices for FFT size {}",
                nb_pilots, nb_fft
            ),
            OfdmError::InvalidBandwidth(bandwidth) => {
                write!(f, "bandwidth {} must be positive and finite", bandwidth)
            }
            OfdmError::InvalidModulationScheme(name) => {
                write!(f, "unknown modulation scheme: {}", name)
            }
            OfdmError::InvalidGuardInterval(fraction) => {
                write!(f, "guard interval fraction {} must be below 1", fraction)
            }
            OfdmError::InconsistentParameters(field) => {
                write!(f, "parameter {} does not match the rest of the OFDM parameters", field)
            }
            OfdmError::MessageSizeMismatch { length, block_size } => write!(
                f,
                "message of {} bits is not a non-zero multiple of {} bits per OFDM symbol",
                length, block_size
            ),
            OfdmError::InvalidBit { index, value } => {
                write!(f, "message entry {} has value {} which is not a bit", index, value)
            }
        }
    }
}

impl std::error::Error for OfdmError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_share_a_kind() {
        let errors = [
            OfdmError::InvalidFftSize { nb_fft: 30, nb_pilots: 4 },
            OfdmError::InvalidPilotCount { nb_pilots: 1, nb_fft: 32 },
            OfdmError::InvalidBandwidth(-1.0),
            OfdmError::InvalidModulationScheme("FSK".into()),
            OfdmError::InconsistentParameters("nb_cyclic_prefix"),
        ];
        for err in &errors {
            assert!(err.is_configuration_error(), "{:?}", err);
        }
        assert_eq!(OfdmError::InvalidGuardInterval(1.0).kind(), ErrorKind::GuardInterval);
        assert_eq!(
            OfdmError::MessageSizeMismatch { length: 27, block_size: 28 }.kind(),
            ErrorKind::MessageSize
        );
    }

    #[test]
    fn display_mentions_sizes() {
        let err = OfdmError::MessageSizeMismatch { length: 27, block_size: 28 };
        let text = err.to_string();
        assert!(text.contains("27"));
        assert!(text.contains("28"));
    }
}
