pub mod symbol_matrix;
pub mod ofdm_error;
pub mod ofdm_parameters;
pub mod ofdm_constellation;
pub mod ofdm_message_splitter;
pub mod ofdm_pilot_inserter;
pub mod ofdm_ifft;
pub mod ofdm_cyclic_prefix;
pub mod ofdm_modulator;

pub use ofdm_constellation::{ConstellationMapper, ModulationScheme};
pub use ofdm_error::{ErrorKind, OfdmError};
pub use ofdm_modulator::{OfdmBaseband, OfdmModulator};
pub use ofdm_parameters::{BitOrder, OfdmModulatorSettings, OfdmParameters};
pub use symbol_matrix::SymbolMatrix;
