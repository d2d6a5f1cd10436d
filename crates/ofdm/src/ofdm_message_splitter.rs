use crate::ofdm_error::OfdmError;
use crate::ofdm_parameters::{BitOrder, OfdmParameters};
use crate::symbol_matrix::SymbolMatrix;
use itertools::Itertools;

/// Groups a flat bit stream into symbol indices and lays them out as (data carrier × OFDM symbol).
///
/// # Diagram
/// For C data carriers and B bits per symbol:
/// ```text
/// | bits                                  |
/// | B*C          | B*C          | ...     |
/// | SYM 0 column | SYM 1 column | ...     |
/// ```
/// The layout is column major so the first C indices are carriers 0..C of OFDM symbol 0.
#[derive(Debug, Clone)]
pub struct MessageSplitter {
    nb_channels: usize,
    bits_per_symbol: usize,
    bit_order: BitOrder,
}

impl MessageSplitter {
    pub fn new(nb_channels: usize, bits_per_symbol: usize, bit_order: BitOrder) -> Self {
        assert!(nb_channels > 0, "Splitter needs at least one channel");
        assert!(bits_per_symbol > 0 && bits_per_symbol < usize::BITS as usize, "Invalid number of bits per symbol {}", bits_per_symbol);
        Self { nb_channels, bits_per_symbol, bit_order }
    }

    pub fn from_parameters(params: &OfdmParameters) -> Self {
        Self::new(params.nb_data_carriers, params.bits_per_symbol(), params.bit_order)
    }

    /// Number of bits carried by one OFDM symbol.
    pub fn block_size(&self) -> usize {
        self.nb_channels * self.bits_per_symbol
    }

    /// Checks the message contains only bits and fills a whole number of OFDM symbols.
    /// Returns the message length after any padding.
    pub fn validate(&self, bits: &[u8], pad: bool) -> Result<usize, OfdmError> {
        if let Some((index, &value)) = bits.iter().find_position(|&&value| value > 1) {
            return Err(OfdmError::InvalidBit { index, value });
        }

        let length = bits.len();
        let block_size = self.block_size();
        if length == 0 {
            return Err(OfdmError::MessageSizeMismatch { length, block_size });
        }

        match length % block_size {
            0 => Ok(length),
            _ if !pad => Err(OfdmError::MessageSizeMismatch { length, block_size }),
            remainder => Ok(length + block_size - remainder),
        }
    }

    /// Splits the message into a matrix of symbol indices with one row per data carrier.
    /// When padding is requested the message is extended with zero bits to the next whole OFDM symbol.
    pub fn split(&self, bits: &[u8], pad: bool) -> Result<SymbolMatrix<usize>, OfdmError> {
        let padded_length = self.validate(bits, pad)?;

        let padded_bits: Vec<u8> = bits
            .iter()
            .copied()
            .pad_using(padded_length, |_| 0)
            .collect();

        let indices: Vec<usize> = padded_bits
            .chunks_exact(self.bits_per_symbol)
            .map(|group| self.pack_symbol(group))
            .collect();

        Ok(SymbolMatrix::from_column_major(indices, self.nb_channels))
    }

    fn pack_symbol(&self, group: &[u8]) -> usize {
        let push_bit = |index: usize, &bit: &u8| (index << 1) | (bit as usize);
        match self.bit_order {
            BitOrder::MsbFirst => group.iter().fold(0, push_bit),
            BitOrder::LsbFirst => group.iter().rev().fold(0, push_bit),
        }
    }
}
