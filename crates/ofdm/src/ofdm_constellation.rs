use crate::ofdm_error::OfdmError;
use crate::symbol_matrix::SymbolMatrix;
use num::complex::Complex64;
use std::f64::consts::{FRAC_1_SQRT_2, PI};
use std::str::FromStr;

/// Modulation schemes that can be placed on each data carrier.
/// All constellations are Gray coded and normalised to an average energy of 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModulationScheme {
    Bpsk,
    Qpsk,
    Psk8,
    Qam16,
    Qam64,
}

impl ModulationScheme {
    pub const ALL: [ModulationScheme; 5] = [
        ModulationScheme::Bpsk,
        ModulationScheme::Qpsk,
        ModulationScheme::Psk8,
        ModulationScheme::Qam16,
        ModulationScheme::Qam64,
    ];

    pub fn bits_per_symbol(&self) -> usize {
        match self {
            ModulationScheme::Bpsk  => 1,
            ModulationScheme::Qpsk  => 2,
            ModulationScheme::Psk8  => 3,
            ModulationScheme::Qam16 => 4,
            ModulationScheme::Qam64 => 6,
        }
    }

    /// Number of points in the constellation.
    pub fn order(&self) -> usize {
        1 << self.bits_per_symbol()
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModulationScheme::Bpsk  => "BPSK",
            ModulationScheme::Qpsk  => "QPSK",
            ModulationScheme::Psk8  => "8PSK",
            ModulationScheme::Qam16 => "16QAM",
            ModulationScheme::Qam64 => "64QAM",
        }
    }

    /// Constellation point for a symbol index. Only the lowest bits_per_symbol bits are used.
    pub fn point(&self, index: usize) -> Complex64 {
        let index = index & (self.order()-1);
        match self {
            // b => 1-2b
            ModulationScheme::Bpsk => Complex64::new(1.0 - 2.0*(index as f64), 0.0),
            // phi = (1-2*b0) + (1-2*b1)*1j, where b0 is the most significant bit
            ModulationScheme::Qpsk => {
                let b0 = ((index >> 1) & 1) as f64;
                let b1 = (index & 1) as f64;
                Complex64::new(1.0 - 2.0*b0, 1.0 - 2.0*b1) * FRAC_1_SQRT_2
            },
            ModulationScheme::Psk8 => {
                let phase = 2.0 * PI * (gray_to_binary(index) as f64) / 8.0;
                Complex64::from_polar(1.0, phase)
            },
            ModulationScheme::Qam16 | ModulationScheme::Qam64 => {
                square_qam_point(index, self.bits_per_symbol())
            },
        }
    }
}

impl FromStr for ModulationScheme {
    type Err = OfdmError;

    /// Names are case insensitive and ignore '-', '_' and spaces, so "16-QAM" and "qam16" are accepted.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let normalised: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .map(|c| c.to_ascii_uppercase())
            .collect();

        match normalised.as_str() {
            "BPSK" | "2PSK"                => Ok(ModulationScheme::Bpsk),
            "QPSK" | "4PSK" | "4QAM"       => Ok(ModulationScheme::Qpsk),
            "8PSK" | "PSK8"                => Ok(ModulationScheme::Psk8),
            "16QAM" | "QAM16"              => Ok(ModulationScheme::Qam16),
            "64QAM" | "QAM64"              => Ok(ModulationScheme::Qam64),
            _ => Err(OfdmError::InvalidModulationScheme(name.to_string())),
        }
    }
}

impl std::fmt::Display for ModulationScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Maps symbol indices onto the complex constellation of a modulation scheme.
/// The constellation is stored as a lookup table built once on creation.
#[derive(Debug, Clone)]
pub struct ConstellationMapper {
    points: Vec<Complex64>,
}

impl ConstellationMapper {
    pub fn new(scheme: ModulationScheme) -> Self {
        let points = (0..scheme.order())
            .map(|i| scheme.point(i))
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[Complex64] {
        &self.points
    }

    #[inline(always)]
    pub fn map_symbol(&self, index: usize) -> Complex64 {
        self.points[index & (self.points.len()-1)]
    }

    /// Maps every grouped symbol index in the matrix, keeping its shape.
    pub fn map(&self, indices: &SymbolMatrix<usize>) -> SymbolMatrix<Complex64> {
        indices.map(|&index| self.map_symbol(index))
    }
}

fn gray_to_binary(gray: usize) -> usize {
    let mut binary = gray;
    let mut shift = gray >> 1;
    while shift != 0 {
        binary ^= shift;
        shift >>= 1;
    }
    binary
}

/// Square QAM where the upper half of the bits select the in-phase level and the lower half select the quadrature level.
/// Each axis is a Gray coded PAM with levels -(L-1),...,-1,+1,...,+(L-1).
fn square_qam_point(index: usize, bits_per_symbol: usize) -> Complex64 {
    let axis_bits = bits_per_symbol/2;
    let nb_levels = 1usize << axis_bits;
    let axis_mask = nb_levels-1;

    let level = |bits: usize| -> f64 {
        2.0*(gray_to_binary(bits) as f64) - ((nb_levels-1) as f64)
    };

    // Average energy of M-QAM with these levels is 2(M-1)/3
    let order = 1usize << bits_per_symbol;
    let scale = (2.0*((order-1) as f64)/3.0).sqrt();

    let re = level(index >> axis_bits);
    let im = level(index & axis_mask);
    Complex64::new(re, im) / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn parses_scheme_names() {
        assert_eq!("BPSK".parse::<ModulationScheme>().unwrap(), ModulationScheme::Bpsk);
        assert_eq!("qpsk".parse::<ModulationScheme>().unwrap(), ModulationScheme::Qpsk);
        assert_eq!("16-QAM".parse::<ModulationScheme>().unwrap(), ModulationScheme::Qam16);
        assert_eq!("qam_64".parse::<ModulationScheme>().unwrap(), ModulationScheme::Qam64);
        assert_eq!("8psk".parse::<ModulationScheme>().unwrap(), ModulationScheme::Psk8);

        let err = "FSK".parse::<ModulationScheme>().unwrap_err();
        assert_eq!(err, OfdmError::InvalidModulationScheme("FSK".into()));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn names_round_trip() {
        for scheme in ModulationScheme::ALL {
            assert_eq!(scheme.name().parse::<ModulationScheme>().unwrap(), scheme);
        }
    }

    #[test]
    fn constellations_have_unit_average_energy() {
        for scheme in ModulationScheme::ALL {
            let mapper = ConstellationMapper::new(scheme);
            let energy: f64 = mapper.points().iter().map(|x| x.norm_sqr()).sum::<f64>()
                / (mapper.points().len() as f64);
            assert!((energy - 1.0).abs() < TOLERANCE, "{} has average energy {}", scheme, energy);
        }
    }

    #[test]
    fn constellations_are_collision_free() {
        for scheme in ModulationScheme::ALL {
            let points = ConstellationMapper::new(scheme).points().to_vec();
            for i in 0..points.len() {
                for j in (i+1)..points.len() {
                    let distance = (points[i] - points[j]).norm();
                    assert!(distance > 1e-6, "{} maps {} and {} to the same point", scheme, i, j);
                }
            }
        }
    }

    #[test]
    fn neighbouring_points_differ_by_one_bit() {
        for scheme in [ModulationScheme::Qpsk, ModulationScheme::Psk8, ModulationScheme::Qam16, ModulationScheme::Qam64] {
            let points = ConstellationMapper::new(scheme).points().to_vec();
            let min_distance = (0..points.len())
                .flat_map(|i| (0..points.len()).filter(move |&j| j != i).map(move |j| (i, j)))
                .map(|(i, j)| (points[i] - points[j]).norm())
                .fold(f64::MAX, f64::min);
            for i in 0..points.len() {
                for j in 0..points.len() {
                    if i == j {
                        continue;
                    }
                    if (points[i] - points[j]).norm() < min_distance + 1e-9 {
                        assert_eq!((i ^ j).count_ones(), 1, "{} neighbours {} and {} are not Gray coded", scheme, i, j);
                    }
                }
            }
        }
    }

    #[test]
    fn bpsk_all_ones_has_unit_magnitude() {
        let mapper = ConstellationMapper::new(ModulationScheme::Bpsk);
        let indices = SymbolMatrix::from_column_major(vec![1usize; 28], 28);
        let mapped = mapper.map(&indices);
        assert_eq!(mapped.shape(), (28, 1));
        for x in mapped.as_slice() {
            assert!((x.norm() - 1.0).abs() < TOLERANCE);
            assert!((x.re + 1.0).abs() < TOLERANCE);
        }
    }

    #[test]
    fn qpsk_most_significant_bit_is_in_phase() {
        let mapper = ConstellationMapper::new(ModulationScheme::Qpsk);
        let x = mapper.map_symbol(0b10);
        assert!(x.re < 0.0);
        assert!(x.im > 0.0);
    }

    #[test]
    fn gray_decoding() {
        let decoded: Vec<usize> = (0..4).map(gray_to_binary).collect();
        assert_eq!(decoded, vec![0, 1, 3, 2]);
    }
}
