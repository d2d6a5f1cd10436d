use ofdm::{BitOrder, OfdmModulator, OfdmModulatorSettings};
use std::io::{Read, Write, BufWriter};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct AppArguments {
    /// Number of FFT bins. Must be a power of two.
    #[arg(short = 'n', long, default_value_t = 64)]
    fft_size: usize,
    /// Channel half bandwidth in Hz
    #[arg(short, long, default_value_t = 1e6)]
    bandwidth: f64,
    /// Modulation scheme. Valid schemes are \[BPSK, QPSK, 8PSK, 16QAM, 64QAM\]
    #[arg(short, long, default_value = "QPSK")]
    modulation: String,
    /// Number of pilot carriers
    #[arg(short, long, default_value_t = 4)]
    pilots: usize,
    /// Fraction of each OFDM symbol copied into its cyclic prefix
    #[arg(short, long, default_value_t = 0.125)]
    guard_fraction: f64,
    /// Read the first bit of each symbol as the least significant bit
    #[arg(long)]
    lsb_first: bool,
    /// Pad the message with zero bits to fill the last OFDM symbol
    #[arg(long)]
    pad: bool,
    /// Input is text of '0' and '1' characters instead of packed bytes
    #[arg(long)]
    ascii: bool,
    /// Input filepath. If not provided uses stdin by default.
    #[arg(short, long)]
    input_filepath: Option<String>,
    /// Output filepath of interleaved little endian f32 IQ samples. If not provided uses stdout by default.
    #[arg(short, long)]
    output_filepath: Option<String>,
}

fn main() -> Result<(), String> {
    init_logging();
    let args = AppArguments::parse();

    let settings = OfdmModulatorSettings {
        nb_pilots: args.pilots,
        guard_fraction: args.guard_fraction,
        bit_order: if args.lsb_first { BitOrder::LsbFirst } else { BitOrder::MsbFirst },
        ..Default::default()
    };
    let modulator = OfdmModulator::new(args.fft_size, args.bandwidth, &args.modulation, settings)
        .map_err(|err| format!("Invalid modulator configuration: {}", err))?;

    let mut input_file: Box<dyn Read> = match &args.input_filepath {
        None => Box::new(std::io::stdin()),
        Some(filepath) => match std::fs::File::open(filepath) {
            Ok(file) => Box::new(file),
            Err(err) => return Err(format!("Failed to open input file {}: {}", filepath, err)),
        },
    };
    let mut output_file: Box<dyn Write> = match &args.output_filepath {
        None => Box::new(BufWriter::new(std::io::stdout())),
        Some(filepath) => match std::fs::File::create(filepath) {
            Ok(file) => Box::new(BufWriter::new(file)),
            Err(err) => return Err(format!("Failed to open file {}: {}", filepath, err)),
        },
    };

    let mut input_bytes = Vec::new();
    if let Err(err) = input_file.read_to_end(&mut input_bytes) {
        return Err(format!("Error while reading from input: {}", err));
    }
    let message = match args.ascii {
        true => parse_ascii_bits(&input_bytes)?,
        false => unpack_bytes(&input_bytes),
    };

    let params = modulator.params();
    info!(
        nb_fft = params.nb_fft,
        modulation = %params.modulation,
        nb_bits = message.len(),
        sample_rate = params.sample_rate(),
        "modulating message"
    );

    let baseband = modulator
        .modulate(&message, args.pad)
        .map_err(|err| format!("Failed to modulate message: {}", err))?;

    for x in &baseband.samples {
        let mut sample = [0u8; 8];
        sample[..4].copy_from_slice(&(x.re as f32).to_le_bytes());
        sample[4..].copy_from_slice(&(x.im as f32).to_le_bytes());
        if let Err(err) = output_file.write_all(&sample) {
            return Err(format!("Error while writing to output: {}", err));
        }
    }
    if let Err(err) = output_file.flush() {
        return Err(format!("Error while flushing output: {}", err));
    }

    info!(nb_symbols = baseband.nb_symbols, nb_samples = baseband.len(), "wrote baseband samples");
    Ok(())
}

/// Logs go to stderr so stdout can carry the IQ samples.
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .compact()
        .with_writer(std::io::stderr)
        .init();
}

/// Unpacks each byte into 8 bits, most significant bit first.
fn unpack_bytes(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .flat_map(|byte| (0..8).rev().map(move |i| (byte >> i) & 1))
        .collect()
}

/// Reads '0' and '1' characters and skips whitespace.
fn parse_ascii_bits(text: &[u8]) -> Result<Vec<u8>, String> {
    text
        .iter()
        .filter(|c| !c.is_ascii_whitespace())
        .enumerate()
        .map(|(i, &c)| match c {
            b'0' => Ok(0),
            b'1' => Ok(1),
            c => Err(format!("Invalid bit character {:?} at position {}", c as char, i)),
        })
        .collect()
}
