use crate::ofdm_constellation::{ConstellationMapper, ModulationScheme};
use crate::ofdm_cyclic_prefix::CyclicPrefixer;
use crate::ofdm_error::OfdmError;
use crate::ofdm_ifft::SpectrumToTimeTransformer;
use crate::ofdm_message_splitter::MessageSplitter;
use crate::ofdm_parameters::{OfdmModulatorSettings, OfdmParameters};
use crate::ofdm_pilot_inserter::{PilotInserter, PilotPlan};
use crate::symbol_matrix::chunk_slice;
use num::complex::Complex64;
use tracing::{debug, trace, Dispatch};

/// The complex baseband output of the modulator.
/// Samples are ordered symbol by symbol, and each symbol starts with its cyclic prefix.
#[derive(Debug, Clone)]
pub struct OfdmBaseband {
    pub samples: Vec<Complex64>,
    /// Sample instants of one OFDM symbol without its prefix.
    pub timebase: Vec<f64>,
    pub nb_symbols: usize,
    /// Number of samples in each OFDM symbol including the cyclic prefix.
    pub nb_symbol_period: usize,
}

impl OfdmBaseband {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn symbol(&self, index: usize) -> &[Complex64] {
        &self.samples[chunk_slice(index, self.nb_symbol_period)]
    }

    /// Splits the samples into their in-phase (real) and quadrature (imaginary) parts.
    pub fn into_iq(self) -> (Vec<f64>, Vec<f64>) {
        self.samples
            .iter()
            .map(|x| (x.re, x.im))
            .unzip()
    }
}

/// Converts a bit stream into an OFDM baseband signal.
///
/// # Pipeline
/// ```text
/// bits -> split -> map -> insert pilots -> IFFT -> cyclic prefix -> (I, Q)
/// ```
///
/// Every stage is created once from the parameters and is read only afterwards.
/// A call either returns the whole signal or fails before any transform work is done.
pub struct OfdmModulator {
    params: OfdmParameters,
    splitter: MessageSplitter,
    mapper: ConstellationMapper,
    pilot_inserter: PilotInserter,
    transformer: SpectrumToTimeTransformer,
    prefixer: CyclicPrefixer,
    dispatch: Option<Dispatch>,
}

impl std::fmt::Debug for OfdmModulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfdmModulator")
            .field("params", &self.params)
            .field("has_dispatch", &self.dispatch.is_some())
            .finish_non_exhaustive()
    }
}

impl OfdmModulator {
    /// Creates a modulator for an FFT size, channel half bandwidth in Hz and modulation scheme name.
    pub fn new(
        nb_fft: usize,
        bandwidth: f64,
        modulation: &str,
        settings: OfdmModulatorSettings,
    ) -> Result<Self, OfdmError>
    {
        let modulation: ModulationScheme = modulation.parse()?;
        let params = OfdmParameters::new(nb_fft, bandwidth, modulation, &settings)?;
        Self::from_parameters(params)
    }

    /// Creates a modulator from parameters that may have been edited after construction.
    /// Parameters whose derived fields disagree are rejected.
    pub fn from_parameters(params: OfdmParameters) -> Result<Self, OfdmError> {
        params.validate()?;

        Ok(Self {
            splitter: MessageSplitter::from_parameters(&params),
            mapper: ConstellationMapper::new(params.modulation),
            pilot_inserter: PilotInserter::new(params.pilot_plan.clone(), params.pilot_value),
            transformer: SpectrumToTimeTransformer::new(&params),
            prefixer: CyclicPrefixer::new(params.nb_fft, params.guard_fraction)?,
            params,
            dispatch: None,
        })
    }

    /// Sends diagnostics from this modulator to the given dispatcher instead of the global default.
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    pub fn params(&self) -> &OfdmParameters {
        &self.params
    }

    pub fn pilot_plan(&self) -> &PilotPlan {
        self.pilot_inserter.plan()
    }

    /// Modulates the message and returns the in-phase and quadrature parts of the signal.
    pub fn message_to_iq(&self, message: &[u8], pad: bool) -> Result<(Vec<f64>, Vec<f64>), OfdmError> {
        Ok(self.modulate(message, pad)?.into_iq())
    }

    /// Modulates the message into complex baseband samples.
    pub fn modulate(&self, message: &[u8], pad: bool) -> Result<OfdmBaseband, OfdmError> {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, || {
                // Callsites first hit without this dispatcher cache its interest as never
                tracing::callsite::rebuild_interest_cache();
                self.run_pipeline(message, pad)
            }),
            None => self.run_pipeline(message, pad),
        }
    }

    fn run_pipeline(&self, message: &[u8], pad: bool) -> Result<OfdmBaseband, OfdmError> {
        let _span = tracing::debug_span!("ofdm_modulate", nb_fft = self.params.nb_fft, modulation = %self.params.modulation).entered();

        // All validation happens while splitting
        let indices = self.splitter.split(message, pad)?;
        debug!(nb_bits = message.len(), nb_symbols = indices.nb_cols(), pad, "split message");

        let mapped = self.mapper.map(&indices);
        let spectrum = self.pilot_inserter.insert_pilots(&mapped);
        trace!(pilots = ?self.pilot_plan().indices(), "inserted pilots");

        let (timebase, signal) = self.transformer.to_time_domain(&spectrum);
        let extended = self.prefixer.add_prefix(&signal);
        debug!(
            nb_samples = extended.as_slice().len(),
            nb_symbol_period = extended.nb_rows(),
            "created baseband signal"
        );

        Ok(OfdmBaseband {
            nb_symbols: extended.nb_cols(),
            nb_symbol_period: extended.nb_rows(),
            samples: extended.into_vec(),
            timebase,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bpsk_32() -> OfdmModulator {
        OfdmModulator::new(32, 8_000_000.0, "BPSK", OfdmModulatorSettings::default()).unwrap()
    }

    #[test]
    fn one_symbol_of_bpsk() {
        let modulator = bpsk_32();
        let (i, q) = modulator.message_to_iq(&[0; 28], false).unwrap();
        assert_eq!(i.len(), 36);
        assert_eq!(q.len(), 36);
    }

    #[test]
    fn rejects_short_message() {
        let modulator = bpsk_32();
        let err = modulator.message_to_iq(&[0; 27], false).unwrap_err();
        assert_eq!(err, OfdmError::MessageSizeMismatch { length: 27, block_size: 28 });
    }

    #[test]
    fn rejects_unknown_scheme() {
        let result = OfdmModulator::new(32, 8e6, "OOK", OfdmModulatorSettings::default());
        assert_eq!(result.err(), Some(OfdmError::InvalidModulationScheme("OOK".into())));
    }

    #[test]
    fn baseband_symbols_start_with_prefix() {
        let modulator = bpsk_32();
        let bits: Vec<u8> = (0..56).map(|i| (i % 3 == 0) as u8).collect();
        let baseband = modulator.modulate(&bits, false).unwrap();
        assert_eq!(baseband.nb_symbols, 2);
        assert_eq!(baseband.nb_symbol_period, 36);
        assert_eq!(baseband.timebase.len(), 32);
        for index in 0..baseband.nb_symbols {
            let symbol = baseband.symbol(index);
            assert_eq!(&symbol[..4], &symbol[32..]);
        }
    }

    #[test]
    fn rejects_edited_parameters() {
        let params = bpsk_32().params().clone();

        let mut edited = params.clone();
        edited.guard_fraction = 0.25;
        let err = OfdmModulator::from_parameters(edited).unwrap_err();
        assert_eq!(err, OfdmError::InconsistentParameters("nb_cyclic_prefix"));
        assert!(err.is_configuration_error());

        let mut edited = params.clone();
        edited.nb_data_carriers = 30;
        let err = OfdmModulator::from_parameters(edited).unwrap_err();
        assert_eq!(err, OfdmError::InconsistentParameters("nb_data_carriers"));

        let modulator = OfdmModulator::from_parameters(params).unwrap();
        assert_eq!(modulator.message_to_iq(&[1; 28], false).unwrap().0.len(), 36);
    }

    #[test]
    fn dispatch_created_before_plain_call_receives_events() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;
        use tracing::subscriber::Interest;
        use tracing::{span, Event, Metadata, Subscriber};

        struct CountEvents(Arc<AtomicUsize>);

        impl Subscriber for CountEvents {
            fn register_callsite(&self, _: &'static Metadata<'static>) -> Interest {
                Interest::always()
            }
            fn enabled(&self, _: &Metadata<'_>) -> bool {
                true
            }
            fn new_span(&self, _: &span::Attributes<'_>) -> span::Id {
                span::Id::from_u64(1)
            }
            fn record(&self, _: &span::Id, _: &span::Record<'_>) {}
            fn record_follows_from(&self, _: &span::Id, _: &span::Id) {}
            fn event(&self, _: &Event<'_>) {
                self.0.fetch_add(1, Ordering::Relaxed);
            }
            fn enter(&self, _: &span::Id) {}
            fn exit(&self, _: &span::Id) {}
        }

        let count = Arc::new(AtomicUsize::new(0));
        let dispatch = Dispatch::new(CountEvents(count.clone()));
        let plain = bpsk_32();
        let logged = bpsk_32().with_dispatch(dispatch);

        plain.message_to_iq(&[0; 28], false).unwrap();
        logged.message_to_iq(&[0; 28], false).unwrap();
        // split message, inserted pilots, created baseband signal
        assert_eq!(count.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn modulator_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OfdmModulator>();
    }
}
