//! Oversampling wrapper.
//!
//! The child runs at `K` times the host rate:
//!
//! 1. **Upsample**: linear interpolation from the previous input sample,
//!    `K` points per input sample.
//! 2. **Process**: the child sees a block `K` times longer at `K` times the
//!    sample rate.
//! 3. **Downsample**: a 16-tap linear-phase FIR low-pass, evaluated at every
//!    `K`th sub-sample (decimation).
//!
//! Oversampling keeps one interpolation history per channel and cannot be
//! shared between voices, so a polyphonic context is rejected.

use super::forward_to_child;
use crate::data::{AudioBuffer, DataSlots, ProcessView};
use crate::error::{self, ErrorCode, NodeError, Result};
use crate::node::Node;
use crate::poly::VoiceIndex;
use crate::specs::{MAX_BLOCK_SIZE, MAX_CHANNELS, PrepareSpecs};

/// Largest supported factor.
pub const MAX_OVERSAMPLE_FACTOR: usize = 8;

const FILTER_ORDER: usize = 15;
const FILTER_TAPS: usize = FILTER_ORDER + 1;

#[derive(Debug, Clone, Copy)]
struct ChannelState {
    prev: f32,
    taps: [f32; FILTER_TAPS],
}

impl ChannelState {
    const CLEAR: Self = Self {
        prev: 0.0,
        taps: [0.0; FILTER_TAPS],
    };

    #[inline]
    fn upsample<const K: usize>(&mut self, input: f32, out: &mut [f32]) {
        let step = 1.0 / K as f32;
        for (i, o) in out.iter_mut().enumerate().take(K) {
            let t = (i as f32 + 1.0) * step;
            *o = self.prev + t * (input - self.prev);
        }
        self.prev = input;
    }

    #[inline]
    fn downsample(&mut self, sub_samples: &[f32], coeffs: &[f32; FILTER_TAPS]) -> f32 {
        for &s in sub_samples {
            self.taps.copy_within(0..FILTER_TAPS - 1, 1);
            self.taps[0] = s;
        }
        self.taps.iter().zip(coeffs).map(|(x, c)| x * c).sum()
    }
}

/// Runs its child at `K` times the rate. `K` must be 2, 4 or 8.
///
/// ```rust
/// use tessel_core::prelude::*;
/// use tessel_core::wrap::Oversample;
/// use tessel_core::nodes::Gain;
///
/// let mut node = Oversample::<4, _>::new(Gain::new(-6.0));
/// node.prepare(&PrepareSpecs::new(48000.0, 64, 1)).unwrap();
/// assert_eq!(node.inner_specs().map(|s| s.block_size), Some(256));
/// ```
#[derive(Debug, Clone)]
pub struct Oversample<const K: usize, T> {
    child: T,
    state: [ChannelState; MAX_CHANNELS],
    upsampled: AudioBuffer,
    inner_specs: Option<PrepareSpecs>,
}

impl<const K: usize, T> Oversample<K, T> {
    /// Wraps `child`.
    pub fn new(child: T) -> Self {
        const { assert!(K == 2 || K == 4 || K == 8, "oversample factor must be 2, 4 or 8") };
        Self {
            child,
            state: [ChannelState::CLEAR; MAX_CHANNELS],
            upsampled: AudioBuffer::default(),
            inner_specs: None,
        }
    }

    /// The oversampling factor.
    pub const fn factor(&self) -> usize {
        K
    }

    /// Group delay of the decimation filter, in oversampled samples.
    pub const fn latency_samples(&self) -> usize {
        FILTER_ORDER / 2
    }

    /// Specs the child was last prepared with.
    pub fn inner_specs(&self) -> Option<PrepareSpecs> {
        self.inner_specs
    }

    /// The wrapped node.
    pub fn inner(&self) -> &T {
        &self.child
    }

    /// The wrapped node, mutably.
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.child
    }

    /// Unwraps the node.
    pub fn into_inner(self) -> T {
        self.child
    }

    #[inline]
    fn coefficients() -> &'static [f32; FILTER_TAPS] {
        match K {
            2 => &COEFFS_2X,
            4 => &COEFFS_4X,
            _ => &COEFFS_8X,
        }
    }
}

impl<const K: usize, T: Default> Default for Oversample<K, T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<const K: usize, T: Node> Node for Oversample<K, T> {
    const ID: &'static str = T::ID;
    const IS_POLYPHONIC: bool = T::IS_POLYPHONIC;
    const HAS_MODULATION: bool = T::HAS_MODULATION;
    const IS_MODULATION_SOURCE: bool = T::IS_MODULATION_SOURCE;
    const FRAME_CAPABLE: bool = T::FRAME_CAPABLE;
    const DATA_SLOTS: DataSlots = T::DATA_SLOTS;

    fn prepare(&mut self, specs: &PrepareSpecs) -> Result<()> {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            factor = K,
            sample_rate = specs.sample_rate,
            block_size = specs.block_size,
            "oversample_prepare: {}",
            self.child.id()
        );

        if specs.is_polyphonic() {
            return error::raise(NodeError::code(ErrorCode::IllegalPolyphony));
        }

        let block_size = specs.block_size * K;
        if block_size > MAX_BLOCK_SIZE {
            return error::raise(NodeError::new(ErrorCode::IllegalBlockSize, MAX_BLOCK_SIZE, block_size));
        }

        let inner = specs
            .with_sample_rate(specs.sample_rate * K as f64)
            .with_block_size(block_size);
        self.upsampled.resize(specs.num_channels, block_size);
        self.state = [ChannelState::CLEAR; MAX_CHANNELS];
        self.inner_specs = Some(inner);
        self.child.prepare(&inner)
    }

    fn reset(&mut self, voice: VoiceIndex) {
        self.state = [ChannelState::CLEAR; MAX_CHANNELS];
        self.child.reset(voice);
    }

    fn process<P: ProcessView>(&mut self, data: &mut P) {
        let num_channels = data.num_channels().min(self.upsampled.num_channels());
        let num_samples = data.num_samples().min(self.upsampled.capacity() / K);
        let voice = data.voice();

        for c in 0..num_channels {
            let input = data.channel(c);
            let up = self.upsampled.channel_mut(c);
            for (i, &x) in input[..num_samples].iter().enumerate() {
                self.state[c].upsample::<K>(x, &mut up[i * K..(i + 1) * K]);
            }
        }

        {
            let mut view = self.upsampled.view(num_channels, num_samples * K, &[], voice);
            self.child.process(&mut view);
        }

        let coeffs = Self::coefficients();
        for c in 0..num_channels {
            let up = self.upsampled.channel(c);
            let out = data.channel_mut(c);
            for (i, o) in out[..num_samples].iter_mut().enumerate() {
                *o = self.state[c].downsample(&up[i * K..(i + 1) * K], coeffs);
            }
        }
    }

    fn process_frame(&mut self, frame: &mut [f32], voice: VoiceIndex) {
        let n = frame.len().min(MAX_CHANNELS);
        let mut sub = [[0.0_f32; MAX_OVERSAMPLE_FACTOR]; MAX_CHANNELS];
        for c in 0..n {
            self.state[c].upsample::<K>(frame[c], &mut sub[c]);
        }

        let mut inner = [0.0_f32; MAX_CHANNELS];
        for k in 0..K {
            for c in 0..n {
                inner[c] = sub[c][k];
            }
            self.child.process_frame(&mut inner[..n], voice);
            for c in 0..n {
                sub[c][k] = inner[c];
            }
        }

        let coeffs = Self::coefficients();
        for c in 0..n {
            frame[c] = self.state[c].downsample(&sub[c][..K], coeffs);
        }
    }

    fn id(&self) -> &'static str {
        self.child.id()
    }

    forward_to_child!(
        handle_event,
        handle_modulation,
        describe_parameters,
        set_parameter,
        bind_external_data,
        fixed_channels,
        is_polyphonic,
        has_modulation,
        is_modulation_source,
        is_frame_capable,
        data_slots,
    );
}

// Low-pass FIR coefficients for the decimation stage: windowed sinc (Kaiser,
// about 60 dB stopband), 16 taps, symmetric. Cutoff sits at the host Nyquist
// for each factor; every set sums to about 1 for unity passband gain.

#[allow(clippy::excessive_precision)]
#[rustfmt::skip]
static COEFFS_2X: [f32; FILTER_TAPS] = [
    -0.00152541,  0.00000000,  0.01309369,  0.00000000,
    -0.05738920,  0.00000000,  0.29581875,  0.50000434,
     0.29581875,  0.00000000, -0.05738920,  0.00000000,
     0.01309369,  0.00000000, -0.00152541,  0.00000000,
];

#[allow(clippy::excessive_precision)]
#[rustfmt::skip]
static COEFFS_4X: [f32; FILTER_TAPS] = [
    0.0018645282, 0.0068257641, 0.0172712655, 0.0342604001,
    0.0571166576, 0.0830896230, 0.1078345458, 0.1260221675,
    0.1332946246, 0.1260221675, 0.1078345458, 0.0830896230,
    0.0571166576, 0.0342604001, 0.0172712655, 0.0068257641,
];

#[allow(clippy::excessive_precision)]
#[rustfmt::skip]
static COEFFS_8X: [f32; FILTER_TAPS] = [
    0.0048323092, 0.0131400047, 0.0264623493, 0.0438249658,
    0.0634416395, 0.0828886958, 0.0994801510, 0.1107812341,
    0.1151296104, 0.1107812341, 0.0994801510, 0.0828886958,
    0.0634416395, 0.0438249658, 0.0264623493, 0.0131400047,
];
