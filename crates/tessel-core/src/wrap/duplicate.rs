//! Resizable clone array.
//!
//! [`Duplicate`] owns a run-time number of copies of one node. The clone
//! count can change while audio is running: a [`DuplicateController`] takes
//! the exclusive lock from a configuration thread, and the render path only
//! ever *tries* the lock. A render call that finds a resize in flight is
//! skipped; it never waits.
//!
//! How the clones share a block is decided by a [`DuplicatePolicy`]:
//!
//! | Policy              | Output                                   |
//! |---------------------|------------------------------------------|
//! | [`Serial`]          | `Cn(..C1(C0(x)))`                        |
//! | [`Parallel`]        | `C0(x) + C1(x) + .. + Cn(x)`             |
//! | [`PassThroughCopy`] | `C0(x)`; the other clones stay idle      |

use std::sync::Arc;

use parking_lot::RwLock;

use crate::data::{AudioBuffer, DataSlots, Event, ExternalData, ProcessView};
use crate::error::{self, ErrorCode, NodeError, Result};
use crate::node::Node;
use crate::parameter::ParameterList;
use crate::poly::VoiceIndex;
use crate::specs::{MAX_CHANNELS, PrepareSpecs};

/// Default upper bound on the clone count.
pub const DEFAULT_MAX_CLONES: usize = 32;

/// Scratch buffers a policy may use while processing.
#[derive(Debug, Clone, Default)]
pub struct DuplicateScratch {
    original: AudioBuffer,
    work: AudioBuffer,
}

/// How the clones of a [`Duplicate`] share a block.
pub trait DuplicatePolicy {
    /// Name used in diagnostics.
    const NAME: &'static str;

    /// Whether the policy needs the scratch buffers.
    const NEEDS_SCRATCH: bool = false;

    /// Processes one block with every clone.
    fn process<T: Node, P: ProcessView>(clones: &mut [T], data: &mut P, scratch: &mut DuplicateScratch);

    /// Processes one frame with every clone.
    fn process_frame<T: Node>(clones: &mut [T], frame: &mut [f32], voice: VoiceIndex);
}

/// Clones run one after another over the same buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Serial;

impl DuplicatePolicy for Serial {
    const NAME: &'static str = "serial";

    fn process<T: Node, P: ProcessView>(clones: &mut [T], data: &mut P, _scratch: &mut DuplicateScratch) {
        for clone in clones {
            clone.process(data);
        }
    }

    fn process_frame<T: Node>(clones: &mut [T], frame: &mut [f32], voice: VoiceIndex) {
        for clone in clones {
            clone.process_frame(frame, voice);
        }
    }
}

/// Each clone processes its own copy of the input; the outputs are summed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parallel;

impl DuplicatePolicy for Parallel {
    const NAME: &'static str = "parallel";
    const NEEDS_SCRATCH: bool = true;

    fn process<T: Node, P: ProcessView>(clones: &mut [T], data: &mut P, scratch: &mut DuplicateScratch) {
        let Some((first, rest)) = clones.split_first_mut() else {
            return;
        };
        if rest.is_empty() {
            first.process(data);
            return;
        }

        let num_channels = data.num_channels();
        let num_samples = data.num_samples();
        let voice = data.voice();

        scratch.original.copy_from(data);
        first.process(data);
        for clone in rest {
            scratch.work.copy_from_buffer(&scratch.original, num_samples);
            {
                let mut copy = scratch.work.view(num_channels, num_samples, data.events(), voice);
                clone.process(&mut copy);
            }
            scratch.work.add_into(data);
        }
    }

    fn process_frame<T: Node>(clones: &mut [T], frame: &mut [f32], voice: VoiceIndex) {
        let Some((first, rest)) = clones.split_first_mut() else {
            return;
        };
        let n = frame.len().min(MAX_CHANNELS);
        let mut original = [0.0_f32; MAX_CHANNELS];
        original[..n].copy_from_slice(&frame[..n]);

        first.process_frame(frame, voice);
        for clone in rest {
            let mut work = original;
            clone.process_frame(&mut work[..n], voice);
            for (out, w) in frame.iter_mut().zip(&work[..n]) {
                *out += *w;
            }
        }
    }
}

/// Only the first clone processes. The others are kept prepared and in step
/// with parameters and events, ready to take over.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughCopy;

impl DuplicatePolicy for PassThroughCopy {
    const NAME: &'static str = "pass_through_copy";

    fn process<T: Node, P: ProcessView>(clones: &mut [T], data: &mut P, _scratch: &mut DuplicateScratch) {
        if let Some(first) = clones.first_mut() {
            first.process(data);
        }
    }

    fn process_frame<T: Node>(clones: &mut [T], frame: &mut [f32], voice: VoiceIndex) {
        if let Some(first) = clones.first_mut() {
            first.process_frame(frame, voice);
        }
    }
}

#[derive(Debug)]
struct Clones<T> {
    nodes: Vec<T>,
    max: usize,
    specs: Option<PrepareSpecs>,
    scratch: DuplicateScratch,
}

/// A run-time sized array of clones of one node.
///
/// ```rust
/// use tessel_core::prelude::*;
/// use tessel_core::nodes::Gain;
/// use tessel_core::wrap::{Duplicate, Serial};
///
/// let mut voices = Duplicate::<_, Serial>::new(Gain::new(-6.0), 2).unwrap();
/// let controller = voices.controller();
/// voices.prepare(&PrepareSpecs::new(44100.0, 64, 1)).unwrap();
///
/// // From a configuration thread:
/// controller.set_clone_count(4).unwrap();
/// assert_eq!(voices.clone_count(), 4);
/// ```
#[derive(Debug)]
pub struct Duplicate<T, Policy = Serial> {
    state: Arc<RwLock<Clones<T>>>,
    policy: core::marker::PhantomData<Policy>,
}

impl<T: Node + Clone, Policy: DuplicatePolicy> Duplicate<T, Policy> {
    /// `count` clones of `prototype`, at most [`DEFAULT_MAX_CLONES`].
    pub fn new(prototype: T, count: usize) -> Result<Self> {
        Self::with_max_clones(prototype, count, DEFAULT_MAX_CLONES)
    }

    /// `count` clones of `prototype`, at most `max`.
    pub fn with_max_clones(prototype: T, count: usize, max: usize) -> Result<Self> {
        if count == 0 || count > max {
            error::raise(clone_mismatch(max, count))?;
        }
        let nodes = vec![prototype; count.clamp(1, max.max(1))];
        Ok(Self {
            state: Arc::new(RwLock::new(Clones {
                nodes,
                max,
                specs: None,
                scratch: DuplicateScratch::default(),
            })),
            policy: core::marker::PhantomData,
        })
    }

    /// A handle that resizes this array from another thread.
    pub fn controller(&self) -> DuplicateController<T> {
        DuplicateController {
            state: Arc::clone(&self.state),
        }
    }

    /// Current clone count.
    pub fn clone_count(&self) -> usize {
        self.state.read().nodes.len()
    }

    /// Runs `f` over the clones.
    pub fn with_clones<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        f(&self.state.read().nodes)
    }

    /// Runs `f` over the clones, mutably.
    pub fn with_clones_mut<R>(&mut self, f: impl FnOnce(&mut [T]) -> R) -> R {
        f(&mut self.state.write().nodes)
    }
}

fn clone_mismatch(max: usize, count: usize) -> NodeError {
    NodeError::new(ErrorCode::CloneMismatch, max, count)
}

impl<T: Node + Clone, Policy: DuplicatePolicy> Node for Duplicate<T, Policy> {
    const ID: &'static str = T::ID;
    const IS_POLYPHONIC: bool = T::IS_POLYPHONIC;
    const HAS_MODULATION: bool = T::HAS_MODULATION;
    const IS_MODULATION_SOURCE: bool = T::IS_MODULATION_SOURCE;
    const FRAME_CAPABLE: bool = T::FRAME_CAPABLE;
    const DATA_SLOTS: DataSlots = T::DATA_SLOTS;

    fn prepare(&mut self, specs: &PrepareSpecs) -> Result<()> {
        let mut state = self.state.write();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            sample_rate = specs.sample_rate,
            block_size = specs.block_size,
            channels = specs.num_channels,
            "duplicate_prepare: {} {} clones",
            state.nodes.len(),
            Policy::NAME
        );

        state.specs = Some(*specs);
        if Policy::NEEDS_SCRATCH {
            state.scratch.original.resize(specs.num_channels, specs.block_size);
            state.scratch.work.resize(specs.num_channels, specs.block_size);
        }
        for node in &mut state.nodes {
            node.prepare(specs)?;
        }
        Ok(())
    }

    fn reset(&mut self, voice: VoiceIndex) {
        if let Some(mut state) = self.state.try_write() {
            for node in &mut state.nodes {
                node.reset(voice);
            }
        }
    }

    fn process<P: ProcessView>(&mut self, data: &mut P) {
        if let Some(mut state) = self.state.try_write() {
            let Clones { nodes, scratch, .. } = &mut *state;
            Policy::process(nodes, data, scratch);
        }
    }

    fn process_frame(&mut self, frame: &mut [f32], voice: VoiceIndex) {
        if let Some(mut state) = self.state.try_write() {
            Policy::process_frame(&mut state.nodes, frame, voice);
        }
    }

    fn handle_event(&mut self, event: &mut Event, voice: VoiceIndex) {
        if let Some(mut state) = self.state.try_write() {
            for node in &mut state.nodes {
                node.handle_event(event, voice);
            }
        }
    }

    fn handle_modulation(&mut self, voice: VoiceIndex) -> Option<f64> {
        self.state.try_write()?.nodes.first_mut()?.handle_modulation(voice)
    }

    fn describe_parameters(&self, list: &mut ParameterList) {
        if let Some(first) = self.state.read().nodes.first() {
            first.describe_parameters(list);
        }
    }

    /// Applies to every clone. Waits for a resize in flight.
    fn set_parameter(&mut self, index: usize, value: f64, voice: VoiceIndex) {
        for node in &mut self.state.write().nodes {
            node.set_parameter(index, value, voice);
        }
    }

    fn bind_external_data(&mut self, data: &ExternalData, index: usize) -> Result<()> {
        for node in &mut self.state.write().nodes {
            node.bind_external_data(data, index)?;
        }
        Ok(())
    }

    fn fixed_channels(&self) -> Option<usize> {
        self.state.read().nodes.first()?.fixed_channels()
    }

    fn is_polyphonic(&self) -> bool {
        self.state.read().nodes.iter().any(Node::is_polyphonic)
    }

    fn has_modulation(&self) -> bool {
        self.state.read().nodes.first().is_some_and(Node::has_modulation)
    }

    fn is_modulation_source(&self) -> bool {
        self.state.read().nodes.first().is_some_and(Node::is_modulation_source)
    }

    fn is_frame_capable(&self) -> bool {
        self.state.read().nodes.iter().all(Node::is_frame_capable)
    }

    fn data_slots(&self) -> DataSlots {
        self.state.read().nodes.first().map_or(T::DATA_SLOTS, Node::data_slots)
    }
}

/// Resizes a [`Duplicate`] from outside the render thread.
#[derive(Debug)]
pub struct DuplicateController<T> {
    state: Arc<RwLock<Clones<T>>>,
}

impl<T> Clone for DuplicateController<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: Node + Clone> DuplicateController<T> {
    /// Grows or shrinks the clone array to `count`.
    ///
    /// New clones copy the current state of clone 0 and, if the array was
    /// prepared, are prepared and reset with the same specs. Trailing clones
    /// are dropped on shrink. Existing clones are not touched. A clone that
    /// fails to prepare leaves the array as it was. Blocks until
    /// the render thread releases the lock; the render thread skips calls
    /// while this runs.
    pub fn set_clone_count(&self, count: usize) -> Result<()> {
        let mut state = self.state.write();
        if count == 0 || count > state.max {
            return error::raise(clone_mismatch(state.max, count));
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(from = state.nodes.len(), to = count, "duplicate_resize: {}", T::ID);

        let Some(seed) = state.nodes.first().cloned() else {
            return error::raise(clone_mismatch(state.max, 0));
        };

        let missing = count.saturating_sub(state.nodes.len());
        let mut added = Vec::with_capacity(missing);
        for _ in 0..missing {
            let mut clone = seed.clone();
            if let Some(specs) = state.specs {
                clone.prepare(&specs)?;
                clone.reset(VoiceIndex::NONE);
            }
            added.push(clone);
        }
        state.nodes.truncate(count);
        state.nodes.extend(added);
        Ok(())
    }

    /// Current clone count.
    pub fn clone_count(&self) -> usize {
        self.state.read().nodes.len()
    }

    /// Upper bound on the clone count.
    pub fn max_clones(&self) -> usize {
        self.state.read().max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ProcessData;
    use crate::node::test_nodes::{Probe, Scale};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn serial_clones_compound() {
        let mut node = Duplicate::<_, Serial>::new(Scale(2.0), 3).unwrap();
        node.prepare(&PrepareSpecs::new(44100.0, 2, 1)).unwrap();
        let mut ch = [1.0_f32, -1.0];
        node.process(&mut ProcessData::new([&mut ch[..]]));
        assert_eq!(ch, [8.0, -8.0]);
    }

    #[test]
    fn parallel_clones_sum() {
        let mut node = Duplicate::<_, Parallel>::new(Scale(1.0), 2).unwrap();
        node.with_clones_mut(|clones| clones[1] = Scale(3.0));
        node.prepare(&PrepareSpecs::new(44100.0, 2, 1)).unwrap();

        let mut ch = [1.0_f32, 2.0];
        node.process(&mut ProcessData::new([&mut ch[..]]));
        assert_eq!(ch, [4.0, 8.0]);

        let mut frame = [0.5_f32];
        node.process_frame(&mut frame, VoiceIndex::NONE);
        assert_eq!(frame, [2.0]);
    }

    #[test]
    fn pass_through_copy_runs_only_the_first() {
        let mut node = Duplicate::<_, PassThroughCopy>::new(Probe::default(), 3).unwrap();
        node.prepare(&PrepareSpecs::new(44100.0, 8, 1)).unwrap();
        let mut ch = [0.0_f32; 8];
        node.process(&mut ProcessData::new([&mut ch[..]]));
        node.with_clones(|clones| {
            assert_eq!(clones[0].blocks, vec![8]);
            assert!(clones[1].blocks.is_empty());
            assert!(clones[2].specs.is_some());
        });
    }

    #[test]
    fn growing_keeps_existing_clones_and_seeds_from_the_first() {
        let mut node = Duplicate::<_, Serial>::new(Scale(1.0), 2).unwrap();
        node.with_clones_mut(|clones| {
            clones[0] = Scale(0.25);
            clones[1] = Scale(4.0);
        });
        let controller = node.controller();

        controller.set_clone_count(3).unwrap();
        node.with_clones(|clones| assert_eq!(clones, [Scale(0.25), Scale(4.0), Scale(0.25)]));

        controller.set_clone_count(1).unwrap();
        node.with_clones(|clones| assert_eq!(clones, [Scale(0.25)]));
    }

    #[test]
    fn new_clones_are_prepared() {
        let mut node = Duplicate::<_, Serial>::new(Probe::default(), 1).unwrap();
        node.prepare(&PrepareSpecs::new(96000.0, 32, 2)).unwrap();
        node.controller().set_clone_count(2).unwrap();
        node.with_clones(|clones| {
            assert_eq!(clones[1].specs.map(|s| s.sample_rate), Some(96000.0));
            assert_eq!(clones[1].resets, 1);
        });
    }

    /// Prepares successfully until a shared budget runs out.
    #[derive(Debug, Clone)]
    struct LimitedPrepares(Arc<AtomicUsize>);

    impl Node for LimitedPrepares {
        const ID: &'static str = "limited_prepares";

        fn prepare(&mut self, _specs: &PrepareSpecs) -> Result<()> {
            match self.0.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1)) {
                Ok(_) => Ok(()),
                Err(_) => Err(NodeError::new(ErrorCode::InitialisationError, 0, 0)),
            }
        }

        fn reset(&mut self, _voice: VoiceIndex) {}

        fn process<P: ProcessView>(&mut self, _data: &mut P) {}

        fn process_frame(&mut self, _frame: &mut [f32], _voice: VoiceIndex) {}
    }

    #[test]
    fn failed_grow_keeps_the_old_count() {
        let budget = Arc::new(AtomicUsize::new(2));
        let mut node = Duplicate::<_, Serial>::new(LimitedPrepares(Arc::clone(&budget)), 1).unwrap();
        node.prepare(&PrepareSpecs::new(44100.0, 4, 1)).unwrap();

        // One prepare left: the second of the three new clones fails.
        let controller = node.controller();
        assert!(controller.set_clone_count(4).is_err());
        assert_eq!(controller.clone_count(), 1);

        budget.store(3, Ordering::SeqCst);
        controller.set_clone_count(4).unwrap();
        assert_eq!(controller.clone_count(), 4);
    }

    #[test]
    fn counts_outside_the_range_fail() {
        let node = Duplicate::<_, Serial>::with_max_clones(Scale(1.0), 2, 4).unwrap();
        let controller = node.controller();
        let err = error::poll(controller.set_clone_count(5)).unwrap_err();
        assert_eq!(err.code, ErrorCode::CloneMismatch);
        assert_eq!((err.expected, err.actual), (4, 5));
        assert!(error::poll(controller.set_clone_count(0)).is_err());
        assert_eq!(controller.clone_count(), 2);
        assert!(error::poll(Duplicate::<_, Serial>::new(Scale(1.0), 0).map(|_| ())).is_err());
    }

    #[test]
    fn render_path_skips_while_resizing() {
        let mut node = Duplicate::<_, Serial>::new(Probe::default(), 1).unwrap();
        node.prepare(&PrepareSpecs::new(44100.0, 4, 1)).unwrap();

        let state = Arc::clone(&node.state);
        let mut ch = [0.0_f32; 4];

        let guard = state.write();
        node.process(&mut ProcessData::new([&mut ch[..]]));
        node.reset(VoiceIndex::NONE);
        drop(guard);
        node.with_clones(|clones| {
            assert!(clones[0].blocks.is_empty());
            assert_eq!(clones[0].resets, 0);
        });

        node.process(&mut ProcessData::new([&mut ch[..]]));
        node.with_clones(|clones| assert_eq!(clones[0].blocks, vec![4]));
    }
}
