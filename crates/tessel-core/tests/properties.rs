//! Property-based tests for tessel-core composition.
//!
//! Checks that composition and type erasure preserve the output of the
//! nodes they hold, using proptest for randomized signals and settings.

use proptest::prelude::*;
use tessel_core::container::{Chain, Split};
use tessel_core::nodes::{Gain, Passthrough};
use tessel_core::prelude::*;
use tessel_core::wrap::{Duplicate, Fix};

const SAMPLE_RATE: f64 = 48000.0;

fn prepared<T: Node>(mut node: T, block: usize, channels: usize) -> T {
    node.prepare(&PrepareSpecs::new(SAMPLE_RATE, block, channels)).unwrap();
    node
}

fn run_mono<T: Node>(node: &mut T, signal: &[f32]) -> Vec<f32> {
    let mut out = signal.to_vec();
    node.process(&mut ProcessData::new([&mut out[..]]));
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A node behind an opaque handle produces bit-identical output to the
    /// same node called directly.
    #[test]
    fn opaque_handle_matches_direct_call(
        db in -60.0f64..0.0,
        input in prop::collection::vec(-1.0f32..=1.0f32, 1..128),
    ) {
        let block = input.len();
        let mut direct = prepared(Gain::new(db), block, 1);
        let mut erased = prepared(OpaqueNode::new(Gain::new(db)), block, 1);

        prop_assert_eq!(run_mono(&mut direct, &input), run_mono(&mut erased, &input));
    }

    /// A chain of two nodes equals applying them one after another.
    #[test]
    fn chain_is_composition(
        a in -40.0f64..0.0,
        b in -40.0f64..0.0,
        input in prop::collection::vec(-1.0f32..=1.0f32, 1..128),
    ) {
        let block = input.len();
        let mut chain = prepared(Chain::new((Gain::new(a), Gain::new(b))), block, 1);
        let mut first = prepared(Gain::new(a), block, 1);
        let mut second = prepared(Gain::new(b), block, 1);

        let composed = run_mono(&mut second, &run_mono(&mut first, &input));
        prop_assert_eq!(run_mono(&mut chain, &input), composed);
    }

    /// A split of two linear nodes yields `A(x) + B(x) - x`.
    #[test]
    fn split_accumulates_deltas(
        a in -40.0f64..0.0,
        b in -40.0f64..0.0,
        input in prop::collection::vec(-1.0f32..=1.0f32, 1..128),
    ) {
        let block = input.len();
        let mut split = prepared(Split::new((Gain::new(a), Gain::new(b))), block, 1);
        let mut first = prepared(Gain::new(a), block, 1);
        let mut second = prepared(Gain::new(b), block, 1);

        let out = run_mono(&mut split, &input);
        let fa = run_mono(&mut first, &input);
        let fb = run_mono(&mut second, &input);
        for i in 0..input.len() {
            let expected = fa[i] + fb[i] - input[i];
            prop_assert!(
                (out[i] - expected).abs() < 1e-5,
                "sample {} was {}, expected {}", i, out[i], expected
            );
        }
    }

    /// Fixing the channel count of a pass-through leaves every channel as is.
    #[test]
    fn fix_around_passthrough_is_identity(
        left in prop::collection::vec(-1.0f32..=1.0f32, 16),
        right in prop::collection::vec(-1.0f32..=1.0f32, 16),
    ) {
        let mut node = prepared(Fix::<1, _>::new(Passthrough), 16, 2);
        let mut l = left.clone();
        let mut r = right.clone();
        node.process(&mut ProcessData::new([&mut l[..], &mut r[..]]));

        prop_assert_eq!(l, left);
        prop_assert_eq!(r, right);
    }

    /// Growing or shrinking a duplicate keeps the surviving clones' state.
    #[test]
    fn duplicate_resize_preserves_clones(
        initial in 1usize..8,
        target in 1usize..8,
        dbs in prop::collection::vec(-60.0f64..0.0, 8),
    ) {
        let mut node: Duplicate<Gain> = Duplicate::new(Gain::new(0.0), initial).unwrap();
        node.prepare(&PrepareSpecs::new(SAMPLE_RATE, 16, 1)).unwrap();
        node.with_clones_mut(|clones| {
            for (clone, db) in clones.iter_mut().zip(&dbs) {
                clone.set_gain_db(*db, VoiceIndex::NONE);
            }
        });
        let before: Vec<f32> = node.with_clones(|clones| {
            clones.iter().map(|c| c.linear_gain(VoiceIndex::NONE)).collect()
        });

        node.controller().set_clone_count(target).unwrap();
        let after: Vec<f32> = node.with_clones(|clones| {
            clones.iter().map(|c| c.linear_gain(VoiceIndex::NONE)).collect()
        });

        prop_assert_eq!(after.len(), target);
        let kept = initial.min(target);
        prop_assert_eq!(&after[..kept], &before[..kept]);
        for gain in &after[kept..] {
            prop_assert_eq!(*gain, before[0], "new clones start from the first");
        }
    }

    /// Voice-indexed access touches one slot inside a voice and every slot
    /// outside one.
    #[test]
    fn poly_data_iterates_one_or_all(voice in 0u16..8, value in -1.0f32..1.0) {
        let mut data: PolyData<f32, 8> = PolyData::new(0.0);
        data.prepare(&PrepareSpecs::default().with_voice_context(tessel_core::VoiceContext::new(8)))
            .unwrap();

        for slot in data.iter_active_mut(VoiceIndex::new(voice)) {
            *slot = value;
        }
        prop_assert_eq!(data.iter_active(VoiceIndex::new(voice)).count(), 1);
        for (i, slot) in data.as_slice().iter().enumerate() {
            let expected = if i == usize::from(voice) { value } else { 0.0 };
            prop_assert_eq!(*slot, expected);
        }

        prop_assert_eq!(data.iter_active(VoiceIndex::NONE).count(), 8);
    }
}
