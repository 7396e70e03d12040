//! Child collections of containers.
//!
//! A container owns its children as a [`NodeList`]: a tuple of distinct node
//! types for statically composed graphs, an array of one type, or a
//! `Vec<OpaqueNode>` for graphs assembled at run time. Every contract member
//! has an indexed form; for tuples the index match is resolved per call site
//! and the container's loop over `0..len()` unrolls.

use crate::data::{DataSlots, Event, ExternalData, ProcessView};
use crate::error::Result;
use crate::handle::OpaqueNode;
use crate::parameter::ParameterList;
use crate::poly::VoiceIndex;
use crate::specs::PrepareSpecs;

use super::Node;

/// An ordered collection of child nodes addressed by index.
///
/// Out-of-range indices are ignored by the call forms and report
/// "nothing" from the query forms; graph validation catches them before the
/// render loop.
pub trait NodeList {
    /// Number of children.
    fn len(&self) -> usize;

    /// True if there are no children.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Prepares child `index`.
    fn prepare_at(&mut self, index: usize, specs: &PrepareSpecs) -> Result<()>;

    /// Resets child `index`.
    fn reset_at(&mut self, index: usize, voice: VoiceIndex);

    /// Runs child `index` over a block.
    fn process_at<P: ProcessView>(&mut self, index: usize, data: &mut P);

    /// Runs child `index` over a frame.
    fn process_frame_at(&mut self, index: usize, frame: &mut [f32], voice: VoiceIndex);

    /// Delivers an event to child `index`.
    fn handle_event_at(&mut self, index: usize, event: &mut Event, voice: VoiceIndex);

    /// Queries child `index` for a modulation value.
    fn handle_modulation_at(&mut self, index: usize, voice: VoiceIndex) -> Option<f64>;

    /// Sets a parameter of child `index`.
    fn set_parameter_at(&mut self, index: usize, parameter: usize, value: f64, voice: VoiceIndex);

    /// Appends child `index`'s parameters to `list`.
    fn describe_parameters_at(&self, index: usize, list: &mut ParameterList);

    /// Binds external data to child `index`.
    fn bind_external_data_at(&mut self, index: usize, data: &ExternalData, slot: usize) -> Result<()>;

    /// Channel count child `index` insists on.
    fn fixed_channels_at(&self, index: usize) -> Option<usize>;

    /// Identifier of child `index`.
    fn id_at(&self, index: usize) -> Option<&'static str>;

    /// External data slots child `index` needs.
    fn data_slots_at(&self, index: usize) -> DataSlots;

    /// Whether child `index` keeps per-voice state.
    fn is_polyphonic_at(&self, index: usize) -> bool;

    /// Whether child `index` is a routed modulation source.
    fn is_modulation_source_at(&self, index: usize) -> bool;

    /// Whether child `index` supports frame processing.
    fn frame_capable_at(&self, index: usize) -> bool;

    /// Whether any child keeps per-voice state.
    fn any_polyphonic(&self) -> bool {
        (0..self.len()).any(|i| self.is_polyphonic_at(i))
    }

    /// Whether every child supports frame processing.
    fn all_frame_capable(&self) -> bool {
        (0..self.len()).all(|i| self.frame_capable_at(i))
    }
}

macro_rules! impl_node_list_for_tuple {
    ($len:expr; $($idx:tt => $name:ident),+) => {
        impl<$($name: Node),+> NodeList for ($($name,)+) {
            #[inline]
            fn len(&self) -> usize {
                $len
            }

            fn prepare_at(&mut self, index: usize, specs: &PrepareSpecs) -> Result<()> {
                match index {
                    $($idx => self.$idx.prepare(specs),)+
                    _ => Ok(()),
                }
            }

            fn reset_at(&mut self, index: usize, voice: VoiceIndex) {
                match index {
                    $($idx => self.$idx.reset(voice),)+
                    _ => {}
                }
            }

            #[inline]
            fn process_at<PV: ProcessView>(&mut self, index: usize, data: &mut PV) {
                match index {
                    $($idx => self.$idx.process(data),)+
                    _ => {}
                }
            }

            #[inline]
            fn process_frame_at(&mut self, index: usize, frame: &mut [f32], voice: VoiceIndex) {
                match index {
                    $($idx => self.$idx.process_frame(frame, voice),)+
                    _ => {}
                }
            }

            fn handle_event_at(&mut self, index: usize, event: &mut Event, voice: VoiceIndex) {
                match index {
                    $($idx => self.$idx.handle_event(event, voice),)+
                    _ => {}
                }
            }

            #[inline]
            fn handle_modulation_at(&mut self, index: usize, voice: VoiceIndex) -> Option<f64> {
                match index {
                    $($idx => self.$idx.handle_modulation(voice),)+
                    _ => None,
                }
            }

            #[inline]
            fn set_parameter_at(&mut self, index: usize, parameter: usize, value: f64, voice: VoiceIndex) {
                match index {
                    $($idx => self.$idx.set_parameter(parameter, value, voice),)+
                    _ => {}
                }
            }

            fn describe_parameters_at(&self, index: usize, list: &mut ParameterList) {
                match index {
                    $($idx => self.$idx.describe_parameters(list),)+
                    _ => {}
                }
            }

            fn bind_external_data_at(&mut self, index: usize, data: &ExternalData, slot: usize) -> Result<()> {
                match index {
                    $($idx => self.$idx.bind_external_data(data, slot),)+
                    _ => Ok(()),
                }
            }

            fn fixed_channels_at(&self, index: usize) -> Option<usize> {
                match index {
                    $($idx => self.$idx.fixed_channels(),)+
                    _ => None,
                }
            }

            fn id_at(&self, index: usize) -> Option<&'static str> {
                match index {
                    $($idx => Some(self.$idx.id()),)+
                    _ => None,
                }
            }

            fn data_slots_at(&self, index: usize) -> DataSlots {
                match index {
                    $($idx => self.$idx.data_slots(),)+
                    _ => DataSlots::NONE,
                }
            }

            fn is_polyphonic_at(&self, index: usize) -> bool {
                match index {
                    $($idx => self.$idx.is_polyphonic(),)+
                    _ => false,
                }
            }

            #[inline]
            fn is_modulation_source_at(&self, index: usize) -> bool {
                match index {
                    $($idx => self.$idx.is_modulation_source(),)+
                    _ => false,
                }
            }

            fn frame_capable_at(&self, index: usize) -> bool {
                match index {
                    $($idx => self.$idx.is_frame_capable(),)+
                    _ => false,
                }
            }
        }
    };
}

impl_node_list_for_tuple!(1; 0 => A);
impl_node_list_for_tuple!(2; 0 => A, 1 => B);
impl_node_list_for_tuple!(3; 0 => A, 1 => B, 2 => C);
impl_node_list_for_tuple!(4; 0 => A, 1 => B, 2 => C, 3 => D);
impl_node_list_for_tuple!(5; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E);
impl_node_list_for_tuple!(6; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F);
impl_node_list_for_tuple!(7; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G);
impl_node_list_for_tuple!(8; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G, 7 => H);

/// Forwards the indexed members to a slice of one node type.
macro_rules! impl_node_list_for_slice_like {
    () => {
        fn prepare_at(&mut self, index: usize, specs: &PrepareSpecs) -> Result<()> {
            self.get_mut(index).map_or(Ok(()), |n| n.prepare(specs))
        }

        fn reset_at(&mut self, index: usize, voice: VoiceIndex) {
            if let Some(n) = self.get_mut(index) {
                n.reset(voice);
            }
        }

        #[inline]
        fn process_at<PV: ProcessView>(&mut self, index: usize, data: &mut PV) {
            if let Some(n) = self.get_mut(index) {
                n.process(data);
            }
        }

        #[inline]
        fn process_frame_at(&mut self, index: usize, frame: &mut [f32], voice: VoiceIndex) {
            if let Some(n) = self.get_mut(index) {
                n.process_frame(frame, voice);
            }
        }

        fn handle_event_at(&mut self, index: usize, event: &mut Event, voice: VoiceIndex) {
            if let Some(n) = self.get_mut(index) {
                n.handle_event(event, voice);
            }
        }

        fn handle_modulation_at(&mut self, index: usize, voice: VoiceIndex) -> Option<f64> {
            self.get_mut(index).and_then(|n| n.handle_modulation(voice))
        }

        fn set_parameter_at(&mut self, index: usize, parameter: usize, value: f64, voice: VoiceIndex) {
            if let Some(n) = self.get_mut(index) {
                n.set_parameter(parameter, value, voice);
            }
        }

        fn describe_parameters_at(&self, index: usize, list: &mut ParameterList) {
            if let Some(n) = self.get(index) {
                n.describe_parameters(list);
            }
        }

        fn bind_external_data_at(&mut self, index: usize, data: &ExternalData, slot: usize) -> Result<()> {
            self.get_mut(index).map_or(Ok(()), |n| n.bind_external_data(data, slot))
        }

        fn fixed_channels_at(&self, index: usize) -> Option<usize> {
            self.get(index).and_then(|n| n.fixed_channels())
        }

        fn id_at(&self, index: usize) -> Option<&'static str> {
            self.get(index).map(|n| n.id())
        }

        fn data_slots_at(&self, index: usize) -> DataSlots {
            self.get(index).map_or(DataSlots::NONE, |n| n.data_slots())
        }

        fn is_polyphonic_at(&self, index: usize) -> bool {
            self.get(index).is_some_and(|n| n.is_polyphonic())
        }

        fn is_modulation_source_at(&self, index: usize) -> bool {
            self.get(index).is_some_and(|n| n.is_modulation_source())
        }

        fn frame_capable_at(&self, index: usize) -> bool {
            self.get(index).is_some_and(|n| n.is_frame_capable())
        }
    };
}

impl<T: Node, const N: usize> NodeList for [T; N] {
    impl_node_list_for_slice_like!();

    fn len(&self) -> usize {
        N
    }
}

impl NodeList for Vec<OpaqueNode> {
    impl_node_list_for_slice_like!();

    fn len(&self) -> usize {
        Vec::len(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ProcessData;
    use crate::node::test_nodes::{BlockOnly, Offset, Scale};

    #[test]
    fn tuple_dispatches_by_index() {
        let mut list = (Scale(2.0), Offset(1.0), BlockOnly::default());
        assert_eq!(list.len(), 3);
        assert_eq!(list.id_at(1), Some("offset"));
        assert_eq!(list.id_at(3), None);
        assert!(list.frame_capable_at(0));
        assert!(!list.frame_capable_at(2));
        assert!(!list.all_frame_capable());

        let mut frame = [1.0_f32];
        list.process_frame_at(0, &mut frame, VoiceIndex::NONE);
        list.process_frame_at(1, &mut frame, VoiceIndex::NONE);
        list.process_frame_at(9, &mut frame, VoiceIndex::NONE);
        assert_eq!(frame, [3.0]);

        list.set_parameter_at(0, 0, 4.0, VoiceIndex::NONE);
        assert_eq!(list.0, Scale(4.0));
    }

    #[test]
    fn array_dispatches_by_index() {
        let mut list = [Scale(2.0), Scale(3.0)];
        let mut ch = [1.0_f32; 2];
        list.process_at(1, &mut ProcessData::new([&mut ch[..]]));
        assert_eq!(ch, [3.0, 3.0]);
        assert_eq!(NodeList::len(&list), 2);
        assert!(list.all_frame_capable());
    }
}
