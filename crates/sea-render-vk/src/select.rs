// SPDX-License-Identifier: CEPL-1.0
//! Candidate selection for physical devices, queue families and memory types.

use ash::vk;

/// Picks one candidate index out of an enumeration.
pub trait Select {
  fn select<T, F>(&self, candidates: &[T], predicate: F) -> Option<usize>
  where
    F: FnMut(usize, &T) -> bool;
}

/// Linear scan in enumeration order; the first candidate that passes wins.
/// No scoring: a discrete GPU listed second loses to whatever is listed first.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstMatch;

impl Select for FirstMatch {
  fn select<T, F>(&self, candidates: &[T], mut predicate: F) -> Option<usize>
  where
    F: FnMut(usize, &T) -> bool,
  {
    candidates.iter().enumerate().position(|(i, c)| predicate(i, c))
  }
}

pub fn select_queue_family<S: Select>(policy: &S, families: &[vk::QueueFamilyProperties]) -> Option<u32> {
  policy
    .select(families, |_, q| q.queue_flags.contains(vk::QueueFlags::GRAPHICS))
    .map(|i| i as u32)
}

/// Index of a memory type allowed by `type_bits` whose flags contain `required`.
pub fn find_memory_type<S: Select>(
  policy: &S,
  props: &vk::PhysicalDeviceMemoryProperties,
  type_bits: u32,
  required: vk::MemoryPropertyFlags,
) -> Option<u32> {
  let count = (props.memory_type_count as usize).min(vk::MAX_MEMORY_TYPES);
  policy
    .select(&props.memory_types[..count], |i, t| {
      (type_bits & (1 << i)) != 0 && t.property_flags.contains(required)
    })
    .map(|i| i as u32)
}
