//! Resolves exclusivity-group displacement for mappings about to go Down.

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::mapping::Mapping;

/// A `group_id → [mapping_index]` table, built once at translator construction
/// (the table layout never changes afterwards — only mapping phases do).
#[derive(Debug)]
pub(crate) struct OvertakingPolicy {
    groups: AHashMap<i32, SmallVec<[usize; 4]>>,
}

impl OvertakingPolicy {
    pub(crate) fn build(mappings: &[Mapping]) -> Self {
        let mut groups: AHashMap<i32, SmallVec<[usize; 4]>> = AHashMap::new();
        for (index, mapping) in mappings.iter().enumerate() {
            if let Some(group) = mapping.config().exclusivity_group() {
                groups.entry(group.id).or_default().push(index);
            }
        }
        Self { groups }
    }

    /// Mappings in `candidate_index`'s overtake-semantics group that are
    /// currently Down or Repeat, in mapping-table order. Empty if the
    /// candidate has no group, or its group uses no-overtake semantics.
    pub(crate) fn displaced(&self, mappings: &[Mapping], candidate_index: usize) -> SmallVec<[usize; 4]> {
        let Some(group) = mappings[candidate_index].config().exclusivity_group() else {
            return SmallVec::new();
        };
        if !group.overtake {
            return SmallVec::new();
        }
        let Some(members) = self.groups.get(&group.id) else {
            return SmallVec::new();
        };
        members
            .iter()
            .copied()
            .filter(|&index| index != candidate_index)
            .filter(|&index| mappings[index].state().is_down() || mappings[index].state().is_repeating())
            .collect()
    }

    /// True if `candidate_index`'s Initial→Down transition is blocked by an
    /// incumbent elsewhere in a no-overtake group.
    pub(crate) fn is_blocked(&self, mappings: &[Mapping], candidate_index: usize) -> bool {
        let Some(group) = mappings[candidate_index].config().exclusivity_group() else {
            return false;
        };
        if group.overtake {
            return false;
        }
        let Some(members) = self.groups.get(&group.id) else {
            return false;
        };
        members.iter().copied().filter(|&index| index != candidate_index).any(|index| {
            mappings[index].state().is_down() || mappings[index].state().is_repeating()
        })
    }
}
