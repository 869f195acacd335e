//! Bitfield grouping.
//!
//! Adjacent bit-packable fields that share a storage kind are packed into a
//! single storage member. Grouping is greedy: a group keeps absorbing the
//! following fields until one of them is not packable, has a different
//! storage kind, or would overflow the storage capacity. That field then
//! opens the next group. Zero-width members take no bits but stay in the
//! group so the fields after them keep packing into the same word.

use crate::paramdef::types::{FieldDef, PrimitiveKind};

/// Placement of one field inside a bitfield group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitfieldMember {
    /// Index of the field in the paramdef.
    pub field_index: usize,
    /// First bit occupied by the field, counted from the least significant bit.
    pub bit_offset: u32,
    pub bit_width: u32,
}

impl BitfieldMember {
    /// Mask selecting the member's bits within the storage word.
    pub fn mask(&self) -> u32 {
        field_mask(self.bit_offset, self.bit_width)
    }

    /// Reads the member's value, shifted down to bit 0.
    pub fn get(&self, storage: u32) -> u32 {
        (storage & self.mask()) >> self.bit_offset
    }

    /// Writes `value` into the member's bits, leaving sibling bits untouched.
    pub fn set(&self, storage: u32, value: u32) -> u32 {
        let cleared = storage & !self.mask();
        if value == 0 {
            return cleared;
        }
        cleared | (value.checked_shl(self.bit_offset).unwrap_or(0) & self.mask())
    }
}

/// A closed group of adjacent bitfield members sharing one storage word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPlan {
    /// Storage kind of the shared member (`dummy8` is normalized to `u8`).
    pub storage: PrimitiveKind,
    /// Capacity of the storage kind in bits.
    pub capacity: u32,
    pub members: Vec<BitfieldMember>,
}

impl GroupPlan {
    pub fn used_bits(&self) -> u32 {
        self.members.iter().map(|m| m.bit_width).sum()
    }

    /// Index of the first field after the group.
    pub fn end(&self) -> usize {
        self.members.last().map(|m| m.field_index + 1).unwrap_or(0)
    }
}

/// Mask with `width` bits set starting at `bit_offset`.
pub fn field_mask(bit_offset: u32, width: u32) -> u32 {
    let bits = if width >= 32 { u32::MAX } else { (1u32 << width) - 1 };
    bits.checked_shl(bit_offset).unwrap_or(0)
}

/// Truncates a mask constant to the width of a `size`-byte storage word.
///
/// 1- and 2-byte storage is masked down; 4-byte storage is left as is.
pub fn truncate_const(value: u32, size: u64) -> u32 {
    match size {
        1 => value & 0xFF,
        2 => value & 0xFFFF,
        _ => value,
    }
}

/// Whether `field` can open a bitfield group.
pub fn opens_group(field: &FieldDef) -> bool {
    field.display_type.is_bit_type() && field.bit_size > 0
}

/* Whether `field` may extend a group of `storage` already holding `offset` bits; width 0 always fits */
fn extends_group(field: &FieldDef, storage: PrimitiveKind, offset: u32, capacity: u32) -> bool {
    field.display_type.is_bit_type()
        && field.bit_size >= 0
        && offset.saturating_add(field.bit_size as u32) <= capacity
        && field.display_type.storage_kind() == storage
}

/// Takes the bitfield group starting at `start`.
///
/// Returns the group and the index of the first field not in it, or `None`
/// when the field at `start` cannot open a group.
pub fn take_group(fields: &[FieldDef], start: usize) -> Option<(GroupPlan, usize)> {
    let first = fields.get(start)?;
    if !opens_group(first) {
        return None;
    }

    let storage = first.display_type.storage_kind();
    let capacity = storage.bit_limit()?;
    let mut width = first.bit_size as u32;
    if width > capacity {
        log::warn!(
            "field '{}' declares {} bits but {} storage holds {}; clamping",
            first.internal_name,
            width,
            storage,
            capacity
        );
        width = capacity;
    }

    let mut members = vec![BitfieldMember {
        field_index: start,
        bit_offset: 0,
        bit_width: width,
    }];
    let mut offset = width;
    let mut next = start + 1;

    while let Some(field) = fields.get(next) {
        if !extends_group(field, storage, offset, capacity) {
            break;
        }
        let bit_width = field.bit_size as u32;
        members.push(BitfieldMember {
            field_index: next,
            bit_offset: offset,
            bit_width,
        });
        offset += bit_width;
        next += 1;
    }

    log::debug!(
        "bitfield group at field {} spans {} field(s), {}/{} bits of {}",
        start,
        members.len(),
        offset,
        capacity,
        storage
    );

    Some((
        GroupPlan {
            storage,
            capacity,
            members,
        },
        next,
    ))
}

/// Iterator over every bitfield group of a field list, in field order.
pub struct BitfieldRuns<'a> {
    fields: &'a [FieldDef],
    pos: usize,
}

impl<'a> BitfieldRuns<'a> {
    pub fn new(fields: &'a [FieldDef]) -> Self {
        Self { fields, pos: 0 }
    }
}

impl Iterator for BitfieldRuns<'_> {
    type Item = GroupPlan;

    fn next(&mut self) -> Option<GroupPlan> {
        while self.pos < self.fields.len() {
            if let Some((group, next)) = take_group(self.fields, self.pos) {
                self.pos = next;
                return Some(group);
            }
            self.pos += 1;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bits(kind: PrimitiveKind, widths: &[i32]) -> Vec<FieldDef> {
        widths
            .iter()
            .enumerate()
            .map(|(i, w)| FieldDef::new(format!("f{}", i), kind).with_bits(*w))
            .collect()
    }

    #[test]
    fn one_three_four_fills_a_byte() {
        let fields = bits(PrimitiveKind::U8, &[1, 3, 4]);
        let (group, next) = take_group(&fields, 0).unwrap();
        assert_eq!(next, 3);
        assert_eq!(group.storage, PrimitiveKind::U8);
        let masks: Vec<u32> = group.members.iter().map(|m| m.mask()).collect();
        assert_eq!(masks, vec![0x01, 0x0E, 0xF0]);
        let offsets: Vec<u32> = group.members.iter().map(|m| m.bit_offset).collect();
        assert_eq!(offsets, vec![0, 1, 4]);
    }

    #[test]
    fn overflow_closes_the_group() {
        let fields = bits(PrimitiveKind::U8, &[4, 3, 2]);
        let groups: Vec<GroupPlan> = BitfieldRuns::new(&fields).collect();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].used_bits(), 7);
        assert_eq!(groups[1].members[0].field_index, 2);
        assert_eq!(groups[1].members[0].bit_offset, 0);
    }

    #[test]
    fn filler_bits_share_u8_storage() {
        let mut fields = bits(PrimitiveKind::U8, &[1, 1]);
        fields.push(FieldDef::new("pad", PrimitiveKind::Dummy8).with_bits(6));
        let (group, next) = take_group(&fields, 0).unwrap();
        assert_eq!(next, 3);
        assert_eq!(group.storage, PrimitiveKind::U8);
        assert_eq!(group.used_bits(), 8);
    }

    #[test]
    fn storage_kind_change_closes_the_group() {
        let mut fields = bits(PrimitiveKind::U8, &[1]);
        fields.extend(bits(PrimitiveKind::U16, &[1]));
        let groups: Vec<GroupPlan> = BitfieldRuns::new(&fields).collect();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].storage, PrimitiveKind::U16);
        assert_eq!(groups[1].capacity, 16);
    }

    #[test]
    fn non_bitfield_fields_break_runs() {
        let fields = vec![
            FieldDef::new("a", PrimitiveKind::U8).with_bits(1),
            FieldDef::new("plain", PrimitiveKind::U8),
            FieldDef::new("b", PrimitiveKind::U8).with_bits(1),
            FieldDef::new("c", PrimitiveKind::U8).with_bits(1),
        ];
        assert!(take_group(&fields, 1).is_none());
        let groups: Vec<GroupPlan> = BitfieldRuns::new(&fields).collect();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].end(), 4);
    }

    #[test]
    fn zero_width_member_stays_in_the_group() {
        let fields = bits(PrimitiveKind::U8, &[1, 0, 1]);
        let groups: Vec<GroupPlan> = BitfieldRuns::new(&fields).collect();
        assert_eq!(groups.len(), 1);

        let group = &groups[0];
        assert_eq!(group.end(), 3);
        assert_eq!(group.used_bits(), 2);
        let offsets: Vec<u32> = group.members.iter().map(|m| m.bit_offset).collect();
        assert_eq!(offsets, vec![0, 1, 1]);
        let masks: Vec<u32> = group.members.iter().map(|m| m.mask()).collect();
        assert_eq!(masks, vec![0x01, 0x00, 0x02]);
    }

    #[test]
    fn zero_width_fits_a_full_word() {
        let fields = bits(PrimitiveKind::U8, &[8, 0]);
        let (group, next) = take_group(&fields, 0).unwrap();
        assert_eq!(next, 2);
        let gap = group.members[1];
        assert_eq!(gap.bit_offset, 8);
        assert_eq!(gap.mask(), 0);
        assert_eq!(gap.set(0xFF, 0), 0xFF);
        assert_eq!(gap.set(0xFF, 1), 0xFF);
    }

    #[test]
    fn zero_width_cannot_open_a_group() {
        let fields = bits(PrimitiveKind::U8, &[0, 1]);
        assert!(take_group(&fields, 0).is_none());
        let groups: Vec<GroupPlan> = BitfieldRuns::new(&fields).collect();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members[0].field_index, 1);
    }

    #[test]
    fn sentinel_width_ends_the_run() {
        let mut fields = bits(PrimitiveKind::U8, &[1, 1]);
        fields.insert(1, FieldDef::new("plainByte", PrimitiveKind::U8));
        let groups: Vec<GroupPlan> = BitfieldRuns::new(&fields).collect();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].end(), 1);
    }

    #[test]
    fn oversized_opener_is_clamped() {
        let fields = bits(PrimitiveKind::U8, &[12]);
        let (group, _) = take_group(&fields, 0).unwrap();
        assert_eq!(group.members[0].bit_width, 8);
        assert_eq!(group.members[0].mask(), 0xFF);
    }

    #[test]
    fn full_width_u32_member() {
        let fields = bits(PrimitiveKind::U32, &[32]);
        let (group, _) = take_group(&fields, 0).unwrap();
        assert_eq!(group.members[0].mask(), u32::MAX);
    }

    #[test]
    fn complemented_masks_truncate_to_storage() {
        assert_eq!(truncate_const(!0x0E, 1), 0xF1);
        assert_eq!(truncate_const(!0x0FF0, 2), 0xF00F);
        assert_eq!(truncate_const(!0x0000_00F0, 4), 0xFFFF_FF0F);
    }

    #[test]
    fn setting_zero_clears_only_the_member() {
        let member = BitfieldMember {
            field_index: 1,
            bit_offset: 1,
            bit_width: 3,
        };
        let storage = member.set(0xFF, 0);
        assert_eq!(storage, 0xF1);
        assert_eq!(member.get(storage), 0);
    }

    proptest! {
        #[test]
        fn groups_tile_their_bits(widths in proptest::collection::vec(0i32..=8, 1..12)) {
            let fields = bits(PrimitiveKind::U8, &widths);
            /* Leading zero-width fields have no group to join */
            let orphans = widths.iter().take_while(|w| **w == 0).count();
            let mut covered = 0usize;
            for group in BitfieldRuns::new(&fields) {
                let mut expected_offset = 0;
                for member in &group.members {
                    prop_assert_eq!(member.bit_offset, expected_offset);
                    expected_offset += member.bit_width;
                }
                prop_assert!(expected_offset <= group.capacity);
                covered += group.members.len();
            }
            prop_assert_eq!(covered, fields.len() - orphans);
        }

        #[test]
        fn greedy_groups_are_maximal(widths in proptest::collection::vec(0i32..=8, 1..12)) {
            let fields = bits(PrimitiveKind::U8, &widths);
            let groups: Vec<GroupPlan> = BitfieldRuns::new(&fields).collect();
            for pair in groups.windows(2) {
                let next_width = pair[1].members[0].bit_width;
                prop_assert!(pair[0].used_bits() + next_width > pair[0].capacity);
            }
        }

        #[test]
        fn accessors_round_trip(
            widths in proptest::collection::vec(1i32..=5, 1..6),
            storage in any::<u8>(),
            pick in any::<prop::sample::Index>(),
            value in any::<u32>(),
        ) {
            let fields = bits(PrimitiveKind::U8, &widths);
            let (group, _) = take_group(&fields, 0).unwrap();
            let member = group.members[pick.index(group.members.len())];
            let value = value & field_mask(0, member.bit_width);
            let before = storage as u32;
            let after = member.set(before, value);
            prop_assert_eq!(member.get(after), value);
            prop_assert_eq!(after & !member.mask(), before & !member.mask());
        }
    }
}
