// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! The schema element capability set: scalar slots, components, and repeating
//! groups.
//!
//! Every message is a fixed ordered list of schema elements. Parsing offers
//! each inbound field to the elements in schema order and takes the first
//! non-[`Accept::TagMismatch`] outcome; serialization enumerates the elements
//! in the same order.

use crate::{
    codec::{FixValue, parse, serialize},
    consts::SOH,
    errors::FixError,
};

/// Outcome of offering a tag-value pair to a schema element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accept {
    /// The element consumed the field.
    Accepted,
    /// The tag does not belong to this element.
    TagMismatch,
    /// The tag belongs to this element but a value is already present.
    ///
    /// Inside a repeating group this closes the current element and opens a
    /// new one; elsewhere it is logged and ignored.
    AlreadySet,
}

/// A node in a message schema: a scalar field slot, a component, or a
/// repeating group.
pub trait SchemaElement {
    /// Offers a tag-value pair to the element.
    ///
    /// # Errors
    ///
    /// Returns [`FixError::MalformedMessage`] if the tag matches but the value
    /// cannot be decoded.
    fn accept(&mut self, tag: u32, value: &[u8]) -> Result<Accept, FixError>;

    /// Enumerates the element as serialized fields into `buf`.
    ///
    /// Unset slots and empty groups emit nothing.
    fn encode(&self, buf: &mut Vec<u8>);
}

/// A scalar field slot: one tag, at most one typed value.
#[derive(Debug)]
pub struct FieldSlot<T> {
    tag: u32,
    value: Option<T>,
}

impl<T: FixValue> FieldSlot<T> {
    /// Creates an empty slot bound to `tag`.
    #[must_use]
    pub const fn new(tag: u32) -> Self {
        Self { tag, value: None }
    }

    /// Returns the bound tag.
    #[must_use]
    pub const fn tag(&self) -> u32 {
        self.tag
    }

    /// Returns the value, if set.
    #[must_use]
    pub const fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Sets the value, replacing any previous one.
    pub fn set(&mut self, value: T) {
        self.value = Some(value);
    }

    /// Clears the slot.
    pub fn clear(&mut self) {
        self.value = None;
    }

    /// Returns `true` if a value is present.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// Returns the value or a missing-mandatory-field error.
    ///
    /// # Errors
    ///
    /// Returns [`FixError::MalformedMessage`] naming the field when unset.
    pub fn required(&self, name: &str) -> Result<&T, FixError> {
        self.value
            .as_ref()
            .ok_or_else(|| FixError::malformed(format!("missing mandatory field {name}({})", self.tag)))
    }
}

impl<T: FixValue> SchemaElement for FieldSlot<T> {
    fn accept(&mut self, tag: u32, value: &[u8]) -> Result<Accept, FixError> {
        if tag != self.tag {
            return Ok(Accept::TagMismatch);
        }
        if self.value.is_some() {
            return Ok(Accept::AlreadySet);
        }
        self.value = Some(T::decode(value)?);
        Ok(Accept::Accepted)
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        if let Some(value) = &self.value {
            serialize::put_tag(buf, self.tag);
            value.encode(buf);
            buf.push(SOH);
        }
    }
}

/// A repeating group: a NumInGroup count tag followed by contiguous elements,
/// each beginning with the delimiter tag.
#[derive(Debug)]
pub struct Group<E> {
    count_tag: u32,
    delimiter_tag: u32,
    declared: Option<usize>,
    entries: Vec<E>,
}

impl<E: SchemaElement + Default> Group<E> {
    /// Creates an empty group bound to its count and delimiter tags.
    #[must_use]
    pub const fn new(count_tag: u32, delimiter_tag: u32) -> Self {
        Self {
            count_tag,
            delimiter_tag,
            declared: None,
            entries: Vec::new(),
        }
    }

    /// Returns the parsed or built entries.
    #[must_use]
    pub fn entries(&self) -> &[E] {
        &self.entries
    }

    /// Appends an entry (builder path).
    pub fn push(&mut self, entry: E) {
        self.entries.push(entry);
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the group has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn open_entry(&mut self, tag: u32, value: &[u8]) -> Result<Accept, FixError> {
        let mut entry = E::default();
        match entry.accept(tag, value)? {
            Accept::Accepted => {
                self.entries.push(entry);
                Ok(Accept::Accepted)
            }
            _ => Err(FixError::malformed(format!(
                "tag {tag} cannot open a new group element"
            ))),
        }
    }
}

impl<E: SchemaElement + Default> SchemaElement for Group<E> {
    fn accept(&mut self, tag: u32, value: &[u8]) -> Result<Accept, FixError> {
        if tag == self.count_tag {
            if self.declared.is_some() {
                return Ok(Accept::AlreadySet);
            }
            let count = parse::parse_uint(value)? as usize;
            self.declared = Some(count);
            return Ok(Accept::Accepted);
        }

        // Group fields cannot appear before the count opens the group
        if self.declared.is_none() {
            return Ok(Accept::TagMismatch);
        }

        if let Some(last) = self.entries.last_mut() {
            match last.accept(tag, value)? {
                Accept::Accepted => Ok(Accept::Accepted),
                // A repeated scalar closes the current element; retry the
                // same field against a fresh one
                Accept::AlreadySet => self.open_entry(tag, value),
                Accept::TagMismatch => Ok(Accept::TagMismatch),
            }
        } else if tag == self.delimiter_tag {
            self.open_entry(tag, value)
        } else {
            Ok(Accept::TagMismatch)
        }
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        if self.entries.is_empty() {
            return;
        }
        serialize::put_tag(buf, self.count_tag);
        serialize::put_uint(buf, self.entries.len() as u64);
        buf.push(SOH);
        for entry in &self.entries {
            entry.encode(buf);
        }
    }
}

/// Implements [`SchemaElement`] for a struct by forwarding to its fields in
/// declaration (schema) order.
macro_rules! impl_schema_elements {
    ($ty:ty => $($field:ident),+ $(,)?) => {
        impl $crate::messages::schema::SchemaElement for $ty {
            fn accept(
                &mut self,
                tag: u32,
                value: &[u8],
            ) -> Result<$crate::messages::schema::Accept, $crate::errors::FixError> {
                $(
                    match self.$field.accept(tag, value)? {
                        $crate::messages::schema::Accept::TagMismatch => {}
                        outcome => return Ok(outcome),
                    }
                )+
                Ok($crate::messages::schema::Accept::TagMismatch)
            }

            fn encode(&self, buf: &mut Vec<u8>) {
                $( self.$field.encode(buf); )+
            }
        }
    };
}

pub(crate) use impl_schema_elements;

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::fields::tags;

    #[derive(Debug)]
    struct Party {
        party_id: FieldSlot<ustr::Ustr>,
        party_role: FieldSlot<i64>,
    }

    impl Default for Party {
        fn default() -> Self {
            Self {
                party_id: FieldSlot::new(tags::PARTY_ID),
                party_role: FieldSlot::new(tags::PARTY_ROLE),
            }
        }
    }

    impl_schema_elements!(Party => party_id, party_role);

    #[rstest]
    fn test_slot_accept_and_already_set() {
        let mut slot: FieldSlot<i64> = FieldSlot::new(38);
        assert_eq!(slot.accept(44, b"1").unwrap(), Accept::TagMismatch);
        assert_eq!(slot.accept(38, b"5").unwrap(), Accept::Accepted);
        assert_eq!(slot.accept(38, b"6").unwrap(), Accept::AlreadySet);
        assert_eq!(slot.get(), Some(&5));
    }

    #[rstest]
    fn test_slot_encode_skips_unset() {
        let mut buf = Vec::new();
        let slot: FieldSlot<i64> = FieldSlot::new(38);
        slot.encode(&mut buf);
        assert!(buf.is_empty());
    }

    #[rstest]
    fn test_group_parses_two_elements() {
        let mut group: Group<Party> = Group::new(tags::NO_PARTY_IDS, tags::PARTY_ID);

        assert_eq!(group.accept(tags::NO_PARTY_IDS, b"2").unwrap(), Accept::Accepted);
        assert_eq!(group.accept(tags::PARTY_ID, b"FIRM1").unwrap(), Accept::Accepted);
        assert_eq!(group.accept(tags::PARTY_ROLE, b"1").unwrap(), Accept::Accepted);
        // Delimiter repeats: closes the first element, opens the second
        assert_eq!(group.accept(tags::PARTY_ID, b"FIRM2").unwrap(), Accept::Accepted);
        assert_eq!(group.accept(tags::PARTY_ROLE, b"3").unwrap(), Accept::Accepted);

        assert_eq!(group.len(), 2);
        assert_eq!(group.entries()[0].party_id.get().unwrap().as_str(), "FIRM1");
        assert_eq!(group.entries()[1].party_role.get(), Some(&3));
    }

    #[rstest]
    fn test_group_rejects_fields_before_count() {
        let mut group: Group<Party> = Group::new(tags::NO_PARTY_IDS, tags::PARTY_ID);
        assert_eq!(
            group.accept(tags::PARTY_ID, b"FIRM1").unwrap(),
            Accept::TagMismatch
        );
    }

    #[rstest]
    fn test_group_encode_writes_actual_count() {
        let mut group: Group<Party> = Group::new(tags::NO_PARTY_IDS, tags::PARTY_ID);
        let mut entry = Party::default();
        entry.party_id.set(ustr::Ustr::from("FIRM1"));
        entry.party_role.set(1);
        group.push(entry);

        let mut buf = Vec::new();
        group.encode(&mut buf);
        assert_eq!(buf, b"453=1\x01448=FIRM1\x01452=1\x01");
    }
}
