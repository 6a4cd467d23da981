// Copyright (c) 2019-2024 The FAT Developers

//! Non-fungible token id sets.
//!
//! FAT-1 inputs and outputs carry sets of token ids, compactly written as a
//! list whose elements are either a single id or an inclusive `{min, max}`
//! range. A [`NFTokenIds`] value is validated at construction: every range
//! is well formed and the elements are pairwise disjoint, so the algebra
//! over constructed sets is total.
//!
//! The JSON form is the mixed list itself, e.g. `[{"min":0,"max":3},150]`.

use core::fmt;
use displaydoc::Display;
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Reasons an id set is malformed.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum IdSetError {
    /// an id must be an integer
    NonInteger,
    /// ids and range bounds must be non-negative
    NegativeBound,
    /// range minimum exceeds its maximum
    EmptyRange,
    /// elements overlap
    Overlap,
    /// an id set must be an array
    NotAnArray,
}

/// One element of an id set: a singleton id or an inclusive range.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NFTokenIdElement {
    /// A single token id.
    Single(u64),
    /// Every id from `min` through `max`, inclusive.
    Range {
        /// Lowest id covered.
        min: u64,
        /// Highest id covered.
        max: u64,
    },
}

impl NFTokenIdElement {
    /// Lowest id covered by this element.
    pub fn min(&self) -> u64 {
        match self {
            Self::Single(id) => *id,
            Self::Range { min, .. } => *min,
        }
    }

    /// Highest id covered by this element.
    pub fn max(&self) -> u64 {
        match self {
            Self::Single(id) => *id,
            Self::Range { max, .. } => *max,
        }
    }

    /// Number of ids covered.
    fn count(&self) -> u128 {
        u128::from(self.max()) - u128::from(self.min()) + 1
    }
}

impl From<u64> for NFTokenIdElement {
    fn from(id: u64) -> Self {
        Self::Single(id)
    }
}

/// A validated set of non-fungible token ids.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct NFTokenIds(Vec<NFTokenIdElement>);

impl NFTokenIds {
    /// Build a set from elements, validating ranges and disjointness.
    pub fn new(elements: Vec<NFTokenIdElement>) -> Result<Self, IdSetError> {
        Self::validate(&elements)?;
        Ok(Self(elements))
    }

    /// Check the id set invariants: every range satisfies `min ≤ max` and
    /// no id is covered twice.
    ///
    /// Overlap is found by a linear sweep over elements sorted by lower
    /// bound (ties put the wider element first).
    pub fn validate(elements: &[NFTokenIdElement]) -> Result<(), IdSetError> {
        for element in elements {
            if let NFTokenIdElement::Range { min, max } = element {
                if min > max {
                    return Err(IdSetError::EmptyRange);
                }
            }
        }

        let mut sorted: Vec<&NFTokenIdElement> = elements.iter().collect();
        sorted.sort_by(|a, b| a.min().cmp(&b.min()).then(b.max().cmp(&a.max())));
        let mut covered_through: Option<u64> = None;
        for element in sorted {
            if let Some(end) = covered_through {
                if element.min() <= end {
                    return Err(IdSetError::Overlap);
                }
            }
            covered_through = Some(element.max());
        }
        Ok(())
    }

    /// The elements as given at construction.
    pub fn elements(&self) -> &[NFTokenIdElement] {
        &self.0
    }

    /// Whether the set covers no ids.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Cardinality, computed without materializing ranges.
    pub fn count(&self) -> u128 {
        self.0.iter().map(NFTokenIdElement::count).sum()
    }

    /// Every covered id in ascending order.
    ///
    /// Materializes the set; intended for small sets such as equality
    /// checks in tests.
    pub fn expand(&self) -> Vec<u64> {
        let mut sorted = self.0.clone();
        sorted.sort_by_key(NFTokenIdElement::min);
        let mut out = Vec::new();
        for element in sorted {
            out.extend(element.min()..=element.max());
        }
        out
    }

    /// The canonical minimal-range form: sorted, with adjacent and
    /// overlapping runs coalesced, singletons for width-one runs.
    pub fn reduce(&self) -> NFTokenIds {
        let mut sorted = self.0.clone();
        sorted.sort_by_key(NFTokenIdElement::min);

        let mut out: Vec<NFTokenIdElement> = Vec::with_capacity(sorted.len());
        let mut run: Option<(u64, u64)> = None;
        for element in sorted {
            run = Some(match run {
                None => (element.min(), element.max()),
                Some((lo, hi)) if element.min() <= hi.saturating_add(1) => {
                    (lo, hi.max(element.max()))
                }
                Some((lo, hi)) => {
                    out.push(Self::run_element(lo, hi));
                    (element.min(), element.max())
                }
            });
        }
        if let Some((lo, hi)) = run {
            out.push(Self::run_element(lo, hi));
        }
        NFTokenIds(out)
    }

    /// The disjoint union of several sets; `Overlap` if any id is covered
    /// by more than one of them.
    pub fn union_of<'a, I>(sets: I) -> Result<NFTokenIds, IdSetError>
    where
        I: IntoIterator<Item = &'a NFTokenIds>,
    {
        let elements: Vec<NFTokenIdElement> = sets
            .into_iter()
            .flat_map(|set| set.0.iter().copied())
            .collect();
        Self::new(elements)
    }

    fn run_element(lo: u64, hi: u64) -> NFTokenIdElement {
        if lo == hi {
            NFTokenIdElement::Single(lo)
        } else {
            NFTokenIdElement::Range { min: lo, max: hi }
        }
    }
}

impl TryFrom<Vec<NFTokenIdElement>> for NFTokenIds {
    type Error = IdSetError;

    fn try_from(elements: Vec<NFTokenIdElement>) -> Result<Self, IdSetError> {
        Self::new(elements)
    }
}

impl Serialize for NFTokenIdElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Single(id) => serializer.serialize_u64(*id),
            Self::Range { min, max } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("min", min)?;
                map.serialize_entry("max", max)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for NFTokenIdElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ElementVisitor;

        impl<'de> Visitor<'de> for ElementVisitor {
            type Value = NFTokenIdElement;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer id or a {min, max} range")
            }

            fn visit_u64<E: serde::de::Error>(self, id: u64) -> Result<Self::Value, E> {
                Ok(NFTokenIdElement::Single(id))
            }

            fn visit_i64<E: serde::de::Error>(self, id: i64) -> Result<Self::Value, E> {
                u64::try_from(id)
                    .map(NFTokenIdElement::Single)
                    .map_err(|_| E::custom(IdSetError::NegativeBound))
            }

            fn visit_f64<E: serde::de::Error>(self, _: f64) -> Result<Self::Value, E> {
                Err(E::custom(IdSetError::NonInteger))
            }

            fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
                let mut min: Option<u64> = None;
                let mut max: Option<u64> = None;
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "min" => min = Some(map.next_value()?),
                        "max" => max = Some(map.next_value()?),
                        other => {
                            return Err(serde::de::Error::unknown_field(other, &["min", "max"]))
                        }
                    }
                }
                let min = min.ok_or_else(|| serde::de::Error::missing_field("min"))?;
                let max = max.ok_or_else(|| serde::de::Error::missing_field("max"))?;
                Ok(NFTokenIdElement::Range { min, max })
            }
        }

        deserializer.deserialize_any(ElementVisitor)
    }
}

impl Serialize for NFTokenIds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NFTokenIds {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SetVisitor;

        impl<'de> Visitor<'de> for SetVisitor {
            type Value = NFTokenIds;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an array of token ids and {min, max} ranges")
            }

            fn visit_seq<S: SeqAccess<'de>>(self, mut seq: S) -> Result<Self::Value, S::Error> {
                let mut elements = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(element) = seq.next_element()? {
                    elements.push(element);
                }
                NFTokenIds::new(elements).map_err(serde::de::Error::custom)
            }
        }

        // Anything but a sequence is NotAnArray; let the visitor's
        // expecting message carry the reason.
        deserializer.deserialize_seq(SetVisitor)
    }
}

/// Metadata attached to a set of freshly minted ids.
///
/// Only coinbase FAT-1 transactions may carry these records; the ids named
/// across all records of one transaction must be pairwise disjoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NFTokenMetadataEntry {
    ids: NFTokenIds,
    metadata: serde_json::Value,
}

impl NFTokenMetadataEntry {
    /// Attach `metadata` to `ids`.
    pub fn new(ids: NFTokenIds, metadata: serde_json::Value) -> Self {
        Self { ids, metadata }
    }

    /// The ids the metadata applies to.
    pub fn ids(&self) -> &NFTokenIds {
        &self.ids
    }

    /// The attached metadata.
    pub fn metadata(&self) -> &serde_json::Value {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(elements: Vec<NFTokenIdElement>) -> NFTokenIds {
        NFTokenIds::new(elements).unwrap()
    }

    fn range(min: u64, max: u64) -> NFTokenIdElement {
        NFTokenIdElement::Range { min, max }
    }

    #[test]
    fn expand_mixed_set() {
        let ids = set(vec![range(0, 3), 150.into()]);
        assert_eq!(ids.expand(), vec![0, 1, 2, 3, 150]);
        assert_eq!(ids.count(), 5);
    }

    #[test]
    fn rejects_inverted_range() {
        assert_eq!(
            NFTokenIds::new(vec![range(5, 2)]),
            Err(IdSetError::EmptyRange)
        );
    }

    #[test]
    fn rejects_overlap() {
        assert_eq!(
            NFTokenIds::new(vec![range(0, 3), range(2, 4)]),
            Err(IdSetError::Overlap)
        );
        assert_eq!(
            NFTokenIds::new(vec![3.into(), range(0, 3)]),
            Err(IdSetError::Overlap)
        );
        assert_eq!(
            NFTokenIds::new(vec![7.into(), 7.into()]),
            Err(IdSetError::Overlap)
        );
    }

    #[test]
    fn reduce_coalesces_adjacent_runs() {
        let ids = set(vec![4.into(), range(0, 3), range(5, 9), 150.into()]);
        assert_eq!(
            ids.reduce().elements(),
            &[range(0, 9), NFTokenIdElement::Single(150)]
        );
    }

    #[test]
    fn reduce_emits_singletons_for_width_one_runs() {
        let ids = set(vec![range(3, 3), 1.into()]);
        assert_eq!(
            ids.reduce().elements(),
            &[NFTokenIdElement::Single(1), NFTokenIdElement::Single(3)]
        );
    }

    #[test]
    fn union_detects_cross_set_overlap() {
        let a = set(vec![range(0, 3)]);
        let b = set(vec![2.into()]);
        assert_eq!(NFTokenIds::union_of([&a, &b]), Err(IdSetError::Overlap));

        let c = set(vec![range(10, 12)]);
        let union = NFTokenIds::union_of([&a, &c]).unwrap();
        assert_eq!(union.count(), 7);
    }

    #[test]
    fn json_roundtrip() {
        let ids = set(vec![range(0, 3), 150.into()]);
        let json = serde_json::to_string(&ids).unwrap();
        assert_eq!(json, r#"[{"min":0,"max":3},150]"#);
        let reparsed: NFTokenIds = serde_json::from_str(&json).unwrap();
        assert_eq!(reparsed, ids);
    }

    #[test]
    fn json_rejects_malformed_sets() {
        assert!(serde_json::from_str::<NFTokenIds>(r#"[{"min":2,"max":0}]"#).is_err());
        assert!(serde_json::from_str::<NFTokenIds>(r#"[{"min":0,"max":3},2]"#).is_err());
        assert!(serde_json::from_str::<NFTokenIds>(r#"[-3]"#).is_err());
        assert!(serde_json::from_str::<NFTokenIds>(r#"[1.5]"#).is_err());
        assert!(serde_json::from_str::<NFTokenIds>(r#"[{"min":0,"max":3,"x":1}]"#).is_err());
        assert!(serde_json::from_str::<NFTokenIds>(r#"{"min":0}"#).is_err());
    }

    // Strategy: disjoint ascending elements built from (gap, width) pairs.
    fn valid_sets() -> impl Strategy<Value = NFTokenIds> {
        proptest::collection::vec((1u64..50, 0u64..10), 0..12).prop_map(|steps| {
            let mut elements = Vec::new();
            let mut cursor = 0u64;
            for (gap, width) in steps {
                let min = cursor + gap;
                let max = min + width;
                elements.push(if width == 0 {
                    NFTokenIdElement::Single(min)
                } else {
                    NFTokenIdElement::Range { min, max }
                });
                cursor = max + 1;
            }
            NFTokenIds::new(elements).unwrap()
        })
    }

    proptest! {
        #[test]
        fn reduce_is_idempotent(ids in valid_sets()) {
            let reduced = ids.reduce();
            prop_assert_eq!(reduced.reduce(), reduced);
        }

        #[test]
        fn count_matches_expansion(ids in valid_sets()) {
            prop_assert_eq!(ids.count(), ids.expand().len() as u128);
        }

        #[test]
        fn reduce_preserves_membership(ids in valid_sets()) {
            prop_assert_eq!(ids.reduce().expand(), ids.expand());
        }
    }
}
