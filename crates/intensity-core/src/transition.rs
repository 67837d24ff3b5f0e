//! Transition table builder.
//!
//! A zonal histogram of one interval maps an encoded transition key to a pixel
//! count. The key packs the pair as `from * 100 + to`; since class ids are
//! below 100 the pair decodes back as `(key / 100, key % 100)`.
//!
//! Decoding happens once here. Everything downstream works on typed
//! [`TransitionRecord`]s.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::classes::{ClassId, ClassScheme, MAX_CLASS_ID};
use crate::error::{IntensityError, Result};

/// Raw histogram as delivered by a zonal histogrammer: decimal key string → pixels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawHistogram(pub BTreeMap<String, u64>);

impl RawHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `pixels` under the packed key of `(from, to)`.
    pub fn insert(&mut self, from: ClassId, to: ClassId, pixels: u64) {
        *self.0.entry(encode_key(from, to).to_string()).or_insert(0) += pixels;
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total_pixels(&self) -> u64 {
        self.0.values().sum()
    }
}

impl<K: Into<String>> FromIterator<(K, u64)> for RawHistogram {
    fn from_iter<I: IntoIterator<Item = (K, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Pack a transition pair into its base-100 key.
pub fn encode_key(from: ClassId, to: ClassId) -> u32 {
    from.0 as u32 * MAX_CLASS_ID as u32 + to.0 as u32
}

/// Unpack a base-100 key, requiring both halves to be members of `scheme`.
pub fn decode_key(key: u32, scheme: &ClassScheme) -> Result<(ClassId, ClassId)> {
    let radix = MAX_CLASS_ID as u32;
    let from = key / radix;
    let to = key % radix;
    let member = |part: u32, role: &str| -> Result<ClassId> {
        match u8::try_from(part) {
            Ok(id) if scheme.contains(ClassId(id)) => Ok(ClassId(id)),
            _ => Err(IntensityError::MalformedTransitionKey {
                key: key.to_string(),
                reason: format!("{role}-class {part} is not in the class scheme"),
            }),
        }
    };
    Ok((member(from, "from")?, member(to, "to")?))
}

/// Pixels observed moving from one class to another within an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from_class: ClassId,
    pub to_class: ClassId,
    pub pixel_count: u64,
}

impl TransitionRecord {
    #[inline]
    pub fn is_persistence(&self) -> bool {
        self.from_class == self.to_class
    }
}

/// Per-class sums over a transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassTotals {
    /// Pixels of the class at the start of the interval.
    pub start_pixels: u64,
    /// Pixels of the class at the end of the interval.
    pub end_pixels: u64,
    /// Pixels that stayed in the class.
    pub persist_pixels: u64,
}

impl ClassTotals {
    pub fn loss_pixels(&self) -> u64 {
        self.start_pixels - self.persist_pixels
    }

    pub fn gain_pixels(&self) -> u64 {
        self.end_pixels - self.persist_pixels
    }
}

fn parse_canonical_key(raw_key: &str) -> Result<u32> {
    let malformed = |reason: &str| IntensityError::MalformedTransitionKey {
        key: raw_key.to_string(),
        reason: reason.to_string(),
    };
    if raw_key.is_empty() || !raw_key.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed("not a non-negative integer"));
    }
    if raw_key.len() > 1 && raw_key.starts_with('0') {
        return Err(malformed("leading zeros"));
    }
    raw_key.parse().map_err(|_| malformed("out of range"))
}

/// All transitions of one interval. Built once, read by both calculators, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    records: Vec<TransitionRecord>,
}

impl TransitionTable {
    /// Decode a string-keyed histogram.
    ///
    /// Keys must be canonical decimal integers: ASCII digits only, without
    /// sign, padding or leading zeros. Fails with `MalformedTransitionKey` on
    /// the first key that is not, or whose halves are not scheme members.
    pub fn from_histogram(histogram: &RawHistogram, scheme: &ClassScheme) -> Result<Self> {
        let mut pairs = Vec::with_capacity(histogram.len());
        for (raw_key, &pixels) in &histogram.0 {
            let key = parse_canonical_key(raw_key)?;
            pairs.push((decode_key(key, scheme)?, pixels));
        }
        Self::from_pairs(pairs, scheme)
    }

    /// Build from already-split `(from, to)` pairs. Repeated pairs are summed.
    pub fn from_pairs<I>(pairs: I, scheme: &ClassScheme) -> Result<Self>
    where
        I: IntoIterator<Item = ((ClassId, ClassId), u64)>,
    {
        let mut merged: BTreeMap<(ClassId, ClassId), u64> = BTreeMap::new();
        for ((from, to), pixels) in pairs {
            for id in [from, to] {
                if !scheme.contains(id) {
                    return Err(IntensityError::MalformedTransitionKey {
                        key: encode_key(from, to).to_string(),
                        reason: format!("class {id} is not in the class scheme"),
                    });
                }
            }
            *merged.entry((from, to)).or_insert(0) += pixels;
        }
        let records = merged
            .into_iter()
            .map(|((from_class, to_class), pixel_count)| TransitionRecord { from_class, to_class, pixel_count })
            .collect();
        Ok(Self { records })
    }

    pub fn records(&self) -> &[TransitionRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_pixels(&self) -> u64 {
        self.records.iter().map(|r| r.pixel_count).sum()
    }

    pub fn persist_pixels(&self) -> u64 {
        self.records.iter().filter(|r| r.is_persistence()).map(|r| r.pixel_count).sum()
    }

    /// Start, end and persistence sums for `class`.
    pub fn class_totals(&self, class: ClassId) -> ClassTotals {
        let mut totals = ClassTotals::default();
        for r in &self.records {
            if r.from_class == class {
                totals.start_pixels += r.pixel_count;
            }
            if r.to_class == class {
                totals.end_pixels += r.pixel_count;
            }
            if r.from_class == class && r.to_class == class {
                totals.persist_pixels += r.pixel_count;
            }
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_a() -> RawHistogram {
        [("101", 50u64), ("102", 30), ("202", 20)].into_iter().collect()
    }

    #[test]
    fn decodes_keys_and_tags_persistence() {
        let table = TransitionTable::from_histogram(&scenario_a(), &ClassScheme::reference()).unwrap();
        assert_eq!(table.records().len(), 3);
        let persistent: Vec<_> = table.records().iter().filter(|r| r.is_persistence()).collect();
        assert_eq!(persistent.len(), 2);
        let change = table.records().iter().find(|r| !r.is_persistence()).unwrap();
        assert_eq!((change.from_class, change.to_class), (ClassId(1), ClassId(2)));
        assert_eq!(change.pixel_count, 30);
    }

    #[test]
    fn key_with_invalid_to_class_is_malformed() {
        let hist: RawHistogram = [("1099", 5u64)].into_iter().collect();
        let err = TransitionTable::from_histogram(&hist, &ClassScheme::reference()).unwrap_err();
        assert!(matches!(err, IntensityError::MalformedTransitionKey { ref key, .. } if key == "1099"));
    }

    #[test]
    fn nodata_and_non_numeric_keys_are_malformed() {
        let scheme = ClassScheme::reference();
        for key in ["100", "5", "abc", "-101", "1e2", "", "99999999999"] {
            let hist: RawHistogram = [(key, 1u64)].into_iter().collect();
            assert!(
                matches!(
                    TransitionTable::from_histogram(&hist, &scheme),
                    Err(IntensityError::MalformedTransitionKey { .. })
                ),
                "key {key} should be rejected"
            );
        }
    }

    #[test]
    fn non_canonical_spellings_of_a_key_are_malformed() {
        let scheme = ClassScheme::reference();
        for key in ["+101", "0101", " 101 ", "101 "] {
            let hist: RawHistogram = [(key, 5u64), ("101", 5)].into_iter().collect();
            let err = TransitionTable::from_histogram(&hist, &scheme).unwrap_err();
            assert!(
                matches!(err, IntensityError::MalformedTransitionKey { key: ref k, .. } if k == key),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn decoded_table_has_one_record_per_pair() {
        let table = TransitionTable::from_histogram(&scenario_a(), &ClassScheme::reference()).unwrap();
        let mut pairs: Vec<_> = table.records().iter().map(|r| (r.from_class, r.to_class)).collect();
        pairs.dedup();
        assert_eq!(pairs.len(), table.records().len());
        assert_eq!(table.total_pixels(), 100);
    }

    #[test]
    fn encode_decode_agree_on_scheme_members() {
        let scheme = ClassScheme::reference();
        assert_eq!(encode_key(ClassId(10), ClassId(3)), 1003);
        assert_eq!(decode_key(1003, &scheme).unwrap(), (ClassId(10), ClassId(3)));
    }

    #[test]
    fn pairs_are_merged_and_validated() {
        let scheme = ClassScheme::reference();
        let table = TransitionTable::from_pairs(
            vec![((ClassId(1), ClassId(2)), 4), ((ClassId(1), ClassId(2)), 6), ((ClassId(2), ClassId(2)), 1)],
            &scheme,
        )
        .unwrap();
        assert_eq!(table.records().len(), 2);
        assert_eq!(table.total_pixels(), 11);

        let bad = TransitionTable::from_pairs(vec![((ClassId(11), ClassId(2)), 1)], &scheme);
        assert!(bad.is_err());
    }

    #[test]
    fn class_totals_follow_from_and_to() {
        let table = TransitionTable::from_histogram(&scenario_a(), &ClassScheme::reference()).unwrap();
        let c1 = table.class_totals(ClassId(1));
        assert_eq!((c1.start_pixels, c1.end_pixels, c1.persist_pixels), (80, 50, 50));
        assert_eq!(c1.loss_pixels(), 30);
        let c2 = table.class_totals(ClassId(2));
        assert_eq!((c2.start_pixels, c2.end_pixels, c2.persist_pixels), (20, 50, 20));
        assert_eq!(c2.gain_pixels(), 30);
        assert_eq!(table.class_totals(ClassId(7)), ClassTotals::default());
    }

    #[test]
    fn raw_histogram_insert_packs_keys() {
        let mut hist = RawHistogram::new();
        hist.insert(ClassId(4), ClassId(8), 12);
        hist.insert(ClassId(4), ClassId(8), 3);
        assert_eq!(hist.0.get("408"), Some(&15));
        assert_eq!(hist.total_pixels(), 15);
    }
}
