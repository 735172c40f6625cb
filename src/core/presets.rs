//! Discovered preset records

use crate::hid::protocol::{PresetIndex, PresetName};
use serde::{Deserialize, Serialize};

/// A programmed preset slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetRecord {
    /// Internal slot (0-127)
    pub index: PresetIndex,
    /// Name as stored on the pedal
    pub name: PresetName,
}

/// Presets found during one discovery pass, in ascending slot order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetList {
    records: Vec<PresetRecord>,
}

impl PresetList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Records must arrive in scan order.
    pub(crate) fn push(&mut self, record: PresetRecord) {
        debug_assert!(self.records.last().map_or(true, |last| last.index < record.index));
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PresetRecord> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[PresetRecord] {
        &self.records
    }

    /// Record for an internal slot, if that slot is programmed
    pub fn get(&self, index: PresetIndex) -> Option<&PresetRecord> {
        self.position(index).map(|pos| &self.records[pos])
    }

    /// Position of a slot within the list
    pub fn position(&self, index: PresetIndex) -> Option<usize> {
        self.records.binary_search_by_key(&index, |r| r.index).ok()
    }

    /// Position following `pos`, wrapping to the first preset
    pub fn next_after(&self, pos: usize) -> Option<usize> {
        if self.records.is_empty() {
            return None;
        }
        Some(if pos + 1 >= self.records.len() { 0 } else { pos + 1 })
    }

    /// Position preceding `pos`, wrapping to the last preset
    pub fn prev_before(&self, pos: usize) -> Option<usize> {
        if self.records.is_empty() {
            return None;
        }
        Some(if pos == 0 || pos > self.records.len() {
            self.records.len() - 1
        } else {
            pos - 1
        })
    }
}

impl<'a> IntoIterator for &'a PresetList {
    type Item = &'a PresetRecord;
    type IntoIter = std::slice::Iter<'a, PresetRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
