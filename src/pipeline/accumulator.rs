use crate::error::AccumulatorError;
use crate::pipeline::domain::KeypointRecord;

/// Ordered, append-only store of the keypoint records produced by one run.
///
/// Every appended record must carry the next dense frame index; anything else
/// is rejected, so insertion order and index order can never diverge.
#[derive(Debug, Default)]
pub struct KeypointAccumulator {
    records: Vec<KeypointRecord>,
}

impl KeypointAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The frame index the next appended record must have.
    pub fn next_index(&self) -> u64 {
        self.records.len() as u64
    }

    pub fn append(&mut self, record: KeypointRecord) -> Result<(), AccumulatorError> {
        let expected = self.next_index();
        if record.frame_index() != expected {
            return Err(AccumulatorError::OutOfOrder {
                expected,
                got: record.frame_index(),
            });
        }
        self.records.push(record);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn all(&self) -> &[KeypointRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<KeypointRecord> {
        self.records
    }
}
