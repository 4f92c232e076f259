//! Per-attempt record of what a persona placed.

use serde::Serialize;

use crate::errors::AttemptError;
use crate::game::{Command, SlotGroup};

/// Placements and run clicks of the current attempt plus the program built so far.
///
/// Every row is sized by its group's capacity; `reset` returns every slot to `None`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttemptRecord {
    placements: usize,
    runs: usize,
    programs: [Vec<Option<Command>>; 4],
}

impl Default for AttemptRecord {
    fn default() -> Self {
        Self {
            placements: 0,
            runs: 0,
            programs: SlotGroup::ALL.map(|group| vec![None; group.capacity()]),
        }
    }
}

impl AttemptRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject `index` unless it addresses an existing slot of `group`.
    pub fn check_slot(group: SlotGroup, index: usize) -> Result<(), AttemptError> {
        if index < group.capacity() {
            Ok(())
        } else {
            Err(AttemptError::SlotOutOfRange {
                group,
                index,
                capacity: group.capacity(),
            })
        }
    }

    /// Record a completed placement.
    pub fn place(
        &mut self,
        group: SlotGroup,
        index: usize,
        command: Command,
    ) -> Result<(), AttemptError> {
        Self::check_slot(group, index)?;
        self.programs[group.position()][index] = Some(command);
        self.placements += 1;
        Ok(())
    }

    pub fn record_run(&mut self) {
        self.runs += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn placements(&self) -> usize {
        self.placements
    }

    pub fn program(&self, group: SlotGroup) -> &[Option<Command>] {
        &self.programs[group.position()]
    }

    pub fn is_empty(&self) -> bool {
        self.placements == 0
            && self.runs == 0
            && self.programs.iter().flatten().all(Option::is_none)
    }

    /// Compact row rendering, `.` for an empty slot.
    pub fn describe(&self, group: SlotGroup) -> String {
        self.program(group)
            .iter()
            .map(|slot| match slot {
                Some(Command::Grab) => "G".to_string(),
                Some(Command::Right) => "R".to_string(),
                Some(Command::Left) => "L".to_string(),
                Some(Command::Call(callee)) => callee.to_string(),
                None => ".".to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_with_group_sized_rows() {
        let record = AttemptRecord::new();
        assert!(record.is_empty());
        assert_eq!(record.program(SlotGroup::F1).len(), 8);
        assert_eq!(record.program(SlotGroup::F4).len(), 5);
    }

    #[test]
    fn place_fills_the_slot_and_counts() {
        let mut record = AttemptRecord::new();
        record.place(SlotGroup::F2, 3, Command::Left).unwrap();
        record.place(SlotGroup::F4, 4, Command::Call(SlotGroup::F3)).unwrap();
        assert_eq!(record.placements(), 2);
        assert_eq!(record.program(SlotGroup::F2)[3], Some(Command::Left));
        assert_eq!(record.describe(SlotGroup::F4), ". . . . F3");
    }

    #[test]
    fn out_of_range_index_is_rejected_without_side_effects() {
        let mut record = AttemptRecord::new();
        let err = record.place(SlotGroup::F4, 5, Command::Grab).unwrap_err();
        assert_eq!(
            err,
            AttemptError::SlotOutOfRange {
                group: SlotGroup::F4,
                index: 5,
                capacity: 5
            }
        );
        assert!(record.is_empty());
        assert!(AttemptRecord::check_slot(SlotGroup::F1, 7).is_ok());
        assert!(AttemptRecord::check_slot(SlotGroup::F1, 8).is_err());
    }

    #[test]
    fn reset_empties_every_slot_and_is_idempotent() {
        let mut record = AttemptRecord::new();
        record.place(SlotGroup::F1, 0, Command::Grab).unwrap();
        record.record_run();
        record.reset();
        assert!(record.is_empty());
        assert_eq!(record, AttemptRecord::new());

        record.reset();
        assert_eq!(record, AttemptRecord::new());
    }
}
