use crate::calendar::{BLOCK_MINUTES, Day};
use crate::data::{Assignment, CourseId, GroupId, InstructorId, RoomId, SectionId, SessionType, TaId};
use log::info;
use thiserror::Error;

pub type TimeslotId = u32;

/// A write against the schedule store failed. The batch driver rolls the
/// whole emission back when it sees one of these.
#[derive(Debug, Error)]
#[error("schedule store error: {0}")]
pub struct PersistError(pub String);

/// One persisted schedule row, keyed by external store ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRow {
    pub course_id: CourseId,
    pub group_id: GroupId,
    pub section_id: Option<SectionId>,
    pub room_id: RoomId,
    pub timeslot_id: TimeslotId,
    pub instructor_id: Option<InstructorId>,
    pub ta_id: Option<TaId>,
    pub session_type: SessionType,
}

/// Write side of the schedule store.
///
/// Writes accumulate until `commit`; `rollback` must discard everything
/// staged since the last commit. `ensure_timeslot` upserts by
/// (day, start, end) so repeated placements share one timeslot row.
pub trait SchedulePersister {
    fn clear_existing_schedule(&mut self) -> Result<(), PersistError>;
    fn ensure_timeslot(
        &mut self,
        day: Day,
        start: &str,
        end: &str,
        duration_minutes: u32,
    ) -> Result<TimeslotId, PersistError>;
    fn insert_assignment(&mut self, row: ScheduleRow) -> Result<(), PersistError>;
    fn commit(&mut self) -> Result<(), PersistError>;
    fn rollback(&mut self);
}

/// Replace the stored schedule with the given assignments as one atomic
/// batch. Any failure rolls back, so the store never holds a partial
/// timetable.
pub fn persist_schedule(
    store: &mut dyn SchedulePersister,
    assignments: &[Assignment],
) -> Result<(), PersistError> {
    let result = write_all(store, assignments);
    if result.is_err() {
        store.rollback();
    }
    result
}

fn write_all(
    store: &mut dyn SchedulePersister,
    assignments: &[Assignment],
) -> Result<(), PersistError> {
    store.clear_existing_schedule()?;
    for assignment in assignments {
        let variable = &assignment.variable;
        let duration_minutes = BLOCK_MINUTES * u32::from(variable.duration_blocks);
        let timeslot_id = store.ensure_timeslot(
            assignment.day,
            assignment.start_time(),
            assignment.end_time(),
            duration_minutes,
        )?;
        store.insert_assignment(ScheduleRow {
            course_id: variable.course_id,
            group_id: variable.group_id,
            section_id: variable.section_id,
            room_id: assignment.room_id,
            timeslot_id,
            instructor_id: assignment.staff.instructor_id(),
            ta_id: assignment.staff.ta_id(),
            session_type: variable.session_type,
        })?;
    }
    store.commit()?;
    info!("persisted {} schedule rows", assignments.len());
    Ok(())
}

/// Store kept entirely in memory, for tests and demos.
#[derive(Debug, Default)]
pub struct InMemoryScheduleStore {
    pub rows: Vec<ScheduleRow>,
    pub timeslots: Vec<(Day, String, String, u32)>,
    staged_rows: Vec<ScheduleRow>,
    staged_clear: bool,
}

impl SchedulePersister for InMemoryScheduleStore {
    fn clear_existing_schedule(&mut self) -> Result<(), PersistError> {
        self.staged_clear = true;
        Ok(())
    }

    fn ensure_timeslot(
        &mut self,
        day: Day,
        start: &str,
        end: &str,
        duration_minutes: u32,
    ) -> Result<TimeslotId, PersistError> {
        let position = self
            .timeslots
            .iter()
            .position(|(d, s, e, _)| *d == day && s == start && e == end);
        let index = match position {
            Some(index) => index,
            None => {
                self.timeslots
                    .push((day, start.to_string(), end.to_string(), duration_minutes));
                self.timeslots.len() - 1
            }
        };
        Ok(index as TimeslotId)
    }

    fn insert_assignment(&mut self, row: ScheduleRow) -> Result<(), PersistError> {
        self.staged_rows.push(row);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), PersistError> {
        if self.staged_clear {
            self.rows.clear();
            self.staged_clear = false;
        }
        self.rows.append(&mut self.staged_rows);
        Ok(())
    }

    fn rollback(&mut self) {
        self.staged_rows.clear();
        self.staged_clear = false;
    }
}
