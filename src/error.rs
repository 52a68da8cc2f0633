use crate::data::{RoomType, StaffRole};
use thiserror::Error;

/// The closed set of terminal outcomes of a failed generation run.
///
/// Every variant ends the run; nothing is retried and nothing partial is
/// kept. `CapacityShortfall` and `NoQualifiedStaff` are raised while
/// variables are generated, before any search happens.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// No room of the required type can seat the session's cohort.
    #[error("no {room_type} with capacity for {students} students ({variable})")]
    CapacityShortfall {
        variable: String,
        room_type: RoomType,
        students: u32,
    },

    /// The course has nobody qualified for the role the session needs.
    #[error("course {course_code} has no qualified {role}")]
    NoQualifiedStaff {
        course_code: String,
        role: StaffRole,
    },

    /// The search exhausted every ordering without a full assignment.
    #[error("exhausted the search space without finding a conflict-free timetable")]
    NoSchedule,

    /// The snapshot violates a structural invariant.
    #[error("invalid academic snapshot: {0}")]
    InvalidInput(String),
}

impl ScheduleError {
    /// Stable discriminant name, used on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            ScheduleError::CapacityShortfall { .. } => "CapacityShortfall",
            ScheduleError::NoQualifiedStaff { .. } => "NoQualifiedStaff",
            ScheduleError::NoSchedule => "NoSchedule",
            ScheduleError::InvalidInput(_) => "InvalidInput",
        }
    }
}
