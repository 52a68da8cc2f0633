use crate::calendar::{self, Day};
use serde::{Deserialize, Serialize};
use std::fmt;

// Type aliases for clarity
pub type RoomId = u32;
pub type CourseId = u32;
pub type LevelId = u32;
pub type GroupId = u32;
pub type SectionId = u32;
pub type InstructorId = u32;
pub type TaId = u32;
pub type VarId = usize;

/// The kind of space a session requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum RoomType {
    Theater,
    Classroom,
    Lab,
    DrawingStudio,
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoomType::Theater => "Theater",
            RoomType::Classroom => "Classroom",
            RoomType::Lab => "Lab",
            RoomType::DrawingStudio => "DrawingStudio",
        };
        f.write_str(name)
    }
}

/// The kind of teaching session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionType {
    Lecture,
    Lab,
    Tutorial,
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionType::Lecture => "LECTURE",
            SessionType::Lab => "LAB",
            SessionType::Tutorial => "TUTORIAL",
        };
        f.write_str(name)
    }
}

/// The staff role a session type demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffRole {
    Instructor,
    Ta,
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaffRole::Instructor => f.write_str("instructor"),
            StaffRole::Ta => f.write_str("TA"),
        }
    }
}

/// A physical room with a fixed capacity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub room_number: String,
    pub building_name: String,
    pub room_type: RoomType,
    pub capacity: u32,
}

/// A course offered to one level of the student hierarchy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub code: String,
    pub name: String,
    pub level_id: LevelId,
}

/// A cohort of students within a level; the audience of one lecture.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub level_id: LevelId,
    pub group_number: u32,
    pub num_students: u32,
}

/// A subdivision of a group; the audience of one lab or tutorial.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: SectionId,
    pub group_id: GroupId,
    pub level_id: LevelId,
    pub section_number: u32,
    pub num_students: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    pub id: InstructorId,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ta {
    pub id: TaId,
    pub name: String,
}

/// One teaching session that must be placed on the grid; the unit of
/// search.
///
/// Variables get dense ids in enumeration order, which also fixes the
/// order the search assigns them in. `section_id`/`section_number` are set
/// for labs and tutorials only; `group_id` is always set.
#[derive(Debug, Clone)]
pub struct SessionVariable {
    pub var_id: VarId,
    pub course_id: CourseId,
    pub course_code: String,
    pub course_name: String,
    pub session_type: SessionType,
    pub duration_blocks: u8,
    pub student_count: u32,
    pub required_room_type: RoomType,
    pub level_id: LevelId,
    pub group_id: GroupId,
    pub group_number: u32,
    pub section_id: Option<SectionId>,
    pub section_number: Option<u32>,
}

impl SessionVariable {
    pub fn staff_role(&self) -> StaffRole {
        match self.session_type {
            SessionType::Lecture => StaffRole::Instructor,
            SessionType::Lab | SessionType::Tutorial => StaffRole::Ta,
        }
    }
}

impl fmt::Display for SessionVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.section_number {
            None => write!(
                f,
                "{} ({}, group {})",
                self.session_type, self.course_code, self.group_number
            ),
            Some(section) => write!(
                f,
                "{} ({}, section {})",
                self.session_type, self.course_code, section
            ),
        }
    }
}

/// The person teaching a session. Lectures take an instructor, labs and
/// tutorials take a TA; a session never has both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staff {
    Instructor { id: InstructorId, name: String },
    Ta { id: TaId, name: String },
}

impl Staff {
    pub fn instructor_id(&self) -> Option<InstructorId> {
        match self {
            Staff::Instructor { id, .. } => Some(*id),
            Staff::Ta { .. } => None,
        }
    }

    pub fn ta_id(&self) -> Option<TaId> {
        match self {
            Staff::Instructor { .. } => None,
            Staff::Ta { id, .. } => Some(*id),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Staff::Instructor { name, .. } | Staff::Ta { name, .. } => name,
        }
    }
}

/// A placed session: one variable pinned to a day, block range, room and
/// teacher. `end_block` is exclusive.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub variable: SessionVariable,
    pub day: Day,
    pub start_block: u8,
    pub end_block: u8,
    pub room_id: RoomId,
    pub room_number: String,
    pub building_name: String,
    pub staff: Staff,
}

impl Assignment {
    pub fn start_time(&self) -> &'static str {
        calendar::block_start(self.start_block)
    }

    pub fn end_time(&self) -> &'static str {
        calendar::block_end(self.end_block - 1)
    }

    /// Whether two placements share at least one block on the same day.
    pub fn overlaps(&self, other: &Assignment) -> bool {
        self.day == other.day
            && !(self.end_block <= other.start_block || self.start_block >= other.end_block)
    }
}

/// One row of the emitted timetable, shaped for rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub session_type: SessionType,
    pub course_code: String,
    pub course_name: String,
    pub day: Day,
    pub start_time: String,
    pub end_time: String,
    pub start_block: u8,
    pub end_block: u8,
    pub duration_blocks: u8,
    pub room_number: String,
    pub building_name: String,
    pub teacher_name: String,
    pub level_id: LevelId,
    pub group_id: GroupId,
    pub group_number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<SectionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_number: Option<u32>,
    pub student_count: u32,
}

impl ScheduleEntry {
    pub fn from_assignment(assignment: &Assignment) -> Self {
        let variable = &assignment.variable;
        ScheduleEntry {
            session_type: variable.session_type,
            course_code: variable.course_code.clone(),
            course_name: variable.course_name.clone(),
            day: assignment.day,
            start_time: assignment.start_time().to_string(),
            end_time: assignment.end_time().to_string(),
            start_block: assignment.start_block,
            end_block: assignment.end_block,
            duration_blocks: variable.duration_blocks,
            room_number: assignment.room_number.clone(),
            building_name: assignment.building_name.clone(),
            teacher_name: assignment.staff.name().to_string(),
            level_id: variable.level_id,
            group_id: variable.group_id,
            group_number: variable.group_number,
            section_id: variable.section_id,
            section_number: variable.section_number,
            student_count: variable.student_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable(session_type: SessionType) -> SessionVariable {
        SessionVariable {
            var_id: 0,
            course_id: 7,
            course_code: "CS101".to_string(),
            course_name: "Intro to Computing".to_string(),
            session_type,
            duration_blocks: 2,
            student_count: 40,
            required_room_type: RoomType::Classroom,
            level_id: 1,
            group_id: 3,
            group_number: 1,
            section_id: (session_type != SessionType::Lecture).then_some(9),
            section_number: (session_type != SessionType::Lecture).then_some(2),
        }
    }

    fn placed(day: Day, start_block: u8, end_block: u8) -> Assignment {
        Assignment {
            variable: variable(SessionType::Lecture),
            day,
            start_block,
            end_block,
            room_id: 1,
            room_number: "B-201".to_string(),
            building_name: "Main".to_string(),
            staff: Staff::Instructor {
                id: 5,
                name: "Dr. Hart".to_string(),
            },
        }
    }

    #[test]
    fn overlap_requires_same_day_and_shared_blocks() {
        let a = placed(Day::Sunday, 0, 2);
        assert!(a.overlaps(&placed(Day::Sunday, 1, 3)));
        assert!(!a.overlaps(&placed(Day::Sunday, 2, 4)));
        assert!(!a.overlaps(&placed(Day::Monday, 0, 2)));
    }

    #[test]
    fn wall_clock_spans_the_whole_block_range() {
        let a = placed(Day::Sunday, 2, 4);
        assert_eq!(a.start_time(), "10:45");
        assert_eq!(a.end_time(), "12:15");
    }

    #[test]
    fn session_type_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&SessionType::Lecture).unwrap(),
            "\"LECTURE\""
        );
        assert_eq!(
            serde_json::to_string(&SessionType::Tutorial).unwrap(),
            "\"TUTORIAL\""
        );
    }

    #[test]
    fn variables_display_their_cohort() {
        assert_eq!(
            variable(SessionType::Lecture).to_string(),
            "LECTURE (CS101, group 1)"
        );
        assert_eq!(
            variable(SessionType::Lab).to_string(),
            "LAB (CS101, section 2)"
        );
    }
}
