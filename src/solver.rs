use crate::calendar::{self, BLOCKS_PER_DAY, DAYS};
use crate::data::{
    Assignment, Course, Room, RoomType, SessionType, SessionVariable, Staff, StaffRole,
};
use crate::error::ScheduleError;
use crate::snapshot::{Snapshot, SnapshotSource};
use log::{debug, info, trace};
use std::time::Instant;

/// Load a snapshot from the source and solve it.
pub fn generate(source: &dyn SnapshotSource) -> Result<Vec<Assignment>, ScheduleError> {
    let snapshot = Snapshot::load(source)?;
    solve(&snapshot)
}

/// Place every required session of the snapshot, or report why that is
/// impossible.
///
/// The run is deterministic: variables are enumerated in a fixed order and
/// each domain is tried in a fixed order, so the same snapshot always
/// yields the same timetable or the same error.
pub fn solve(snapshot: &Snapshot) -> Result<Vec<Assignment>, ScheduleError> {
    let start_time = Instant::now();
    let mut scheduler = Scheduler {
        snapshot,
        variables: Vec::new(),
        assignments: Vec::new(),
    };

    scheduler.generate_variables()?;
    let count_of = |session_type| {
        scheduler
            .variables
            .iter()
            .filter(|v| v.session_type == session_type)
            .count()
    };
    info!(
        "generated {} session variables ({} lectures, {} labs, {} tutorials)",
        scheduler.variables.len(),
        count_of(SessionType::Lecture),
        count_of(SessionType::Lab),
        count_of(SessionType::Tutorial),
    );

    let assignments = scheduler.search()?;
    info!(
        "placed {} sessions in {:.2?}",
        assignments.len(),
        start_time.elapsed()
    );
    Ok(assignments)
}

struct Scheduler<'a> {
    snapshot: &'a Snapshot,
    variables: Vec<SessionVariable>,
    assignments: Vec<Assignment>,
}

impl<'a> Scheduler<'a> {
    /// Enumerate one LECTURE per (course, group) and one LAB plus one
    /// TUTORIAL per (course, section), in course, group-number,
    /// section-number order.
    ///
    /// Each variable is vetted as soon as it is built: a cohort no room of
    /// the required type can seat, or a course with nobody qualified for
    /// the role, can never be placed, so the run aborts here instead of
    /// after an exhaustive search.
    fn generate_variables(&mut self) -> Result<(), ScheduleError> {
        let snapshot = self.snapshot;
        let mut next_var_id = 0;

        for course in &snapshot.courses {
            debug!("generating variables for course {}", course.code);
            let groups = snapshot
                .groups_by_level
                .get(&course.level_id)
                .filter(|groups| !groups.is_empty())
                .ok_or_else(|| {
                    ScheduleError::InvalidInput(format!(
                        "course {} belongs to level {} which has no groups",
                        course.code, course.level_id
                    ))
                })?;

            for group in groups {
                let lecture = SessionVariable {
                    var_id: next_var_id,
                    course_id: course.id,
                    course_code: course.code.clone(),
                    course_name: course.name.clone(),
                    session_type: SessionType::Lecture,
                    duration_blocks: 2,
                    student_count: group.num_students,
                    required_room_type: if group.num_students > 100 {
                        RoomType::Theater
                    } else {
                        RoomType::Classroom
                    },
                    level_id: group.level_id,
                    group_id: group.id,
                    group_number: group.group_number,
                    section_id: None,
                    section_number: None,
                };
                next_var_id += 1;
                self.check_feasible(&lecture, course)?;
                self.variables.push(lecture);

                let sections = snapshot
                    .sections_by_group
                    .get(&group.id)
                    .filter(|sections| !sections.is_empty())
                    .ok_or_else(|| {
                        ScheduleError::InvalidInput(format!(
                            "group {} of level {} has no sections",
                            group.group_number, group.level_id
                        ))
                    })?;

                for section in sections {
                    let lab = SessionVariable {
                        var_id: next_var_id,
                        course_id: course.id,
                        course_code: course.code.clone(),
                        course_name: course.name.clone(),
                        session_type: SessionType::Lab,
                        duration_blocks: 2,
                        student_count: section.num_students,
                        required_room_type: RoomType::Lab,
                        level_id: section.level_id,
                        group_id: group.id,
                        group_number: group.group_number,
                        section_id: Some(section.id),
                        section_number: Some(section.section_number),
                    };
                    next_var_id += 1;
                    self.check_feasible(&lab, course)?;
                    self.variables.push(lab);

                    // Small sections fit their tutorial into half a slot.
                    let duration_blocks = if section.num_students <= 15 { 1 } else { 2 };
                    let tutorial = SessionVariable {
                        var_id: next_var_id,
                        course_id: course.id,
                        course_code: course.code.clone(),
                        course_name: course.name.clone(),
                        session_type: SessionType::Tutorial,
                        duration_blocks,
                        student_count: section.num_students,
                        required_room_type: RoomType::Classroom,
                        level_id: section.level_id,
                        group_id: group.id,
                        group_number: group.group_number,
                        section_id: Some(section.id),
                        section_number: Some(section.section_number),
                    };
                    next_var_id += 1;
                    self.check_feasible(&tutorial, course)?;
                    self.variables.push(tutorial);
                }
            }
        }
        Ok(())
    }

    /// Per-variable feasibility that no amount of searching can recover
    /// from: some room of the required type must seat the cohort, and the
    /// course must have staff for the session's role.
    fn check_feasible(
        &self,
        variable: &SessionVariable,
        course: &Course,
    ) -> Result<(), ScheduleError> {
        if !self
            .snapshot
            .has_room_for(variable.required_room_type, variable.student_count)
        {
            return Err(ScheduleError::CapacityShortfall {
                variable: variable.to_string(),
                room_type: variable.required_room_type,
                students: variable.student_count,
            });
        }

        let has_staff = match variable.staff_role() {
            StaffRole::Instructor => self
                .snapshot
                .instructors_by_course
                .get(&variable.course_id)
                .is_some_and(|list| !list.is_empty()),
            StaffRole::Ta => self
                .snapshot
                .tas_by_course
                .get(&variable.course_id)
                .is_some_and(|list| !list.is_empty()),
        };
        if !has_staff {
            return Err(ScheduleError::NoQualifiedStaff {
                course_code: course.code.clone(),
                role: variable.staff_role(),
            });
        }
        Ok(())
    }

    fn search(mut self) -> Result<Vec<Assignment>, ScheduleError> {
        if self.backtrack(0) {
            Ok(self.assignments)
        } else {
            Err(ScheduleError::NoSchedule)
        }
    }

    /// Depth-first assignment in variable order; candidates are tried in
    /// domain order and popped again when the rest of the search fails.
    fn backtrack(&mut self, index: usize) -> bool {
        if index >= self.variables.len() {
            return true;
        }

        let variable = self.variables[index].clone();
        let domain = self.domain(&variable);
        trace!(
            "level {}: {} candidates for {}",
            index,
            domain.len(),
            variable
        );

        for candidate in domain {
            if self.is_consistent(&candidate) {
                self.assignments.push(candidate);
                if self.backtrack(index + 1) {
                    return true;
                }
                self.assignments.pop();
            }
        }
        false
    }

    /// Every candidate placement for a variable: the cross-product of
    /// legal (day, start block) pairs, rooms of the required type with
    /// sufficient capacity, and staff qualified for the role. The
    /// enumeration order (days, then starts, then rooms, then staff) is
    /// what makes the first solution found reproducible.
    fn domain(&self, variable: &SessionVariable) -> Vec<Assignment> {
        let rooms: Vec<&Room> = self
            .snapshot
            .suitable_rooms(variable.required_room_type, variable.student_count)
            .collect();
        let staff = self.staff_for(variable);

        let mut domain = Vec::new();
        for day in DAYS {
            for &start_block in calendar::legal_starts(variable.duration_blocks) {
                let end_block = start_block + variable.duration_blocks;
                if end_block > BLOCKS_PER_DAY {
                    continue;
                }
                for room in &rooms {
                    for teacher in &staff {
                        domain.push(Assignment {
                            variable: variable.clone(),
                            day,
                            start_block,
                            end_block,
                            room_id: room.id,
                            room_number: room.room_number.clone(),
                            building_name: room.building_name.clone(),
                            staff: teacher.clone(),
                        });
                    }
                }
            }
        }
        domain
    }

    /// Lectures draw from the course's qualified instructors, labs and
    /// tutorials from its qualified TAs. Hard rule in both directions.
    fn staff_for(&self, variable: &SessionVariable) -> Vec<Staff> {
        match variable.staff_role() {
            StaffRole::Instructor => self
                .snapshot
                .instructors_by_course
                .get(&variable.course_id)
                .into_iter()
                .flatten()
                .map(|instructor| Staff::Instructor {
                    id: instructor.id,
                    name: instructor.name.clone(),
                })
                .collect(),
            StaffRole::Ta => self
                .snapshot
                .tas_by_course
                .get(&variable.course_id)
                .into_iter()
                .flatten()
                .map(|ta| Staff::Ta {
                    id: ta.id,
                    name: ta.name.clone(),
                })
                .collect(),
        }
    }

    /// Hard-constraint check of a candidate against everything already
    /// placed: each variable at most once, and no same-day block overlap
    /// may share a room, a teacher, or a cohort (per the hierarchy rules).
    fn is_consistent(&self, candidate: &Assignment) -> bool {
        let variable = &candidate.variable;

        if self
            .assignments
            .iter()
            .any(|existing| existing.variable.var_id == variable.var_id)
        {
            return false;
        }

        for existing in &self.assignments {
            if !candidate.overlaps(existing) {
                continue;
            }
            if candidate.room_id == existing.room_id {
                return false;
            }
            match (&candidate.staff, &existing.staff) {
                (Staff::Instructor { id: a, .. }, Staff::Instructor { id: b, .. }) if a == b => {
                    return false;
                }
                (Staff::Ta { id: a, .. }, Staff::Ta { id: b, .. }) if a == b => {
                    return false;
                }
                _ => {}
            }
            if hierarchy_clash(variable, &existing.variable) {
                return false;
            }
        }
        true
    }
}

/// Containment clashes between two time-overlapping sessions.
///
/// A group's lecture claims every student of the group, so it excludes any
/// other lecture of the same group and every lab or tutorial of the
/// group's sections. Two labs/tutorials clash only within one section;
/// distinct sections of a group hold distinct students and may overlap.
fn hierarchy_clash(a: &SessionVariable, b: &SessionVariable) -> bool {
    if a.session_type == SessionType::Lecture || b.session_type == SessionType::Lecture {
        a.group_id == b.group_id
    } else {
        a.section_id == b.section_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Day;
    use crate::data::{Group, Section};
    use crate::snapshot::{CatalogInput, StaffRecord};

    fn variable(
        var_id: usize,
        session_type: SessionType,
        group_id: u32,
        section_id: Option<u32>,
    ) -> SessionVariable {
        SessionVariable {
            var_id,
            course_id: 1,
            course_code: "CS101".to_string(),
            course_name: "Intro".to_string(),
            session_type,
            duration_blocks: 2,
            student_count: 20,
            required_room_type: RoomType::Classroom,
            level_id: 1,
            group_id,
            group_number: group_id,
            section_id,
            section_number: section_id,
        }
    }

    fn catalog() -> CatalogInput {
        CatalogInput {
            rooms: vec![
                Room {
                    id: 1,
                    room_number: "B-101".to_string(),
                    building_name: "Main".to_string(),
                    room_type: RoomType::Classroom,
                    capacity: 40,
                },
                Room {
                    id: 2,
                    room_number: "L-1".to_string(),
                    building_name: "Main".to_string(),
                    room_type: RoomType::Lab,
                    capacity: 40,
                },
            ],
            courses: vec![Course {
                id: 1,
                code: "CS101".to_string(),
                name: "Intro".to_string(),
                level_id: 1,
            }],
            instructors: vec![StaffRecord {
                id: 1,
                name: "Dr. Hart".to_string(),
                qualified_courses: vec![1],
            }],
            tas: vec![StaffRecord {
                id: 1,
                name: "N. Osei".to_string(),
                qualified_courses: vec![1],
            }],
            groups: vec![Group {
                id: 1,
                level_id: 1,
                group_number: 1,
                num_students: 12,
            }],
            sections: vec![Section {
                id: 1,
                group_id: 1,
                level_id: 1,
                section_number: 1,
                num_students: 12,
            }],
        }
    }

    #[test]
    fn two_lectures_of_one_group_clash() {
        let a = variable(0, SessionType::Lecture, 1, None);
        let b = variable(1, SessionType::Lecture, 1, None);
        assert!(hierarchy_clash(&a, &b));
    }

    #[test]
    fn lectures_of_different_groups_do_not_clash() {
        let a = variable(0, SessionType::Lecture, 1, None);
        let b = variable(1, SessionType::Lecture, 2, None);
        assert!(!hierarchy_clash(&a, &b));
    }

    #[test]
    fn a_lecture_blocks_its_sections() {
        let lecture = variable(0, SessionType::Lecture, 1, None);
        let lab = variable(1, SessionType::Lab, 1, Some(5));
        assert!(hierarchy_clash(&lecture, &lab));
        assert!(hierarchy_clash(&lab, &lecture));
    }

    #[test]
    fn a_lecture_does_not_block_other_groups_sections() {
        let lecture = variable(0, SessionType::Lecture, 1, None);
        let lab = variable(1, SessionType::Lab, 2, Some(5));
        assert!(!hierarchy_clash(&lecture, &lab));
    }

    #[test]
    fn non_lectures_clash_only_within_one_section() {
        let lab = variable(0, SessionType::Lab, 1, Some(5));
        let tutorial = variable(1, SessionType::Tutorial, 1, Some(5));
        let other_section = variable(2, SessionType::Tutorial, 1, Some(6));
        assert!(hierarchy_clash(&lab, &tutorial));
        assert!(!hierarchy_clash(&lab, &other_section));
    }

    #[test]
    fn domain_enumerates_days_then_blocks_then_rooms_then_staff() {
        let snapshot = Snapshot::load(&catalog()).unwrap();
        let scheduler = Scheduler {
            snapshot: &snapshot,
            variables: Vec::new(),
            assignments: Vec::new(),
        };

        let lecture = variable(0, SessionType::Lecture, 1, None);
        let domain = scheduler.domain(&lecture);
        // 5 days x 4 legal starts x 1 room x 1 instructor
        assert_eq!(domain.len(), 20);
        assert_eq!(domain[0].day, Day::Sunday);
        assert_eq!((domain[0].start_block, domain[0].end_block), (0, 2));
        assert_eq!((domain[1].start_block, domain[1].end_block), (2, 4));
        assert_eq!(domain[4].day, Day::Monday);

        let mut tutorial = variable(1, SessionType::Tutorial, 1, Some(1));
        tutorial.duration_blocks = 1;
        let domain = scheduler.domain(&tutorial);
        // a 1-block session may start on any of the 8 blocks
        assert_eq!(domain.len(), 40);
        assert_eq!((domain[0].start_block, domain[0].end_block), (0, 1));
        assert_eq!((domain[1].start_block, domain[1].end_block), (1, 2));
    }

    #[test]
    fn a_variable_is_never_placed_twice() {
        let snapshot = Snapshot::load(&catalog()).unwrap();
        let mut scheduler = Scheduler {
            snapshot: &snapshot,
            variables: Vec::new(),
            assignments: Vec::new(),
        };
        let lecture = variable(0, SessionType::Lecture, 1, None);
        let domain = scheduler.domain(&lecture);
        scheduler.assignments.push(domain[0].clone());

        // same var id, different slot
        assert!(!scheduler.is_consistent(&domain[5]));
    }

    #[test]
    fn search_reports_no_schedule_when_the_week_is_saturated() {
        let snapshot = Snapshot::load(&catalog()).unwrap();
        let mut scheduler = Scheduler {
            snapshot: &snapshot,
            variables: Vec::new(),
            assignments: Vec::new(),
        };
        scheduler.generate_variables().unwrap();

        // Fill every block of every day with lectures of the same group so
        // each remaining candidate trips a containment clash.
        let mut blocker_id = 1000;
        for day in DAYS {
            for start_block in [0u8, 2, 4, 6] {
                scheduler.assignments.push(Assignment {
                    variable: variable(blocker_id, SessionType::Lecture, 1, None),
                    day,
                    start_block,
                    end_block: start_block + 2,
                    room_id: 99,
                    room_number: "X".to_string(),
                    building_name: "Annex".to_string(),
                    staff: Staff::Instructor {
                        id: 99,
                        name: "Blocker".to_string(),
                    },
                });
                blocker_id += 1;
            }
        }

        let err = scheduler.search().unwrap_err();
        assert!(matches!(err, ScheduleError::NoSchedule));
    }
}
