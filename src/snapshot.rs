use crate::data::{
    Course, CourseId, Group, GroupId, Instructor, LevelId, Room, RoomType, Section, Ta,
};
use crate::error::ScheduleError;
use itertools::Itertools;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Read-only view of the academic store the solver runs against.
///
/// Implementations back onto whatever holds the catalog; the solver only
/// ever reads through this trait, once, at the start of a run.
pub trait SnapshotSource {
    fn list_rooms(&self) -> Vec<Room>;
    fn list_courses(&self) -> Vec<Course>;
    fn qualified_instructors(&self, course_id: CourseId) -> Vec<Instructor>;
    fn qualified_tas(&self, course_id: CourseId) -> Vec<Ta>;
    fn groups_of_level(&self, level_id: LevelId) -> Vec<Group>;
    fn sections_of_group(&self, group_id: GroupId) -> Vec<Section>;
}

/// The immutable lookup tables one solver run works from.
///
/// Groups are sorted by group number and sections by section number at
/// load time; together with the course order from `list_courses` this
/// fixes the variable enumeration order for the whole run.
#[derive(Debug)]
pub struct Snapshot {
    pub courses: Vec<Course>,
    pub rooms_by_type: HashMap<RoomType, Vec<Room>>,
    pub instructors_by_course: HashMap<CourseId, Vec<Instructor>>,
    pub tas_by_course: HashMap<CourseId, Vec<Ta>>,
    pub groups_by_level: HashMap<LevelId, Vec<Group>>,
    pub sections_by_group: HashMap<GroupId, Vec<Section>>,
}

impl Snapshot {
    pub fn load(source: &dyn SnapshotSource) -> Result<Self, ScheduleError> {
        let rooms = source.list_rooms();
        let courses = source.list_courses();

        let mut seen_codes = HashSet::new();
        for course in &courses {
            if !seen_codes.insert(course.code.as_str()) {
                return Err(ScheduleError::InvalidInput(format!(
                    "duplicate course code {}",
                    course.code
                )));
            }
        }

        let room_count = rooms.len();
        let rooms_by_type: HashMap<RoomType, Vec<Room>> =
            rooms.into_iter().map(|r| (r.room_type, r)).into_group_map();

        let mut instructors_by_course = HashMap::new();
        let mut tas_by_course = HashMap::new();
        let mut groups_by_level: HashMap<LevelId, Vec<Group>> = HashMap::new();
        let mut sections_by_group: HashMap<GroupId, Vec<Section>> = HashMap::new();

        for course in &courses {
            instructors_by_course.insert(course.id, source.qualified_instructors(course.id));
            tas_by_course.insert(course.id, source.qualified_tas(course.id));

            if groups_by_level.contains_key(&course.level_id) {
                continue;
            }
            let mut groups = source.groups_of_level(course.level_id);
            groups.sort_by_key(|g| g.group_number);
            for group in &groups {
                let mut sections = source.sections_of_group(group.id);
                sections.sort_by_key(|s| s.section_number);
                for section in &sections {
                    if section.num_students == 0 {
                        return Err(ScheduleError::InvalidInput(format!(
                            "section {} of group {} has no students",
                            section.section_number, group.group_number
                        )));
                    }
                }
                sections_by_group.insert(group.id, sections);
            }
            groups_by_level.insert(course.level_id, groups);
        }

        info!(
            "snapshot loaded: {} rooms, {} courses, {} groups",
            room_count,
            courses.len(),
            groups_by_level.values().map(Vec::len).sum::<usize>()
        );

        Ok(Snapshot {
            courses,
            rooms_by_type,
            instructors_by_course,
            tas_by_course,
            groups_by_level,
            sections_by_group,
        })
    }

    /// Rooms of the given type that can seat the cohort, in snapshot order.
    pub fn suitable_rooms(
        &self,
        room_type: RoomType,
        students: u32,
    ) -> impl Iterator<Item = &Room> + '_ {
        self.rooms_by_type
            .get(&room_type)
            .into_iter()
            .flatten()
            .filter(move |room| room.capacity >= students)
    }

    pub fn has_room_for(&self, room_type: RoomType, students: u32) -> bool {
        self.suitable_rooms(room_type, students).next().is_some()
    }
}

/// A complete catalog held in memory.
///
/// Serves as the request body of the generate endpoint and as the test
/// fixture type. Staff qualification is carried on the staff record as the
/// set of course ids the person may teach.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogInput {
    pub rooms: Vec<Room>,
    pub courses: Vec<Course>,
    pub instructors: Vec<StaffRecord>,
    pub tas: Vec<StaffRecord>,
    pub groups: Vec<Group>,
    pub sections: Vec<Section>,
}

/// A staff member plus the courses they are qualified to teach.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffRecord {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub qualified_courses: Vec<CourseId>,
}

impl SnapshotSource for CatalogInput {
    fn list_rooms(&self) -> Vec<Room> {
        self.rooms.clone()
    }

    fn list_courses(&self) -> Vec<Course> {
        self.courses.clone()
    }

    fn qualified_instructors(&self, course_id: CourseId) -> Vec<Instructor> {
        self.instructors
            .iter()
            .filter(|record| record.qualified_courses.contains(&course_id))
            .map(|record| Instructor {
                id: record.id,
                name: record.name.clone(),
            })
            .collect()
    }

    fn qualified_tas(&self, course_id: CourseId) -> Vec<Ta> {
        self.tas
            .iter()
            .filter(|record| record.qualified_courses.contains(&course_id))
            .map(|record| Ta {
                id: record.id,
                name: record.name.clone(),
            })
            .collect()
    }

    fn groups_of_level(&self, level_id: LevelId) -> Vec<Group> {
        self.groups
            .iter()
            .filter(|group| group.level_id == level_id)
            .cloned()
            .collect()
    }

    fn sections_of_group(&self, group_id: GroupId) -> Vec<Section> {
        self.sections
            .iter()
            .filter(|section| section.group_id == group_id)
            .cloned()
            .collect()
    }
}
