use std::collections::{HashMap, HashSet};

use crate::data::{CourseName, SchedulingInput, TeacherName};
use crate::error::{ScheduleError, ScheduleResult};

pub type CourseIdx = usize;

// upper bounds on the grid; a pass scans timeslots x rooms per day
pub const MAX_TIMESLOTS_PER_DAY: usize = 96;
pub const MAX_ROOMS: usize = 256;

/// Represents a course to be scheduled.
#[derive(Debug, Clone)]
pub struct CourseSpec {
    pub name: CourseName,
    pub size: u32,
    pub teacher: TeacherName,
    pub repetitions: u32,
    /// Courses that may never share a (day, timeslot) with this one, as given.
    pub conflicts: HashSet<CourseIdx>,
}

#[derive(Debug, Clone)]
pub struct ConstraintModel {
    courses: Vec<CourseSpec>,
    index: HashMap<CourseName, CourseIdx>,
    room_capacities: Vec<u32>,
    timeslots_per_day: usize,
}

impl ConstraintModel {
    /// Builds the model, rejecting any inconsistency between the course list and
    /// the per-course tables before anything is scheduled.
    pub fn from_input(input: &SchedulingInput) -> ScheduleResult<Self> {
        let mut index = HashMap::with_capacity(input.courses.len());
        for (idx, name) in input.courses.iter().enumerate() {
            if index.insert(name.clone(), idx).is_some() {
                return Err(invalid(format!("duplicate course '{name}'")));
            }
        }

        check_keys("conflicts", input.conflicts.keys(), &index)?;
        check_keys("courseSizes", input.course_sizes.keys(), &index)?;
        check_keys("teachers", input.teachers.keys(), &index)?;
        check_keys("repetitions", input.repetitions.keys(), &index)?;

        if input.room_capacities.len() > MAX_ROOMS {
            return Err(invalid(format!(
                "{} rooms exceed the limit of {MAX_ROOMS}",
                input.room_capacities.len()
            )));
        }
        if let Some(pos) = input.room_capacities.iter().position(|&c| c == 0) {
            return Err(invalid(format!("room {pos} has zero capacity")));
        }
        let timeslots_per_day = match input.timeslots_per_day {
            Some(0) => return Err(invalid("timeslotsPerDay must be positive".to_string())),
            Some(n) => n,
            None => input.room_capacities.len(),
        };
        if timeslots_per_day > MAX_TIMESLOTS_PER_DAY {
            return Err(invalid(format!(
                "{timeslots_per_day} timeslots per day exceed the limit of {MAX_TIMESLOTS_PER_DAY}"
            )));
        }

        let mut courses = Vec::with_capacity(input.courses.len());
        for name in &input.courses {
            let size = *lookup("courseSizes", &input.course_sizes, name)?;
            if size == 0 {
                return Err(invalid(format!("course '{name}' has zero enrollment")));
            }
            let teacher = lookup("teachers", &input.teachers, name)?.clone();
            let repetitions = *lookup("repetitions", &input.repetitions, name)?;
            let conflicts = lookup("conflicts", &input.conflicts, name)?
                .iter()
                .map(|other| {
                    index.get(other).copied().ok_or_else(|| {
                        invalid(format!("course '{name}' conflicts with unknown course '{other}'"))
                    })
                })
                .collect::<ScheduleResult<HashSet<_>>>()?;

            courses.push(CourseSpec {
                name: name.clone(),
                size,
                teacher,
                repetitions,
                conflicts,
            });
        }

        Ok(Self {
            courses,
            index,
            room_capacities: input.room_capacities.clone(),
            timeslots_per_day,
        })
    }

    pub fn courses(&self) -> &[CourseSpec] {
        &self.courses
    }

    pub fn course(&self, idx: CourseIdx) -> &CourseSpec {
        &self.courses[idx]
    }

    pub fn course_index(&self, name: &str) -> Option<CourseIdx> {
        self.index.get(name).copied()
    }

    pub fn room_capacities(&self) -> &[u32] {
        &self.room_capacities
    }

    pub fn room_count(&self) -> usize {
        self.room_capacities.len()
    }

    pub fn timeslots_per_day(&self) -> usize {
        self.timeslots_per_day
    }

    /// True when `a` lists `b` as a conflict. Not symmetric unless the input is.
    pub fn conflicts(&self, a: CourseIdx, b: CourseIdx) -> bool {
        self.courses[a].conflicts.contains(&b)
    }
}

fn invalid(msg: String) -> ScheduleError {
    ScheduleError::InvalidModel(msg)
}

fn check_keys<'a>(
    table: &str,
    keys: impl Iterator<Item = &'a CourseName>,
    index: &HashMap<CourseName, CourseIdx>,
) -> ScheduleResult<()> {
    // sorted so the reported course does not depend on hash order
    let mut unknown: Vec<&CourseName> = keys.filter(|k| !index.contains_key(*k)).collect();
    unknown.sort();
    match unknown.first() {
        Some(name) => Err(invalid(format!("{table} references unknown course '{name}'"))),
        None => Ok(()),
    }
}

fn lookup<'a, V>(
    table: &str,
    map: &'a HashMap<CourseName, V>,
    course: &str,
) -> ScheduleResult<&'a V> {
    map.get(course)
        .ok_or_else(|| invalid(format!("course '{course}' has no entry in {table}")))
}
