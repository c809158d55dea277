use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::grid::ScheduleGrid;

// Type aliases for clarity
pub type CourseName = String;
pub type TeacherName = String;
pub type Day = usize;
pub type Timeslot = usize;
pub type RoomIndex = usize;

/// Number of teaching days in the scheduling horizon (Monday to Friday).
pub const DAYS_PER_WEEK: usize = 5;

pub const DAY_NAMES: [&str; DAYS_PER_WEEK] =
    ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

/// A session pinned to a fixed cell by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PreAssignment {
    pub course: CourseName,
    pub day: Day,
    pub timeslot: Timeslot,
    pub room: RoomIndex,
}

/// The complete input for the scheduling problem.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingInput {
    pub courses: Vec<CourseName>,
    pub conflicts: HashMap<CourseName, Vec<CourseName>>,
    pub room_capacities: Vec<u32>,
    pub course_sizes: HashMap<CourseName, u32>,
    pub teachers: HashMap<CourseName, TeacherName>,
    pub repetitions: HashMap<CourseName, u32>,
    /// Pins applied in list order before greedy placement. `Some` (even empty)
    /// switches the engine to ordering by outstanding demand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_assignments: Option<Vec<PreAssignment>>,
    /// Defaults to the number of rooms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeslots_per_day: Option<usize>,
}

/// Represents a single placed session, flattened out of the grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub day: Day,
    pub timeslot: Timeslot,
    pub room: RoomIndex,
    pub course: CourseName,
    pub teacher: TeacherName,
    pub pinned: bool,
}

/// The final output of the solver.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingOutput {
    pub schedule: ScheduleGrid,
    pub assignments: Vec<Assignment>,
    pub elapsed_ms: u128,
}

#[cfg(test)]
pub mod fixtures {
    use super::*;

    fn owned<V: Clone>(pairs: &[(&str, V)]) -> HashMap<CourseName, V> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    /// Seven courses over three rooms (50/40/20 seats).
    pub fn reference_input() -> SchedulingInput {
        let conflicts: &[(&str, Vec<String>)] = &[
            ("Math", vec!["Physics".into(), "Chemistry".into()]),
            ("Physics", vec!["Math".into(), "Biology".into(), "Electronics".into()]),
            ("Chemistry", vec!["Math".into(), "Biology".into()]),
            ("Biology", vec!["Physics".into(), "Chemistry".into()]),
            ("Computer Science", vec![]),
            ("Statistics", vec![]),
            ("Electronics", vec!["Physics".into()]),
        ];
        SchedulingInput {
            courses: [
                "Math",
                "Physics",
                "Chemistry",
                "Biology",
                "Computer Science",
                "Statistics",
                "Electronics",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            conflicts: owned(conflicts),
            room_capacities: vec![50, 40, 20],
            course_sizes: owned(&[
                ("Math", 20),
                ("Physics", 20),
                ("Chemistry", 30),
                ("Biology", 30),
                ("Computer Science", 40),
                ("Statistics", 40),
                ("Electronics", 40),
            ]),
            teachers: owned(&[
                ("Math", "Mr A".to_string()),
                ("Physics", "Mr A".to_string()),
                ("Chemistry", "Mr B".to_string()),
                ("Biology", "Mr B".to_string()),
                ("Computer Science", "Mr C".to_string()),
                ("Statistics", "Mr D".to_string()),
                ("Electronics", "Mr E".to_string()),
            ]),
            repetitions: owned(&[
                ("Math", 5),
                ("Physics", 4),
                ("Chemistry", 1),
                ("Biology", 1),
                ("Computer Science", 3),
                ("Statistics", 1),
                ("Electronics", 1),
            ]),
            pre_assignments: None,
            timeslots_per_day: None,
        }
    }

    pub fn pin(course: &str, day: Day, timeslot: Timeslot, room: RoomIndex) -> PreAssignment {
        PreAssignment {
            course: course.to_string(),
            day,
            timeslot,
            room,
        }
    }
}
