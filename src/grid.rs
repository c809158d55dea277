use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use crate::data::{
    Assignment, CourseName, DAY_NAMES, DAYS_PER_WEEK, Day, RoomIndex, TeacherName, Timeslot,
};
use crate::model::CourseIdx;

/// Whoever sits in one (day, timeslot, room) cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occupant {
    #[serde(skip)]
    pub course_idx: CourseIdx,
    pub course: CourseName,
    pub teacher: TeacherName,
    pub pinned: bool,
}

pub type Cell = BTreeMap<RoomIndex, Occupant>;
pub type DaySchedule = BTreeMap<Timeslot, Cell>;

/// Sparse day -> timeslot -> room -> occupant mapping. Every day of the week is
/// present; timeslots and rooms only appear once something is placed there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleGrid {
    timeslots_per_day: usize,
    days: BTreeMap<Day, DaySchedule>,
}

impl ScheduleGrid {
    pub fn new(timeslots_per_day: usize) -> Self {
        Self {
            timeslots_per_day,
            days: (0..DAYS_PER_WEEK).map(|d| (d, DaySchedule::new())).collect(),
        }
    }

    pub fn timeslots_per_day(&self) -> usize {
        self.timeslots_per_day
    }

    pub fn get(&self, day: Day, timeslot: Timeslot, room: RoomIndex) -> Option<&Occupant> {
        self.days.get(&day)?.get(&timeslot)?.get(&room)
    }

    /// Occupants sharing one (day, timeslot), across all rooms.
    pub fn cell(&self, day: Day, timeslot: Timeslot) -> impl Iterator<Item = &Occupant> {
        self.days
            .get(&day)
            .and_then(|d| d.get(&timeslot))
            .into_iter()
            .flat_map(|rooms| rooms.values())
    }

    /// Writes `occupant` into the cell and returns whoever was there before.
    pub fn place(
        &mut self,
        day: Day,
        timeslot: Timeslot,
        room: RoomIndex,
        occupant: Occupant,
    ) -> Option<Occupant> {
        self.days
            .entry(day)
            .or_default()
            .entry(timeslot)
            .or_default()
            .insert(room, occupant)
    }

    pub fn course_on_day(&self, day: Day, course: CourseIdx) -> bool {
        self.days.get(&day).is_some_and(|d| {
            d.values()
                .flat_map(|rooms| rooms.values())
                .any(|o| o.course_idx == course)
        })
    }

    pub fn occupants(&self) -> impl Iterator<Item = (Day, Timeslot, RoomIndex, &Occupant)> {
        self.days.iter().flat_map(|(&day, slots)| {
            slots.iter().flat_map(move |(&timeslot, rooms)| {
                rooms
                    .iter()
                    .map(move |(&room, occupant)| (day, timeslot, room, occupant))
            })
        })
    }

    /// Flattened view in (day, timeslot, room) order.
    pub fn assignments(&self) -> Vec<Assignment> {
        self.occupants()
            .map(|(day, timeslot, room, o)| Assignment {
                day,
                timeslot,
                room,
                course: o.course.clone(),
                teacher: o.teacher.clone(),
                pinned: o.pinned,
            })
            .collect()
    }

    #[cfg(test)]
    pub fn session_count(&self, course: &str) -> usize {
        self.occupants().filter(|(_, _, _, o)| o.course == course).count()
    }
}

impl fmt::Display for ScheduleGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Course Timetable (Day-wise Schedule):")?;
        for (day, slots) in &self.days {
            let name = DAY_NAMES.get(*day).copied().unwrap_or("Unknown");
            writeln!(f)?;
            writeln!(f, "{name}:")?;
            for timeslot in 0..self.timeslots_per_day() {
                match slots.get(&timeslot).filter(|rooms| !rooms.is_empty()) {
                    Some(rooms) => {
                        for (room, o) in rooms {
                            writeln!(
                                f,
                                "  Timeslot {}: {} (Room: R{}, Teacher: {})",
                                timeslot + 1,
                                o.course,
                                room + 1,
                                o.teacher
                            )?;
                        }
                    }
                    None => writeln!(f, "  Timeslot {}: No Class", timeslot + 1)?,
                }
            }
        }
        Ok(())
    }
}

/// Which timeslots each teacher already has booked, per day.
#[derive(Debug, Clone, Default)]
pub struct TeacherLedger {
    booked: HashMap<TeacherName, [BTreeSet<Timeslot>; DAYS_PER_WEEK]>,
}

impl TeacherLedger {
    pub fn is_busy(&self, teacher: &str, day: Day, timeslot: Timeslot) -> bool {
        self.booked
            .get(teacher)
            .and_then(|days| days.get(day))
            .is_some_and(|slots| slots.contains(&timeslot))
    }

    pub fn book(&mut self, teacher: &str, day: Day, timeslot: Timeslot) {
        let days = self.booked.entry(teacher.to_string()).or_default();
        if let Some(slots) = days.get_mut(day) {
            slots.insert(timeslot);
        }
    }

    pub fn release(&mut self, teacher: &str, day: Day, timeslot: Timeslot) {
        if let Some(slots) = self.booked.get_mut(teacher).and_then(|d| d.get_mut(day)) {
            slots.remove(&timeslot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occupant(idx: CourseIdx, course: &str, teacher: &str) -> Occupant {
        Occupant {
            course_idx: idx,
            course: course.to_string(),
            teacher: teacher.to_string(),
            pinned: false,
        }
    }

    #[test]
    fn new_grid_has_every_day_and_no_occupants() {
        let grid = ScheduleGrid::new(3);
        assert_eq!(grid.days.len(), DAYS_PER_WEEK);
        assert_eq!(grid.occupants().count(), 0);
        assert!(grid.get(0, 0, 0).is_none());
    }

    #[test]
    fn place_returns_evicted_occupant() {
        let mut grid = ScheduleGrid::new(2);
        assert!(grid.place(1, 0, 1, occupant(0, "Art", "Ms Z")).is_none());
        let evicted = grid.place(1, 0, 1, occupant(1, "Music", "Mr Y")).unwrap();
        assert_eq!(evicted.course, "Art");
        assert_eq!(grid.get(1, 0, 1).unwrap().course, "Music");
        assert_eq!(grid.session_count("Art"), 0);
    }

    #[test]
    fn course_on_day_looks_across_timeslots_and_rooms() {
        let mut grid = ScheduleGrid::new(3);
        grid.place(2, 1, 0, occupant(4, "Art", "Ms Z"));
        assert!(grid.course_on_day(2, 4));
        assert!(!grid.course_on_day(1, 4));
        assert!(!grid.course_on_day(2, 5));
        assert_eq!(grid.cell(2, 1).count(), 1);
        assert_eq!(grid.cell(2, 0).count(), 0);
    }

    #[test]
    fn assignments_are_in_grid_order() {
        let mut grid = ScheduleGrid::new(2);
        grid.place(3, 1, 0, occupant(0, "Art", "Ms Z"));
        grid.place(0, 1, 1, occupant(1, "Music", "Mr Y"));
        grid.place(0, 1, 0, occupant(2, "Dance", "Mr X"));
        let order: Vec<_> = grid
            .assignments()
            .into_iter()
            .map(|a| (a.day, a.timeslot, a.room))
            .collect();
        assert_eq!(order, vec![(0, 1, 0), (0, 1, 1), (3, 1, 0)]);
    }

    #[test]
    fn display_marks_empty_timeslots() {
        let mut grid = ScheduleGrid::new(2);
        grid.place(0, 1, 2, occupant(0, "Art", "Ms Z"));
        let text = grid.to_string();
        let monday: Vec<&str> = text.lines().skip(2).take(3).collect();
        assert_eq!(
            monday,
            vec![
                "Monday:",
                "  Timeslot 1: No Class",
                "  Timeslot 2: Art (Room: R3, Teacher: Ms Z)",
            ]
        );
        assert!(text.starts_with("Course Timetable (Day-wise Schedule):\n\nMonday:"));
        assert!(text.contains("\nFriday:\n  Timeslot 1: No Class\n  Timeslot 2: No Class\n"));
    }

    #[test]
    fn ledger_books_and_releases() {
        let mut ledger = TeacherLedger::default();
        assert!(!ledger.is_busy("Mr A", 0, 1));
        ledger.book("Mr A", 0, 1);
        assert!(ledger.is_busy("Mr A", 0, 1));
        assert!(!ledger.is_busy("Mr A", 1, 1));
        assert!(!ledger.is_busy("Mr B", 0, 1));
        ledger.release("Mr A", 0, 1);
        assert!(!ledger.is_busy("Mr A", 0, 1));
    }
}
