use crate::data::{DAYS_PER_WEEK, PreAssignment, SchedulingInput, SchedulingOutput};
use crate::error::{ScheduleError, ScheduleResult};
use crate::grid::{Occupant, ScheduleGrid, TeacherLedger};
use crate::model::{ConstraintModel, CourseIdx};
use itertools::Itertools;
use log::{debug, info, trace, warn};
use std::cmp::Reverse;
use std::time::Instant;

pub const DEFAULT_MAX_PASSES_PER_COURSE: usize = 16;

/// Order in which courses get to claim cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    /// Larger classes first, so they get the big rooms.
    LargestEnrollment,
    /// Courses with the most sessions still outstanding first.
    MostOutstandingDemand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Hard cap on full-week passes for a single course.
    pub max_passes_per_course: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_passes_per_course: DEFAULT_MAX_PASSES_PER_COURSE,
        }
    }
}

/// Builds a timetable with first-fit greedy placement.
///
/// Pins are applied first when `input.pre_assignments` is present, and the
/// remaining demand is then ordered by outstanding sessions. Otherwise courses
/// are ordered by enrollment. Ties keep the input course order.
pub fn solve(input: &SchedulingInput, options: EngineOptions) -> ScheduleResult<SchedulingOutput> {
    let start_time = Instant::now();
    let model = ConstraintModel::from_input(input)?;
    info!(
        "Scheduling {} courses over {} days, {} timeslots and {} rooms...",
        model.courses().len(),
        DAYS_PER_WEEK,
        model.timeslots_per_day(),
        model.room_count()
    );

    let mut engine = Engine::new(&model, options);
    let priority = match &input.pre_assignments {
        Some(pins) => {
            engine.apply_pre_assignments(pins)?;
            Priority::MostOutstandingDemand
        }
        None => Priority::LargestEnrollment,
    };
    engine.place_all(priority)?;

    let schedule = engine.into_grid();
    let duration = start_time.elapsed();
    let assignments = schedule.assignments();
    info!(
        "Placed {} sessions in {:.2?}",
        assignments.len(),
        duration
    );

    Ok(SchedulingOutput {
        schedule,
        assignments,
        elapsed_ms: duration.as_millis(),
    })
}

/// Mutable state of one scheduling run. `remaining` starts as a copy of each
/// course's required repetitions and is the only state shared between the pin
/// and greedy phases.
struct Engine<'m> {
    model: &'m ConstraintModel,
    options: EngineOptions,
    grid: ScheduleGrid,
    ledger: TeacherLedger,
    remaining: Vec<u32>,
}

impl<'m> Engine<'m> {
    fn new(model: &'m ConstraintModel, options: EngineOptions) -> Self {
        Self {
            model,
            options,
            grid: ScheduleGrid::new(model.timeslots_per_day()),
            ledger: TeacherLedger::default(),
            remaining: model.courses().iter().map(|c| c.repetitions).collect(),
        }
    }

    fn into_grid(self) -> ScheduleGrid {
        self.grid
    }

    /// Writes pinned sessions without any constraint checks. Every pin is
    /// range-checked before the first one is applied.
    fn apply_pre_assignments(&mut self, pins: &[PreAssignment]) -> ScheduleResult<()> {
        let model = self.model;
        let resolved = pins
            .iter()
            .map(|pin| self.resolve_pin(pin).map(|idx| (idx, pin)))
            .collect::<ScheduleResult<Vec<_>>>()?;

        for (idx, pin) in resolved {
            if self.remaining[idx] == 0 {
                warn!(
                    "Skipping pin of {} at day {} timeslot {}: no sessions left",
                    pin.course, pin.day, pin.timeslot
                );
                continue;
            }

            let course = model.course(idx);
            let occupant = Occupant {
                course_idx: idx,
                course: course.name.clone(),
                teacher: course.teacher.clone(),
                pinned: true,
            };
            if let Some(evicted) = self.grid.place(pin.day, pin.timeslot, pin.room, occupant) {
                warn!(
                    "Pin of {} evicts {} from day {} timeslot {} room {}",
                    pin.course, evicted.course, pin.day, pin.timeslot, pin.room
                );
                self.remaining[evicted.course_idx] += 1;
                let still_teaching = self
                    .grid
                    .cell(pin.day, pin.timeslot)
                    .any(|o| o.teacher == evicted.teacher);
                if !still_teaching {
                    self.ledger.release(&evicted.teacher, pin.day, pin.timeslot);
                }
            }
            self.ledger.book(&course.teacher, pin.day, pin.timeslot);
            self.remaining[idx] -= 1;
            debug!(
                "Pinned {} to day {} timeslot {} room {}",
                pin.course, pin.day, pin.timeslot, pin.room
            );
        }
        Ok(())
    }

    fn resolve_pin(&self, pin: &PreAssignment) -> ScheduleResult<CourseIdx> {
        let reject = |reason: String| ScheduleError::InvalidPreAssignment {
            course: pin.course.clone(),
            reason,
        };
        let idx = self
            .model
            .course_index(&pin.course)
            .ok_or_else(|| reject("unknown course".to_string()))?;
        if pin.day >= DAYS_PER_WEEK {
            return Err(reject(format!(
                "day {} is outside 0..{}",
                pin.day, DAYS_PER_WEEK
            )));
        }
        if pin.timeslot >= self.model.timeslots_per_day() {
            return Err(reject(format!(
                "timeslot {} is outside 0..{}",
                pin.timeslot,
                self.model.timeslots_per_day()
            )));
        }
        if pin.room >= self.model.room_count() {
            return Err(reject(format!(
                "room {} is outside 0..{}",
                pin.room,
                self.model.room_count()
            )));
        }
        Ok(idx)
    }

    fn place_all(&mut self, priority: Priority) -> ScheduleResult<()> {
        let model = self.model;
        let order: Vec<CourseIdx> = match priority {
            Priority::LargestEnrollment => (0..model.courses().len())
                .sorted_by_key(|&i| Reverse(model.course(i).size))
                .collect(),
            Priority::MostOutstandingDemand => (0..model.courses().len())
                .sorted_by_key(|&i| Reverse(self.remaining[i]))
                .collect(),
        };
        trace!(
            "Placement order: {}",
            order.iter().map(|&i| &model.course(i).name).join(", ")
        );

        for idx in order {
            self.place_course(idx)?;
        }
        Ok(())
    }

    /// Runs full-week passes until the course's demand is met. A pass that
    /// places nothing is final.
    fn place_course(&mut self, idx: CourseIdx) -> ScheduleResult<()> {
        let mut passes = 0;
        while self.remaining[idx] > 0 {
            if passes == self.options.max_passes_per_course || self.run_pass(idx) == 0 {
                return Err(ScheduleError::UnsatisfiableDemand {
                    course: self.model.course(idx).name.clone(),
                    remaining: self.remaining[idx],
                });
            }
            passes += 1;
        }
        Ok(())
    }

    /// One scan over days, timeslots and rooms; at most one placement per day.
    fn run_pass(&mut self, idx: CourseIdx) -> usize {
        let model = self.model;
        let course = model.course(idx);
        let mut placed = 0;

        for day in 0..DAYS_PER_WEEK {
            if self.remaining[idx] == 0 {
                break;
            }
            if self.grid.course_on_day(day, idx) {
                continue;
            }
            for timeslot in 0..model.timeslots_per_day() {
                if self.ledger.is_busy(&course.teacher, day, timeslot) {
                    trace!(
                        "{} busy on day {} timeslot {}",
                        course.teacher, day, timeslot
                    );
                    continue;
                }
                let Some(room) = self.first_fit(idx, day, timeslot) else {
                    continue;
                };

                self.grid.place(
                    day,
                    timeslot,
                    room,
                    Occupant {
                        course_idx: idx,
                        course: course.name.clone(),
                        teacher: course.teacher.clone(),
                        pinned: false,
                    },
                );
                self.ledger.book(&course.teacher, day, timeslot);
                self.remaining[idx] -= 1;
                placed += 1;
                debug!(
                    "Placed {} on day {} timeslot {} room {} ({} left)",
                    course.name, day, timeslot, room, self.remaining[idx]
                );
                break;
            }
        }
        placed
    }

    /// First room in index order that is free, large enough, and not shared
    /// with a conflicting course in this (day, timeslot).
    fn first_fit(&self, idx: CourseIdx, day: usize, timeslot: usize) -> Option<usize> {
        let size = self.model.course(idx).size;
        if self
            .grid
            .cell(day, timeslot)
            .any(|o| self.model.conflicts(idx, o.course_idx))
        {
            return None;
        }
        self.model
            .room_capacities()
            .iter()
            .enumerate()
            .find(|&(room, &capacity)| {
                capacity >= size && self.grid.get(day, timeslot, room).is_none()
            })
            .map(|(room, _)| room)
    }
}
