//! Conflict-free weekly university timetables via backtracking CSP search.
//!
//! The solver consumes an immutable snapshot of the academic catalog
//! (rooms, courses, staff qualifications, cohorts), derives one session
//! variable per required teaching session, and assigns each a
//! (day, block range, room, teacher) tuple that satisfies every hard
//! constraint. Persistence and the HTTP surface sit behind adapters so the
//! core stays a pure function of the snapshot.

pub mod calendar;
pub mod data;
pub mod error;
pub mod persist;
pub mod server;
pub mod snapshot;
pub mod solver;
