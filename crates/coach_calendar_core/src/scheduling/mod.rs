//! crates/coach_calendar_core/src/scheduling/mod.rs
//!
//! The scheduling engine: month grids, day slots, and booking plans.
//! Every function here is synchronous and works only on the snapshots it is given.

pub mod grid;
pub mod planner;
pub mod slots;

pub use grid::build_month_grid;
pub use planner::{
    bookings_on, has_overlap, plan_booking, plan_deletion, BookingDraft, BookingPlan,
    BookingRequest, Candidate, DeletionRequest, PlanError, PlanResult,
};
pub use slots::{build_day_slots, slot_availability, SlotAvailability};
