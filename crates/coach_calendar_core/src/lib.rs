pub mod domain;
pub mod ports;
pub mod scheduling;

pub use domain::{
    Booking, CalendarDay, CallType, Client, MonthRef, NewBooking, TimeSlot, UnknownCallType,
};
pub use ports::{BookingStore, PortError, PortResult};
pub use scheduling::{
    build_day_slots, build_month_grid, bookings_on, has_overlap, plan_booking, plan_deletion,
    slot_availability, BookingDraft, BookingPlan, BookingRequest, Candidate, DeletionRequest,
    PlanError, PlanResult, SlotAvailability,
};
