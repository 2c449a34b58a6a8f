pub mod db;
pub mod memory;

pub use db::PgBookingStore;
pub use memory::MemoryBookingStore;
