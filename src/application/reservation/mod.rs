mod due_sweep;
mod errors;
mod locks;
mod reservation_service;

pub use due_sweep::check_due;
pub use errors::{ReservationServiceError, Result};
pub use locks::NumberLocks;
pub use reservation_service::{
    ServiceDependencies, expire, get_by_filter, get_by_number, process_return, request,
};
