pub mod bus;
pub mod inventory;
pub mod pagination;
pub mod reservation_repository;

pub use bus::MessagePublisher;
pub use inventory::{InventoryResolution, InventoryResolver};
pub use pagination::{PagedRequest, PagedResponse, ReservationFilter};
pub use reservation_repository::ReservationRepository;
