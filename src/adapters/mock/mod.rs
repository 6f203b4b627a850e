pub mod bus;
pub mod inventory;
pub mod repository;

pub use bus::InMemoryBus;
pub use inventory::InventoryResolver;
pub use repository::InMemoryReservationRepository;
