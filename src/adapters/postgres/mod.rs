pub mod inventory;
pub mod reservation_repository;

// パブリックに型を再エクスポート
pub use inventory::InventoryResolver as PostgresInventoryResolver;
pub use reservation_repository::ReservationRepository as PostgresReservationRepository;
