pub mod logging;
pub mod mock;
pub mod postgres;
