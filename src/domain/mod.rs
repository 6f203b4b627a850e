pub mod events;
pub mod messages;
pub mod reservation;
pub mod value_objects;

pub use events::*;
pub use messages::*;
pub use value_objects::*;
