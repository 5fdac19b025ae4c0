pub mod events;
pub mod models;

pub use events::AppEvent;
pub use models::*;
