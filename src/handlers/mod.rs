pub mod clubs;
pub mod events;
pub mod health;

pub use clubs::clubs_config;
pub use events::events_config;
pub use health::health_check;
