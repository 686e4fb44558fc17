pub mod attendance;
pub mod complaints;
pub mod events;
pub mod feedback;
pub mod meals;
pub mod menu;
pub mod metrics;
pub mod notifications;
pub mod schedule;
pub mod waste;
