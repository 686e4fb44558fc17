pub mod attendance;
pub mod auth;
pub mod complaint;
pub mod event;
pub mod feedback;
pub mod meal;
pub mod menu;
pub mod notification;
pub mod schedule;
pub mod user;
pub mod waste;
