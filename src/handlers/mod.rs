pub mod auth;
pub mod bookings;
pub mod catalog;
pub mod community;
pub mod guest;
pub mod notifications;
pub mod provider;
