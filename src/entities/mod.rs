pub mod activity;
pub mod anonymous_guest;
pub mod badge;
pub mod booking;
pub mod notification;
pub mod photo;
pub mod place;
pub mod review;
pub mod tip;
pub mod user;
pub mod user_badge;
