pub mod attendance;
pub mod auth;
pub mod backup;
pub mod calendar;
pub mod catalog;
pub mod core;
pub mod dashboard;
pub mod demands;
pub mod documents;
pub mod finance;
pub mod insight;
pub mod meetings;
pub mod occurrences;
pub mod people;
