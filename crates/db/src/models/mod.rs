pub mod case;
pub mod case_client;
pub mod case_handler;
pub mod case_notification;
pub mod lawsuit;
pub mod organization;
pub mod party;
pub mod personal_notification;
pub mod recovery_activity;
pub mod schedule;
pub mod submission;
pub mod user;
