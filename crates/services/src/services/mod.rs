pub mod case_events;
pub mod events;
pub mod lawsuit_changes;
pub mod notification;
pub mod recipients;
pub mod store;
