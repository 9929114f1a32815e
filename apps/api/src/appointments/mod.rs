pub mod acknowledgements;
pub mod aggregation;
pub mod handlers;
pub mod reminders;
pub mod store;
