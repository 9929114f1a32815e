pub mod appointment;
pub mod document;
pub mod queue;
pub mod user;
