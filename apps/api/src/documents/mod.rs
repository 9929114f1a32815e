pub mod extraction;
pub mod grouping;
pub mod handlers;
pub mod prompts;
pub mod search;
pub mod store;
pub mod transform;
