pub mod error;
pub mod tracker;
