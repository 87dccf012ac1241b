pub mod agent;
pub mod catalog;
pub mod digest;
pub mod schedule;
pub mod tooling;
