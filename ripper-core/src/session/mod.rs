pub mod engine;
pub(crate) mod job;
