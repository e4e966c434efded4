pub mod aggregates;
pub(crate) mod response;
