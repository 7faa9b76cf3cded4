pub mod aggregator;
pub mod naming;
