pub mod filter;
pub mod sampling;
pub mod scoring;
pub mod sort;
pub mod stats;
