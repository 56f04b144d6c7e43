//! File export of plans and timelines.

pub mod export;
