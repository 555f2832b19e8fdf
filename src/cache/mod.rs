// Persistent run state — site text cache and atomic output files.

pub mod atomic;
pub mod site_cache;
