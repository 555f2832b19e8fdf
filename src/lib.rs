// SitePulse: competitive website vocabulary snapshots
//
// This is the library root. Each module corresponds to a stage of the
// crawl → normalize → vectorize → differ pipeline.

pub mod cache;
pub mod config;
pub mod crawl;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod site;
pub mod status;
pub mod text;
pub mod topics;
