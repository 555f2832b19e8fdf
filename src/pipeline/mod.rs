// Pipeline orchestration — crawling, vectorizing and differencing a snapshot.

pub mod snapshot;
