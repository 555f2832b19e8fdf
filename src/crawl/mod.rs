// Site crawling — fetching, frontier control and text extraction.

pub mod crawler;
pub mod extract;
pub mod fetcher;
pub mod frontier;
pub mod retry;
