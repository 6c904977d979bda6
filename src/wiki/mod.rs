mod client;
mod crawler;
mod markup;
mod parser;
mod response;

pub use client::WikiClient;
pub use crawler::{IngestReport, Ingestor};
#[cfg(test)]
pub use crawler::SkippedPage;
