pub mod aggregator;
pub mod calculator;
pub mod ingest;
pub mod normalizer;
pub mod ranker;
pub mod report;
