pub mod aggregators;
pub mod bucket;
pub mod config;
pub mod format;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod stats;
