pub mod cli;
pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod request;
pub mod staging;
pub mod storage;
pub mod util;
