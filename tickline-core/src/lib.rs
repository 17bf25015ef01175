pub mod config;
pub mod env_filter;
pub mod input;
pub mod merge;
pub mod model;
pub mod rollup;
pub mod status;
pub mod ticks;
