pub mod analyzers;
pub mod bindings;
pub mod charts;
pub mod config;
pub mod duration;
pub mod loader;
pub mod output;
pub mod pages;
pub mod records;
pub mod status;
