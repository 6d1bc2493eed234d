pub mod completions;
pub mod config;
pub mod console;
pub mod info;
pub mod scan;
