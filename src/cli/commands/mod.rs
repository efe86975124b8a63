//! Command implementations

pub mod back;
pub mod completions;
pub mod config;
pub mod go;
pub mod next;
pub mod pin;
pub mod reset;
pub mod schema;
pub mod set;
pub mod show;
pub mod start;
pub mod subjects;
pub mod submit;
pub mod utils;
pub mod validate;
