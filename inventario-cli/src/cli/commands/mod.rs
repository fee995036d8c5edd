//! Command handlers

pub mod backout;
pub mod book;
pub mod diff;
pub mod graph;
pub mod import;
pub mod list;
