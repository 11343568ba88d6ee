//! Test modules for the scanner system
//!
//! Scanner behaviour tests driven through scripted fetchers and counting
//! parsers, so fetch and parse calls can be asserted exactly.

pub mod helpers;
