#![allow(dead_code)]

pub mod stub_fetcher;

pub use stub_fetcher::*;

/// Owned identifiers from string literals
pub fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
