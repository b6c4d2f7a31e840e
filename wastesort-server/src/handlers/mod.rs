//! HTTP handlers

pub mod download;
pub mod health;
pub mod stats;
pub mod upload;

#[cfg(test)]
mod tests;
