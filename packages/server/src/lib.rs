//! Line-oriented broadcast chat server library.
//!
//! Clients connect over TCP, pick a unique display name and exchange text
//! lines that are broadcast to every participant. A bounded history of recent
//! lines is kept for late joiners and for pollers of the HTTP facade.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
