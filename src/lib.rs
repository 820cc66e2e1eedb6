//! Appcast Notes - a release notes viewer core
//!
//! This crate fetches a Sparkle-style appcast feed, extracts its release
//! entries, and renders them as a self-contained HTML document for a host
//! view to display in an embedded browser surface.

pub mod config;
pub mod parser;
pub mod record;
pub mod render;
pub mod view;
