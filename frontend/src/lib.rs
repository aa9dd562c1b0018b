//! Faceted listing engine: settles search input, composes queries, keeps only
//! the newest response and derives the pagination the page renders.

pub mod api;
pub mod components;
pub mod config;
pub mod data_definitions;
pub mod listing;
