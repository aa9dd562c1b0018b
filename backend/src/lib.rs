//! ClickHouse-backed query service for the faceted listing views.

pub mod api;
pub mod db_utils;
