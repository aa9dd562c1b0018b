//! Common library exports shared between frontend and backend.

extern crate serde;


pub mod search_const;
pub mod search_query;
pub mod search_result;
pub mod facet_catalog;
pub mod query_composer;
pub mod listing_schema;
pub mod pagination;
