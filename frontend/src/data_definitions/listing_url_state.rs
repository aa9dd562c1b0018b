//! The part of a listing worth putting in the address bar.

use common::search_query::{FacetSelections, SearchTerm};
use serde::{Deserialize, Serialize};

use crate::data_definitions::url_param::UrlParam;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingUrlState {
    pub search_term: SearchTerm,
    pub facet_filters: FacetSelections,
    pub page_index: u64,
}

impl Default for ListingUrlState {
    fn default() -> Self {
        Self {
            search_term: SearchTerm::default(),
            facet_filters: FacetSelections::default(),
            page_index: 1,
        }
    }
}

impl ListingUrlState {
    pub fn to_url_param(&self) -> String {
        UrlParam(self.clone()).to_string()
    }

    /// Falls back to the default state on anything unparseable, so a mangled
    /// link opens the unfiltered first page.
    pub fn from_url_param(param: &str) -> Self {
        param
            .parse::<UrlParam<ListingUrlState>>()
            .map(|p| p.0)
            .unwrap_or_else(|e| {
                tracing::info!("ignoring listing url state: {e}");
                Self::default()
            })
    }
}
