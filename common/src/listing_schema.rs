//! Per-view configuration of the listing engine.
//!
//! Every faceted listing (the automation directory, the job board) runs the
//! same engine; only the table, the searchable fields and the facet catalog
//! differ.

use serde::{Deserialize, Serialize};

use crate::{
    facet_catalog::{AliasTable, FacetDefinition, FilterCatalog},
    query_composer,
    search_const::{DEFAULT_ID_COLUMN, PAGE_SIZE},
    search_query::{FacetSelections, QueryDescriptor, SearchTerm},
};


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSchema {
    pub name: String,
    pub table: String,
    /// Stable identity key, ordered ascending so pages never overlap.
    pub id_column: String,
    /// Text fields the search box matches against, in this exact order.
    pub searchable_fields: Vec<String>,
    /// Columns returned for each row.
    pub display_columns: Vec<String>,
    pub catalog: FilterCatalog,
    pub page_size: u64,
}

impl ListingSchema {
    pub fn compose(&self, search_term: &SearchTerm, facet_selections: &FacetSelections, page_index: u64) -> QueryDescriptor {
        query_composer::compose(self, search_term, facet_selections, page_index, self.page_size)
    }

    pub fn with_catalog(mut self, catalog: FilterCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub fn automation_directory() -> ListingSchema {
    let searchable_fields = strings(&[
        "name",
        "summary",
        "primary_objective",
        "outcome",
        "use_case",
        "step_by_step",
        "integrations",
        "capabilities",
        "notification_channels",
    ]);
    let mut display_columns = vec![DEFAULT_ID_COLUMN.to_string()];
    display_columns.extend(searchable_fields.iter().cloned());
    display_columns.extend(strings(&["functions", "industries"]));

    ListingSchema {
        name: "automation_directory".to_string(),
        table: "automations".to_string(),
        id_column: DEFAULT_ID_COLUMN.to_string(),
        searchable_fields,
        display_columns,
        catalog: FilterCatalog::new(
            vec![
                FacetDefinition::new("function", "Function", "functions", vec![
                    "Sales",
                    "Marketing",
                    "Customer Support",
                    "Operations",
                    "Finance",
                    "Human Resources",
                    "IT",
                    "Product",
                ]),
                FacetDefinition::new("industry", "Industry", "industries", vec![
                    "SaaS",
                    "E-commerce",
                    "Healthcare",
                    "Real Estate",
                    "Education",
                    "Financial Services",
                    "Manufacturing",
                    "Legal",
                ]),
            ],
            AliasTable::new().with_alias("Customer Support", vec!["Customer Service", "Support"]),
        ),
        page_size: PAGE_SIZE,
    }
}

pub fn job_board() -> ListingSchema {
    let searchable_fields = strings(&["title", "company", "location", "description", "skills"]);
    let mut display_columns = vec![DEFAULT_ID_COLUMN.to_string()];
    display_columns.extend(searchable_fields.iter().cloned());
    display_columns.extend(strings(&["job_functions", "employment_types"]));

    ListingSchema {
        name: "job_board".to_string(),
        table: "jobs".to_string(),
        id_column: DEFAULT_ID_COLUMN.to_string(),
        searchable_fields,
        display_columns,
        catalog: FilterCatalog::new(
            vec![
                FacetDefinition::new("job_function", "Job Function", "job_functions", vec![
                    "Engineering",
                    "Automation",
                    "Sales",
                    "Marketing",
                    "Operations",
                    "Customer Support",
                ]),
                FacetDefinition::new("employment_type", "Employment Type", "employment_types", vec![
                    "Full-time",
                    "Part-time",
                    "Contract",
                    "Internship",
                ]),
            ],
            AliasTable::new()
                .with_alias("Full-time", vec!["Full Time", "Fulltime"])
                .with_alias("Customer Support", vec!["Customer Service", "Support"]),
        ),
        page_size: PAGE_SIZE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schemas_display_their_id_and_facet_fields() {
        for schema in [automation_directory(), job_board()] {
            assert_eq!(schema.display_columns[0], schema.id_column);
            for facet in &schema.catalog.facets {
                assert!(schema.display_columns.contains(&facet.field), "{} missing {}", schema.name, facet.field);
            }
        }
    }

    #[test]
    fn page_size_never_drops_to_zero() {
        assert_eq!(job_board().with_page_size(0).page_size, 1);
    }
}
