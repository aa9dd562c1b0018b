//! Builds a [`QueryDescriptor`] from the current listing inputs.

use crate::{
    listing_schema::ListingSchema,
    pagination::max_page_index,
    search_query::{FacetSelections, OrderKey, OverlapPredicate, QueryDescriptor, SearchTerm, TextPredicate},
};


/// Deterministic and total: identical inputs give equal descriptors.
///
/// Facets the schema's catalog does not define are skipped, since there is no
/// array field to run the overlap against. Unknown *values* of a known facet
/// pass through to the backend unchanged. The page is kept within
/// `[1, max_page_index(page_size)]`; the result's total clamps it further.
pub fn compose(
    schema: &ListingSchema,
    search_term: &SearchTerm,
    facet_selections: &FacetSelections,
    page_index: u64,
    page_size: u64,
) -> QueryDescriptor {
    // an all-wildcard predicate would match everything; leave it out instead
    let text_predicate = (!search_term.is_empty()).then(|| TextPredicate {
        term: search_term.as_str().to_string(),
        fields: schema.searchable_fields.clone(),
    });

    let mut overlap_predicates = Vec::new();
    for (facet_name, selection) in facet_selections.iter() {
        if selection.is_empty() {
            continue;
        }
        let Some(facet) = schema.catalog.facet(facet_name) else { continue };
        overlap_predicates.push(OverlapPredicate {
            field: facet.field.clone(),
            values: schema.catalog.expand(selection),
        });
    }

    QueryDescriptor {
        table: schema.table.clone(),
        columns: schema.display_columns.clone(),
        text_predicate,
        overlap_predicates,
        order: OrderKey::ascending(schema.id_column.clone()),
        page_index: page_index.clamp(1, max_page_index(page_size)),
        page_size,
    }
}
