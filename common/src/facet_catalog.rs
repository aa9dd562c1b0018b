//! Selectable facet values and the alias table used to expand them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetDefinition {
    /// Name the view layer uses when reporting a selection.
    pub name: String,
    pub display_name: String,
    /// Array column the overlap predicate runs against.
    pub field: String,
    /// Selectable values, in display order.
    pub values: Vec<String>,
}

impl FacetDefinition {
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        field: impl Into<String>,
        values: Vec<impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            field: field.into(),
            values: values.into_iter().map(|v| v.into()).collect(),
        }
    }
}

/// Canonical display value -> stored synonyms.
///
/// Every group contains its canonical value, whichever way the table was built.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, BTreeSet<String>>", into = "BTreeMap<String, BTreeSet<String>>")]
pub struct AliasTable {
    groups: BTreeMap<String, BTreeSet<String>>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alias(mut self, canonical: impl Into<String>, synonyms: Vec<impl Into<String>>) -> Self {
        self.insert(canonical, synonyms);
        self
    }

    pub fn insert(&mut self, canonical: impl Into<String>, synonyms: Vec<impl Into<String>>) {
        let canonical = canonical.into();
        let group = self.groups.entry(canonical.clone()).or_default();
        group.insert(canonical);
        group.extend(synonyms.into_iter().map(|s| s.into()));
    }

    pub fn group(&self, canonical: &str) -> Option<&BTreeSet<String>> {
        self.groups.get(canonical)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl From<BTreeMap<String, BTreeSet<String>>> for AliasTable {
    fn from(groups: BTreeMap<String, BTreeSet<String>>) -> Self {
        let mut table = AliasTable::new();
        for (canonical, synonyms) in groups {
            table.insert(canonical, synonyms.into_iter().collect::<Vec<String>>());
        }
        table
    }
}

impl From<AliasTable> for BTreeMap<String, BTreeSet<String>> {
    fn from(table: AliasTable) -> Self {
        table.groups
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterCatalog {
    pub facets: Vec<FacetDefinition>,
    #[serde(default)]
    pub aliases: AliasTable,
}

impl FilterCatalog {
    pub fn new(facets: Vec<FacetDefinition>, aliases: AliasTable) -> Self {
        Self { facets, aliases }
    }

    pub fn facet(&self, name: &str) -> Option<&FacetDefinition> {
        self.facets.iter().find(|facet| facet.name == name)
    }

    pub fn values(&self, name: &str) -> &[String] {
        self.facet(name).map(|facet| facet.values.as_slice()).unwrap_or(&[])
    }

    /// Replace each canonical value with its alias group. Values the catalog
    /// does not know are passed through unchanged.
    pub fn expand(&self, selection: &BTreeSet<String>) -> BTreeSet<String> {
        let mut expanded = BTreeSet::new();
        for value in selection {
            match self.aliases.group(value) {
                Some(group) => expanded.extend(group.iter().cloned()),
                None => {
                    expanded.insert(value.clone());
                }
            }
        }
        expanded
    }
}
