//! Canonical query strings for OpenAlex requests.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::schema::registry::{DEFAULT_PAGE, DEFAULT_PER_PAGE};

/// Validated search options. Built by conforming caller input to
/// [`crate::schema::registry::SEARCH_INPUT`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
    /// Passed through verbatim; its grammar belongs to OpenAlex.
    pub filter: Option<String>,
    pub sort: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    pub mailto: Option<String>,
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            search: None,
            filter: None,
            sort: None,
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            mailto: None,
        }
    }
}

impl SearchParams {
    /// Present parameters in canonical order. Absent ones are skipped.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(6);
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(filter) = &self.filter {
            pairs.push(("filter", filter.clone()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.clone()));
        }
        pairs.push(("page", self.page.to_string()));
        pairs.push(("per_page", self.per_page.to_string()));
        if let Some(mailto) = &self.mailto {
            pairs.push(("mailto", mailto.clone()));
        }
        pairs
    }

    pub fn encode(&self) -> String {
        encode_pairs(self.pairs())
    }
}

/// Query for single-entity lookups, which only carry the contact email.
pub fn mailto_query(mailto: Option<&str>) -> String {
    encode_pairs(mailto.map(|m| ("mailto", m.to_string())))
}

fn encode_pairs<I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'static str, String)>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, &value);
    }
    serializer.finish()
}
