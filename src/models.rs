//! Typed OpenAlex entities.
//!
//! Values of these types are only ever built by [`crate::schema::conform`]
//! against the matching shape in [`crate::schema::registry`], so a value that
//! exists has passed response validation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Pagination ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub count: u64,
    pub db_response_time_ms: u64,
    /// Absent when the request did not ask for a page.
    pub page: Option<u32>,
    pub per_page: u32,
    pub groups_count: Option<u64>,
}

/// One page of a collection response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub meta: Meta,
    pub results: Vec<T>,
    pub group_by: Option<Vec<Value>>,
}

// ── Shared pieces ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DehydratedInstitution {
    pub id: String,
    pub display_name: String,
    pub ror: Option<String>,
    pub country_code: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryStats {
    #[serde(rename = "2yr_mean_citedness")]
    pub two_year_mean_citedness: f64,
    pub h_index: u64,
    pub i10_index: u64,
}

/// One level (subfield, field or domain) of the topic hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicLevel {
    pub id: String,
    pub display_name: String,
}

/// Topic with the number of works an author, institution or source has in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicCount {
    pub id: String,
    pub display_name: String,
    pub count: u64,
    pub subfield: TopicLevel,
    pub field: TopicLevel,
    pub domain: TopicLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearCount {
    pub year: i32,
    pub works_count: u64,
    pub cited_by_count: u64,
}

// ── Work ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Work {
    pub id: String,
    pub doi: Option<String>,
    pub title: Option<String>,
    pub display_name: String,
    pub publication_year: Option<i32>,
    pub publication_date: Option<String>,
    pub ids: WorkIds,
    pub language: Option<String>,
    pub primary_location: Option<Location>,
    #[serde(rename = "type")]
    pub kind: String,
    pub type_crossref: Option<String>,
    pub open_access: OpenAccess,
    pub authorships: Vec<Authorship>,
    pub biblio: Biblio,
    pub is_retracted: bool,
    pub is_paratext: bool,
    pub primary_topic: Option<TopicAssignment>,
    pub topics: Vec<TopicAssignment>,
    pub keywords: Vec<Keyword>,
    pub referenced_works_count: u64,
    pub referenced_works: Vec<String>,
    pub related_works: Vec<String>,
    pub cited_by_count: u64,
    pub cited_by_api_url: Option<String>,
    pub counts_by_year: Vec<CitationYear>,
    pub updated_date: String,
    pub created_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkIds {
    pub openalex: String,
    pub doi: Option<String>,
    pub pmid: Option<String>,
    pub pmcid: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub source: Option<LocationSource>,
    pub landing_page_url: Option<String>,
    pub pdf_url: Option<String>,
    pub license: Option<String>,
    pub version: Option<String>,
    pub is_oa: bool,
    pub is_accepted: bool,
    pub is_published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationSource {
    pub id: String,
    pub display_name: String,
    pub issn_l: Option<String>,
    pub issn: Option<Vec<String>>,
    pub is_oa: bool,
    pub is_in_doaj: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAccess {
    pub is_oa: bool,
    pub oa_status: String,
    pub oa_url: Option<String>,
    pub any_repository_has_fulltext: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorPosition {
    First,
    Middle,
    Last,
}

impl AuthorPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorPosition::First => "first",
            AuthorPosition::Middle => "middle",
            AuthorPosition::Last => "last",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Authorship {
    pub author_position: AuthorPosition,
    pub author: AuthorRef,
    pub institutions: Vec<DehydratedInstitution>,
    pub countries: Vec<String>,
    pub is_corresponding: bool,
    pub raw_author_name: String,
    pub raw_affiliation_strings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: String,
    pub display_name: String,
    pub orcid: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Biblio {
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub first_page: Option<String>,
    pub last_page: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicAssignment {
    pub id: String,
    pub display_name: String,
    pub score: f64,
    pub subfield: Option<TopicLevel>,
    pub field: Option<TopicLevel>,
    pub domain: Option<TopicLevel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keyword {
    pub id: String,
    pub display_name: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitationYear {
    pub year: i32,
    pub cited_by_count: u64,
}

// ── Author ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub orcid: Option<String>,
    pub display_name: String,
    pub display_name_alternatives: Vec<String>,
    pub works_count: u64,
    pub cited_by_count: u64,
    pub summary_stats: SummaryStats,
    pub ids: AuthorIds,
    pub affiliations: Vec<Affiliation>,
    pub last_known_institutions: Vec<DehydratedInstitution>,
    pub topics: Vec<TopicCount>,
    pub counts_by_year: Vec<YearCount>,
    pub works_api_url: String,
    pub updated_date: String,
    pub created_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorIds {
    pub openalex: String,
    pub orcid: Option<String>,
    pub scopus: Option<String>,
    pub twitter: Option<String>,
    pub wikipedia: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Affiliation {
    pub institution: DehydratedInstitution,
    pub years: Vec<i32>,
}

// ── Institution ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Institution {
    pub id: String,
    pub ror: Option<String>,
    pub display_name: String,
    pub display_name_alternatives: Vec<String>,
    pub display_name_acronyms: Vec<String>,
    pub country_code: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub homepage_url: Option<String>,
    pub image_url: Option<String>,
    pub image_thumbnail_url: Option<String>,
    pub works_count: u64,
    pub cited_by_count: u64,
    pub summary_stats: SummaryStats,
    pub ids: InstitutionIds,
    pub geo: Option<Geo>,
    pub international: Option<International>,
    pub associated_institutions: Vec<AssociatedInstitution>,
    pub counts_by_year: Vec<YearCount>,
    pub roles: Vec<Role>,
    pub topics: Vec<TopicCount>,
    pub works_api_url: String,
    pub updated_date: String,
    pub created_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstitutionIds {
    pub openalex: String,
    pub ror: Option<String>,
    pub grid: Option<String>,
    pub wikipedia: Option<String>,
    pub wikidata: Option<String>,
    pub mag: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geo {
    pub city: Option<String>,
    pub geonames_city_id: Option<String>,
    pub region: Option<String>,
    pub country_code: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Display name keyed by language code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct International {
    pub display_name: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    Parent,
    Child,
    Related,
}

impl Relationship {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::Parent => "parent",
            Relationship::Child => "child",
            Relationship::Related => "related",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociatedInstitution {
    pub id: String,
    pub ror: Option<String>,
    pub display_name: String,
    pub country_code: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub relationship: Relationship,
}

/// The institution acting in another capacity (funder, publisher, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub role: String,
    pub id: String,
    pub works_count: u64,
}

// ── Source ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub issn_l: Option<String>,
    pub issn: Option<Vec<String>>,
    pub display_name: String,
    pub host_organization: Option<String>,
    pub host_organization_name: Option<String>,
    pub host_organization_lineage: Vec<String>,
    pub works_count: u64,
    pub cited_by_count: u64,
    pub summary_stats: SummaryStats,
    pub is_oa: bool,
    pub is_in_doaj: bool,
    pub is_indexed_in_doaj: Option<bool>,
    pub ids: SourceIds,
    pub homepage_url: Option<String>,
    pub apc_prices: Option<Vec<ApcPrice>>,
    pub apc_usd: Option<u64>,
    pub country_code: Option<String>,
    pub societies: Vec<Value>,
    pub alternate_titles: Vec<String>,
    pub abbreviated_title: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub topics: Vec<TopicCount>,
    pub counts_by_year: Vec<YearCount>,
    pub works_api_url: String,
    pub updated_date: String,
    pub created_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceIds {
    pub openalex: String,
    pub issn_l: Option<String>,
    pub issn: Option<Vec<String>>,
    pub mag: Option<String>,
    pub wikidata: Option<String>,
    pub fatcat: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApcPrice {
    pub price: u64,
    pub currency: String,
}
