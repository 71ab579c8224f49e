//! Declared shapes for OpenAlex responses and tool inputs.
//!
//! Response shapes are permissive: OpenAlex adds fields over time, so
//! undeclared keys are dropped instead of rejected. Input shapes are strict.

use std::sync::LazyLock;

use super::{
    array, boolean, count, field, list, metric, nullable, object, one_of, optional, record,
    score, small_count, string, strict_object, year, Shape, StringFormat,
};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 25;
pub const MAX_PER_PAGE: i64 = 200;

pub static WORK: LazyLock<Shape> = LazyLock::new(work);
pub static AUTHOR: LazyLock<Shape> = LazyLock::new(author);
pub static INSTITUTION: LazyLock<Shape> = LazyLock::new(institution);
pub static SOURCE: LazyLock<Shape> = LazyLock::new(source);

pub static WORKS_PAGE: LazyLock<Shape> = LazyLock::new(|| envelope(work()));
pub static AUTHORS_PAGE: LazyLock<Shape> = LazyLock::new(|| envelope(author()));
pub static INSTITUTIONS_PAGE: LazyLock<Shape> = LazyLock::new(|| envelope(institution()));
pub static SOURCES_PAGE: LazyLock<Shape> = LazyLock::new(|| envelope(source()));

/// Arguments accepted by every search operation.
pub static SEARCH_INPUT: LazyLock<Shape> = LazyLock::new(|| {
    strict_object(vec![
        optional("search", string()),
        optional("filter", string()),
        optional("sort", Shape::String(StringFormat::SortKey)),
        optional("page", Shape::Integer { min: Some(1), max: Some(u32::MAX as i64) }),
        optional("per_page", Shape::Integer { min: Some(1), max: Some(MAX_PER_PAGE) }),
        optional("mailto", Shape::String(StringFormat::Email)),
    ])
});

/// Arguments accepted by every get-by-id operation.
pub static GET_INPUT: LazyLock<Shape> = LazyLock::new(|| {
    strict_object(vec![
        field("id", Shape::String(StringFormat::NonEmpty)),
        optional("mailto", Shape::String(StringFormat::Email)),
    ])
});

fn envelope(entity: Shape) -> Shape {
    object(vec![
        field("meta", meta()),
        field("results", array(entity)),
        optional("group_by", array(Shape::Any)),
    ])
}

fn meta() -> Shape {
    object(vec![
        field("count", count()),
        field("db_response_time_ms", count()),
        optional("page", nullable(small_count())),
        field("per_page", small_count()),
        optional("groups_count", nullable(count())),
    ])
}

fn nullable_string() -> Shape {
    nullable(string())
}

fn dehydrated_institution() -> Shape {
    object(vec![
        field("id", string()),
        field("display_name", string()),
        field("ror", nullable_string()),
        field("country_code", nullable_string()),
        field("type", nullable_string()),
    ])
}

fn summary_stats() -> Shape {
    object(vec![
        field("2yr_mean_citedness", metric()),
        field("h_index", count()),
        field("i10_index", count()),
    ])
}

fn topic_level() -> Shape {
    object(vec![field("id", string()), field("display_name", string())])
}

fn topic_count() -> Shape {
    object(vec![
        field("id", string()),
        field("display_name", string()),
        field("count", count()),
        field("subfield", topic_level()),
        field("field", topic_level()),
        field("domain", topic_level()),
    ])
}

fn year_count() -> Shape {
    object(vec![
        field("year", year()),
        field("works_count", count()),
        field("cited_by_count", count()),
    ])
}

fn topic_assignment() -> Shape {
    object(vec![
        field("id", string()),
        field("display_name", string()),
        field("score", score()),
        optional("subfield", topic_level()),
        optional("field", topic_level()),
        optional("domain", topic_level()),
    ])
}

fn work() -> Shape {
    let ids = object(vec![
        field("openalex", string()),
        optional("doi", string()),
        optional("pmid", string()),
        optional("pmcid", string()),
    ]);
    let location_source = object(vec![
        field("id", string()),
        field("display_name", string()),
        field("issn_l", nullable_string()),
        field("issn", nullable(array(string()))),
        field("is_oa", boolean()),
        field("is_in_doaj", boolean()),
    ]);
    let location = object(vec![
        field("source", nullable(location_source)),
        field("landing_page_url", nullable_string()),
        field("pdf_url", nullable_string()),
        field("license", nullable_string()),
        field("version", nullable_string()),
        field("is_oa", boolean()),
        field("is_accepted", boolean()),
        field("is_published", boolean()),
    ]);
    let open_access = object(vec![
        field("is_oa", boolean()),
        field("oa_status", string()),
        field("oa_url", nullable_string()),
        field("any_repository_has_fulltext", boolean()),
    ]);
    let authorship = object(vec![
        field("author_position", one_of(&["first", "middle", "last"])),
        field(
            "author",
            object(vec![
                field("id", string()),
                field("display_name", string()),
                field("orcid", nullable_string()),
            ]),
        ),
        list("institutions", dehydrated_institution()),
        list("countries", string()),
        field("is_corresponding", boolean()),
        field("raw_author_name", string()),
        list("raw_affiliation_strings", string()),
    ]);
    let biblio = object(vec![
        field("volume", nullable_string()),
        field("issue", nullable_string()),
        field("first_page", nullable_string()),
        field("last_page", nullable_string()),
    ]);
    let keyword = object(vec![
        field("id", string()),
        field("display_name", string()),
        field("score", score()),
    ]);
    let citation_year = object(vec![field("year", year()), field("cited_by_count", count())]);

    object(vec![
        field("id", string()),
        field("doi", nullable_string()),
        field("title", nullable_string()),
        field("display_name", string()),
        field("publication_year", nullable(year())),
        field("publication_date", nullable_string()),
        field("ids", ids),
        field("language", nullable_string()),
        field("primary_location", nullable(location)),
        field("type", string()),
        optional("type_crossref", nullable_string()),
        field("open_access", open_access),
        list("authorships", authorship),
        field("biblio", biblio),
        field("is_retracted", boolean()),
        field("is_paratext", boolean()),
        field("primary_topic", nullable(topic_assignment())),
        list("topics", topic_assignment()),
        list("keywords", keyword),
        field("referenced_works_count", count()),
        list("referenced_works", string()),
        list("related_works", string()),
        field("cited_by_count", count()),
        optional("cited_by_api_url", string()),
        list("counts_by_year", citation_year),
        field("updated_date", string()),
        field("created_date", string()),
    ])
}

fn author() -> Shape {
    let ids = object(vec![
        field("openalex", string()),
        optional("orcid", nullable_string()),
        optional("scopus", nullable_string()),
        optional("twitter", nullable_string()),
        optional("wikipedia", nullable_string()),
    ]);
    let affiliation = object(vec![
        field("institution", dehydrated_institution()),
        list("years", year()),
    ]);

    object(vec![
        field("id", string()),
        field("orcid", nullable_string()),
        field("display_name", string()),
        list("display_name_alternatives", string()),
        field("works_count", count()),
        field("cited_by_count", count()),
        field("summary_stats", summary_stats()),
        field("ids", ids),
        list("affiliations", affiliation),
        list("last_known_institutions", dehydrated_institution()),
        list("topics", topic_count()),
        list("counts_by_year", year_count()),
        field("works_api_url", string()),
        field("updated_date", string()),
        field("created_date", string()),
    ])
}

fn institution() -> Shape {
    let ids = object(vec![
        field("openalex", string()),
        optional("ror", nullable_string()),
        optional("grid", nullable_string()),
        optional("wikipedia", nullable_string()),
        optional("wikidata", nullable_string()),
        optional("mag", nullable_string()),
    ]);
    let geo = object(vec![
        field("city", nullable_string()),
        optional("geonames_city_id", nullable_string()),
        field("region", nullable_string()),
        field("country_code", nullable_string()),
        field("country", nullable_string()),
        field("latitude", nullable(Shape::Number { min: Some(-90.0), max: Some(90.0) })),
        field("longitude", nullable(Shape::Number { min: Some(-180.0), max: Some(180.0) })),
    ]);
    let international = object(vec![field("display_name", record(string()))]);
    let associated = object(vec![
        field("id", string()),
        field("ror", nullable_string()),
        field("display_name", string()),
        field("country_code", nullable_string()),
        field("type", nullable_string()),
        field("relationship", one_of(&["parent", "child", "related"])),
    ]);
    let role = object(vec![
        field("role", string()),
        field("id", string()),
        field("works_count", count()),
    ]);

    object(vec![
        field("id", string()),
        field("ror", nullable_string()),
        field("display_name", string()),
        list("display_name_alternatives", string()),
        list("display_name_acronyms", string()),
        field("country_code", nullable_string()),
        field("type", nullable_string()),
        field("homepage_url", nullable_string()),
        optional("image_url", nullable_string()),
        optional("image_thumbnail_url", nullable_string()),
        field("works_count", count()),
        field("cited_by_count", count()),
        field("summary_stats", summary_stats()),
        field("ids", ids),
        field("geo", nullable(geo)),
        optional("international", nullable(international)),
        list("associated_institutions", associated),
        list("counts_by_year", year_count()),
        list("roles", role),
        list("topics", topic_count()),
        field("works_api_url", string()),
        field("updated_date", string()),
        field("created_date", string()),
    ])
}

fn source() -> Shape {
    let ids = object(vec![
        field("openalex", string()),
        optional("issn_l", nullable_string()),
        optional("issn", nullable(array(string()))),
        optional("mag", nullable_string()),
        optional("wikidata", nullable_string()),
        optional("fatcat", nullable_string()),
    ]);
    let apc_price = object(vec![field("price", count()), field("currency", string())]);

    object(vec![
        field("id", string()),
        field("issn_l", nullable_string()),
        field("issn", nullable(array(string()))),
        field("display_name", string()),
        field("host_organization", nullable_string()),
        field("host_organization_name", nullable_string()),
        list("host_organization_lineage", string()),
        field("works_count", count()),
        field("cited_by_count", count()),
        field("summary_stats", summary_stats()),
        field("is_oa", boolean()),
        field("is_in_doaj", boolean()),
        optional("is_indexed_in_doaj", boolean()),
        field("ids", ids),
        field("homepage_url", nullable_string()),
        optional("apc_prices", nullable(array(apc_price))),
        field("apc_usd", nullable(count())),
        field("country_code", nullable_string()),
        list("societies", Shape::Any),
        list("alternate_titles", string()),
        field("abbreviated_title", nullable_string()),
        field("type", nullable_string()),
        list("topics", topic_count()),
        list("counts_by_year", year_count()),
        field("works_api_url", string()),
        field("updated_date", string()),
        field("created_date", string()),
    ])
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Author, Institution, Page, Relationship, Source, Work};
    use crate::schema::{conform, validate};

    #[test]
    fn test_fixtures_conform() {
        let work: Work = conform(&WORK, fixtures::work()).unwrap();
        assert_eq!(work.display_name, "The state of OA");
        assert!(work.topics.is_empty());
        assert!(work.related_works.is_empty());
        assert_eq!(work.authorships[0].author_position.as_str(), "first");

        let author: Author = conform(&AUTHOR, fixtures::author()).unwrap();
        assert_eq!(author.summary_stats.h_index, 18);
        assert_eq!(author.ids.scopus, None);

        let inst: Institution = conform(&INSTITUTION, fixtures::institution()).unwrap();
        assert!(inst.display_name_alternatives.is_empty());
        assert_eq!(inst.associated_institutions[0].relationship, Relationship::Child);

        let source: Source = conform(&SOURCE, fixtures::source()).unwrap();
        assert_eq!(source.apc_usd, Some(11390));
    }

    #[test]
    fn test_missing_display_name_fails_whole_page() {
        let mut broken = fixtures::author();
        broken.as_object_mut().unwrap().remove("display_name");
        let body = fixtures::page(vec![fixtures::author(), broken]);

        let err = conform::<Page<Author>>(&AUTHORS_PAGE, body).unwrap_err();
        assert_eq!(err.path, "results[1].display_name");
        assert_eq!(err.actual, "missing field");
    }

    #[test]
    fn test_out_of_range_topic_score() {
        let mut work = fixtures::work();
        work["primary_topic"]["score"] = serde_json::json!(1.5);
        let err = validate(&WORK, work).unwrap_err();
        assert_eq!(err.path, "primary_topic.score");
        assert_eq!(err.expected, "number in [0, 1]");
    }

    #[test]
    fn test_negative_count_rejected() {
        let mut source = fixtures::source();
        source["works_count"] = serde_json::json!(-3);
        assert_eq!(validate(&SOURCE, source).unwrap_err().path, "works_count");
    }

    #[test]
    fn test_null_page_in_meta() {
        let mut body = fixtures::page(vec![fixtures::source()]);
        body["meta"]["page"] = serde_json::Value::Null;
        let page: Page<Source> = conform(&SOURCES_PAGE, body).unwrap();
        assert_eq!(page.meta.page, None);
        assert_eq!(page.meta.per_page, 25);
    }

    #[test]
    fn test_year_wider_than_i32_rejected_at_field() {
        let mut work = fixtures::work();
        work["publication_year"] = serde_json::json!(4294967296u64);
        let err = conform::<Work>(&WORK, work).unwrap_err();
        assert_eq!(err.path, "publication_year");
        assert_eq!(err.expected, "integer in [-2147483648, 2147483647]");
    }

    #[test]
    fn test_per_page_wider_than_u32_rejected_at_field() {
        let mut body = fixtures::page(vec![fixtures::work()]);
        body["meta"]["per_page"] = serde_json::json!(5000000000u64);
        let err = conform::<Page<Work>>(&WORKS_PAGE, body).unwrap_err();
        assert_eq!(err.path, "meta.per_page");
        assert_eq!(err.expected, "integer in [0, 4294967295]");
    }

    #[test]
    fn test_search_input_bounds() {
        assert!(validate(&SEARCH_INPUT, serde_json::json!({"per_page": 200})).is_ok());
        assert_eq!(
            validate(&SEARCH_INPUT, serde_json::json!({"per_page": 201})).unwrap_err().path,
            "per_page"
        );
        assert_eq!(
            validate(&SEARCH_INPUT, serde_json::json!({"page": 0})).unwrap_err().path,
            "page"
        );
        assert!(validate(&GET_INPUT, serde_json::json!({"id": "  "})).is_err());
        assert!(validate(&GET_INPUT, serde_json::json!({"id": "W1", "mailto": "nope"})).is_err());
    }
}
