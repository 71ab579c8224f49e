//! Search and get-by-id operations for each OpenAlex entity type.
//!
//! Every operation takes the caller's untyped argument bag, validates it
//! strictly, performs one GET, validates the response and hands back a typed
//! value. Nothing is retried and nothing is cached.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::apis::query::mailto_query;
use crate::apis::{OpenAlexClient, OpenAlexError, SearchParams};
use crate::models::{Author, Institution, Page, Source, Work};
use crate::schema::registry::{
    AUTHOR, AUTHORS_PAGE, GET_INPUT, INSTITUTION, INSTITUTIONS_PAGE, SEARCH_INPUT, SOURCE,
    SOURCES_PAGE, WORK, WORKS_PAGE,
};
use crate::schema::{conform, SchemaViolation, Shape};

/// An OpenAlex entity type with its collection path and response shapes.
pub trait Entity: DeserializeOwned {
    /// Collection path segment, e.g. `works`.
    const COLLECTION: &'static str;
    fn shape() -> &'static Shape;
    fn page_shape() -> &'static Shape;
}

impl Entity for Work {
    const COLLECTION: &'static str = "works";
    fn shape() -> &'static Shape {
        &WORK
    }
    fn page_shape() -> &'static Shape {
        &WORKS_PAGE
    }
}

impl Entity for Author {
    const COLLECTION: &'static str = "authors";
    fn shape() -> &'static Shape {
        &AUTHOR
    }
    fn page_shape() -> &'static Shape {
        &AUTHORS_PAGE
    }
}

impl Entity for Institution {
    const COLLECTION: &'static str = "institutions";
    fn shape() -> &'static Shape {
        &INSTITUTION
    }
    fn page_shape() -> &'static Shape {
        &INSTITUTIONS_PAGE
    }
}

impl Entity for Source {
    const COLLECTION: &'static str = "sources";
    fn shape() -> &'static Shape {
        &SOURCE
    }
    fn page_shape() -> &'static Shape {
        &SOURCES_PAGE
    }
}

#[derive(Debug, Deserialize)]
struct GetParams {
    id: String,
    mailto: Option<String>,
}

/// Reduce a full OpenAlex URL (`https://openalex.org/W123`) to its trailing
/// path segment. Anything else is taken as a bare ID. Returns `None` when
/// nothing usable is left.
pub fn normalize_id(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Ok(url) = Url::parse(raw) {
        let is_openalex = matches!(url.scheme(), "http" | "https")
            && url.host_str().is_some_and(|h| h == "openalex.org" || h.ends_with(".openalex.org"));
        if is_openalex {
            return url
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                .map(str::to_string);
        }
    }
    (!raw.is_empty()).then(|| raw.to_string())
}

/// One page of `E` matching the search arguments.
pub async fn search<E: Entity>(
    client: &OpenAlexClient,
    args: Value,
) -> Result<Page<E>, OpenAlexError> {
    let params: SearchParams = conform(&SEARCH_INPUT, args).map_err(OpenAlexError::InvalidInput)?;
    let body = client
        .fetch(&[E::COLLECTION], &params.encode(), params.mailto.as_deref())
        .await?;
    let page: Page<E> = conform(E::page_shape(), body).map_err(|v| {
        tracing::warn!(collection = E::COLLECTION, "response failed validation: {}", v);
        OpenAlexError::ResponseSchema(v)
    })?;
    tracing::debug!(
        collection = E::COLLECTION,
        total = page.meta.count,
        returned = page.results.len(),
        "search complete"
    );
    Ok(page)
}

/// A single `E` by ID or OpenAlex URL.
pub async fn get<E: Entity>(client: &OpenAlexClient, args: Value) -> Result<E, OpenAlexError> {
    let params: GetParams = conform(&GET_INPUT, args).map_err(OpenAlexError::InvalidInput)?;
    let id = normalize_id(&params.id).ok_or_else(|| {
        OpenAlexError::InvalidInput(SchemaViolation {
            path: "id".into(),
            expected: "OpenAlex ID or URL ending in one".into(),
            actual: format!("string {:?}", params.id),
        })
    })?;
    let mailto = params.mailto.as_deref();
    let body = client
        .fetch(&[E::COLLECTION, id.as_str()], &mailto_query(mailto), mailto)
        .await?;
    conform(E::shape(), body).map_err(|v| {
        tracing::warn!(collection = E::COLLECTION, %id, "response failed validation: {}", v);
        OpenAlexError::ResponseSchema(v)
    })
}

pub async fn search_works(client: &OpenAlexClient, args: Value) -> Result<Page<Work>, OpenAlexError> {
    search(client, args).await
}

pub async fn get_work(client: &OpenAlexClient, args: Value) -> Result<Work, OpenAlexError> {
    get(client, args).await
}

pub async fn search_authors(
    client: &OpenAlexClient,
    args: Value,
) -> Result<Page<Author>, OpenAlexError> {
    search(client, args).await
}

pub async fn get_author(client: &OpenAlexClient, args: Value) -> Result<Author, OpenAlexError> {
    get(client, args).await
}

pub async fn search_institutions(
    client: &OpenAlexClient,
    args: Value,
) -> Result<Page<Institution>, OpenAlexError> {
    search(client, args).await
}

pub async fn get_institution(
    client: &OpenAlexClient,
    args: Value,
) -> Result<Institution, OpenAlexError> {
    get(client, args).await
}

pub async fn search_sources(
    client: &OpenAlexClient,
    args: Value,
) -> Result<Page<Source>, OpenAlexError> {
    search(client, args).await
}

pub async fn get_source(client: &OpenAlexClient, args: Value) -> Result<Source, OpenAlexError> {
    get(client, args).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::registry::fixtures;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> OpenAlexClient {
        OpenAlexClient::with_base_url(&server.base_url()).unwrap()
    }

    #[test]
    fn test_normalize_id() {
        assert_eq!(normalize_id("W123").as_deref(), Some("W123"));
        assert_eq!(normalize_id("  W123 ").as_deref(), Some("W123"));
        assert_eq!(normalize_id("https://openalex.org/W123").as_deref(), Some("W123"));
        assert_eq!(normalize_id("https://api.openalex.org/works/W123/").as_deref(), Some("W123"));
        assert_eq!(
            normalize_id("https://orcid.org/0000-0001-6187-6610").as_deref(),
            Some("https://orcid.org/0000-0001-6187-6610")
        );
        assert_eq!(normalize_id("https://openalex.org/"), None);
        assert_eq!(normalize_id("   "), None);
    }

    #[tokio::test]
    async fn test_search_works_with_mailto() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/works")
                .query_param("search", "open access")
                .query_param("page", "1")
                .query_param("per_page", "25")
                .query_param("mailto", "a@b.com")
                .header("user-agent", "openalex-mcp (a@b.com)");
            then.status(200).json_body(fixtures::page(vec![fixtures::work()]));
        });

        let page = search_works(
            &client_for(&server),
            json!({"search": "open access", "mailto": "a@b.com"}),
        )
        .await
        .unwrap();

        mock.assert();
        assert_eq!(page.meta.count, 1250);
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].display_name, "The state of OA");
    }

    #[tokio::test]
    async fn test_search_without_mailto_sends_bare_token() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/authors")
                .query_param("filter", "last_known_institutions.country_code:US")
                .header("user-agent", "openalex-mcp");
            then.status(200).json_body(fixtures::page(vec![fixtures::author()]));
        });

        let page = search_authors(
            &client_for(&server),
            json!({"filter": "last_known_institutions.country_code:US", "per_page": 10}),
        )
        .await
        .unwrap();

        mock.assert();
        assert_eq!(page.results[0].display_name, "Jason Priem");
    }

    #[tokio::test]
    async fn test_search_institutions_and_sources() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/institutions");
            then.status(200).json_body(fixtures::page(vec![fixtures::institution()]));
        });
        server.mock(|when, then| {
            when.method(GET).path("/sources").query_param("sort", "works_count:desc");
            then.status(200).json_body(fixtures::page(vec![fixtures::source()]));
        });
        let client = client_for(&server);

        let institutions = search_institutions(&client, json!({"search": "michigan"})).await.unwrap();
        assert_eq!(institutions.results[0].roles[0].works_count, 12000);

        let sources = search_sources(&client, json!({"sort": "works_count:desc"})).await.unwrap();
        assert_eq!(sources.results[0].issn.as_deref().map(|i| i.len()), Some(2));
    }

    #[tokio::test]
    async fn test_get_work_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/works/W0");
            then.status(404).body("Resource not found");
        });

        let err = get_work(&client_for(&server), json!({"id": "W0"})).await.unwrap_err();

        assert_eq!(err.status_code(), Some(404));
        assert!(matches!(err, OpenAlexError::Http { ref body, .. } if body == "Resource not found"));
    }

    #[tokio::test]
    async fn test_get_author_connection_refused() {
        let client = OpenAlexClient::with_base_url("http://127.0.0.1:1").unwrap();
        let err = get_author(&client, json!({"id": "A1"})).await.unwrap_err();

        assert_eq!(err.kind(), "transport");
        assert_eq!(err.status_code(), None);
    }

    #[tokio::test]
    async fn test_get_work_missing_display_name() {
        let server = MockServer::start();
        let mut body = fixtures::work();
        body.as_object_mut().unwrap().remove("display_name");
        server.mock(|when, then| {
            when.method(GET).path("/works/W2741809807");
            then.status(200).json_body(body.clone());
        });

        let err = get_work(&client_for(&server), json!({"id": "W2741809807"}))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "response_schema");
        assert_eq!(err.violation().unwrap().path, "display_name");
    }

    #[tokio::test]
    async fn test_get_accepts_bare_id_and_url() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/works/W2741809807");
            then.status(200).json_body(fixtures::work());
        });
        let client = client_for(&server);

        let bare = get_work(&client, json!({"id": "W2741809807"})).await.unwrap();
        let full = get_work(&client, json!({"id": "https://openalex.org/W2741809807"}))
            .await
            .unwrap();

        mock.assert_calls(2);
        assert_eq!(bare.id, full.id);
    }

    #[tokio::test]
    async fn test_get_with_mailto() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/sources/S137773608")
                .query_param("mailto", "a@b.com")
                .header("user-agent", "openalex-mcp (a@b.com)");
            then.status(200).json_body(fixtures::source());
        });
        let client = client_for(&server);

        let source = get_source(&client, json!({"id": "S137773608", "mailto": "a@b.com"}))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(source.display_name, "Nature");
    }

    #[tokio::test]
    async fn test_get_institution() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/institutions/I27837315");
            then.status(200).json_body(fixtures::institution());
        });

        let inst = get_institution(
            &client_for(&server),
            json!({"id": "https://openalex.org/I27837315"}),
        )
        .await
        .unwrap();
        assert_eq!(inst.geo.unwrap().city.as_deref(), Some("Ann Arbor"));
    }

    #[tokio::test]
    async fn test_invalid_input_makes_no_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.any_request();
            then.status(200).json_body(fixtures::page(vec![]));
        });
        let client = client_for(&server);

        for args in [
            json!({"per_page": 500}),
            json!({"per_page": 0}),
            json!({"page": 0}),
            json!({"sort": "cited_by_count:sideways"}),
            json!({"mailto": "not-an-email"}),
            json!({"query": "misspelled key"}),
            json!("just a string"),
        ] {
            let err = search_works(&client, args).await.unwrap_err();
            assert_eq!(err.kind(), "input_validation");
        }
        let err = get_author(&client, json!({"id": "https://openalex.org/"})).await.unwrap_err();
        assert_eq!(err.violation().unwrap().path, "id");

        mock.assert_calls(0);
    }
}
