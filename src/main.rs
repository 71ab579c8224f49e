use std::sync::Arc;
use rmcp::{
    handler::server::tool::ToolRouter, handler::server::wrapper::Parameters,
    model::*, tool, tool_handler, tool_router,
    transport::stdio, ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

mod apis;
mod config;
mod models;
mod ops;
mod render;
mod schema;

use apis::{OpenAlexClient, OpenAlexError};
use config::Config;

// ── Parameter structs ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
struct SearchParams {
    #[schemars(description = "Free-text search query")]
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<String>,
    #[schemars(description = "OpenAlex filter expression (e.g. \"publication_year:2023\", \"country_code:US\", \"is_oa:true\")")]
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<String>,
    #[schemars(description = "Sort field, optionally suffixed with :asc or :desc (e.g. \"cited_by_count:desc\")")]
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<String>,
    #[schemars(description = "Page number, 1-based (default 1)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<i64>,
    #[schemars(description = "Results per page (default 25, max 200)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    per_page: Option<i64>,
    #[schemars(description = "Email for polite pool access")]
    #[serde(skip_serializing_if = "Option::is_none")]
    mailto: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
struct GetParams {
    #[schemars(description = "OpenAlex ID (e.g. \"W2741809807\") or full URL (\"https://openalex.org/W2741809807\")")]
    id: String,
    #[schemars(description = "Email for polite pool access")]
    #[serde(skip_serializing_if = "Option::is_none")]
    mailto: Option<String>,
}

// ── Server ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct OpenAlexServer {
    tool_router: ToolRouter<Self>,
    config: Arc<Config>,
    client: Arc<OpenAlexClient>,
}

#[tool_router]
impl OpenAlexServer {
    pub fn create(config: Config) -> anyhow::Result<Self> {
        let client = config.build_client()?;

        tracing::info!(
            "OpenAlex endpoint {}, {}",
            client.base_url(),
            config.polite_pool_note()
        );

        Ok(Self {
            tool_router: Self::tool_router(),
            config: Arc::new(config),
            client: Arc::new(client),
        })
    }

    #[tool(description = "Search for scholarly works/publications in OpenAlex")]
    async fn search_works(
        &self,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let args = self.arguments(&params)?;
        let result = ops::search_works(&self.client, args).await;
        Ok(respond("searching works", result, render::works_page))
    }

    #[tool(description = "Get detailed information about a specific work by its OpenAlex ID")]
    async fn get_work(
        &self,
        Parameters(params): Parameters<GetParams>,
    ) -> Result<CallToolResult, McpError> {
        let args = self.arguments(&params)?;
        let result = ops::get_work(&self.client, args).await;
        Ok(respond("fetching work", result, render::work))
    }

    #[tool(description = "Search for authors in OpenAlex")]
    async fn search_authors(
        &self,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let args = self.arguments(&params)?;
        let result = ops::search_authors(&self.client, args).await;
        Ok(respond("searching authors", result, render::authors_page))
    }

    #[tool(description = "Get detailed information about a specific author by their OpenAlex ID")]
    async fn get_author(
        &self,
        Parameters(params): Parameters<GetParams>,
    ) -> Result<CallToolResult, McpError> {
        let args = self.arguments(&params)?;
        let result = ops::get_author(&self.client, args).await;
        Ok(respond("fetching author", result, render::author))
    }

    #[tool(description = "Search for academic institutions in OpenAlex")]
    async fn search_institutions(
        &self,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let args = self.arguments(&params)?;
        let result = ops::search_institutions(&self.client, args).await;
        Ok(respond("searching institutions", result, render::institutions_page))
    }

    #[tool(description = "Get detailed information about a specific institution by its OpenAlex ID")]
    async fn get_institution(
        &self,
        Parameters(params): Parameters<GetParams>,
    ) -> Result<CallToolResult, McpError> {
        let args = self.arguments(&params)?;
        let result = ops::get_institution(&self.client, args).await;
        Ok(respond("fetching institution", result, render::institution))
    }

    #[tool(description = "Search for sources (journals, conferences, repositories) in OpenAlex")]
    async fn search_sources(
        &self,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<CallToolResult, McpError> {
        let args = self.arguments(&params)?;
        let result = ops::search_sources(&self.client, args).await;
        Ok(respond("searching sources", result, render::sources_page))
    }

    #[tool(description = "Get detailed information about a specific source (journal, repository, conference) by its OpenAlex ID")]
    async fn get_source(
        &self,
        Parameters(params): Parameters<GetParams>,
    ) -> Result<CallToolResult, McpError> {
        let args = self.arguments(&params)?;
        let result = ops::get_source(&self.client, args).await;
        Ok(respond("fetching source", result, render::source))
    }
}

impl OpenAlexServer {
    /// Turn tool parameters back into the untyped argument bag the
    /// operations validate, with the configured default `mailto` filled in.
    fn arguments<T: Serialize>(&self, params: &T) -> Result<Value, McpError> {
        let mut args = serde_json::to_value(params)
            .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
        self.config.apply_default_mailto(&mut args);
        Ok(args)
    }
}

/// Render a success, or flag the call as failed with the error text.
fn respond<T>(
    action: &str,
    result: Result<T, OpenAlexError>,
    format: fn(&T) -> String,
) -> CallToolResult {
    match result {
        Ok(value) => CallToolResult::success(vec![Content::text(format(&value))]),
        Err(e) => {
            tracing::warn!(
                kind = e.kind(),
                status = ?e.status_code(),
                path = ?e.violation().map(|v| v.path.as_str()),
                "{} failed: {}",
                action,
                e
            );
            CallToolResult::error(vec![Content::text(render::error(action, &e))])
        }
    }
}

#[tool_handler]
impl ServerHandler for OpenAlexServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Search and retrieve scholarly metadata from OpenAlex: works, authors, \
                 institutions and sources (journals, repositories, conferences). \
                 Pass `mailto` to use the polite pool."
                    .into(),
            ),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Starting OpenAlex MCP server");

    let server = OpenAlexServer::create(Config::from_env())?;
    let service = server.serve(stdio()).await?;

    tokio::select! {
        quit = service.waiting() => {
            quit?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, shutting down");
        }
    }

    Ok(())
}
