/// MCP server implementation for platform boilerplate guidelines.
///
/// Exposes three tools:
/// - `get_boilerplate_structure`: Directory tree of a platform boilerplate
/// - `search_best_practices`: Line search over a platform's guideline document
/// - `get_all_contexts`: Every configured platform's guideline document
///
/// and one resource per configured platform (`context://<platform>/agents.md`).
///
/// Every call refreshes the working copy through the shared [`RepoCache`] first.
use std::sync::Arc;

use rmcp::{
    ErrorData, RoleServer, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, warn};

use crate::cache::RepoCache;
use crate::config::Config;
use crate::content::ContentReader;
use crate::error::AppError;
use crate::model::Platform;
use crate::search::search;

const RESOURCE_SCHEME: &str = "context://";
const RESOURCE_FILE: &str = "agents.md";
const MARKDOWN_MIME: &str = "text/markdown";
const PLATFORM_SEPARATOR: &str = "\n\n---\n\n";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct StructureParams {
    /// Target platform: "backend", "frontend" or "mobile".
    pub platform: Platform,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// Target platform: "backend", "frontend" or "mobile".
    pub platform: Platform,
    /// Text to look for. Matching is case-insensitive.
    pub query: String,
}

#[derive(Clone)]
pub struct BoilerplateContextServer {
    cache: Arc<RepoCache>,
    reader: Arc<ContentReader>,
    platforms: Arc<[Platform]>,
    tool_router: ToolRouter<BoilerplateContextServer>,
}

impl BoilerplateContextServer {
    pub fn new(config: &Config, cache: Arc<RepoCache>) -> Self {
        Self {
            cache,
            reader: Arc::new(ContentReader::new(config)),
            platforms: config.platforms.clone().into(),
            tool_router: Self::tool_router(),
        }
    }

    fn check_configured(&self, platform: Platform) -> Result<(), AppError> {
        if self.platforms.contains(&platform) {
            Ok(())
        } else {
            Err(AppError::PlatformNotConfigured(platform.to_string()))
        }
    }

    async fn structure_report(&self, platform: Platform) -> Result<String, AppError> {
        self.check_configured(platform)?;
        self.cache.ensure().await?;
        let entries = self.reader.directory_structure(platform).await?;
        Ok(format!(
            "Directory structure for {platform} boilerplate:\n\n{}",
            entries.join("\n")
        ))
    }

    async fn search_report(&self, platform: Platform, query: &str) -> Result<String, AppError> {
        self.check_configured(platform)?;
        self.cache.ensure().await?;
        let text = self.reader.read_guideline(platform).await?;
        let matches = search(&text, query);

        if matches.is_empty() {
            return Ok(format!(
                "No matches found for \"{query}\" in {platform} best practices."
            ));
        }

        let blocks: Vec<String> = matches
            .iter()
            .map(|m| format!("--- Line {} ---\n{}", m.line_number, m.context))
            .collect();
        Ok(format!(
            "Found {} matches for \"{query}\" in {platform} best practices:\n\n{}",
            matches.len(),
            blocks.join("\n\n")
        ))
    }

    async fn all_contexts(&self) -> Result<String, AppError> {
        self.cache.ensure().await?;
        let mut sections = Vec::with_capacity(self.platforms.len());
        for &platform in self.platforms.iter() {
            let text = self.reader.read_guideline(platform).await?;
            sections.push(format!("# {} Guidelines\n\n{}", platform.title(), text.trim_end()));
        }
        Ok(sections.join(PLATFORM_SEPARATOR))
    }

    /// One markdown resource per configured platform, in configuration order.
    fn resources(&self) -> Vec<Resource> {
        self.platforms.iter().map(|&p| Self::resource_for(p)).collect()
    }

    fn resource_for(platform: Platform) -> Resource {
        let mut raw = RawResource::new(
            resource_uri(platform),
            format!("{} guidelines", platform.title()),
        );
        raw.description = Some(format!(
            "Best practices and agent guidelines for {platform} projects"
        ));
        raw.mime_type = Some(MARKDOWN_MIME.to_string());
        raw.no_annotation()
    }

    /// Only the exact URIs advertised by `list_resources` resolve.
    fn platform_for_uri(&self, uri: &str) -> Option<Platform> {
        self.platforms
            .iter()
            .copied()
            .find(|&p| resource_uri(p) == uri)
    }

    async fn read_platform_resource(&self, uri: &str) -> Result<ReadResourceResult, ErrorData> {
        let platform = self
            .platform_for_uri(uri)
            .ok_or_else(|| ErrorData::resource_not_found(format!("unknown resource: {uri}"), None))?;
        self.cache.ensure().await.map_err(to_mcp_error)?;
        let text = self
            .reader
            .read_guideline(platform)
            .await
            .map_err(to_mcp_error)?;

        let mut contents = ResourceContents::text(text, uri);
        if let ResourceContents::TextResourceContents { mime_type, .. } = &mut contents {
            *mime_type = Some(MARKDOWN_MIME.to_string());
        }
        Ok(ReadResourceResult {
            contents: vec![contents],
        })
    }
}

#[tool_router]
impl BoilerplateContextServer {
    #[tool(description = "Get the directory structure of a platform boilerplate (backend, frontend or mobile). Hidden files and node_modules are omitted; directories end with '/'.")]
    async fn get_boilerplate_structure(
        &self,
        Parameters(params): Parameters<StructureParams>,
    ) -> Result<String, String> {
        info!(platform = %params.platform, "get_boilerplate_structure invoked");
        self.structure_report(params.platform)
            .await
            .map_err(|e| tool_error("get_boilerplate_structure", e))
    }

    #[tool(description = "Search a platform's best-practice guidelines for a case-insensitive phrase. Returns each matching line with two lines of context on either side.")]
    async fn search_best_practices(
        &self,
        Parameters(params): Parameters<SearchParams>,
    ) -> Result<String, String> {
        let query = params.query.trim().to_string();
        if query.is_empty() {
            return Err("query must not be empty".to_string());
        }
        info!(platform = %params.platform, query = %query, "search_best_practices invoked");
        self.search_report(params.platform, &query)
            .await
            .map_err(|e| tool_error("search_best_practices", e))
    }

    #[tool(description = "Get the full best-practice guidelines of every configured platform, concatenated in configuration order.")]
    async fn get_all_contexts(&self) -> Result<String, String> {
        info!("get_all_contexts invoked");
        self.all_contexts()
            .await
            .map_err(|e| tool_error("get_all_contexts", e))
    }
}

#[tool_handler]
impl ServerHandler for BoilerplateContextServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: "boilerplate-context".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Boilerplate context MCP server. Serves per-platform best-practice guidelines \
                 from a mirrored reference repository. Use get_boilerplate_structure to see a \
                 platform's project layout, search_best_practices to find guidance on a topic, \
                 get_all_contexts for every guideline document at once, or read the \
                 context://<platform>/agents.md resources."
                    .to_string(),
            ),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        Ok(ListResourcesResult::with_all_items(self.resources()))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        info!(uri = %request.uri, "read_resource invoked");
        self.read_platform_resource(&request.uri).await
    }
}

fn resource_uri(platform: Platform) -> String {
    format!("{RESOURCE_SCHEME}{platform}/{RESOURCE_FILE}")
}

fn tool_error(tool: &str, err: AppError) -> String {
    warn!(tool, error = %err, "tool call failed");
    err.to_string()
}

fn to_mcp_error(err: AppError) -> ErrorData {
    warn!(error = %err, "resource read failed");
    match err {
        AppError::DocumentNotFound { .. }
        | AppError::DirectoryNotFound(_)
        | AppError::UnknownPlatform(_)
        | AppError::PlatformNotConfigured(_) => ErrorData::resource_not_found(err.to_string(), None),
        _ => ErrorData::internal_error(err.to_string(), None),
    }
}
