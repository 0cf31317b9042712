use anyhow::Result;
use rmcp::{
    ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

use crate::config::Config;
use crate::naming::YearPrefix;
use crate::session::{DocumentInfo, Session};

// Request structs for tools

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PathRequest {
    #[schemars(description = "Path to the file")]
    pub path: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PageRequest {
    #[schemars(description = "1-indexed page number")]
    pub page: u32,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetNameRequest {
    #[schemars(description = "1-indexed page number")]
    pub page: u32,
    #[schemars(description = "Name for the page, without prefix or extension")]
    pub name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct YearPrefixRequest {
    #[schemars(description = "Year to prefix file names with; omit or leave empty for none")]
    #[serde(default)]
    pub year: Option<String>,
    #[schemars(description = "Accept a value outside the preset years (default: false)")]
    #[serde(default)]
    pub custom: bool,
}

#[derive(Clone)]
pub struct SplitterServer {
    tool_router: ToolRouter<Self>,
    session: Arc<Mutex<Session>>,
    config: Config,
}

impl SplitterServer {
    pub fn new(config: Config) -> Self {
        let session = Session::default().with_year_prefix(config.initial_prefix());
        Self {
            tool_router: Self::tool_router(),
            session: Arc::new(Mutex::new(session)),
            config,
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        // A panic inside a tool leaves the session usable
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn state(&self, session: &Session) -> SessionState {
        SessionState {
            document: session.info().ok().map(DocumentResult::from),
            year_prefix: session.year_prefix().as_token().map(str::to_string),
            year_presets: self.config.year_tokens.clone(),
            names: session.names().to_vec(),
            committed_pages: session.committed_pages(),
            submitted: session.display_names().to_vec(),
        }
    }
}

fn page_index(page: u32) -> Result<usize, String> {
    page.checked_sub(1)
        .map(|i| i as usize)
        .ok_or_else(|| "Error: pages are numbered from 1".to_string())
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("Error: {}", e))
}

#[tool_router]
impl SplitterServer {
    #[tool(description = "Open a PDF for naming. Returns file name, page count, size and preview sizes. Replaces the current document only if loading succeeds.")]
    fn load_document(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        let mut session = self.session();
        match session.load_document(&path) {
            Ok(info) => {
                let previews = session
                    .previews()
                    .iter()
                    .map(|p| PreviewResult {
                        page: p.page,
                        width: p.width(),
                        height: p.height(),
                    })
                    .collect();
                to_json(&LoadResult {
                    document: info.into(),
                    previews,
                })
            }
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Show the loaded document, year prefix, page names and submitted file names")]
    fn session_state(&self) -> String {
        let session = self.session();
        to_json(&self.state(&session))
    }

    #[tool(description = "Set the name of one page (no validation until process)")]
    fn set_name(&self, Parameters(req): Parameters<SetNameRequest>) -> String {
        let index = match page_index(req.page) {
            Ok(index) => index,
            Err(e) => return e,
        };
        let mut session = self.session();
        match session.set_name(index, req.name) {
            Ok(()) => to_json(&self.state(&session)),
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Submit a page's name; republishes the prefixed names of all pages")]
    fn submit_name(&self, Parameters(req): Parameters<PageRequest>) -> String {
        let index = match page_index(req.page) {
            Ok(index) => index,
            Err(e) => return e,
        };
        let mut session = self.session();
        match session.submit_name(index) {
            Ok(submitted) => to_json(&submitted),
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Replace a submitted name; the page is the position in the submitted list")]
    fn update_name(&self, Parameters(req): Parameters<SetNameRequest>) -> String {
        let index = match page_index(req.page) {
            Ok(index) => index,
            Err(e) => return e,
        };
        let mut session = self.session();
        match session.update_name(index, &req.name) {
            Ok(display) => to_json(&UpdateResult {
                page: req.page,
                display_name: display,
                count: session.display_names().len(),
            }),
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Set or clear the year prefix used in file names (ATCH_<year>_<name>.pdf)")]
    fn set_year_prefix(&self, Parameters(req): Parameters<YearPrefixRequest>) -> String {
        let prefix = match req.year.filter(|y| !y.is_empty()) {
            None => YearPrefix::None,
            Some(year) if req.custom => YearPrefix::Custom(year),
            Some(year) => match self.config.preset(&year) {
                Ok(prefix) => prefix,
                Err(e) => return format!("Error: {}", e),
            },
        };

        let mut session = self.session();
        session.set_year_prefix(prefix);
        to_json(&self.state(&session))
    }

    #[tool(description = "Split the document into one PDF per page named from the page names, and save the names file. Fails without writing anything if a name is empty or duplicated.")]
    fn process(&self) -> String {
        let mut session = self.session();
        match session.process() {
            Ok(report) => to_json(&ProcessResult {
                output_dir: report.output_dir.display().to_string(),
                files: report
                    .files
                    .iter()
                    .map(|f| f.display().to_string())
                    .collect(),
            }),
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Save page names to a CSV next to the source PDF")]
    fn save_names(&self) -> String {
        let session = self.session();
        match session.save_sidecar() {
            Ok(Some(path)) => to_json(&SavedResult {
                path: path.display().to_string(),
            }),
            Ok(None) => "No pages loaded; nothing saved.".to_string(),
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Load page names from a CSV written by save_names; rows are matched to pages by position")]
    fn load_names(&self, Parameters(PathRequest { path }): Parameters<PathRequest>) -> String {
        let mut session = self.session();
        match session.load_sidecar(&path) {
            Ok(_) => to_json(&self.state(&session)),
            Err(e) => format!("Error: {}", e),
        }
    }

    #[tool(description = "Forget the loaded document, names and year prefix")]
    fn clear(&self) -> String {
        let mut session = self.session();
        session.clear();
        to_json(&self.state(&session))
    }
}

// Result types for MCP tools

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct DocumentResult {
    pub path: String,
    pub file_name: String,
    pub page_count: u32,
    pub size: String,
}

impl From<DocumentInfo> for DocumentResult {
    fn from(info: DocumentInfo) -> Self {
        DocumentResult {
            path: info.path.display().to_string(),
            size: info.size_kb(),
            file_name: info.file_name,
            page_count: info.page_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PreviewResult {
    pub page: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct LoadResult {
    pub document: DocumentResult,
    pub previews: Vec<PreviewResult>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SessionState {
    pub document: Option<DocumentResult>,
    pub year_prefix: Option<String>,
    pub year_presets: Vec<String>,
    pub names: Vec<String>,
    pub committed_pages: Vec<u32>,
    pub submitted: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct UpdateResult {
    pub page: u32,
    pub display_name: String,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ProcessResult {
    pub output_dir: String,
    pub files: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SavedResult {
    pub path: String,
}

#[tool_handler]
impl ServerHandler for SplitterServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Split a PDF into single-page files with chosen names. Use load_document to \
                 open a PDF, set_name for each page, optionally set_year_prefix, then process \
                 to write ATCH_[<year>_]<name>.pdf files into a folder next to the source. \
                 save_names and load_names keep names in a CSV between sessions."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

pub async fn run_server(config: Config) -> Result<()> {
    let server = SplitterServer::new(config);
    info!("starting MCP server on stdio");

    // Serve using stdin/stdout as a tuple
    let service = server.serve((tokio::io::stdin(), tokio::io::stdout())).await?;

    service.waiting().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::write_test_pdf;
    use tempfile::TempDir;

    fn set_name(server: &SplitterServer, page: u32, name: &str) -> String {
        server.set_name(Parameters(SetNameRequest {
            page,
            name: name.to_string(),
        }))
    }

    #[test]
    fn test_tools_drive_a_session() {
        let dir = TempDir::new().unwrap();
        let path = write_test_pdf(dir.path(), "report.pdf", 2);
        let server = SplitterServer::new(Config::default());

        let loaded = server.load_document(Parameters(PathRequest {
            path: path.display().to_string(),
        }));
        let loaded: serde_json::Value = serde_json::from_str(&loaded).unwrap();
        assert_eq!(loaded["document"]["page_count"], 2);
        assert_eq!(loaded["previews"][0]["width"], 595);

        set_name(&server, 1, "Cover");
        set_name(&server, 2, "Body");
        let prefix = server.set_year_prefix(Parameters(YearPrefixRequest {
            year: Some("2024".into()),
            custom: false,
        }));
        assert!(prefix.contains("\"year_prefix\": \"2024\""), "{}", prefix);

        let processed = server.process();
        let processed: serde_json::Value = serde_json::from_str(&processed).unwrap();
        assert_eq!(processed["files"].as_array().unwrap().len(), 2);
        assert!(dir.path().join("report").join("ATCH_2024_Cover.pdf").exists());
        assert!(dir.path().join("report.csv").exists());
    }

    #[test]
    fn test_errors_are_reported_as_text() {
        let server = SplitterServer::new(Config::default());
        assert!(server.process().starts_with("Error: "));
        assert!(server
            .set_year_prefix(Parameters(YearPrefixRequest {
                year: Some("1999".into()),
                custom: false,
            }))
            .starts_with("Error: "));
    }

    #[test]
    fn test_out_of_range_page_is_reported_one_based() {
        let dir = TempDir::new().unwrap();
        let path = write_test_pdf(dir.path(), "report.pdf", 2);
        let server = SplitterServer::new(Config::default());
        server.load_document(Parameters(PathRequest {
            path: path.display().to_string(),
        }));

        assert_eq!(
            set_name(&server, 5, "Extra"),
            "Error: Page 5 is out of range (document has 2 page(s))"
        );
        assert!(set_name(&server, 0, "Zero").starts_with("Error: "));
    }

    #[test]
    fn test_custom_year_prefix() {
        let server = SplitterServer::new(Config::default());
        let state = server.set_year_prefix(Parameters(YearPrefixRequest {
            year: Some("1999".into()),
            custom: true,
        }));
        assert!(state.contains("\"year_prefix\": \"1999\""), "{}", state);
    }
}
