//! Code-persistence tool: the generated dashboard page
//!
//! One operation, one fixed output path. Every successful call fully
//! replaces the previous page; there is no versioning and at most one
//! generated page exists at any time.

use finsight_llm::ToolDefinition;
use finsight_llm::tools::schema;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Tool name the write stage is instructed to call
pub const SAVE_PAGE_TOOL: &str = "save_dashboard_page";

/// Default location of the generated page
pub const DEFAULT_PAGE_PATH: &str = "pages/generated_dashboard.html";

/// Writes generated page source to the fixed page path
#[derive(Debug, Clone)]
pub struct PageWriter {
    path: PathBuf,
}

impl Default for PageWriter {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_PATH)
    }
}

impl PageWriter {
    /// Create a writer targeting the given page path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The fixed path the page is written to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Tool definition for the write stage
    pub fn definition() -> ToolDefinition {
        ToolDefinition::new(
            SAVE_PAGE_TOOL,
            "Save the generated dashboard page source to the application's page file, \
             replacing any previous page.",
            schema::object(
                json!({
                    "source_code": schema::string("Complete source of the dashboard page"),
                }),
                vec!["source_code"],
            ),
        )
    }

    /// Write the page source verbatim, creating parent directories
    pub fn try_save(&self, source_code: &str) -> std::io::Result<PathBuf> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, source_code)?;
        info!("Saved dashboard page to {}", self.path.display());
        Ok(self.path.clone())
    }

    /// Write the page source and shape the outcome as tool-result content
    ///
    /// Returns the saved path on success, or a descriptive error string on
    /// filesystem failure. The content is not validated; producing a
    /// runnable page is the generating stage's responsibility.
    pub fn save(&self, source_code: &str) -> String {
        match self.try_save(source_code) {
            Ok(path) => path.to_string_lossy().into_owned(),
            Err(e) => format!("Error saving dashboard page: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_returns_path_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pages").join("generated_dashboard.html");
        let writer = PageWriter::new(&path);

        let result = writer.save("<html></html>");
        assert_eq!(result, path.to_string_lossy());
        assert_eq!(fs::read_to_string(&path).unwrap(), "<html></html>");
    }

    #[test]
    fn test_save_fully_replaces_previous_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generated_dashboard.html");
        let writer = PageWriter::new(&path);

        writer.save("a much longer first version of the page source");
        writer.save("<html>v2</html>");

        assert_eq!(fs::read_to_string(&path).unwrap(), "<html>v2</html>");
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_save_failure_yields_error_string() {
        // A directory cannot be overwritten by a file write
        let dir = tempfile::tempdir().unwrap();
        let writer = PageWriter::new(dir.path());

        let result = writer.save("<html></html>");
        assert!(result.starts_with("Error saving dashboard page:"));
    }

    #[test]
    fn test_definition_shape() {
        let def = PageWriter::definition();
        assert_eq!(def.name, SAVE_PAGE_TOOL);
        assert!(def.input_schema["properties"]["source_code"].is_object());
    }
}
