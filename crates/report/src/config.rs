//! Generator configuration: filesystem conventions plus page layout

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::layout::LayoutConfig;
use crate::{ReportError, Result};

/// Where the generator reads its inputs and writes reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportPaths {
    #[serde(rename = "templatePath")]
    pub template_path: PathBuf,
    #[serde(rename = "fontPath")]
    pub font_path: PathBuf,
    #[serde(rename = "outputDir")]
    pub output_dir: PathBuf,
    /// Public URL prefix under which `output_dir` is served
    #[serde(rename = "urlPrefix")]
    pub url_prefix: String,
}

impl Default for ReportPaths {
    fn default() -> Self {
        Self {
            template_path: PathBuf::from("templates/final_report_template.pdf"),
            font_path: PathBuf::from("fonts/NotoSansKR-Regular.ttf"),
            output_dir: PathBuf::from("reports"),
            url_prefix: "/reports/".to_string(),
        }
    }
}

impl ReportPaths {
    /// Paths relative to a base directory, keeping the default file names
    pub fn under<P: AsRef<Path>>(base: P) -> Self {
        let base = base.as_ref();
        let defaults = Self::default();
        Self {
            template_path: base.join(defaults.template_path),
            font_path: base.join(defaults.font_path),
            output_dir: base.join(defaults.output_dir),
            url_prefix: defaults.url_prefix,
        }
    }

    /// Public URL of a generated file
    pub fn url_for(&self, filename: &str) -> String {
        if self.url_prefix.ends_with('/') {
            format!("{}{}", self.url_prefix, filename)
        } else {
            format!("{}/{}", self.url_prefix, filename)
        }
    }
}

/// Complete generator configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub paths: ReportPaths,
    pub layout: LayoutConfig,
}

impl ReportConfig {
    /// Parse and validate a JSON configuration; omitted keys keep defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ReportConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.paths.output_dir.as_os_str().is_empty() {
            return Err(ReportError::Config(
                "output directory must not be empty".to_string(),
            ));
        }
        self.layout.validate()
    }
}
