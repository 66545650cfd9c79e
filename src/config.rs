use crate::errors::{config_error, AutodocError};
use crate::runtime::ReprLimits;
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};
use toml::{Table, Value as TomlValue};

/// Docstring layout used for generated blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DocStyle {
    #[default]
    Google,
    Numpy,
    Sphinx,
}

impl DocStyle {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "google" => Some(DocStyle::Google),
            "numpy" => Some(DocStyle::Numpy),
            "sphinx" | "rest" => Some(DocStyle::Sphinx),
            _ => None,
        }
    }
}

/// What counts as "already documented" in an interface file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MarkerPolicy {
    /// Bare function name anywhere in the file
    #[default]
    Name,
    /// `def name(` anywhere in the file
    Signature,
}

impl MarkerPolicy {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "name" => Some(MarkerPolicy::Name),
            "signature" => Some(MarkerPolicy::Signature),
            _ => None,
        }
    }

    /// Uniqueness key for `function_name`
    pub fn key_for(&self, function_name: &str) -> String {
        match self {
            MarkerPolicy::Name => function_name.to_string(),
            MarkerPolicy::Signature => format!("def {function_name}("),
        }
    }
}

/// Settings for documentation generation and the interface store
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AutodocConfig {
    /// Directory receiving interface files
    pub output_dir: PathBuf,
    /// Appended to the source file name, `shapes.py` -> `shapes.pyi`
    pub suffix: String,
    /// One indentation level inside generated blocks
    pub indent: String,
    /// Docstring delimiter, used at open and close
    pub quote: String,
    pub style: DocStyle,
    pub marker: MarkerPolicy,
    pub repr: ReprLimits,
    /// Write `from module import Class` lines for non-builtin classes
    pub emit_imports: bool,
}

impl Default for AutodocConfig {
    fn default() -> Self {
        AutodocConfig {
            output_dir: PathBuf::from("typings"),
            suffix: "i".to_string(),
            indent: "    ".to_string(),
            quote: "\"\"\"".to_string(),
            style: DocStyle::default(),
            marker: MarkerPolicy::default(),
            repr: ReprLimits::default(),
            emit_imports: true,
        }
    }
}

impl AutodocConfig {
    pub fn new() -> Self {
        AutodocConfig::default()
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_style(mut self, style: DocStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_marker(mut self, marker: MarkerPolicy) -> Self {
        self.marker = marker;
        self
    }

    /// Load `[tool.autodoc]` from a `pyproject.toml`; defaults if absent
    pub fn from_pyproject(path: impl AsRef<Path>) -> Result<Self, AutodocError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Ok(AutodocConfig::default());
        }
        let content = fs::read_to_string(path)?;
        let mut config = AutodocConfig::default();
        config.parse_pyproject_toml(&content)?;
        Ok(config)
    }

    /// Apply the keys of the `[tool.autodoc]` table of a `pyproject.toml`
    pub fn parse_pyproject_toml(&mut self, content: &str) -> Result<(), AutodocError> {
        let document: Table = toml::from_str(content)
            .map_err(|e| config_error(format!("invalid pyproject.toml: {e}")))?;
        let Some(table) = document
            .get("tool")
            .and_then(|tool| tool.get("autodoc"))
            .and_then(TomlValue::as_table)
        else {
            return Ok(());
        };

        for (key, value) in table {
            match key.as_str() {
                "output_dir" => self.output_dir = PathBuf::from(expect_str(key, value)?),
                "suffix" => self.suffix = expect_str(key, value)?.to_string(),
                "indent" => {
                    self.indent = match value {
                        TomlValue::Integer(width) if *width >= 0 => " ".repeat(*width as usize),
                        TomlValue::String(unit) => unit.clone(),
                        other => {
                            return Err(config_error(format!(
                                "indent must be a width or a string, got `{other}`"
                            )))
                        }
                    }
                }
                "style" => {
                    let name = expect_str(key, value)?;
                    self.style = DocStyle::parse(name)
                        .ok_or_else(|| config_error(format!("unknown docstring style `{name}`")))?
                }
                "marker" => {
                    let name = expect_str(key, value)?;
                    self.marker = MarkerPolicy::parse(name)
                        .ok_or_else(|| config_error(format!("unknown marker policy `{name}`")))?
                }
                "emit_imports" => {
                    self.emit_imports = value.as_bool().ok_or_else(|| {
                        config_error(format!("emit_imports must be true or false, got `{value}`"))
                    })?
                }
                other => warn!("ignoring unknown [tool.autodoc] key `{other}`"),
            }
        }

        Ok(())
    }
}

fn expect_str<'a>(key: &str, value: &'a TomlValue) -> Result<&'a str, AutodocError> {
    value
        .as_str()
        .ok_or_else(|| config_error(format!("{key} must be a string, got `{value}`")))
}
