//! Grid options.
//!
//! Options are plain serde structs so they can live in an application's TOML
//! settings file:
//!
//! ```
//! use horizon_treegrid::{SelectionMode, TreeGridOptions};
//!
//! let options = TreeGridOptions::from_toml_str(r#"
//!     selection_mode = "extended"
//!     remember_selection_on_collapse = false
//! "#).unwrap();
//!
//! assert_eq!(options.selection_mode, SelectionMode::Extended);
//! assert!(options.show_expander_before_expand);
//! assert!(!options.remember_selection_on_collapse);
//! ```

use std::path::Path as FsPath;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TreeError};
use crate::model::SelectionMode;

/// Behavior switches for a tree grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeGridOptions {
    /// How pointer and keyboard interaction selects rows.
    pub selection_mode: SelectionMode,
    /// Show an expander on rows whose children have not been resolved yet.
    pub show_expander_before_expand: bool,
    /// Keep the selection of rows hidden by a collapse.
    pub remember_selection_on_collapse: bool,
}

impl Default for TreeGridOptions {
    fn default() -> Self {
        Self {
            selection_mode: SelectionMode::default(),
            show_expander_before_expand: true,
            remember_selection_on_collapse: true,
        }
    }
}

impl TreeGridOptions {
    /// Decodes options from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads options from a TOML file.
    pub fn load(path: impl AsRef<FsPath>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| TreeError::io(path, e))?;
        let options = Self::from_toml_str(&text)?;
        tracing::debug!(
            target: horizon_treegrid_core::logging::targets::GRID,
            path = %path.display(),
            "loaded grid options"
        );
        Ok(options)
    }

    /// Encodes the options as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
