//! # Configuration
//!
//! A container type can be declared in code with [`Schema::builder`](crate::Schema::builder)
//! or loaded from configuration with [`DtoConfig`], managed by [`confique`].
//!
//! ## Resolution Order
//!
//! 1. **Environment variables**: `DTOKIT_DATE_FORMAT`, `DTOKIT_TIMESTAMPS`.
//! 2. **Config file**: a TOML file passed to [`DtoConfig::load`].
//! 3. **Compiled defaults**: via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `date_format` | `%Y-%m-%d %H:%M:%S` | strftime pattern used when exporting dates |
//! | `timestamps` | `true` | Treat `created_at`/`updated_at` as dates |
//! | `casts` | none | Table of `attribute = "kind"` |
//! | `dates` | none | Extra attributes always read as dates |
//! | `visible` | none | Export whitelist, in export order |
//! | `hidden` | none | Export blacklist |
//!
//! ## Example
//!
//! ```toml
//! date_format = "%d/%m/%Y"
//!
//! [casts]
//! age = "int"
//! meta = "json"
//! ```

use std::collections::HashMap;
use std::path::Path;

use confique::Config;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::moment::DATE_TIME_FORMAT;

/// Configuration for a container type.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DtoConfig {
    /// strftime pattern used when exporting date attributes.
    #[config(default = "%Y-%m-%d %H:%M:%S", env = "DTOKIT_DATE_FORMAT")]
    pub date_format: String,

    /// Whether `created_at` and `updated_at` are read as dates.
    #[config(default = true, env = "DTOKIT_TIMESTAMPS")]
    pub timestamps: bool,

    /// Cast declarations, `attribute = "kind"`.
    pub casts: Option<HashMap<String, String>>,

    /// Attributes always read as dates.
    pub dates: Option<Vec<String>>,

    pub visible: Option<Vec<String>>,

    pub hidden: Option<Vec<String>>,
}

impl Default for DtoConfig {
    fn default() -> Self {
        Self {
            date_format: DATE_TIME_FORMAT.to_string(),
            timestamps: true,
            casts: None,
            dates: None,
            visible: None,
            hidden: None,
        }
    }
}

impl DtoConfig {
    /// Load from `path`, with environment variables layered on top.
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::builder().env().file(path.as_ref()).load()?)
    }
}
