//! Cast declarations and the per-type registry.
//!
//! A [`Schema`] is the definition of a container type: which attributes are
//! cast and how, which are always dates, which are exported, and the default
//! date format. It is built once, wrapped in an [`Arc`] and shared by every
//! instance of the type. It has no mutators.
//!
//! Declarations can be written as a constant table, the same way attribute
//! registries are usually spelled out:
//!
//! ```
//! use dtokit::{CastKind, CastSpec, Schema};
//!
//! const CASTS: &[CastSpec] = &[
//!     CastSpec::new("age", CastKind::Int),
//!     CastSpec::new("meta", CastKind::Json),
//! ];
//!
//! let schema = Schema::builder().casts(CASTS).build();
//! assert_eq!(schema.cast_kind_for("age"), Some(CastKind::Int));
//! ```

use std::sync::Arc;

use indexmap::IndexMap;

use crate::cast::CastKind;
use crate::config::DtoConfig;
use crate::error::Result;
use crate::moment::DATE_TIME_FORMAT;

/// Attribute names treated as dates when timestamps are enabled.
pub const TIMESTAMP_ATTRIBUTES: [&str; 2] = ["created_at", "updated_at"];

/// A single cast declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastSpec {
    pub name: &'static str,
    pub kind: CastKind,
}

impl CastSpec {
    pub const fn new(name: &'static str, kind: CastKind) -> Self {
        Self { name, kind }
    }
}

/// Immutable definition of a container type.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    casts: IndexMap<String, CastKind>,
    dates: Vec<String>,
    visible: Vec<String>,
    hidden: Vec<String>,
    date_format: String,
}

impl Default for Schema {
    fn default() -> Self {
        SchemaBuilder::default().finish()
    }
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Build a schema from configuration.
    ///
    /// Fails with [`DtoError::UnknownCastKind`](crate::DtoError::UnknownCastKind)
    /// if any declared cast is not one of the recognized spellings.
    pub fn from_config(config: &DtoConfig) -> Result<Arc<Self>> {
        let mut builder = Self::builder()
            .date_format(config.date_format.clone())
            .timestamps(config.timestamps);

        if let Some(casts) = &config.casts {
            for (name, kind) in casts {
                builder = builder.cast(name.clone(), kind.parse::<CastKind>()?);
            }
        }
        if let Some(dates) = &config.dates {
            builder = dates.iter().fold(builder, |b, name| b.date(name.clone()));
        }
        if let Some(visible) = &config.visible {
            builder = builder.visible(visible.iter().cloned());
        }
        if let Some(hidden) = &config.hidden {
            builder = builder.hidden(hidden.iter().cloned());
        }
        Ok(builder.build())
    }

    /// Look up the cast applied to `name`.
    ///
    /// Explicit casts win; otherwise date attributes resolve to
    /// [`CastKind::DateTime`]. Everything else is passed through unmodified.
    pub fn cast_kind_for(&self, name: &str) -> Option<CastKind> {
        self.casts.get(name).copied().or_else(|| {
            self.dates
                .iter()
                .any(|d| d == name)
                .then_some(CastKind::DateTime)
        })
    }

    pub fn casts(&self) -> impl Iterator<Item = (&str, CastKind)> {
        self.casts.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    /// Attribute names that restrict (and order) serialization. Empty means
    /// every stored attribute is exported.
    pub fn visible(&self) -> &[String] {
        &self.visible
    }

    pub fn is_hidden(&self, name: &str) -> bool {
        self.hidden.iter().any(|h| h == name)
    }

    /// Default date format for new instances of this type.
    pub fn date_format(&self) -> &str {
        &self.date_format
    }
}

#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    casts: IndexMap<String, CastKind>,
    dates: Vec<String>,
    visible: Vec<String>,
    hidden: Vec<String>,
    date_format: String,
    timestamps: bool,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self {
            casts: IndexMap::new(),
            dates: Vec::new(),
            visible: Vec::new(),
            hidden: Vec::new(),
            date_format: DATE_TIME_FORMAT.to_string(),
            timestamps: true,
        }
    }
}

impl SchemaBuilder {
    /// Declare a cast. A later declaration for the same name replaces it.
    pub fn cast(mut self, name: impl Into<String>, kind: CastKind) -> Self {
        self.casts.insert(name.into(), kind);
        self
    }

    pub fn casts(self, specs: &[CastSpec]) -> Self {
        specs
            .iter()
            .fold(self, |builder, spec| builder.cast(spec.name, spec.kind))
    }

    /// Always read `name` as a date, even without a cast.
    pub fn date(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.dates.contains(&name) {
            self.dates.push(name);
        }
        self
    }

    /// Toggle the implicit `created_at`/`updated_at` date attributes.
    pub fn timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }

    pub fn visible<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.visible = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn hidden<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    pub fn build(self) -> Arc<Schema> {
        Arc::new(self.finish())
    }

    fn finish(self) -> Schema {
        let mut builder = self;
        if builder.timestamps {
            for name in TIMESTAMP_ATTRIBUTES {
                builder = builder.date(name);
            }
        }
        Schema {
            casts: builder.casts,
            dates: builder.dates,
            visible: builder.visible,
            hidden: builder.hidden,
            date_format: builder.date_format,
        }
    }
}
