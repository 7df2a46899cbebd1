use std::collections::BTreeMap;
use std::fmt::Debug;

use chrono::NaiveDate;
use tracing::debug;

use crate::datetime::{format_long_date, format_padded_date};
use crate::error::{Result, WorklogError};
use crate::render::RenderContext;

pub const DEFAULT_FORMAT: &str = "adoc";

/// Text fragments a worklog document is assembled from.
///
/// Implementations are stateless: every fragment depends only on its
/// arguments.
pub trait OutputFormat: Debug + Send + Sync {
    fn id(&self) -> &'static str;

    fn extension(&self) -> &'static str;

    fn directives(&self) -> String;

    fn header_main(&self, ctx: &RenderContext) -> String;

    fn header_topic(&self, topic: &str) -> String;

    fn header_week(&self, week_number: u32, start_day: NaiveDate) -> String;

    fn header_daily(&self, ctx: &RenderContext, day: NaiveDate) -> String;

    fn item_daily(&self) -> String;

    fn header_pto(&self) -> String;

    fn header_check_in(&self, ctx: &RenderContext) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiDoc;

impl OutputFormat for AsciiDoc {
    fn id(&self) -> &'static str {
        "adoc"
    }

    fn extension(&self) -> &'static str {
        "adoc"
    }

    fn directives(&self) -> String {
        "// Directives\n:toc:\n:sectnums:\n:sectnumlevels: 2\n:hardbreaks:\n".to_string()
    }

    fn header_main(&self, ctx: &RenderContext) -> String {
        format!(
            "= {} Q{} WorkLog\n{} <{}>\n\n",
            ctx.year(),
            ctx.quarter(),
            ctx.author_name,
            ctx.author_email
        )
    }

    fn header_topic(&self, topic: &str) -> String {
        format!("== {topic}\n")
    }

    fn header_week(&self, week_number: u32, start_day: NaiveDate) -> String {
        format!(
            "=== Week {week_number} (TODO) {}\n",
            format_long_date(start_day)
        )
    }

    fn header_daily(&self, ctx: &RenderContext, day: NaiveDate) -> String {
        format!("==== {}: {}\n", ctx.customer, format_padded_date(day))
    }

    fn item_daily(&self) -> String {
        concat!(
            ".Schedule update\n",
            "None\n",
            "\n",
            ".Issues/Blockers\n",
            "None\n",
            "\n",
            ".Progress today\n",
            ". [todo]\n",
            "\n",
            ".Plans for tomorrow\n",
            ". [todo]\n",
            "\n",
            ".References/Links\n",
            "None\n",
            "\n",
        )
        .to_string()
    }

    fn header_pto(&self) -> String {
        concat!(
            "== PTO\n",
            ".This Quarter\n",
            ". [todo]\n",
            "\n",
            ".Next Quarter\n",
            ". [todo]\n",
            "\n",
        )
        .to_string()
    }

    fn header_check_in(&self, ctx: &RenderContext) -> String {
        format!(
            "== Q{} CheckIn\n.Impacts\n. [todo]\n\n.Challenges\n. [todo]\n\n.Priorities\n. [todo]\n\n",
            ctx.quarter()
        )
    }
}

/// Maps format identifiers to [`OutputFormat`] implementations.
#[derive(Debug)]
pub struct FormatRegistry {
    formats: BTreeMap<&'static str, Box<dyn OutputFormat>>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(AsciiDoc));
        registry
    }
}

impl FormatRegistry {
    pub fn empty() -> Self {
        Self {
            formats: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, format: Box<dyn OutputFormat>) {
        debug!(format = format.id(), "registered output format");
        self.formats.insert(format.id(), format);
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.formats.keys().copied().collect()
    }

    #[tracing::instrument(skip(self))]
    pub fn resolve(&self, id: &str) -> Result<&dyn OutputFormat> {
        self.formats
            .get(id.trim())
            .map(|format| format.as_ref())
            .ok_or_else(|| WorklogError::UnsupportedFormat {
                format: id.to_string(),
                supported: self.ids().join(", "),
            })
    }
}
