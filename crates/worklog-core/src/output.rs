use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::datetime::format_long_date;
use crate::format::OutputFormat;
use crate::quarter::QuarterDescriptor;
use crate::render::RenderContext;

/// `WorkLog_<year>Q<quarter>.<ext>`
pub fn file_name(descriptor: &QuarterDescriptor, format: &dyn OutputFormat) -> String {
    format!(
        "WorkLog_{}Q{}.{}",
        descriptor.year,
        descriptor.quarter,
        format.extension()
    )
}

/// Replaces `path` with `document` via a temp file in the same directory.
///
/// The temp file is created owner-only (0600 on unix) and keeps those
/// permissions once persisted.
#[tracing::instrument(skip(document))]
pub fn write_document(path: &Path, document: &str) -> anyhow::Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    if !dir.exists() {
        info!(dir = %dir.display(), "creating output directory");
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    temp.write_all(document.as_bytes())?;
    temp.flush()?;

    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

    debug!(file = %path.display(), bytes = document.len(), "wrote worklog");
    Ok(())
}

pub fn output_path(dir: &Path, descriptor: &QuarterDescriptor, format: &dyn OutputFormat) -> PathBuf {
    dir.join(file_name(descriptor, format))
}

pub fn write_summary<W: Write>(mut writer: W, ctx: &RenderContext, path: &Path) -> anyhow::Result<()> {
    let d = &ctx.descriptor;
    writeln!(
        writer,
        "Generating report for customer {} year {} and Quarter {} in file {}. Using ...",
        ctx.customer,
        d.year,
        d.quarter,
        path.display()
    )?;
    writeln!(writer, "  Name: {}", ctx.author_name)?;
    writeln!(writer, "  Email: {}", ctx.author_email)?;
    writeln!(writer, "  Between weeks: {} and {}", d.first_week, d.last_week)?;
    writeln!(
        writer,
        "  Between days: {} and {}",
        format_long_date(d.first_day),
        format_long_date(d.last_day)
    )?;
    Ok(())
}
