pub mod cli;
pub mod config;
pub mod datetime;
pub mod error;
pub mod format;
pub mod output;
pub mod quarter;
pub mod render;

use std::ffi::OsString;
use std::io::{
  self,
  Write
};

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

use crate::format::FormatRegistry;
use crate::render::{
  RenderContext,
  WorklogRenderer
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting worklog"
  );

  let registry =
    FormatRegistry::default();
  if cli.list_formats {
    let mut out = io::stdout().lock();
    for id in registry.ids() {
      writeln!(out, "{id}")?;
    }
    return Ok(());
  }

  let cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  let settings = cli.settings(&cfg);
  debug!(
    config = ?cfg.loaded_file,
    ?settings,
    "resolved settings"
  );

  let format = registry
    .resolve(&settings.format)?;
  let email =
    cli::parse_email(&settings.email)?;
  cli::validate_customer(
    &settings.customer
  )?;

  let reference =
    datetime::parse_reference_date(
      &cli.date,
      datetime::today()
    )
    .context(
      "failed to resolve reference \
       date"
    )?;
  let descriptor = quarter::compute(
    Some(reference),
    cli.next_quarter
  )?;

  let ctx = RenderContext::new(
    settings.customer,
    settings.name,
    email,
    descriptor
  );
  let document = WorklogRenderer::new()
    .with_extras(settings.extras)
    .render(&ctx, format)?;

  if cli.stdout {
    let mut out = io::stdout().lock();
    out.write_all(document.as_bytes())?;
    out.flush()?;
    info!("done");
    return Ok(());
  }

  let path = output::output_path(
    &config::expand_tilde(
      &settings.output_dir
    ),
    &descriptor,
    format
  );
  if cli.quiet == 0 {
    output::write_summary(
      io::stdout().lock(),
      &ctx,
      &path
    )?;
  }

  output::write_document(
    &path, &document
  )
  .with_context(|| {
    format!(
      "failed to write worklog to {}",
      path.display()
    )
  })?;

  info!(file = %path.display(), "done");
  Ok(())
}
