use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use serde::Deserialize;
use tracing::{
  debug,
  info
};

use crate::format::DEFAULT_FORMAT;

pub const CONFIG_ENV_VAR: &str =
  "WORKLOG_CONFIG";
const CONFIG_FILE: &str =
  "worklog.toml";
const CONFIG_DIR: &str = "worklog";

pub const DEFAULT_CUSTOMER: &str =
  "Company";
pub const DEFAULT_NAME: &str = "MyName";
pub const DEFAULT_EMAIL: &str =
  "myemail@company.io";

#[derive(
  Debug, Clone, Default, Deserialize,
)]
#[serde(deny_unknown_fields)]
struct FileConfig {
  customer:   Option<String>,
  format:     Option<String>,
  output_dir: Option<PathBuf>,
  extras:     Option<bool>,
  author:     Option<AuthorSection>
}

#[derive(
  Debug, Clone, Default, Deserialize,
)]
#[serde(deny_unknown_fields)]
struct AuthorSection {
  name:  Option<String>,
  email: Option<String>
}

/// Settings resolved from the config file and built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  pub customer:    String,
  pub name:        String,
  pub email:       String,
  pub format:      String,
  pub output_dir:  PathBuf,
  pub extras:      bool,
  pub loaded_file: Option<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    Self {
      customer:    DEFAULT_CUSTOMER
        .to_string(),
      name:        DEFAULT_NAME
        .to_string(),
      email:       DEFAULT_EMAIL
        .to_string(),
      format:      DEFAULT_FORMAT
        .to_string(),
      output_dir:  PathBuf::from("."),
      extras:      false,
      loaded_file: None
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    config_override
  ))]
  pub fn load(
    config_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let Some(path) =
      resolve_config_path(
        config_override
      )?
    else {
      debug!(
        "no config file; using \
         defaults"
      );
      return Ok(Self::default());
    };

    let path = expand_tilde(&path);
    if !path.exists() {
      if config_override.is_some() {
        return Err(anyhow!(
          "config file {} does not \
           exist",
          path.display()
        ));
      }
      debug!(file = %path.display(), "config file not found; using defaults");
      return Ok(Self::default());
    }

    info!(file = %path.display(), "loading config");
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;
    let mut cfg = Self::from_toml(
      &text
    )
    .with_context(|| {
      format!(
        "failed to parse {}",
        path.display()
      )
    })?;
    cfg.loaded_file = Some(path);
    Ok(cfg)
  }

  pub fn from_toml(
    text: &str
  ) -> anyhow::Result<Self> {
    let parsed: FileConfig =
      toml::from_str(text)?;
    let defaults = Self::default();
    let author =
      parsed.author.unwrap_or_default();

    Ok(Self {
      customer:    parsed
        .customer
        .unwrap_or(defaults.customer),
      name:        author
        .name
        .unwrap_or(defaults.name),
      email:       author
        .email
        .unwrap_or(defaults.email),
      format:      parsed
        .format
        .unwrap_or(defaults.format),
      output_dir:  parsed
        .output_dir
        .map(|dir| expand_tilde(&dir))
        .unwrap_or(defaults.output_dir),
      extras:      parsed
        .extras
        .unwrap_or(defaults.extras),
      loaded_file: None
    })
  }
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_config_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(raw) =
    std::env::var(CONFIG_ENV_VAR)
  {
    let trimmed = raw.trim();
    if trimmed == "/dev/null" {
      return Ok(None);
    }
    if !trimmed.is_empty() {
      return Ok(Some(PathBuf::from(
        trimmed
      )));
    }
  }

  if let Some(dir) = dirs::config_dir()
  {
    let candidate = dir
      .join(CONFIG_DIR)
      .join(CONFIG_FILE);
    if candidate.exists() {
      return Ok(Some(candidate));
    }
  }

  let local = std::env::current_dir()
    .context(
      "cannot determine current \
       directory"
    )?
    .join(CONFIG_FILE);
  if local.exists() {
    return Ok(Some(local));
  }

  Ok(None)
}

/// Resolves a leading `~` component against the home directory.
pub fn expand_tilde(
  path: &Path
) -> PathBuf {
  let Ok(rest) = path.strip_prefix("~")
  else {
    return path.to_path_buf();
  };
  match dirs::home_dir() {
    | Some(home)
      if rest.as_os_str().is_empty() =>
    {
      home
    }
    | Some(home) => home.join(rest),
    | None => path.to_path_buf()
  }
}
