use std::collections::HashMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};
use std::time::Duration;

use anyhow::{
  Context,
  anyhow
};
use home_shared::DEFAULT_IDLE_TIMEOUT;
use tracing::{
  debug,
  info,
  trace,
  warn
};
use url::Url;

pub const DEFAULT_SERVER_URL: &str =
  "http://127.0.0.1:5000";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 =
  30;

#[derive(Debug, Clone)]
pub struct Config {
  map: HashMap<String, String>,
  pub loaded_files: Vec<PathBuf>
}

impl Config {
  #[tracing::instrument(skip(
    homerc_override
  ))]
  pub fn load(
    homerc_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Config::defaults();

    let homerc = resolve_homerc_path(
      homerc_override
    )?;
    if let Some(path) = homerc {
      info!(homerc = %path.display(), "loading homerc");
      cfg.load_file(&path, &mut Vec::new())?;
    } else {
      debug!(
        "no homerc found; using \
         defaults"
      );
    }

    Ok(cfg)
  }

  pub fn defaults() -> Self {
    let mut cfg = Config {
      map:          HashMap::new(),
      loaded_files: vec![]
    };

    cfg.set(
      "server.url",
      DEFAULT_SERVER_URL
    );
    cfg.set(
      "session.timeout",
      DEFAULT_IDLE_TIMEOUT
        .as_millis()
        .to_string()
    );
    cfg.set(
      "http.timeout",
      DEFAULT_HTTP_TIMEOUT_SECS
        .to_string()
    );
    cfg
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, "applying override");
      self.map.insert(key, v);
    }
  }

  pub fn set(
    &mut self,
    key: &str,
    value: impl Into<String>
  ) {
    self
      .map
      .insert(key.to_string(), value.into());
  }

  pub fn get(
    &self,
    key: &str
  ) -> Option<String> {
    self
      .map
      .get(key)
      .filter(|v| !v.is_empty())
      .cloned()
  }

  pub fn get_u64(
    &self,
    key: &str
  ) -> anyhow::Result<Option<u64>> {
    self
      .get(key)
      .map(|raw| {
        raw.trim().parse::<u64>().with_context(
          || {
            format!(
              "{key} must be a \
               non-negative integer, \
               got {raw:?}"
            )
          }
        )
      })
      .transpose()
  }

  pub fn server_url(
    &self
  ) -> anyhow::Result<Url> {
    let raw = self
      .get("server.url")
      .unwrap_or_else(|| {
        DEFAULT_SERVER_URL.to_string()
      });
    Url::parse(&raw).with_context(|| {
      format!(
        "invalid server.url: {raw}"
      )
    })
  }

  pub fn idle_timeout(
    &self
  ) -> anyhow::Result<Duration> {
    Ok(
      self
        .get_u64("session.timeout")?
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_IDLE_TIMEOUT)
    )
  }

  pub fn http_timeout(
    &self
  ) -> anyhow::Result<Duration> {
    Ok(Duration::from_secs(
      self
        .get_u64("http.timeout")?
        .unwrap_or(
          DEFAULT_HTTP_TIMEOUT_SECS
        )
    ))
  }

  /// `loading` holds the files currently
  /// being read, outermost first.
  #[tracing::instrument(skip(self, loading))]
  fn load_file(
    &mut self,
    path: &Path,
    loading: &mut Vec<PathBuf>
  ) -> anyhow::Result<()> {
    let path = expand_tilde(path);
    let identity = fs::canonicalize(&path)
      .unwrap_or_else(|_| path.clone());
    if loading.contains(&identity) {
      return Err(anyhow!(
        "include cycle at {}",
        path.display()
      ));
    }
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;

    self
      .loaded_files
      .push(path.clone());

    let base_dir = path
      .parent()
      .map(|p| p.to_path_buf())
      .unwrap_or_else(|| {
        PathBuf::from(".")
      });

    for (line_num, raw_line) in
      text.lines().enumerate()
    {
      let line = strip_comment(raw_line);

      if line.is_empty() {
        continue;
      }

      if let Some(include_rest) =
        line.strip_prefix("include ")
      {
        let include_path =
          resolve_include_path(
            &base_dir,
            include_rest.trim()
          )?;
        debug!(
            file = %path.display(),
            include = %include_path.display(),
            line = line_num + 1,
            "processing include"
        );

        if include_path.exists() {
          loading.push(identity.clone());
          let result = self.load_file(
            &include_path,
            loading
          );
          loading.pop();
          result?;
        } else {
          warn!(include = %include_path.display(), "include file does not exist; skipping");
        }
        continue;
      }

      let (k, v) = line
        .split_once('=')
        .ok_or_else(|| {
          anyhow!(
            "invalid config line \
             {}:{}: {}",
            path.display(),
            line_num + 1,
            raw_line
          )
        })?;

      let key = k.trim().to_string();
      let value = v.trim().to_string();
      trace!(key = %key, "loaded config key");
      self.map.insert(key, value);
    }

    Ok(())
  }
}

#[tracing::instrument(skip(
  override_path
))]
fn resolve_homerc_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(homerc_env) =
    std::env::var("HOMERC")
  {
    if homerc_env == "/dev/null" {
      return Ok(None);
    }
    return Ok(Some(PathBuf::from(
      homerc_env
    )));
  }

  let Some(home) = dirs::home_dir()
  else {
    warn!(
      "cannot determine home \
       directory; skipping homerc"
    );
    return Ok(None);
  };
  let candidate = home.join(".homerc");
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

/// `#` opens a comment at the start of a
/// line or after whitespace, so values may
/// contain it.
fn strip_comment(raw_line: &str) -> &str {
  let line = raw_line.trim();
  let cut = line
    .char_indices()
    .find(|&(index, ch)| {
      ch == '#'
        && line[..index]
          .chars()
          .next_back()
          .is_none_or(char::is_whitespace)
    })
    .map_or(line.len(), |(index, _)| index);
  line[..cut].trim_end()
}

fn resolve_include_path(
  base_dir: &Path,
  include: &str
) -> anyhow::Result<PathBuf> {
  if include.trim().is_empty() {
    return Err(anyhow!(
      "include path cannot be empty"
    ));
  }

  let raw = PathBuf::from(include);
  let expanded = expand_tilde(&raw);
  if expanded.is_absolute() {
    Ok(expanded)
  } else {
    Ok(base_dir.join(expanded))
  }
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use std::fs;
  use std::time::Duration;

  use tempfile::tempdir;

  use super::Config;

  #[test]
  fn defaults_cover_server_and_session() {
    let cfg = Config::defaults();

    assert_eq!(
      cfg
        .server_url()
        .expect("default url")
        .as_str(),
      "http://127.0.0.1:5000/"
    );
    assert_eq!(
      cfg
        .idle_timeout()
        .expect("default timeout"),
      Duration::from_millis(300_000)
    );
    assert_eq!(cfg.get("login.user"), None);
  }

  #[test]
  fn file_includes_and_overrides() {
    let dir = tempdir().expect("tempdir");
    let shared = dir.path().join("shared.rc");
    fs::write(
      &shared,
      "server.url = http://home.lan:8080\n"
    )
    .expect("write include");

    let main = dir.path().join("homerc");
    fs::write(
      &main,
      "# family tablet\ninclude \
       shared.rc\nsession.timeout=60000 \
       # one minute\nuser.id=3\n"
    )
    .expect("write homerc");

    let mut cfg = Config::load(Some(&main))
      .expect("load homerc");
    cfg.apply_overrides([(
      "rc.user.id".to_string(),
      "4".to_string()
    )]);

    assert_eq!(cfg.loaded_files.len(), 2);
    assert_eq!(
      cfg
        .server_url()
        .expect("url")
        .host_str(),
      Some("home.lan")
    );
    assert_eq!(
      cfg.idle_timeout().expect("timeout"),
      Duration::from_secs(60)
    );
    assert_eq!(
      cfg.get("user.id").as_deref(),
      Some("4")
    );
  }

  #[test]
  fn malformed_values_are_reported() {
    let mut cfg = Config::defaults();
    cfg.set("session.timeout", "soon");

    let err = cfg
      .idle_timeout()
      .expect_err("non-numeric timeout");
    assert!(
      err
        .to_string()
        .contains("session.timeout")
    );
  }

  #[test]
  fn hash_inside_a_value_is_kept() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("homerc");
    fs::write(
      &path,
      "#login\nlogin.passcode=ab#12 # kitchen \
       tablet\nlogin.user=2#\n"
    )
    .expect("write homerc");

    let cfg = Config::load(Some(&path))
      .expect("load homerc");

    assert_eq!(
      cfg.get("login.passcode").as_deref(),
      Some("ab#12")
    );
    assert_eq!(
      cfg.get("login.user").as_deref(),
      Some("2#")
    );
  }

  #[test]
  fn include_cycles_are_errors() {
    let dir = tempdir().expect("tempdir");
    let own = dir.path().join("homerc");
    fs::write(&own, "include homerc\n")
      .expect("write homerc");
    let first = dir.path().join("a.rc");
    let second = dir.path().join("b.rc");
    fs::write(&first, "user.id=1\ninclude b.rc\n")
      .expect("write a.rc");
    fs::write(&second, "include a.rc\n")
      .expect("write b.rc");

    let err = Config::load(Some(&own))
      .expect_err("self include");
    assert!(
      err.to_string().contains("include cycle"),
      "{err:#}"
    );

    let err = Config::load(Some(&first))
      .expect_err("mutual include");
    assert!(
      err.to_string().contains("include cycle"),
      "{err:#}"
    );
  }

  #[test]
  fn repeated_includes_are_not_cycles() {
    let dir = tempdir().expect("tempdir");
    let shared = dir.path().join("shared.rc");
    fs::write(&shared, "user.id=5\n")
      .expect("write shared.rc");
    let main = dir.path().join("homerc");
    fs::write(
      &main,
      "include shared.rc\ninclude shared.rc\n"
    )
    .expect("write homerc");

    let cfg = Config::load(Some(&main))
      .expect("load homerc");

    assert_eq!(cfg.loaded_files.len(), 3);
    assert_eq!(
      cfg.get("user.id").as_deref(),
      Some("5")
    );
  }

  #[test]
  fn line_without_equals_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("homerc");
    fs::write(&path, "server.url\n")
      .expect("write homerc");

    assert!(Config::load(Some(&path)).is_err());
  }
}
