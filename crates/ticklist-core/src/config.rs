use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, anyhow};
use tracing::{debug, info, trace, warn};

use crate::overlay::{OVERLAY_ATTRIBUTION, OVERLAY_TITLE, OverlaySettings, RearmPolicy};

pub const RC_ENV: &str = "TICKLISTRC";
const RC_FILE_NAME: &str = ".ticklistrc";
const LOG_FILE_NAME: &str = "ticklist.log";

#[derive(Debug, Clone)]
pub struct Config {
    map: HashMap<String, String>,
    pub loaded_files: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let mut map = HashMap::new();
        map.insert("overlay.delay".to_string(), "10".to_string());
        map.insert("overlay.rearm".to_string(), "stack".to_string());
        map.insert("overlay.title".to_string(), OVERLAY_TITLE.to_string());
        map.insert(
            "overlay.attribution".to_string(),
            OVERLAY_ATTRIBUTION.to_string(),
        );
        map.insert("color".to_string(), "on".to_string());

        Self {
            map,
            loaded_files: vec![],
        }
    }
}

impl Config {
    #[tracing::instrument(skip(rc_override))]
    pub fn load(rc_override: Option<&Path>) -> anyhow::Result<Self> {
        let mut cfg = Config::default();

        match resolve_rc_path(rc_override)? {
            Some(path) => {
                info!(rc = %path.display(), "loading ticklistrc");
                cfg.load_file(&path)?;
            }
            None => {
                debug!("no ticklistrc found; using defaults");
            }
        }

        Ok(cfg)
    }

    #[tracing::instrument(skip(self, overrides))]
    pub fn apply_overrides<I>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (k, v) in overrides {
            let key = k.strip_prefix("rc.").unwrap_or(&k).to_string();
            debug!(key = %key, value = %v, "applying override");
            self.map.insert(key, v);
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_bool(&self, key: &str) -> anyhow::Result<Option<bool>> {
        self.map
            .get(key)
            .map(|v| parse_bool(v).ok_or_else(|| anyhow!("invalid boolean for {key}: {v}")))
            .transpose()
    }

    pub fn color(&self) -> anyhow::Result<bool> {
        Ok(self.get_bool("color")?.unwrap_or(true))
    }

    pub fn overlay_settings(&self) -> anyhow::Result<OverlaySettings> {
        let defaults = OverlaySettings::default();

        let delay = match self.get("overlay.delay") {
            Some(raw) => parse_delay(&raw).context("invalid overlay.delay")?,
            None => defaults.delay,
        };
        let policy = match self.get("overlay.rearm") {
            Some(raw) => raw.parse::<RearmPolicy>()?,
            None => defaults.policy,
        };

        Ok(OverlaySettings {
            delay,
            policy,
            title: self.get("overlay.title").unwrap_or(defaults.title),
            attribution: self
                .get("overlay.attribution")
                .unwrap_or(defaults.attribution),
        })
    }

    #[tracing::instrument(skip(self))]
    fn load_file(&mut self, path: &Path) -> anyhow::Result<()> {
        let path = expand_tilde(path);
        let path = fs::canonicalize(&path).unwrap_or(path);
        if self.loaded_files.contains(&path) {
            warn!(file = %path.display(), "config file already loaded; skipping");
            return Ok(());
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        self.loaded_files.push(path.clone());

        let base_dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();

        for (idx, raw_line) in text.lines().enumerate() {
            let line_num = idx + 1;
            match RcLine::parse(raw_line) {
                Some(RcLine::Include(target)) => {
                    let include_path = resolve_include_path(&base_dir, target)?;
                    debug!(
                        file = %path.display(),
                        include = %include_path.display(),
                        line = line_num,
                        "processing include"
                    );
                    if include_path.exists() {
                        self.load_file(&include_path)?;
                    } else {
                        warn!(include = %include_path.display(), "include file does not exist; skipping");
                    }
                }
                Some(RcLine::Entry(key, value)) => {
                    trace!(key, value, "loaded config key");
                    self.map.insert(key.to_string(), value.to_string());
                }
                Some(RcLine::Malformed) => {
                    return Err(anyhow!(
                        "invalid config line {}:{line_num}: {raw_line}",
                        path.display()
                    ));
                }
                None => {}
            }
        }

        Ok(())
    }
}

/// One meaningful line of a ticklistrc; blank lines and `#` comments parse
/// to `None`.
#[derive(Debug, PartialEq, Eq)]
enum RcLine<'a> {
    Include(&'a str),
    Entry(&'a str, &'a str),
    Malformed,
}

impl<'a> RcLine<'a> {
    fn parse(raw: &'a str) -> Option<Self> {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        if let Some(target) = line.strip_prefix("include ") {
            return Some(RcLine::Include(target.trim()));
        }
        Some(match line.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => RcLine::Entry(key.trim(), value.trim()),
            _ => RcLine::Malformed,
        })
    }
}

/// Where the terminal front-end writes its log: explicit flag, then
/// `log.file`, then the platform state (or cache) directory.
#[tracing::instrument(skip(cfg, override_path))]
pub fn resolve_log_file(cfg: &Config, override_path: Option<&Path>) -> anyhow::Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path.to_path_buf());
    }
    if let Some(value) = cfg.get("log.file") {
        return Ok(expand_tilde(Path::new(&value)));
    }

    let base = dirs::state_dir()
        .or_else(dirs::cache_dir)
        .ok_or_else(|| anyhow!("cannot determine a directory for the log file"))?;
    Ok(base.join("ticklist").join(LOG_FILE_NAME))
}

#[tracing::instrument(skip(override_path))]
fn resolve_rc_path(override_path: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    if let Some(path) = override_path {
        return Ok(Some(path.to_path_buf()));
    }

    if let Ok(rc_env) = std::env::var(RC_ENV) {
        if rc_env == "/dev/null" {
            return Ok(None);
        }
        return Ok(Some(PathBuf::from(rc_env)));
    }

    let Some(home) = dirs::home_dir() else {
        warn!("cannot determine home directory; skipping ticklistrc lookup");
        return Ok(None);
    };
    let candidate = home.join(RC_FILE_NAME);
    if candidate.exists() {
        return Ok(Some(candidate));
    }

    Ok(None)
}

fn resolve_include_path(base_dir: &Path, include: &str) -> anyhow::Result<PathBuf> {
    if include.trim().is_empty() {
        return Err(anyhow!("include path cannot be empty"));
    }

    let raw = PathBuf::from(include);
    let expanded = expand_tilde(&raw);
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(base_dir.join(expanded))
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    if let Some(rest) = text.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "y" | "yes" | "on" | "true" => Some(true),
        "0" | "n" | "no" | "off" | "false" => Some(false),
        _ => None,
    }
}

fn parse_delay(raw: &str) -> anyhow::Result<Duration> {
    let secs: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("expected seconds, got: {raw}"))?;
    if secs <= 0.0 {
        return Err(anyhow!("delay must be positive, got: {raw}"));
    }
    let delay =
        Duration::try_from_secs_f64(secs).map_err(|e| anyhow!("delay out of range: {e}"))?;
    if Instant::now().checked_add(delay).is_none() {
        return Err(anyhow!("delay out of range: {raw}"));
    }
    Ok(delay)
}
