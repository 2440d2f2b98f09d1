use anyhow::{Context, Result, anyhow, bail};
use std::collections::HashSet;
use std::path::Path;

use crate::model::Config;

/// Read a configuration file from disk.
pub fn load(path: &Path) -> Result<Config> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Reading config {}", path.display()))?;
    load_from_json(&json).with_context(|| format!("Parsing config {}", path.display()))
}

/// Parse a JSON configuration.
///
/// Every field is optional; anything left out keeps its default. The
/// result is normalized before it is handed out:
///   • keywords and builtin names are upper-cased (lookups are case-insensitive)
///   • duplicate builtins are dropped
///
/// A config whose keywords are empty or clash, or whose numeric range is
/// inverted, is rejected.
pub fn load_from_json(json: &str) -> Result<Config> {
    let config: Config = serde_json::from_str(json).map_err(|e| anyhow!("invalid config: {e}"))?;
    normalize(config)
}

pub fn normalize(mut config: Config) -> Result<Config> {
    let kw = &mut config.keywords;
    for word in [
        &mut kw.module,
        &mut kw.function,
        &mut kw.start,
        &mut kw.self_ref,
    ] {
        *word = word.trim().to_uppercase();
        if word.is_empty() {
            bail!("keywords must not be empty");
        }
    }

    let distinct: HashSet<&str> = config.keywords.all().into_iter().collect();
    if distinct.len() != 4 {
        bail!("keywords must be distinct: {:?}", config.keywords.all());
    }

    let mut seen = HashSet::new();
    config.globals = config
        .globals
        .iter()
        .map(|g| g.trim().to_uppercase())
        .filter(|g| !g.is_empty() && seen.insert(g.clone()))
        .collect();

    if let Some(reserved) = config.globals.iter().find(|g| config.is_reserved(g)) {
        bail!("builtin `{reserved}` clashes with a keyword");
    }

    if config.number_range.min > config.number_range.max {
        bail!(
            "number range is inverted: {} > {}",
            config.number_range.min,
            config.number_range.max
        );
    }

    if config.max_symbol_len == 0 {
        bail!("max_symbol_len must be at least 1");
    }

    Ok(config)
}
