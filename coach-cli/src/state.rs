use anyhow::{Context, Result};
use coach_core::MemoryStore;
use std::fs;
use std::path::{Path, PathBuf};

const LEDGER_FILE: &str = "ledger.json";

/// Resolve the coach home: `--home`, then `$COACH_HOME`, then `~/.coach`.
pub fn coach_home(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    if let Ok(dir) = std::env::var("COACH_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set (pass --home or set COACH_HOME)")?;
    Ok(PathBuf::from(home).join(".coach"))
}

pub fn ensure_coach_home(explicit: Option<&Path>) -> Result<PathBuf> {
    let dir = coach_home(explicit)?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn ledger_path(home: &Path) -> PathBuf {
    home.join(LEDGER_FILE)
}

/// Load the ledger; a missing file is an empty ledger.
pub fn load_ledger(home: &Path) -> Result<MemoryStore> {
    let p = ledger_path(home);
    if !p.exists() {
        return Ok(MemoryStore::new());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

/// Write the ledger through a temp file so a failed write never truncates it.
pub fn save_ledger(home: &Path, ledger: &MemoryStore) -> Result<()> {
    let p = ledger_path(home);
    let tmp = p.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(ledger).context("serialize ledger")?;
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, &p).with_context(|| format!("replace {}", p.display()))?;
    Ok(())
}
