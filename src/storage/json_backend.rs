use chrono::NaiveDate;
use serde_json::Value;
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    core::{
        errors::CoreError,
        utils::{ensure_dir, PathResolver},
    },
    domain::{AppState, CURRENT_SCHEMA_VERSION},
};

use super::{ExportDocument, Result, StorageBackend};

const TMP_SUFFIX: &str = "tmp";
const EXPORT_PREFIX: &str = "quanto-custa-backup";

/// Top-level keys an import document must carry.
pub const REQUIRED_IMPORT_FIELDS: [&str; 3] = ["settings", "challengeSettings", "envelopes"];

/// File backend: one pretty-printed JSON document under the app directory.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
    state_file: PathBuf,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let app_root = PathResolver::resolve_base(root);
        ensure_dir(&app_root)?;
        let state_file = PathResolver::state_file_in(&app_root);
        Ok(Self {
            root: app_root,
            state_file,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn state_path(&self) -> &Path {
        &self.state_file
    }

    pub fn export_dir(&self) -> PathBuf {
        PathResolver::export_dir_in(&self.root)
    }
}

impl StorageBackend for JsonStorage {
    fn load(&self) -> Result<Option<AppState>> {
        if !self.state_file.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&self.state_file)?;
        if data.trim().is_empty() {
            return Ok(None);
        }
        let state: AppState = serde_json::from_str(&data)?;
        Ok(Some(state))
    }

    fn save(&self, state: &AppState) -> Result<()> {
        let json = serde_json::to_string_pretty(state)?;
        let tmp = tmp_path(&self.state_file);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.state_file)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.state_file.exists() {
            fs::remove_file(&self.state_file)?;
        }
        Ok(())
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.state_file)
    }
}

/// `quanto-custa-backup-YYYY-MM-DD.json`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("{}-{}.json", EXPORT_PREFIX, date.format("%Y-%m-%d"))
}

pub fn render_export(state: &AppState, date: NaiveDate) -> Result<ExportDocument> {
    Ok(ExportDocument {
        file_name: export_file_name(date),
        contents: serde_json::to_string_pretty(state)?,
    })
}

/// Writes an export into `dir`, returning the full path.
pub fn write_export(dir: &Path, document: &ExportDocument) -> Result<PathBuf> {
    ensure_dir(dir)?;
    let path = dir.join(&document.file_name);
    let tmp = tmp_path(&path);
    write_atomic(&tmp, &document.contents)?;
    fs::rename(&tmp, &path)?;
    Ok(path)
}

/// Validates an import document and turns it into a state. Nothing is
/// persisted here; callers replace their state only on `Ok`.
pub fn parse_import_document(text: &str) -> Result<AppState> {
    let value: Value = serde_json::from_str(text)
        .map_err(|err| CoreError::InvalidImport(format!("not a JSON document ({err})")))?;
    let object = value
        .as_object()
        .ok_or_else(|| CoreError::InvalidImport("expected a JSON object".into()))?;

    let missing: Vec<&str> = REQUIRED_IMPORT_FIELDS
        .iter()
        .copied()
        .filter(|field| !object.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(CoreError::InvalidImport(format!(
            "missing field(s): {}",
            missing.join(", ")
        )));
    }

    if let Some(version) = object.get("schemaVersion").and_then(Value::as_u64) {
        if version > u64::from(CURRENT_SCHEMA_VERSION) {
            return Err(CoreError::InvalidImport(format!(
                "document schema v{} is newer than supported v{}",
                version, CURRENT_SCHEMA_VERSION
            )));
        }
    }

    serde_json::from_value(value).map_err(|err| CoreError::InvalidImport(err.to_string()))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
