//! Portable copy of a workspace's collections.
//!
//! A bundle is a zip with `manifest.json` and `collections.json`. The second
//! maps each storage key to the JSON array the store keeps under it, so an
//! import is a batch of key writes followed by a reload. The signed-in
//! session never travels in a bundle.

use crate::db::KvStore;
use crate::model::User;
use crate::store::{Slot, COLLECTION_KEYS, SESSION_KEY};
use anyhow::{anyhow, Context};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
const COLLECTIONS_ENTRY: &str = "collections.json";
pub const BUNDLE_FORMAT_V1: &str = "emdra-collections-v1";

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: String,
    pub counts: BTreeMap<String, usize>,
    pub sha256: String,
}

/// Stored collections keyed by storage key. Every value is a JSON array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    collections: BTreeMap<String, Value>,
}

impl Snapshot {
    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.collections
            .iter()
            .map(|(k, v)| (k.clone(), v.as_array().map_or(0, Vec::len)))
            .collect()
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Reads every collection key. Missing keys and values that are not arrays
/// export as empty lists, the same way the workspace would load them.
pub fn snapshot(kv: &dyn KvStore) -> anyhow::Result<Snapshot> {
    let mut collections = BTreeMap::new();
    for key in COLLECTION_KEYS {
        let raw = kv
            .get(key)
            .with_context(|| format!("failed to read {}", key))?;
        let value = match raw.map(|r| serde_json::from_str::<Value>(&r)) {
            Some(Ok(v)) if v.is_array() => v,
            None => Value::Array(Vec::new()),
            Some(_) => {
                warn!(key, "stored collection is unreadable, exporting it empty");
                Value::Array(Vec::new())
            }
        };
        collections.insert(key.to_string(), value);
    }
    Ok(Snapshot { collections })
}

pub fn write_bundle(snapshot: &Snapshot, out_path: &Path) -> anyhow::Result<ExportSummary> {
    let body = serde_json::to_vec_pretty(&snapshot.collections)
        .context("failed to serialize collections")?;
    let checksum = sha256_hex(&body);

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let exported_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    let counts = snapshot.counts();
    let manifest = json!({
        "format": BUNDLE_FORMAT_V1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": exported_at,
        "collectionsSha256": checksum,
        "counts": counts,
    });
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    zip.start_file(COLLECTIONS_ENTRY, opts)
        .context("failed to start collections entry")?;
    zip.write_all(&body)
        .context("failed to write collections entry")?;
    zip.finish().context("failed to finalize zip bundle")?;

    Ok(ExportSummary {
        bundle_format: BUNDLE_FORMAT_V1.to_string(),
        counts,
        sha256: checksum,
    })
}

/// Opens and checks a bundle: format tag, checksum, one JSON array per
/// known key and at least one account. Unknown keys are ignored.
pub fn read_bundle(in_path: &Path) -> anyhow::Result<Snapshot> {
    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: Value =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid JSON")?;
    let format = manifest
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if format != BUNDLE_FORMAT_V1 {
        return Err(anyhow!("unsupported bundle format: {}", format));
    }

    let mut body = Vec::new();
    archive
        .by_name(COLLECTIONS_ENTRY)
        .context("bundle missing collections.json")?
        .read_to_end(&mut body)
        .context("failed to extract collections entry")?;
    let expected = manifest
        .get("collectionsSha256")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("manifest carries no collections checksum"))?;
    let actual = sha256_hex(&body);
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(anyhow!(
            "collections checksum mismatch (manifest {}, bundle {})",
            expected,
            actual
        ));
    }

    let mut raw: BTreeMap<String, Value> =
        serde_json::from_slice(&body).context("collections.json is not a JSON object")?;
    let mut collections = BTreeMap::new();
    for key in COLLECTION_KEYS {
        match raw.remove(key) {
            Some(v) if v.is_array() => {
                collections.insert(key.to_string(), v);
            }
            Some(_) => return Err(anyhow!("collection {} is not a list", key)),
            None => {
                collections.insert(key.to_string(), Value::Array(Vec::new()));
            }
        }
    }
    for key in raw.keys() {
        warn!(key = %key, "ignoring unknown key in bundle");
    }
    let has_accounts = collections
        .get(User::KEY)
        .and_then(|v| v.as_array())
        .map_or(false, |a| !a.is_empty());
    if !has_accounts {
        return Err(anyhow!("bundle holds no accounts"));
    }
    Ok(Snapshot { collections })
}

/// Overwrites every collection key in one batch. The session key is left
/// alone.
pub fn restore(kv: &dyn KvStore, snapshot: &Snapshot) -> anyhow::Result<()> {
    let entries: Vec<(String, String)> = snapshot
        .collections
        .iter()
        .filter(|(k, _)| k.as_str() != SESSION_KEY)
        .map(|(k, v)| (k.clone(), v.to_string()))
        .collect();
    kv.set_all(&entries).context("failed to write restored collections")
}
