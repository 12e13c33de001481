use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::StoreResult;

/// Load a JSON table from disk, or its empty default when the file does not
/// exist yet (first boot of a fresh working dir).
pub async fn load_table<T>(path: &Path) -> StoreResult<T>
where
    T: DeserializeOwned + Default,
{
    match fs::read(path).await {
        Ok(bytes) if bytes.is_empty() => Ok(T::default()),
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(err) => Err(err.into()),
    }
}

/// Atomically persist a JSON table: write to a sibling temp file, fsync,
/// then rename over the target. A crash mid-write leaves the old table
/// intact.
pub async fn persist_table<T>(path: &Path, table: &T) -> StoreResult<()>
where
    T: Serialize,
{
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).await?;
    }

    let tmp_path = tmp_sibling(path);
    let mut file = fs::File::create(&tmp_path).await?;
    file.write_all(&serde_json::to_vec_pretty(table)?).await?;
    file.sync_all().await?;

    fs::rename(&tmp_path, path).await?;
    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let file_name = path
        .file_name()
        .map(|name| format!("{}.tmp", name.to_string_lossy()))
        .unwrap_or_else(|| "table.tmp".to_string());
    tmp.set_file_name(file_name);
    tmp
}
