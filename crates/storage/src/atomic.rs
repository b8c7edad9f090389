// SPDX-License-Identifier: MIT

//! Crash-safe whole-file rewrite: write to a sibling temp file, then rename
//! over the target. A rename is atomic on the same filesystem, so a crash
//! mid-write leaves either the old file or the new one fully intact, never
//! a half-written one (§4.1's only durability requirement).

use std::io::Write;
use std::path::Path;

pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let tmp_path = dir.join(format!(
        ".{}.tmp-{}",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("store"),
        std::process::id()
    ));
    {
        let mut f = std::fs::File::create(&tmp_path)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Read and parse a JSON file. A missing file is treated as `default`; a
/// corrupt (unparseable) file is also treated as `default` rather than a
/// hard error — recoverability over durability (§4.1).
pub fn read_json_or_default<T: serde::de::DeserializeOwned + Default>(path: &Path) -> T {
    match std::fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "corrupt JSON file, treating as empty");
            T::default()
        }),
        Err(_) => T::default(),
    }
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
