//! 把下载结果落盘。

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::models::AudioBlob;
use crate::base_system::context::safe_fs_name;
use crate::error::DownloadError;

const MAX_NAME_BYTES: usize = 200;

pub fn save(
    blob: &AudioBlob,
    suggested_filename: &str,
    save_dir: &Path,
    allow_overwrite: bool,
) -> Result<PathBuf, DownloadError> {
    fs::create_dir_all(save_dir)?;
    let name = safe_fs_name(suggested_filename, "_", MAX_NAME_BYTES);
    let path = if allow_overwrite {
        save_dir.join(&name)
    } else {
        free_path(save_dir, &name)
    };
    fs::write(&path, &blob.bytes)?;
    info!(target: "save", "已保存 {} ({} 字节)", path.display(), blob.bytes.len());
    Ok(path)
}

/// `name.mp3` 已存在时依次尝试 `name (1).mp3`、`name (2).mp3` ...
fn free_path(dir: &Path, name: &str) -> PathBuf {
    let first = dir.join(name);
    if !first.exists() {
        return first;
    }
    let (stem, ext) = match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    };
    (1..)
        .map(|n| dir.join(format!("{stem} ({n}){ext}")))
        .find(|p| !p.exists())
        .unwrap_or(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_sanitized_name() {
        let dir = tempfile::tempdir().unwrap();
        let blob = AudioBlob::single(vec![1, 2]);
        let path = save(&blob, "Chapter_A/B_1-2_x?.mp3", dir.path(), true).unwrap();
        assert_eq!(path.file_name().unwrap(), "Chapter_A_B_1-2_x_.mp3");
        assert_eq!(fs::read(&path).unwrap(), vec![1, 2]);
    }

    #[test]
    fn overwrite_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        save(&AudioBlob::single(vec![1]), "a.mp3", dir.path(), true).unwrap();
        let path = save(&AudioBlob::single(vec![2]), "a.mp3", dir.path(), true).unwrap();
        assert_eq!(path, dir.path().join("a.mp3"));
        assert_eq!(fs::read(&path).unwrap(), vec![2]);
    }

    #[test]
    fn numbered_suffix_when_overwrite_disallowed() {
        let dir = tempfile::tempdir().unwrap();
        let blob = AudioBlob::single(vec![1]);
        save(&blob, "a.mp3", dir.path(), false).unwrap();
        let second = save(&blob, "a.mp3", dir.path(), false).unwrap();
        let third = save(&blob, "a.mp3", dir.path(), false).unwrap();
        assert_eq!(second, dir.path().join("a (1).mp3"));
        assert_eq!(third, dir.path().join("a (2).mp3"));
    }
}
