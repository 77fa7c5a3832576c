//! Whole-file replacement through a temp file and a rename.
//!
//! Readers see either the previous contents or the new contents, never a
//! partial write. Parent directories are created on demand.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Replace `path` with `bytes`. Errors name the path that failed.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| with_path(parent, e))?;
    }

    let tmp_path = tmp_write_path(path);
    let written = File::create(&tmp_path).and_then(|mut file| {
        file.write_all(bytes)?;
        file.sync_all()
    });
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(with_path(&tmp_path, err));
    }

    fs::rename(&tmp_path, path).map_err(|err| {
        let _ = fs::remove_file(&tmp_path);
        io::Error::new(
            err.kind(),
            format!("{} -> {}: {err}", tmp_path.display(), path.display()),
        )
    })
}

fn with_path(path: &Path, err: io::Error) -> io::Error {
    io::Error::new(err.kind(), format!("{}: {err}", path.display()))
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp.{}.{}", std::process::id(), unique));
    PathBuf::from(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(prefix: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "relaygate-atomic-{prefix}-{}-{unique}",
            std::process::id()
        ))
    }

    #[test]
    fn replaces_contents_and_leaves_no_temp_files() {
        let dir = temp_dir("replace");
        let path = dir.join("nested").join("state.json");
        write_atomic(&path, b"first").expect("first write");
        write_atomic(&path, b"second").expect("second write");

        assert_eq!(fs::read(&path).expect("read back"), b"second");
        let entries: Vec<_> = fs::read_dir(path.parent().expect("parent"))
            .expect("list dir")
            .filter_map(Result::ok)
            .map(|entry| entry.file_name())
            .collect();
        assert_eq!(entries, vec![OsString::from("state.json")]);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn failure_names_the_unwritable_path() {
        let dir = temp_dir("blocked");
        fs::create_dir_all(&dir).expect("dir");
        let blocker = dir.join("file");
        fs::write(&blocker, b"not a dir").expect("blocker");

        let err = write_atomic(&blocker.join("child.json"), b"x")
            .expect_err("parent is a regular file");
        assert!(err.to_string().contains("file"));
        let _ = fs::remove_dir_all(dir);
    }
}
