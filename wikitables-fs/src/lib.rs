//! Shared filesystem helpers built on `cap-std` and `camino`.
//!
//! Paths supplied by the operator are resolved once with ambient authority;
//! everything below an output directory is then reached through its
//! [`fs_utf8::Dir`] handle.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use std::io;
use std::path::Component;

/// What, if anything, lives at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Nothing exists at the path.
    Missing,
    /// A regular file.
    File,
    /// A directory.
    Dir,
    /// Anything else, such as a socket or device.
    Other,
}

/// Open a UTF-8 file path for reading using ambient authority.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Classify the entry at `path`, following symbolic links.
pub fn entry_kind(path: &Utf8Path) -> io::Result<EntryKind> {
    let Some(name) = path.file_name() else {
        // `/`, `.` and `..` have no file name; they are directories when they resolve.
        return match fs_utf8::Dir::open_ambient_dir(path, ambient_authority()) {
            Ok(_) => Ok(EntryKind::Dir),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(EntryKind::Missing),
            Err(err) => Err(err),
        };
    };
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let dir = match fs_utf8::Dir::open_ambient_dir(parent, ambient_authority()) {
        Ok(dir) => dir,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(EntryKind::Missing),
        Err(err) => return Err(err),
    };
    match dir.metadata(name) {
        Ok(meta) if meta.is_file() => Ok(EntryKind::File),
        Ok(meta) if meta.is_dir() => Ok(EntryKind::Dir),
        Ok(_) => Ok(EntryKind::Other),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(EntryKind::Missing),
        Err(err) => Err(err),
    }
}

/// Create `path` and any missing ancestors, then open it as a directory handle.
pub fn ensure_dir(path: &Utf8Path) -> io::Result<fs_utf8::Dir> {
    let (base, relative) = base_dir_and_relative(path)?;
    if relative.as_os_str().is_empty() {
        return Ok(base);
    }
    base.create_dir_all(&relative)?;
    base.open_dir(&relative)
}

/// Open an existing directory using ambient authority.
pub fn open_dir(path: &Utf8Path) -> io::Result<fs_utf8::Dir> {
    fs_utf8::Dir::open_ambient_dir(path, ambient_authority())
}

/// Replace the child directory `name` of `dir` with an empty one.
pub fn reset_child_dir(dir: &fs_utf8::Dir, name: &str) -> io::Result<()> {
    match dir.remove_dir_all(name) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.create_dir(name)
}

/// Open `path` below `dir` for appending, creating it when absent.
pub fn open_append(dir: &fs_utf8::Dir, path: &Utf8Path) -> io::Result<fs_utf8::File> {
    let mut options = fs_utf8::OpenOptions::new();
    options.create(true).append(true);
    dir.open_with(path, &options)
}

/// Names of the regular files in `dir` ending in `.{extension}`, sorted.
pub fn files_with_extension(dir: &fs_utf8::Dir, extension: &str) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for item in dir.entries()? {
        let entry = item?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name()?;
        if Utf8Path::new(&name).extension() == Some(extension) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Split an absolute or relative path into an ambient base directory and a relative suffix.
pub fn base_dir_and_relative(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_path = path.as_std_path();

    let (base, relative) = match std_path.components().next() {
        // Windows absolute path with a drive or UNC prefix.
        Some(Component::Prefix(prefix)) => {
            let prefix_str = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            let base = Utf8PathBuf::from(prefix_str).join(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_path
                .strip_prefix(base.as_std_path())
                .or_else(|_| std_path.strip_prefix(prefix.as_os_str()))
                .map_err(|_| io::Error::other("failed to strip prefix from path"))?
                .to_path_buf();
            (base, relative)
        }
        Some(Component::RootDir) => {
            let base = Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_path
                .strip_prefix(base.as_std_path())
                .map_err(|_| io::Error::other("failed to strip root from absolute path"))?
                .to_path_buf();
            (base, relative)
        }
        _ => (Utf8PathBuf::from("."), std_path.to_path_buf()),
    };

    let dir = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    let relative =
        Utf8PathBuf::from_path_buf(relative).map_err(|_| io::Error::other("non-UTF-8 path"))?;
    Ok((dir, relative))
}
