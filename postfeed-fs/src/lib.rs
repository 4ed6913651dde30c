//! Capability-based UTF-8 file helpers shared by the Postfeed tools.
#![forbid(unsafe_code)]

use std::io::{self, Read};

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};

/// What a path points at, as reported by its parent directory.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PathKind {
    /// A regular file.
    File,
    /// A directory.
    Directory,
    /// Anything else, such as a socket or device node.
    Other,
}

/// Open a UTF-8 file path for reading using ambient authority.
///
/// # Errors
/// Returns the underlying IO error when the file cannot be opened.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Read a whole UTF-8 text file into memory.
///
/// # Errors
/// Returns the underlying IO error when the file cannot be opened or is not
/// valid UTF-8.
pub fn read_utf8_to_string(path: &Utf8Path) -> io::Result<String> {
    let mut file = open_utf8_file(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Classify `path` through a capability on its parent directory.
///
/// # Errors
/// Returns [`io::ErrorKind::NotFound`] when the path (or its parent) does
/// not exist, and other IO errors when it cannot be inspected.
pub fn path_kind(path: &Utf8Path) -> io::Result<PathKind> {
    let (dir, name) = open_parent(path)?;
    let metadata = dir.metadata(name)?;
    Ok(if metadata.is_file() {
        PathKind::File
    } else if metadata.is_dir() {
        PathKind::Directory
    } else {
        PathKind::Other
    })
}

fn open_parent(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, &str)> {
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name))
}
