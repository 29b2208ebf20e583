use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Inserts `marker` right before the last extension separator of the file
/// name, or appends it when the name has no extension. Directory components
/// are kept as they are.
///
/// Leading dots do not count as extension separators, so `.bashrc` becomes
/// `.bashrc'` and `archive.tar.gz` becomes `archive.tar'.gz`.
///
/// The result is not checked against existing files; a second conflict on
/// the same path produces the same name.
pub fn marked_name(relative_path: &Path, marker: char) -> PathBuf {
    match relative_path.file_name() {
        Some(name) => relative_path.with_file_name(insert_marker(name, marker)),
        None => relative_path.to_path_buf(),
    }
}

#[cfg(unix)]
fn insert_marker(name: &OsStr, marker: char) -> OsString {
    use std::os::unix::ffi::{OsStrExt, OsStringExt};

    let bytes = name.as_bytes();
    let at = extension_start(bytes);
    let mut encoded = [0u8; 4];
    let marker = marker.encode_utf8(&mut encoded).as_bytes();

    let mut renamed = Vec::with_capacity(bytes.len() + marker.len());
    renamed.extend_from_slice(&bytes[..at]);
    renamed.extend_from_slice(marker);
    renamed.extend_from_slice(&bytes[at..]);
    OsString::from_vec(renamed)
}

#[cfg(not(unix))]
fn insert_marker(name: &OsStr, marker: char) -> OsString {
    match name.to_str() {
        Some(name) => {
            let (stem, ext) = name.split_at(extension_start(name.as_bytes()));
            format!("{}{}{}", stem, marker, ext).into()
        }
        None => {
            // Unpaired surrogates: append, never split
            let mut renamed = name.to_os_string();
            renamed.push(marker.to_string());
            renamed
        }
    }
}

/// Index of the last '.' that has a non-dot byte somewhere before it, or the
/// length of the name when there is no extension.
fn extension_start(name: &[u8]) -> usize {
    match name.iter().rposition(|&b| b == b'.') {
        Some(dot) if name[..dot].iter().any(|&b| b != b'.') => dot,
        _ => name.len(),
    }
}
