//! Relative-prefix computation between the mapping file and the image root.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Prefix to join in front of stored image paths.
///
/// When the mapping XML sits inside the image directory the game resolves
/// bare `<category>/<filename>` paths and no prefix is needed. Otherwise the
/// prefix is the relative path from the XML file's directory to the image
/// root, with forward slashes.
pub fn image_path_prefix(xml_path: &Path, img_dir: &Path) -> io::Result<String> {
    let img_abs = fs::canonicalize(img_dir)?;
    let xml_abs = fs::canonicalize(xml_path)?;
    let xml_dir = xml_abs.parent().unwrap_or(&xml_abs);

    if xml_dir == img_abs {
        return Ok(String::new());
    }

    let rel = relative_path(xml_dir, &img_abs);
    Ok(rel
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}

/// Relative path from directory `from` to `to`; both must be absolute.
fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from: Vec<Component<'_>> = from.components().collect();
    let to: Vec<Component<'_>> = to.components().collect();

    let common = from
        .iter()
        .zip(&to)
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..from.len() {
        rel.push("..");
    }
    for component in &to[common..] {
        rel.push(component);
    }
    rel
}
