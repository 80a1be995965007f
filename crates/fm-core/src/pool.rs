//! Image pool: per-category portrait inventory with randomized selection.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use log::debug;
use rand::Rng;
use regex::Regex;
use strum::IntoEnumIterator;
use thiserror::Error;

use crate::ethnic::EthnicCategory;

/// Whole-word match of any category wire name inside a stored image path.
/// Spaces inside category names ("Central European") match literal spaces.
static CATEGORY_RE: LazyLock<Regex> = LazyLock::new(|| {
    let names: Vec<String> = EthnicCategory::iter()
        .map(|category| category.to_string().replace(' ', r"\s"))
        .collect();
    Regex::new(&format!(r"\b({})\b", names.join("|"))).expect("category pattern")
});

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("cannot read image folder for {category}: {source}")]
    DirectoryAccess {
        category: EthnicCategory,
        #[source]
        source: std::io::Error,
    },
    #[error("ran out of images for ethnicity: {0}")]
    Exhausted(EthnicCategory),
}

/// In-memory pool of available image filenames, one collection per category.
///
/// Filenames are stored without their extension because the game references
/// portraits that way. The pool only shrinks: once a filename is excluded or
/// picked with removal it cannot come back for the pool's lifetime.
#[derive(Debug, Clone)]
pub struct ImagePool {
    available: HashMap<EthnicCategory, Vec<String>>,
}

impl ImagePool {
    /// Scans `root/<category>` for every category and collects the filenames
    /// directly inside (subdirectories ignored, extensions stripped).
    ///
    /// A missing or unreadable category folder fails the whole build.
    pub fn build(root: impl AsRef<Path>) -> Result<Self, PoolError> {
        let root = root.as_ref();
        let mut available = HashMap::new();

        for category in EthnicCategory::iter() {
            let dir = root.join(category.to_string());
            let entries = fs::read_dir(&dir).map_err(|source| PoolError::DirectoryAccess {
                category,
                source,
            })?;

            let mut files = Vec::new();
            for entry in entries {
                let entry = entry.map_err(|source| PoolError::DirectoryAccess {
                    category,
                    source,
                })?;
                let path = entry.path();
                if path.is_dir() {
                    continue;
                }
                // The game wants "filename", not "filename.png".
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    files.push(stem.to_string());
                }
            }

            // Two files differing only in extension collapse to one key.
            files.sort();
            files.dedup();

            debug!("{}: {} portraits available", category, files.len());
            available.insert(category, files);
        }

        Ok(Self { available })
    }

    /// Number of images still available for `category`.
    pub fn remaining(&self, category: EthnicCategory) -> usize {
        self.available.get(&category).map_or(0, Vec::len)
    }

    /// Removes previously assigned images from the pool.
    ///
    /// Each path is matched for a whole-word category name; the trailing path
    /// segment (extension stripped) is the filename to drop. Paths whose
    /// category cannot be matched come from freeform historical layouts and
    /// are ignored.
    pub fn exclude<'a>(&mut self, paths: impl IntoIterator<Item = &'a str>) {
        for path in paths {
            let Some(found) = CATEGORY_RE.find(path) else {
                debug!("cannot match a category in assigned path, ignoring: {path}");
                continue;
            };
            let Ok(category) = found.as_str().parse::<EthnicCategory>() else {
                continue;
            };
            let Some(filename) = Path::new(path)
                .file_stem()
                .and_then(|stem| stem.to_str())
            else {
                continue;
            };

            if let Some(files) = self.available.get_mut(&category) {
                files.retain(|file| file != filename);
            }
        }
    }

    /// Picks a uniformly random available image for `category`.
    ///
    /// With `remove_from_pool` the selection is deleted via swap-with-last,
    /// so it can never be returned again from this pool. Without it the same
    /// filename may come back on a later call.
    pub fn pick<R: Rng + ?Sized>(
        &mut self,
        category: EthnicCategory,
        remove_from_pool: bool,
        rng: &mut R,
    ) -> Result<String, PoolError> {
        let files = self
            .available
            .get_mut(&category)
            .filter(|files| !files.is_empty())
            .ok_or(PoolError::Exhausted(category))?;

        let index = rng.gen_range(0..files.len());

        if remove_from_pool {
            Ok(files.swap_remove(index))
        } else {
            Ok(files[index].clone())
        }
    }
}
