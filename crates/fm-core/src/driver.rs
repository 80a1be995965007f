//! Allocation driver: walks the parsed players and wires pool and store.

use std::path::Path;

use log::info;
use rand::RngCore;
use thiserror::Error;

use crate::ethnic::EthnicCategory;
use crate::mapping::{MappingStore, StoreError};
use crate::pool::{ImagePool, PoolError};
use crate::report::{PlayerId, PlayerRecord};

/// Anything that can hand out an image filename for a category.
pub trait ImageSource {
    fn pick(
        &mut self,
        category: EthnicCategory,
        remove_from_pool: bool,
        rng: &mut dyn RngCore,
    ) -> Result<String, PoolError>;
}

impl ImageSource for ImagePool {
    fn pick(
        &mut self,
        category: EthnicCategory,
        remove_from_pool: bool,
        rng: &mut dyn RngCore,
    ) -> Result<String, PoolError> {
        ImagePool::pick(self, category, remove_from_pool, rng)
    }
}

/// The mapping operations the driver needs; lets tests run against fakes.
pub trait MappingSink {
    fn exists(&self, id: &PlayerId) -> bool;
    fn assign(&mut self, id: PlayerId, image_path: String);
    fn save(&mut self) -> Result<(), StoreError>;
    fn write(&self, path: &Path) -> Result<(), StoreError>;
}

impl MappingSink for MappingStore {
    fn exists(&self, id: &PlayerId) -> bool {
        MappingStore::exists(self, id)
    }

    fn assign(&mut self, id: PlayerId, image_path: String) {
        MappingStore::assign(self, id, image_path);
    }

    fn save(&mut self) -> Result<(), StoreError> {
        MappingStore::save(self)
    }

    fn write(&self, path: &Path) -> Result<(), StoreError> {
        MappingStore::write(self, path)
    }
}

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("unable to pick an image for player {id}: {source}")]
    Pick {
        id: PlayerId,
        #[source]
        source: PoolError,
    },
    #[error("cannot persist mapping document: {0}")]
    Persist(#[from] StoreError),
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Leave players that already have a mapping untouched.
    pub preserve_existing: bool,
    /// Permit the same image for more than one player (picked images stay in
    /// the pool).
    pub allow_duplicate_images: bool,
    /// Relative prefix joined in front of `<category>/<filename>` in stored
    /// paths; empty when the document sits inside the image directory.
    pub image_path_prefix: String,
}

/// Assigns a portrait to every player, then persists the merged mapping.
///
/// Players are processed in input order. Any pick failure aborts the whole
/// run; `save`/`write` failures abort too and leave the previous on-disk
/// document unmodified.
pub fn allocate<S, I>(
    players: &[PlayerRecord],
    store: &mut S,
    pool: &mut I,
    destination: &Path,
    opts: &RunOptions,
    rng: &mut dyn RngCore,
) -> Result<(), DriverError>
where
    S: MappingSink,
    I: ImageSource,
{
    let mut assigned = 0usize;
    let mut preserved = 0usize;

    for player in players {
        if opts.preserve_existing && store.exists(&player.id) {
            preserved += 1;
            continue;
        }

        let filename = pool
            .pick(player.ethnic, !opts.allow_duplicate_images, rng)
            .map_err(|source| DriverError::Pick {
                id: player.id.clone(),
                source,
            })?;

        store.assign(
            player.id.clone(),
            join_image_path(&opts.image_path_prefix, player.ethnic, &filename),
        );
        assigned += 1;
    }

    store.save()?;
    store.write(destination)?;

    info!("assigned {assigned} portraits, preserved {preserved} existing mappings");
    Ok(())
}

/// Stored paths always use forward slashes, whatever the host separator.
fn join_image_path(prefix: &str, category: EthnicCategory, filename: &str) -> String {
    if prefix.is_empty() {
        format!("{category}/{filename}")
    } else {
        format!("{}/{category}/{filename}", prefix.trim_end_matches('/'))
    }
}
