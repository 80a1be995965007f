use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use fm_core::driver::{DriverError, ImageSource, MappingSink, RunOptions, allocate};
use fm_core::ethnic::{EthnicCategory, NationEthnicTable};
use fm_core::mapping::{GameVersion, MappingStore, StoreError};
use fm_core::pool::{ImagePool, PoolError};
use fm_core::report::{PlayerId, PlayerRecord, parse_players};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use strum::IntoEnumIterator;
use tempfile::TempDir;

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}

fn player(id: &str, ethnic: EthnicCategory) -> PlayerRecord {
    PlayerRecord {
        id: PlayerId(id.to_string()),
        ethnic,
    }
}

/// Scripted image source recording every pick request.
#[derive(Default)]
struct FakeSource {
    responses: Vec<Result<String, PoolError>>,
    requests: Vec<(EthnicCategory, bool)>,
}

impl ImageSource for FakeSource {
    fn pick(
        &mut self,
        category: EthnicCategory,
        remove_from_pool: bool,
        _rng: &mut dyn RngCore,
    ) -> Result<String, PoolError> {
        self.requests.push((category, remove_from_pool));
        self.responses.remove(0)
    }
}

/// In-memory sink recording assignments and persistence calls.
#[derive(Default)]
struct FakeSink {
    existing: HashMap<PlayerId, String>,
    saved: usize,
    written: RefCell<Vec<PathBuf>>,
    fail_save: bool,
}

impl MappingSink for FakeSink {
    fn exists(&self, id: &PlayerId) -> bool {
        self.existing.contains_key(id)
    }

    fn assign(&mut self, id: PlayerId, image_path: String) {
        self.existing.insert(id, image_path);
    }

    fn save(&mut self) -> Result<(), StoreError> {
        if self.fail_save {
            return Err(StoreError::NotLoaded);
        }
        self.saved += 1;
        Ok(())
    }

    fn write(&self, path: &Path) -> Result<(), StoreError> {
        self.written.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

#[test]
fn test_allocates_in_input_order_and_persists() {
    let players = [
        player("1000001", EthnicCategory::African),
        player("1000002", EthnicCategory::Asian),
    ];
    let mut source = FakeSource {
        responses: vec![Ok("img_a".to_string()), Ok("img_b".to_string())],
        ..Default::default()
    };
    let mut sink = FakeSink::default();

    allocate(
        &players,
        &mut sink,
        &mut source,
        Path::new("out.xml"),
        &RunOptions::default(),
        &mut rng(),
    )
    .unwrap();

    assert_eq!(
        source.requests,
        [
            (EthnicCategory::African, true),
            (EthnicCategory::Asian, true)
        ]
    );
    assert_eq!(
        sink.existing.get(&PlayerId("1000001".to_string())).unwrap(),
        "African/img_a"
    );
    assert_eq!(
        sink.existing.get(&PlayerId("1000002".to_string())).unwrap(),
        "Asian/img_b"
    );
    assert_eq!(sink.saved, 1);
    assert_eq!(*sink.written.borrow(), [PathBuf::from("out.xml")]);
}

#[test]
fn test_prefix_is_joined_into_stored_paths() {
    let players = [player("1000001", EthnicCategory::SouthAmerican)];
    let mut source = FakeSource {
        responses: vec![Ok("img".to_string())],
        ..Default::default()
    };
    let mut sink = FakeSink::default();
    let opts = RunOptions {
        image_path_prefix: "../faces".to_string(),
        ..Default::default()
    };

    allocate(
        &players,
        &mut sink,
        &mut source,
        Path::new("out.xml"),
        &opts,
        &mut rng(),
    )
    .unwrap();

    assert_eq!(
        sink.existing.get(&PlayerId("1000001".to_string())).unwrap(),
        "../faces/South American/img"
    );
}

#[test]
fn test_preserve_mode_skips_mapped_players() {
    let players = [
        player("1000001", EthnicCategory::African),
        player("1000002", EthnicCategory::Asian),
    ];
    let mut source = FakeSource {
        responses: vec![Ok("img_b".to_string())],
        ..Default::default()
    };
    let mut sink = FakeSink::default();
    sink.existing
        .insert(PlayerId("1000001".to_string()), "African/old".to_string());
    let opts = RunOptions {
        preserve_existing: true,
        ..Default::default()
    };

    allocate(
        &players,
        &mut sink,
        &mut source,
        Path::new("out.xml"),
        &opts,
        &mut rng(),
    )
    .unwrap();

    // Only the unmapped player pulled an image; the old mapping survived.
    assert_eq!(source.requests.len(), 1);
    assert_eq!(
        sink.existing.get(&PlayerId("1000001".to_string())).unwrap(),
        "African/old"
    );
    assert_eq!(
        sink.existing.get(&PlayerId("1000002".to_string())).unwrap(),
        "Asian/img_b"
    );
}

#[test]
fn test_allow_duplicates_keeps_images_in_pool() {
    let players = [player("1000001", EthnicCategory::African)];
    let mut source = FakeSource {
        responses: vec![Ok("img".to_string())],
        ..Default::default()
    };
    let mut sink = FakeSink::default();
    let opts = RunOptions {
        allow_duplicate_images: true,
        ..Default::default()
    };

    allocate(
        &players,
        &mut sink,
        &mut source,
        Path::new("out.xml"),
        &opts,
        &mut rng(),
    )
    .unwrap();

    assert_eq!(source.requests, [(EthnicCategory::African, false)]);
}

#[test]
fn test_pick_failure_aborts_without_persisting() {
    let players = [
        player("1000001", EthnicCategory::African),
        player("1000002", EthnicCategory::Asian),
    ];
    let mut source = FakeSource {
        responses: vec![
            Ok("img_a".to_string()),
            Err(PoolError::Exhausted(EthnicCategory::Asian)),
        ],
        ..Default::default()
    };
    let mut sink = FakeSink::default();

    let err = allocate(
        &players,
        &mut sink,
        &mut source,
        Path::new("out.xml"),
        &RunOptions::default(),
        &mut rng(),
    )
    .unwrap_err();

    let DriverError::Pick { id, source } = err else {
        panic!("expected pick error, got {err}");
    };
    assert_eq!(id, PlayerId("1000002".to_string()));
    assert!(matches!(source, PoolError::Exhausted(EthnicCategory::Asian)));

    assert_eq!(sink.saved, 0);
    assert!(sink.written.borrow().is_empty());
}

#[test]
fn test_save_failure_aborts_before_write() {
    let players = [player("1000001", EthnicCategory::African)];
    let mut source = FakeSource {
        responses: vec![Ok("img".to_string())],
        ..Default::default()
    };
    let mut sink = FakeSink {
        fail_save: true,
        ..Default::default()
    };

    let err = allocate(
        &players,
        &mut sink,
        &mut source,
        Path::new("out.xml"),
        &RunOptions::default(),
        &mut rng(),
    )
    .unwrap_err();

    assert!(matches!(err, DriverError::Persist(_)));
    assert!(sink.written.borrow().is_empty());
}

fn image_root(files_per_category: usize) -> TempDir {
    let root = TempDir::new().expect("temp dir");
    for category in EthnicCategory::iter() {
        let dir = root.path().join(category.to_string());
        fs::create_dir(&dir).expect("category dir");
        for i in 0..files_per_category {
            fs::write(dir.join(format!("image{i}.png")), []).expect("image file");
        }
    }
    root
}

const REPORT: &str = "\
| 2000133469| GER       | RSA       | Tebogo Maluleke            | 1         | 16        | 3         |
| 2000133381| FRA       | MTQ       | Anthony Marlet             | 1         | 5         | 1         |
";

/// End-to-end with the real pool and store: a second preserve-mode run over
/// the same players leaves the document byte-identical.
#[test]
fn test_preserve_rerun_is_idempotent() {
    let root = image_root(3);
    let xml_path = root.path().join("config.xml");
    fs::write(
        &xml_path,
        "<record>\n\t<boolean id=\"preload\" value=\"false\"/>\n\t<list id=\"maps\">\n\t</list>\n</record>",
    )
    .unwrap();

    let table = NationEthnicTable::default();
    let players = parse_players(std::io::Cursor::new(REPORT), &table).unwrap();
    let opts = RunOptions {
        preserve_existing: true,
        ..Default::default()
    };

    let mut store = MappingStore::load(&xml_path, GameVersion::V2024).unwrap();
    let mut pool = ImagePool::build(root.path()).unwrap();
    let assigned = store.assigned_images();
    pool.exclude(assigned.iter().map(String::as_str));
    allocate(&players, &mut store, &mut pool, &xml_path, &opts, &mut rng()).unwrap();

    let first = fs::read_to_string(&xml_path).unwrap();
    assert!(first.contains("r-2000133469"));
    assert!(first.contains("r-2000133381"));

    // Second run over the same report: everyone already mapped, so nothing
    // may change, whatever the pool hands out this time.
    let mut store = MappingStore::load(&xml_path, GameVersion::V2024).unwrap();
    let mut pool = ImagePool::build(root.path()).unwrap();
    let assigned = store.assigned_images();
    pool.exclude(assigned.iter().map(String::as_str));
    allocate(
        &players,
        &mut store,
        &mut pool,
        &xml_path,
        &opts,
        &mut ChaCha8Rng::seed_from_u64(99),
    )
    .unwrap();

    let second = fs::read_to_string(&xml_path).unwrap();
    assert_eq!(first, second);
}
