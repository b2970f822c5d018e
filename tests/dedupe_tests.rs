use photosweep::dedupe::{DedupeConfig, Deduper};
use photosweep::fsops::{MockFs, RealFs};
use photosweep::progress::Progress;
use photosweep::scanner::{ScanConfig, Scanner};
use std::fs::{self, File};
use std::io::Write;
use tempfile::tempdir;

const BUDGET: u64 = 1 << 20;

/// Deterministic pseudo-random bytes so duplicate pairs are exact and
/// non-duplicates differ early and often.
fn noise(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 56) as u8
        })
        .collect()
}

fn write_file(dir: &std::path::Path, name: &str, contents: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    File::create(&path).unwrap().write_all(contents).unwrap();
    path
}

fn quiet() -> Progress {
    Progress::hidden(true)
}

#[test]
fn test_photo_library_scenario() {
    let dir = tempdir().unwrap();

    // Two identical photos and a third of the same size but different
    // content. Only the copy with the longer stem should go.
    let photo = noise(55513, 42);
    let other = noise(55513, 99);
    let keep = write_file(dir.path(), "duplicate.jpg", &photo);
    let remove = write_file(dir.path(), "duplicate-1.jpg", &photo);
    let distinct = write_file(dir.path(), "exif-20170202.jpg", &other);

    let files = Scanner::new(ScanConfig::default())
        .scan(dir.path(), &quiet())
        .unwrap();
    assert_eq!(files.len(), 3);

    let fs_ops = RealFs;
    let deduper = Deduper::new(DedupeConfig::default(), &fs_ops);
    let stats = deduper.run(files, BUDGET, &quiet()).unwrap();

    assert!(keep.exists());
    assert!(!remove.exists());
    assert!(distinct.exists());
    assert_eq!(stats.removed_files, 1);
    assert_eq!(stats.kept_files, 2);
    assert_eq!(stats.reclaimed_bytes, 55513);
}

#[test]
fn test_dry_run_reports_without_deleting() {
    let dir = tempdir().unwrap();
    let photo = noise(4000, 7);
    let a = write_file(dir.path(), "a.jpg", &photo);
    let b = write_file(dir.path(), "a-1.jpg", &photo);

    let files = Scanner::new(ScanConfig::default())
        .scan(dir.path(), &quiet())
        .unwrap();

    let fs_ops = RealFs;
    let deduper = Deduper::new(DedupeConfig::default().with_dry_run(true), &fs_ops);
    let stats = deduper.run(files, BUDGET, &quiet()).unwrap();

    assert!(a.exists());
    assert!(b.exists());
    assert_eq!(stats.removed_files, 1);
}

#[test]
fn test_keeper_prefers_shortest_stem() {
    let dir = tempdir().unwrap();
    let photo = noise(10_000, 3);
    let original = write_file(dir.path(), "holiday.jpg", &photo);
    let copy1 = write_file(dir.path(), "holiday-1.jpg", &photo);
    let copy2 = write_file(dir.path(), "holiday-2.jpg", &photo);

    let files = Scanner::new(ScanConfig::default())
        .scan(dir.path(), &quiet())
        .unwrap();

    let fs_ops = RealFs;
    let deduper = Deduper::new(DedupeConfig::default(), &fs_ops);
    let stats = deduper.run(files, BUDGET, &quiet()).unwrap();

    assert!(original.exists());
    assert!(!copy1.exists());
    assert!(!copy2.exists());
    assert_eq!(stats.removed_files, 2);
}

#[test]
fn test_interleaved_duplicate_pairs() {
    let dir = tempdir().unwrap();

    // Two duplicate pairs sharing one size group. Each pair keeps its
    // own leader.
    let first = noise(8192, 1);
    let second = noise(8192, 2);
    write_file(dir.path(), "alpha.jpg", &first);
    write_file(dir.path(), "alpha-1.jpg", &first);
    write_file(dir.path(), "zeta.jpg", &second);
    write_file(dir.path(), "zeta-1.jpg", &second);

    let files = Scanner::new(ScanConfig::default())
        .scan(dir.path(), &quiet())
        .unwrap();

    let fs_ops = RealFs;
    let deduper = Deduper::new(DedupeConfig::default(), &fs_ops);
    let stats = deduper.run(files, BUDGET, &quiet()).unwrap();

    assert!(dir.path().join("alpha.jpg").exists());
    assert!(dir.path().join("zeta.jpg").exists());
    assert!(!dir.path().join("alpha-1.jpg").exists());
    assert!(!dir.path().join("zeta-1.jpg").exists());
    assert_eq!(stats.kept_files, 2);
    assert_eq!(stats.removed_files, 2);
}

#[test]
fn test_same_size_different_content_untouched() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.jpg", &noise(55513, 10));
    write_file(dir.path(), "b.jpg", &noise(55513, 11));
    write_file(dir.path(), "c.jpg", &noise(55513, 12));

    let files = Scanner::new(ScanConfig::default())
        .scan(dir.path(), &quiet())
        .unwrap();

    let fs_ops = RealFs;
    let deduper = Deduper::new(DedupeConfig::default(), &fs_ops);
    let stats = deduper.run(files, BUDGET, &quiet()).unwrap();

    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
    assert_eq!(stats.removed_files, 0);
    assert_eq!(stats.kept_files, 3);
}

#[test]
fn test_divergence_past_first_chunk() {
    let dir = tempdir().unwrap();

    // Identical until the final byte, well past one 4 KiB chunk.
    let mut a = noise(20_000, 5);
    let b = a.clone();
    a[19_999] ^= 0xff;
    write_file(dir.path(), "a.jpg", &a);
    write_file(dir.path(), "b.jpg", &b);

    let files = Scanner::new(ScanConfig::default())
        .scan(dir.path(), &quiet())
        .unwrap();

    let fs_ops = RealFs;
    let config = DedupeConfig::default().with_chunk_size(4096);
    let deduper = Deduper::new(config, &fs_ops);
    let stats = deduper.run(files, BUDGET, &quiet()).unwrap();

    assert!(dir.path().join("a.jpg").exists());
    assert!(dir.path().join("b.jpg").exists());
    assert_eq!(stats.removed_files, 0);
}

#[test]
fn test_empty_files_need_explicit_flag() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "blank.jpg", b"");
    write_file(dir.path(), "blank-1.jpg", b"");

    let files = Scanner::new(ScanConfig::default())
        .scan(dir.path(), &quiet())
        .unwrap();

    // Default: zero-length files are not comparable, both kept.
    let fs_ops = MockFs::new();
    let deduper = Deduper::new(DedupeConfig::default(), &fs_ops);
    let stats = deduper.run(files.clone(), BUDGET, &quiet()).unwrap();
    assert_eq!(fs_ops.remove_count(), 0);
    assert_eq!(stats.kept_files, 2);

    // With the flag: the shorter stem survives.
    let fs_ops = MockFs::new();
    let config = DedupeConfig::default().with_empty_files_are_identical(true);
    let deduper = Deduper::new(config, &fs_ops);
    let stats = deduper.run(files, BUDGET, &quiet()).unwrap();
    assert_eq!(fs_ops.remove_count(), 1);
    assert!(fs_ops.removed_paths()[0].ends_with("blank-1.jpg"));
    assert_eq!(stats.kept_files, 1);
}

#[test]
fn test_nested_directories_deduped_together() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("backup");
    fs::create_dir(&sub).unwrap();

    let photo = noise(12_345, 21);
    let keep = write_file(dir.path(), "trip.jpg", &photo);
    let dupe = write_file(&sub, "trip-1.jpg", &photo);

    let files = Scanner::new(ScanConfig::default())
        .scan(dir.path(), &quiet())
        .unwrap();
    assert_eq!(files.len(), 2);

    let fs_ops = RealFs;
    let deduper = Deduper::new(DedupeConfig::default(), &fs_ops);
    deduper.run(files, BUDGET, &quiet()).unwrap();

    assert!(keep.exists());
    assert!(!dupe.exists());
}
