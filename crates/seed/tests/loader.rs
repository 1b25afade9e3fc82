use std::fs;

use camino::Utf8PathBuf;
use masjid_seed::{LoadError, SeedLoader};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn seed_dir(files: &[(&str, &str)]) -> (TempDir, Utf8PathBuf) {
    let tmp = tempfile::tempdir().unwrap();
    for (name, content) in files {
        fs::write(tmp.path().join(name), content).unwrap();
    }
    let path = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();
    (tmp, path)
}

#[test]
fn test_loads_json_files_in_name_order() {
    let (_tmp, dir) = seed_dir(&[
        ("b-fiqh.json", r#"{"courses": [{"title": "Fiqh"}]}"#),
        ("a-quran.json", r#"{"courses": [{"title": "Quran"}, {"title": "Tajweed"}]}"#),
        ("notes.txt", "not a seed file"),
    ]);

    let docs = SeedLoader::open(dir).unwrap().load();

    let names = docs.iter().map(|d| d.name()).collect::<Vec<_>>();
    assert_eq!(names, vec!["a-quran.json", "b-fiqh.json"]);
    assert_eq!(docs[0].courses.len(), 2);
}

#[test]
fn test_malformed_file_skipped() {
    let (_tmp, dir) = seed_dir(&[
        ("broken.json", r#"{"courses": [{"title": "Unclosed""#),
        ("good.json", r#"{"courses": [{"title": "Hadith"}]}"#),
    ]);

    let docs = SeedLoader::open(dir).unwrap().load();

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].name(), "good.json");
}

#[test]
fn test_empty_directory() {
    let (_tmp, dir) = seed_dir(&[]);
    assert!(SeedLoader::open(dir).unwrap().load().is_empty());
}

#[test]
fn test_directory_removed_after_open() {
    let (tmp, dir) = seed_dir(&[("a.json", r#"{"courses": []}"#)]);
    let loader = SeedLoader::open(dir).unwrap();
    drop(tmp);

    assert!(loader.load().is_empty());
}

#[test]
fn test_missing_directory_is_an_error() {
    let (_tmp, dir) = seed_dir(&[]);
    let missing = dir.join("does-not-exist");

    assert!(matches!(
        SeedLoader::open(missing),
        Err(LoadError::Unreadable(..))
    ));
}

#[test]
fn test_file_is_not_a_directory() {
    let (_tmp, dir) = seed_dir(&[("a.json", "{}")]);

    assert!(matches!(
        SeedLoader::open(dir.join("a.json")),
        Err(LoadError::NotADirectory(_))
    ));
}
