use safe_rm_core::{
    classify, sidecar_path, CoreError, ProtectionRules, Provenance, RealFileSystem, Trash,
};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[test]
fn file_round_trip_restores_content_and_drops_sidecar() {
    let tmp = tempdir().unwrap();
    let original = tmp.path().join("docs/report.txt");
    fs::create_dir_all(original.parent().unwrap()).unwrap();
    fs::write(&original, b"quarterly numbers").unwrap();
    let trash = Trash::open(tmp.path().join("trash"), "laptop");

    let location = trash.put(&original).unwrap().location;
    assert!(!original.exists());
    // The parent is gone too; restore must recreate it.
    fs::remove_dir(original.parent().unwrap()).unwrap();

    let outcome = trash.restore(&original).unwrap();

    assert_eq!(outcome.to, original);
    assert_eq!(fs::read(&original).unwrap(), b"quarterly numbers");
    assert!(!location.exists());
    assert!(!sidecar_path(&location).exists());
    assert!(trash.list().is_empty());
}

#[test]
fn directory_round_trip_keeps_structure() {
    let tmp = tempdir().unwrap();
    let project = tmp.path().join("project");
    let files = ["a.txt", "src/main.rs", "src/nested/deep.rs", "assets/logo.svg"];
    for (idx, relative) in files.iter().enumerate() {
        let path = project.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, format!("file {idx}")).unwrap();
    }
    let trash = Trash::open(tmp.path().join("trash"), "laptop");

    let location = trash.put(&project).unwrap().location;
    for (idx, relative) in files.iter().enumerate() {
        assert_eq!(
            fs::read_to_string(location.join(relative)).unwrap(),
            format!("file {idx}")
        );
    }
    let rows = trash.list();
    assert_eq!(rows.len(), 1);
    match &rows[0].provenance {
        Provenance::Known(metadata) => {
            assert!(metadata.is_directory);
            assert_eq!(metadata.original_path, project);
        }
        Provenance::Unknown => panic!("expected metadata for {}", location.display()),
    }

    trash.restore(&project).unwrap();
    for (idx, relative) in files.iter().enumerate() {
        assert_eq!(
            fs::read_to_string(project.join(relative)).unwrap(),
            format!("file {idx}")
        );
    }
}

#[test]
fn repeated_deletes_of_one_path_stay_recoverable() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("notes.md");
    let trash = Trash::open(tmp.path().join("trash"), "laptop");

    fs::write(&path, "first").unwrap();
    let first = trash.put(&path).unwrap().location;
    fs::write(&path, "second").unwrap();
    let second = trash.put(&path).unwrap().location;

    assert_ne!(first, second);
    assert_eq!(trash.enumerate().len(), 2);
    assert_eq!(fs::read_to_string(&first).unwrap(), "first");

    // Restoring takes one copy back and leaves the other in the trash.
    trash.restore(&path).unwrap();
    assert!(path.exists());
    assert_eq!(trash.enumerate().len(), 1);
    assert!(matches!(
        trash.restore(&path),
        Err(CoreError::AlreadyExists(_))
    ));
}

#[test]
fn classification_gates_what_reaches_the_trash() {
    let tmp = tempdir().unwrap();
    let repo = tmp.path().join("repo");
    fs::create_dir_all(repo.join(".git")).unwrap();
    fs::write(repo.join("README"), "hi").unwrap();
    let rules = ProtectionRules::builtin()
        .with_patterns(&[format!("{}/keep/**", tmp.path().display())], Path::new("/"));

    assert!(classify(&RealFileSystem, &rules, &repo, true).protected);
    assert!(classify(&RealFileSystem, &rules, &repo.join(".git"), true).protected);
    assert!(!classify(&RealFileSystem, &rules, &repo.join("README"), false).protected);
    assert!(classify(&RealFileSystem, &rules, &tmp.path().join("keep/x"), false).protected);
    assert!(!classify(&RealFileSystem, &rules, &tmp.path().join("keeper"), false).protected);
}

#[test]
fn restore_unknown_path_is_not_found() {
    let tmp = tempdir().unwrap();
    let trash = Trash::open(tmp.path().join("trash"), "laptop");
    assert!(matches!(
        trash.restore(&tmp.path().join("never-trashed")),
        Err(CoreError::NotFound(_))
    ));
}

#[test]
fn file_trashed_after_its_parent_directory_stays_separate() {
    let tmp = tempdir().unwrap();
    let project = tmp.path().join("proj");
    fs::create_dir_all(&project).unwrap();
    fs::write(project.join("old.txt"), "old").unwrap();
    let trash = Trash::open(tmp.path().join("trash"), "laptop");

    trash.put(&project).unwrap();
    fs::create_dir_all(&project).unwrap();
    fs::write(project.join("x"), "new").unwrap();
    trash.put(&project.join("x")).unwrap();
    fs::remove_dir(&project).unwrap();

    assert_eq!(trash.enumerate().len(), 2);
    let originals: Vec<_> = trash
        .list()
        .into_iter()
        .filter_map(|row| row.provenance.metadata().map(|m| m.original_path.clone()))
        .collect();
    assert!(originals.contains(&project));
    assert!(originals.contains(&project.join("x")));

    // The directory comes back without the later file or its sidecar.
    trash.restore(&project).unwrap();
    let names: Vec<_> = fs::read_dir(&project)
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(names, ["old.txt"]);

    trash.restore(&project.join("x")).unwrap();
    assert_eq!(fs::read_to_string(project.join("x")).unwrap(), "new");
    assert!(trash.enumerate().is_empty());
}
