use std::fs;

use rstest::rstest;
use tempfile::tempdir;
use toolshed_fs::{Error, VaultRoot};

fn vault_with_notes() -> (tempfile::TempDir, VaultRoot) {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("Projects")).unwrap();
    fs::write(dir.path().join("Projects/Plan.md"), "# Plan").unwrap();
    let vault = VaultRoot::new(dir.path()).unwrap();
    (dir, vault)
}

#[rstest]
#[case("Projects/Plan.md")]
#[case("./Projects/Plan.md")]
#[case("Projects/../Projects/Plan.md")]
#[case("Projects/new-note.md")]
#[case("Daily Notes/2025-11-10.md")]
fn paths_inside_vault_are_accepted(#[case] input: &str) {
    let (_dir, vault) = vault_with_notes();
    let resolved = vault.resolve(input).unwrap();
    assert!(resolved.starts_with(vault.path()));
}

#[rstest]
#[case("../secrets.txt")]
#[case("Projects/../../secrets.txt")]
#[case("Projects/../../../../etc/passwd")]
#[case("missing/../../outside.md")]
fn traversal_outside_vault_is_rejected(#[case] input: &str) {
    let (_dir, vault) = vault_with_notes();
    let err = vault.resolve(input).unwrap_err();
    assert!(matches!(err, Error::PathOutsideRoot { .. }), "got {err:?}");
}

#[test]
fn absolute_path_outside_vault_is_rejected() {
    let (_dir, vault) = vault_with_notes();
    let other = tempdir().unwrap();
    assert!(!vault.contains(other.path()));
}

#[test]
fn absolute_path_inside_vault_is_accepted() {
    let (_dir, vault) = vault_with_notes();
    assert!(vault.contains(vault.path().join("Projects/Plan.md")));
}

#[test]
fn sibling_with_shared_prefix_is_rejected() {
    let parent = tempdir().unwrap();
    let vault_dir = parent.path().join("vault");
    let sibling = parent.path().join("vault2");
    fs::create_dir_all(&vault_dir).unwrap();
    fs::create_dir_all(&sibling).unwrap();
    fs::write(sibling.join("note.md"), "x").unwrap();

    let vault = VaultRoot::new(&vault_dir).unwrap();
    assert!(!vault.contains(sibling.join("note.md")));
    assert!(!vault.contains("../vault2/note.md"));
}

#[test]
#[cfg(unix)]
fn symlink_escaping_vault_is_rejected() {
    use std::os::unix::fs::symlink;

    let (dir, vault) = vault_with_notes();
    let outside = tempdir().unwrap();
    fs::write(outside.path().join("secret.md"), "token").unwrap();
    symlink(outside.path(), dir.path().join("escape")).unwrap();

    assert!(!vault.contains("escape/secret.md"));
    assert!(!vault.contains("escape"));
}

#[test]
#[cfg(unix)]
fn symlink_within_vault_is_followed() {
    use std::os::unix::fs::symlink;

    let (dir, vault) = vault_with_notes();
    symlink(dir.path().join("Projects"), dir.path().join("P")).unwrap();

    let resolved = vault.resolve("P/Plan.md").unwrap();
    assert_eq!(resolved, vault.path().join("Projects/Plan.md"));
}
