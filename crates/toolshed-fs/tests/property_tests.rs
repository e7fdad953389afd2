use std::path::Path;

use proptest::prelude::*;
use toolshed_fs::{NormalizedPath, VaultRoot};

fn segment() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("a"),
        Just("b"),
        Just("notes"),
        Just("missing"),
        Just("."),
        Just(".."),
    ]
}

proptest! {
    #[test]
    fn normalization_invariants(s in "\\PC*") {
        let path = NormalizedPath::new(&s);
        let as_str = path.as_str();

        prop_assert!(!as_str.contains('\\'));

        let is_network = as_str.starts_with("//") && !as_str.starts_with("///");
        if is_network {
            prop_assert!(!as_str[2..].contains("//"));
        } else {
            prop_assert!(!as_str.contains("//"));
        }

        let roundtripped = NormalizedPath::new(path.to_native());
        prop_assert_eq!(path, roundtripped);
    }

    #[test]
    fn normalized_relative_paths_never_climb(segments in prop::collection::vec(segment(), 0..10)) {
        let joined = segments.join("/");
        let path = NormalizedPath::new(&joined);
        prop_assert!(!path.as_str().split('/').any(|s| s == ".."));
    }

    /// With no symlinks in play, `resolve` accepts exactly the paths whose
    /// lexical normalization lies under the root.
    #[test]
    fn containment_matches_lexical_ancestry(segments in prop::collection::vec(segment(), 0..10)) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b")).unwrap();
        std::fs::create_dir_all(dir.path().join("notes")).unwrap();
        let vault = VaultRoot::new(dir.path()).unwrap();

        let relative = segments.join("/");
        let lexical = NormalizedPath::new(vault.path().join(&relative));
        let expected = Path::new(lexical.as_str()).starts_with(vault.path());

        prop_assert_eq!(vault.contains(&relative), expected, "path: {:?}", relative);
        if let Ok(resolved) = vault.resolve(&relative) {
            prop_assert!(resolved.starts_with(vault.path()));
        }
    }
}
