//! Property-based tests for merging and promotion.
//!
//! These tests use proptest to generate random entry lists and verify that
//! the override rules hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use std::collections::HashSet;
    use std::path::{Path, PathBuf};

    use crate::cache::CacheLayout;
    use crate::entry::{parse_search_path, render, NixPathEntry};
    use crate::merge::{merge, merge_all, promote};
    use crate::target::PathTarget;
    use proptest::prelude::*;

    fn entry_strategy() -> impl Strategy<Value = NixPathEntry> {
        let target = "/[a-z]{1,5}".prop_map(|p| PathTarget::Local(PathBuf::from(p)));
        prop_oneof![
            4 => ("[a-c](\\.[a-c]){0,2}", target.clone())
                .prop_map(|(key, target)| NixPathEntry::Keyed(key, target)),
            1 => target.prop_map(NixPathEntry::Root),
        ]
    }

    fn entries_strategy() -> impl Strategy<Value = Vec<NixPathEntry>> {
        prop::collection::vec(entry_strategy(), 0..12)
    }

    fn keyed_only() -> impl Strategy<Value = Vec<NixPathEntry>> {
        entries_strategy()
            .prop_map(|entries| entries.into_iter().filter(|e| e.key().is_some()).collect())
    }

    fn first_target<'a>(entries: &'a [NixPathEntry], key: &str) -> Option<&'a PathTarget> {
        entries
            .iter()
            .find(|e| e.key() == Some(key))
            .map(NixPathEntry::target)
    }

    fn roots(entries: &[NixPathEntry]) -> usize {
        entries.iter().filter(|e| e.key().is_none()).count()
    }

    // ============================================================================
    // merge property tests
    // ============================================================================

    proptest! {
        /// Property: keys are unique after a merge
        #[test]
        fn merge_yields_unique_keys(base in entries_strategy(), incoming in entries_strategy()) {
            let merged = merge(base, incoming);
            let mut seen = HashSet::new();
            for key in merged.iter().filter_map(NixPathEntry::key) {
                prop_assert!(seen.insert(key.to_string()), "duplicate key {}", key);
            }
        }

        /// Property: incoming wins, base fills in the rest
        #[test]
        fn merge_incoming_wins(base in entries_strategy(), incoming in entries_strategy()) {
            let merged = merge(base.clone(), incoming.clone());
            let keys: HashSet<&str> = base
                .iter()
                .chain(incoming.iter())
                .filter_map(NixPathEntry::key)
                .collect();

            for key in keys {
                let expected = first_target(&incoming, key).or_else(|| first_target(&base, key));
                prop_assert_eq!(first_target(&merged, key), expected);
            }
        }

        /// Property: every root entry survives, duplicates included
        #[test]
        fn merge_keeps_all_roots(base in entries_strategy(), incoming in entries_strategy()) {
            let expected = roots(&base) + roots(&incoming);
            prop_assert_eq!(roots(&merge(base, incoming)), expected);
        }

        /// Property: merging a keyed list into itself changes nothing further
        #[test]
        fn merge_is_idempotent(entries in keyed_only()) {
            let once = merge(Vec::new(), entries);
            let twice = merge(once.clone(), once.clone());
            prop_assert_eq!(twice, once);
        }

        /// Property: merging the same keyed source again is a no-op
        #[test]
        fn merge_same_source_twice(base in entries_strategy(), incoming in keyed_only()) {
            let once = merge(base, incoming.clone());
            prop_assert_eq!(merge(once.clone(), incoming), once);
        }

        /// Property: folding sources equals merging them pairwise
        #[test]
        fn merge_all_matches_pairwise(a in entries_strategy(), b in entries_strategy(), c in entries_strategy()) {
            let folded = merge_all(vec![a.clone(), b.clone(), c.clone()]);
            let pairwise = merge(merge(merge(Vec::new(), a), b), c);
            prop_assert_eq!(folded, pairwise);
        }
    }

    // ============================================================================
    // promote property tests
    // ============================================================================

    proptest! {
        /// Property: every key under the prefix is reachable without it
        #[test]
        fn promote_exposes_stripped_keys(entries in keyed_only(), prefix in "[a-c]") {
            let deduped = merge(Vec::new(), entries);
            let promoted = promote(deduped.clone(), std::slice::from_ref(&prefix)).unwrap();
            let dotted = format!("{}.", prefix);

            for entry in &deduped {
                let key = entry.key().unwrap_or_default();
                if let Some(rest) = key.strip_prefix(dotted.as_str()) {
                    prop_assert_eq!(first_target(&promoted, rest), Some(entry.target()));
                }
            }
        }

        /// Property: promotion never drops an original key
        #[test]
        fn promote_keeps_original_keys(entries in entries_strategy(), prefix in "[a-c]") {
            let deduped = merge(Vec::new(), entries);
            let promoted = promote(deduped.clone(), &[prefix]).unwrap();
            for key in deduped.iter().filter_map(NixPathEntry::key) {
                prop_assert!(first_target(&promoted, key).is_some());
            }
            prop_assert_eq!(roots(&promoted), roots(&deduped));
        }
    }

    // ============================================================================
    // search-path string property tests
    // ============================================================================

    proptest! {
        /// Property: rendering local entries and parsing them back is lossless
        #[test]
        fn rendered_local_entries_parse_back(entries in entries_strategy()) {
            let layout = CacheLayout::new("/cache");
            let rendered = render(&entries, &layout).unwrap();
            let parsed = parse_search_path(&rendered, Path::new("/work")).unwrap();
            prop_assert_eq!(parsed, entries);
        }
    }
}
