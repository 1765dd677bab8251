use proptest::prelude::*;
use std::num::NonZeroUsize;
use ume_core::model::{Record, User};
use ume_core::password::{self, DIGITS, LOWERCASE, PasswordPolicy, SYMBOLS, UPPERCASE};
use ume_core::{FilterState, SelectionSet, SortPolicy, filter, paginate, sort, total_pages};

use generators::*;

fn ids(items: &[&User]) -> Vec<String> {
    items.iter().map(|u| u.id.clone()).collect()
}

fn index(user: &User) -> usize {
    user.id[1..].parse().unwrap()
}

fn matches_query(user: &User, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    User::SEARCH_FIELDS.iter().any(|field| {
        user.text(*field)
            .is_some_and(|v| v.to_lowercase().contains(&needle))
    })
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(2000))]

    // Filter

    #[test]
    fn empty_filter_is_identity(users in arb_users(30)) {
        let out = filter(&users, &FilterState::default());
        let all: Vec<&User> = users.iter().collect();
        prop_assert_eq!(ids(&out), ids(&all));
    }

    #[test]
    fn query_results_are_exactly_the_matching_records(users in arb_users(30), query in arb_query()) {
        let state = FilterState { query: query.clone(), ..FilterState::default() };
        let out = filter(&users, &state);
        let kept: Vec<String> = ids(&out);

        for user in &users {
            let expected = query.trim().is_empty() || matches_query(user, &query);
            prop_assert_eq!(kept.contains(&user.id), expected, "user {:?} query {:?}", user, query);
        }
    }

    #[test]
    fn hiding_inactive_keeps_only_active(users in arb_users(30)) {
        let mut state = FilterState::default();
        state.set_include_inactive(false);
        let out = filter(&users, &state);
        prop_assert!(out.iter().all(|u| u.active));
        prop_assert_eq!(out.len(), users.iter().filter(|u| u.active).count());
    }

    // Paging

    #[test]
    fn pages_concatenate_to_the_input(users in arb_users(40), size in 1usize..7) {
        let size = NonZeroUsize::new(size).unwrap();
        let sorted = sort(users.iter().collect(), &SortPolicy::active_first_by_name());
        let pages = total_pages(sorted.len(), size);

        let mut joined = Vec::new();
        for page in 0..pages {
            let slice = paginate(&sorted, page, size);
            prop_assert!(slice.len() <= size.get());
            joined.extend_from_slice(slice);
        }
        prop_assert_eq!(ids(&joined), ids(&sorted));
        prop_assert!(paginate(&sorted, pages, size).is_empty());
    }

    // Sorting

    #[test]
    fn sort_is_stable(users in arb_users(40)) {
        let sorted = sort(users.iter().collect(), &SortPolicy::active_first_by_name());
        for pair in sorted.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            prop_assert!(SortPolicy::active_first_by_name().compare(a, b).is_le());
            if a.active == b.active && a.name.to_lowercase() == b.name.to_lowercase() {
                prop_assert!(index(a) < index(b), "{} before {}", a.id, b.id);
            }
        }
    }

    // Selection

    #[test]
    fn toggle_all_from_unselected_view_round_trips(users in arb_users(25), picks in arb_picks(25)) {
        let mut state = FilterState::default();
        state.set_include_inactive(false);
        let visible = filter(&users, &state);

        // Start with only hidden records selected.
        let original: SelectionSet = picks
            .iter()
            .filter_map(|i| users.get(*i))
            .filter(|u| !u.active)
            .map(|u| u.id.clone())
            .collect();

        let mut selection = original.clone();
        selection.toggle_all_visible(&visible);
        selection.toggle_all_visible(&visible);
        prop_assert_eq!(selection, original);
    }

    #[test]
    fn toggle_all_from_fully_selected_view_empties_it(users in arb_users(25)) {
        let visible: Vec<&User> = users.iter().collect();
        let mut selection: SelectionSet = users.iter().map(|u| u.id.clone()).collect();

        selection.toggle_all_visible(&visible);
        prop_assert!(selection.is_empty());
        selection.toggle_all_visible(&visible);
        prop_assert_eq!(selection.len(), users.len());
    }

    #[test]
    fn inverting_twice_is_identity(users in arb_users(25), picks in arb_picks(25)) {
        let original: SelectionSet = picks
            .iter()
            .filter_map(|i| users.get(*i))
            .map(|u| u.id.clone())
            .collect();
        let visible: Vec<&User> = users.iter().filter(|u| u.active).collect();

        let mut scoped = original.clone();
        scoped.invert_visible(&visible);
        scoped.invert_visible(&visible);
        prop_assert_eq!(&scoped, &original);

        let mut full = original.clone();
        full.invert_all(&users);
        prop_assert!(full.iter().all(|id| !original.contains(id)));
        full.invert_all(&users);
        prop_assert_eq!(full, original);
    }

    // Passwords

    #[test]
    fn generated_length_is_exact(length in 0usize..40, upper: bool, lower: bool, digits: bool, symbols: bool) {
        let policy = PasswordPolicy { length, uppercase: upper, lowercase: lower, digits, symbols };
        let p = password::generate(&policy);
        prop_assert_eq!(p.chars().count(), length);
    }
}

#[test]
fn default_policy_covers_every_class_over_10000_trials() {
    let policy = PasswordPolicy::default();
    for _ in 0..10_000 {
        let p = password::generate(&policy);
        assert_eq!(p.chars().count(), 12);
        for class in [UPPERCASE, LOWERCASE, DIGITS, SYMBOLS] {
            assert!(p.chars().any(|c| class.contains(c)), "{p} lacks one of {class}");
        }
    }
}
