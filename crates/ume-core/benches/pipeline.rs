use chrono::{TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::num::NonZeroUsize;
use ume_core::model::{Profile, User, UserKind};
use ume_core::{FilterState, SortPolicy, filter, paginate, sort};

const SIZES: [usize; 3] = [100, 1_000, 10_000];

const NAMES: [&str; 8] = ["Ane", "Bob", "Cid", "Iker", "Maite", "Jon", "Leire", "Unai"];

fn synthetic_users(count: usize) -> Vec<User> {
    (0..count)
        .map(|i| {
            let mut user = User::new(format!("{i:08}X"), NAMES[i % NAMES.len()]);
            user.surname = format!("Surname{}", i % 97);
            user.email = format!("user{i}@example.com");
            user.active = i % 5 != 0;
            user.registered_at = Utc.timestamp_opt(1_700_000_000 + i as i64, 0).single();
            user.profiles = vec![Profile {
                kind: if i % 3 == 0 {
                    UserKind::Teacher
                } else {
                    UserKind::Student
                },
                center_id: None,
                verified: true,
            }];
            user
        })
        .collect()
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let page_size = NonZeroUsize::new(20).unwrap_or(NonZeroUsize::MIN);

    let mut state = FilterState::default();
    state.query = "ai".into();
    state.set_include_inactive(false);
    let policy = SortPolicy::active_first_by_name();

    for count in SIZES {
        let users = synthetic_users(count);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("filter", count), &users, |b, users| {
            b.iter(|| black_box(filter(users, &state).len()));
        });

        group.bench_with_input(
            BenchmarkId::new("filter_sort_page", count),
            &users,
            |b, users| {
                b.iter(|| {
                    let sorted = sort(filter(users, &state), &policy);
                    black_box(paginate(&sorted, 1, page_size).len())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
