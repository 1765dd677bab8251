//! End-to-end list screen flows over the public API.

use chrono::{DateTime, TimeZone, Utc};
use std::num::NonZeroUsize;
use ume_core::batch::{BatchAction, RecordActions};
use ume_core::error::ActionError;
use ume_core::model::{Address, Center, Notification, NotificationKind, Task, TaskStatus, User};
use ume_core::{
    CollectionView, CsvOptions, DateCondition, ExportScope, Flag, FilterState, SortPolicy,
    TextField, TimeField, filter, paginate, sort,
};

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, day, 9, 0, 0).unwrap()
}

fn user(id: &str, name: &str, active: bool) -> User {
    let mut u = User::new(id, name);
    u.active = active;
    u
}

fn ids<R: ume_core::Record>(items: &[&R]) -> Vec<String> {
    items.iter().map(|r| r.id().to_string()).collect()
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[test]
fn ann_bob_cid_pipeline() {
    let items = vec![user("A", "Ann", true), user("B", "Bob", false), user("C", "Cid", true)];
    let mut state = FilterState::default();
    state.set_include_inactive(false);

    let filtered = filter(&items, &state);
    assert_eq!(ids(&filtered), vec!["A", "C"]);

    let sorted = sort(filtered, &SortPolicy::active_first_by_name());
    assert_eq!(ids(&sorted), vec!["A", "C"]);

    let size = NonZeroUsize::new(2).unwrap();
    assert_eq!(ids(paginate(&sorted, 0, size)), vec!["A", "C"]);
    assert!(paginate(&sorted, 1, size).is_empty());
}

// ---------------------------------------------------------------------------
// Users screen
// ---------------------------------------------------------------------------

/// Backend that records every call and rejects one identity.
struct Recorder {
    calls: Vec<String>,
    reject: &'static str,
}

impl RecordActions for Recorder {
    fn delete(&mut self, id: &str) -> Result<(), ActionError> {
        self.call(format!("delete {id}"), id)
    }

    fn set_active(&mut self, id: &str, active: bool) -> Result<(), ActionError> {
        self.call(format!("set_active {id} {active}"), id)
    }

    fn reset_password(&mut self, id: &str, _password: &str) -> Result<(), ActionError> {
        self.call(format!("reset_password {id}"), id)
    }
}

impl Recorder {
    fn call(&mut self, entry: String, id: &str) -> Result<(), ActionError> {
        self.calls.push(entry);
        if id == self.reject {
            Err(ActionError::Backend("permission denied".into()))
        } else {
            Ok(())
        }
    }
}

#[test]
fn select_filtered_users_then_deactivate() {
    let mut ann = user("A", "Ann", true);
    ann.email = "ann@school.example".into();
    let mut abe = user("D", "Abe", true);
    abe.email = "abe@home.example".into();
    let items = vec![ann, user("B", "Bob", false), user("C", "Cid", true), abe];

    let mut view = CollectionView::new(items, SortPolicy::active_first_by_name());
    view.set_include_inactive(false);
    view.set_query("SCHOOL");
    assert_eq!(ids(&view.visible()), vec!["A"]);

    view.toggle_all_visible();
    view.set_query("");
    assert_eq!(view.selection().len(), 1);
    assert!(!view.all_visible_selected());

    view.toggle_selected("D");
    let mut backend = Recorder {
        calls: Vec::new(),
        reject: "D",
    };
    let report = view.run_batch(&BatchAction::SetActive(false), &mut backend);

    assert_eq!(backend.calls, vec!["set_active A false", "set_active D false"]);
    assert_eq!(report.succeeded, vec!["A"]);
    assert_eq!(report.failed.len(), 1);
    assert!(view.selection().is_empty());
    assert!(view.error().unwrap().contains("permission denied"));
}

#[test]
fn paging_survives_snapshot_shrinking() {
    let items: Vec<User> = (0..12).map(|i| user(&format!("u{i:02}"), &format!("n{i:02}"), true)).collect();
    let mut view = CollectionView::new(items.clone(), SortPolicy::active_first_by_name())
        .with_page_size(NonZeroUsize::new(5).unwrap());
    view.go_to_page(2);
    assert_eq!(ids(&view.current_page()), vec!["u10", "u11"]);
    assert_eq!(view.page_info().first_row, 11);

    view.replace_items(items.into_iter().take(4).collect());
    assert_eq!(view.paginator().page(), 0);
    assert_eq!(view.current_page().len(), 4);
    assert_eq!(view.summary(), "showing 4 of 4");
}

#[test]
fn per_field_filters_narrow_like_the_student_list() {
    let mut a = user("11111111A", "Ane", true);
    a.surname = "Garcia".into();
    let mut b = user("22222222B", "Ane", true);
    b.surname = "Lopez".into();
    let mut c = user("33333333C", "Jon", false);
    c.surname = "Garcia".into();

    let mut view = CollectionView::new(vec![a, b, c], SortPolicy::active_first_by_name());
    view.set_field_query(TextField::Surname, "garc");
    assert_eq!(ids(&view.visible()), vec!["11111111A", "33333333C"]);

    view.require_flag(Flag::Active, true);
    assert_eq!(ids(&view.visible()), vec!["11111111A"]);

    view.clear_flag(Flag::Active);
    view.set_field_query(TextField::Surname, " ");
    view.set_field_query(TextField::Identifier, "2222");
    assert_eq!(ids(&view.visible()), vec!["22222222B"]);
}

// ---------------------------------------------------------------------------
// Other screens
// ---------------------------------------------------------------------------

#[test]
fn centers_search_by_city() {
    let center = |id: &str, name: &str, city: &str| Center {
        id: id.into(),
        name: name.into(),
        address: Address {
            city: city.into(),
            province: "Bizkaia".into(),
            ..Address::default()
        },
        phone: String::new(),
        email: String::new(),
        created_at: None,
        active: true,
    };
    let centers = vec![
        center("c1", "Ikastola Txiki", "Getxo"),
        center("c2", "Escuela Norte", "Bilbao"),
        center("c3", "Bilbao Haurreskola", "Barakaldo"),
    ];

    let view = CollectionView::new(centers, SortPolicy::active_first_by_name())
        .with_filter(FilterState {
            query: "bilbao".into(),
            ..FilterState::default()
        });
    assert_eq!(ids(&view.visible()), vec!["c3", "c2"]);
}

#[test]
fn overdue_tasks_sorted_by_due_date() {
    let task = |id: &str, title: &str, status, due| Task {
        id: id.into(),
        title: title.into(),
        description: String::new(),
        subject: "Maths".into(),
        student_id: None,
        status,
        created_at: Some(at(1)),
        due_at: due,
    };
    let tasks = vec![
        task("t1", "Fractions", TaskStatus::Pending, Some(at(10))),
        task("t2", "Decimals", TaskStatus::Completed, Some(at(5))),
        task("t3", "Geometry", TaskStatus::InProgress, Some(at(4))),
        task("t4", "Reading", TaskStatus::Pending, None),
        task("t5", "Algebra", TaskStatus::Pending, Some(at(20))),
    ];

    let mut view = CollectionView::new(tasks, SortPolicy::by_due_date());
    assert_eq!(ids(&view.visible()), vec!["t3", "t2", "t1", "t5", "t4"]);

    view.set_date_condition(Some(DateCondition::Overdue { as_of: at(15) }));
    assert_eq!(ids(&view.visible()), vec!["t3", "t1"]);

    view.set_date_condition(Some(DateCondition::Between {
        field: TimeField::Due,
        from: at(5),
        to: at(10),
    }));
    assert_eq!(ids(&view.visible()), vec!["t2", "t1"]);
}

#[test]
fn unread_notifications_newest_first_and_exported() {
    let note = |id: &str, kind, read, day| Notification {
        id: id.into(),
        title: format!("note {id}"),
        body: "See you, \"tomorrow\"".into(),
        kind,
        read,
        created_at: Some(at(day)),
    };
    let notes = vec![
        note("n1", NotificationKind::Grade, false, 2),
        note("n2", NotificationKind::Event, true, 3),
        note("n3", NotificationKind::Message, false, 4),
    ];

    let mut view = CollectionView::new(notes, SortPolicy::newest_first(TimeField::Created));
    view.require_flag(Flag::Read, false);
    assert_eq!(ids(&view.visible()), vec!["n3", "n1"]);

    let csv = view
        .export_csv(ExportScope::Visible, &CsvOptions::default())
        .unwrap();
    let mut rdr = csv::Reader::from_reader(csv.as_bytes());
    let rows: Vec<csv::StringRecord> = rdr.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "n3");
    assert_eq!(&rows[0][1], "message");
    assert_eq!(&rows[0][3], "See you, \"tomorrow\"");
}
