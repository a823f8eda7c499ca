//! Tests for the in-memory resource repository.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use rstest::rstest;

use super::*;
use crate::domain::{DisplayName, MetadataDraft, ResourceMetadata, StoredFile, UserId};
use crate::test_support::fixture_timestamp;

fn metadata(title: &str, subject: &str, year: &str, college: &str, kind: &str) -> ResourceMetadata {
    ResourceMetadata::try_from(MetadataDraft {
        title: Some(title.to_owned()),
        subject: Some(subject.to_owned()),
        year: Some(year.to_owned()),
        college: Some(college.to_owned()),
        resource_type: Some(kind.to_owned()),
        description: None,
    })
    .expect("valid metadata")
}

fn new_resource(metadata: ResourceMetadata, created_at: DateTime<Utc>) -> NewResource {
    NewResource {
        id: ResourceId::random(),
        metadata,
        file: StoredFile {
            original_name: "paper.pdf".to_owned(),
            stored_name: format!("file-{}-1.pdf", created_at.timestamp_millis()),
            size: 4,
        },
        uploaded_by: UserId::random(),
        uploader_name: DisplayName::new("Ada").expect("name"),
        created_at,
    }
}

fn at_minute(minute: i64) -> DateTime<Utc> {
    fixture_timestamp() + TimeDelta::minutes(minute)
}

async fn seeded(entries: &[(&str, &str, &str, &str, &str)]) -> InMemoryResourceRepository {
    let repo = InMemoryResourceRepository::new();
    for (minute, (title, subject, year, college, kind)) in entries.iter().enumerate() {
        let meta = metadata(title, subject, year, college, kind);
        repo.insert(&new_resource(meta, at_minute(minute as i64)))
            .await
            .expect("insert");
    }
    repo
}

fn titles(page: &Paginated<Resource>) -> Vec<&str> {
    page.items.iter().map(|r| r.metadata.title()).collect()
}

#[rstest]
#[tokio::test]
async fn inserted_resources_start_with_zero_downloads() {
    let repo = InMemoryResourceRepository::new();
    let new = new_resource(metadata("Midterm", "Physics", "2024", "MIT", "Notes"), at_minute(0));

    let stored = repo.insert(&new).await.expect("insert");

    assert_eq!(stored.download_count, 0);
    assert_eq!(repo.find_by_id(&new.id).await.expect("find"), Some(stored));
}

#[rstest]
#[tokio::test]
async fn pages_are_newest_first_and_sized_by_limit() {
    let repo = InMemoryResourceRepository::new();
    for minute in 0..23 {
        let meta = metadata(&format!("Doc {minute}"), "Physics", "2024", "MIT", "Notes");
        repo.insert(&new_resource(meta, at_minute(minute)))
            .await
            .expect("insert");
    }

    let first = repo
        .list(&ResourceFilter::default(), PageRequest::new(1, 10).expect("page"))
        .await
        .expect("list");
    let third = repo
        .list(&ResourceFilter::default(), PageRequest::new(3, 10).expect("page"))
        .await
        .expect("list");
    let beyond = repo
        .list(&ResourceFilter::default(), PageRequest::new(4, 10).expect("page"))
        .await
        .expect("list");

    assert_eq!(first.items.len(), 10);
    assert_eq!(first.items[0].metadata.title(), "Doc 22");
    assert_eq!(third.items.len(), 3);
    assert_eq!(titles(&third), ["Doc 2", "Doc 1", "Doc 0"]);
    assert_eq!(third.info.total, 23);
    assert_eq!(third.info.pages, 3);
    assert!(beyond.items.is_empty());
}

#[rstest]
#[tokio::test]
async fn filters_combine_exact_fields_and_search() {
    let repo = seeded(&[
        ("Quantum Midterm", "Physics", "2024", "MIT", "Question Paper"),
        ("Optics Notes", "Physics", "2023", "MIT", "Notes"),
        ("Linear Algebra", "Maths", "2024", "Caltech", "Notes"),
    ])
    .await;
    let page = PageRequest::default();

    let physics = ResourceFilter {
        subject: Some("Physics".to_owned()),
        ..ResourceFilter::default()
    };
    let notes_2024 = ResourceFilter {
        year: Some("2024".to_owned()),
        resource_type: Some("Notes".to_owned()),
        ..ResourceFilter::default()
    };
    let search = ResourceFilter {
        search: Some("quantum caltech".to_owned()),
        ..ResourceFilter::default()
    };

    assert_eq!(
        titles(&repo.list(&physics, page).await.expect("list")),
        ["Optics Notes", "Quantum Midterm"]
    );
    assert_eq!(
        titles(&repo.list(&notes_2024, page).await.expect("list")),
        ["Linear Algebra"]
    );
    assert_eq!(
        titles(&repo.list(&search, page).await.expect("list")),
        ["Linear Algebra", "Quantum Midterm"]
    );
}

#[rstest]
#[tokio::test]
async fn increment_returns_updated_record_or_none() {
    let repo = InMemoryResourceRepository::new();
    let new = new_resource(metadata("Midterm", "Physics", "2024", "MIT", "Notes"), at_minute(0));
    repo.insert(&new).await.expect("insert");

    let once = repo.increment_downloads(&new.id).await.expect("increment");
    let twice = repo.increment_downloads(&new.id).await.expect("increment");
    let missing = repo
        .increment_downloads(&ResourceId::random())
        .await
        .expect("increment");

    assert_eq!(once.map(|r| r.download_count), Some(1));
    assert_eq!(twice.map(|r| r.download_count), Some(2));
    assert_eq!(missing, None);
}

#[rstest]
#[tokio::test]
async fn concurrent_increments_are_not_lost() {
    const DOWNLOADS: u64 = 64;
    let repo = Arc::new(InMemoryResourceRepository::new());
    let new = new_resource(metadata("Midterm", "Physics", "2024", "MIT", "Notes"), at_minute(0));
    repo.insert(&new).await.expect("insert");

    let tasks: Vec<_> = (0..DOWNLOADS)
        .map(|_| {
            let repo = Arc::clone(&repo);
            let id = new.id;
            tokio::spawn(async move { repo.increment_downloads(&id).await })
        })
        .collect();
    for task in tasks {
        task.await.expect("join").expect("increment");
    }

    let stored = repo.find_by_id(&new.id).await.expect("find").expect("present");
    assert_eq!(stored.download_count, DOWNLOADS);
}

#[rstest]
#[tokio::test]
async fn totals_rank_subjects_and_list_recent_uploads() {
    let repo = seeded(&[
        ("A", "Physics", "2024", "MIT", "Notes"),
        ("B", "Maths", "2024", "MIT", "Notes"),
        ("C", "Physics", "2024", "MIT", "Notes"),
        ("D", "Biology", "2024", "MIT", "Notes"),
        ("E", "Chemistry", "2024", "MIT", "Notes"),
        ("F", "Art", "2024", "MIT", "Notes"),
        ("G", "Maths", "2024", "MIT", "Notes"),
    ])
    .await;
    let listed = repo
        .list(&ResourceFilter::default(), PageRequest::default())
        .await
        .expect("list");
    let first_id = listed.items[0].id;
    repo.increment_downloads(&first_id).await.expect("increment");
    repo.increment_downloads(&first_id).await.expect("increment");

    let totals = repo.totals().await.expect("totals");

    assert_eq!(totals.total_resources, 7);
    assert_eq!(totals.total_downloads, 2);
    let ranked: Vec<(&str, u64)> = totals
        .top_subjects
        .iter()
        .map(|s| (s.subject.as_str(), s.count))
        .collect();
    assert_eq!(
        ranked,
        [("Maths", 2), ("Physics", 2), ("Art", 1), ("Biology", 1), ("Chemistry", 1)]
    );
    let recent: Vec<&str> = totals.recent_uploads.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(recent, ["G", "F", "E", "D", "C"]);
}

#[rstest]
#[tokio::test]
async fn filter_values_are_distinct_and_ordered() {
    let repo = seeded(&[
        ("A", "Physics", "2023", "MIT", "Notes"),
        ("B", "Maths", "2024", "Caltech", "Syllabus"),
        ("C", "Physics", "Final year", "MIT", "Notes"),
        ("D", "Maths", "2021", "MIT", "Question Paper"),
    ])
    .await;

    let values = repo.filter_values().await.expect("values");

    assert_eq!(values.subjects, ["Maths", "Physics"]);
    assert_eq!(values.years, ["2024", "2023", "2021", "Final year"]);
    assert_eq!(values.colleges, ["Caltech", "MIT"]);
    assert_eq!(values.types, ["Notes", "Question Paper", "Syllabus"]);
}

#[rstest]
#[tokio::test]
async fn empty_repository_reports_zero_totals() {
    let repo = InMemoryResourceRepository::new();
    assert_eq!(repo.totals().await.expect("totals"), CatalogueTotals::default());
    assert_eq!(repo.filter_values().await.expect("values"), FilterValues::default());
}
