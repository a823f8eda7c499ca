//! Tests for resource values, upload checks and ordering helpers.

use chrono::TimeZone;
use rstest::{fixture, rstest};

use super::*;

#[fixture]
fn draft() -> MetadataDraft {
    MetadataDraft {
        title: Some("Midterm 2024".into()),
        subject: Some("Physics".into()),
        year: Some("2024".into()),
        college: Some("X".into()),
        resource_type: Some("Notes".into()),
        description: None,
    }
}

fn resource_with(metadata: ResourceMetadata) -> Resource {
    Resource {
        id: ResourceId::random(),
        metadata,
        file: StoredFile {
            original_name: "midterm.pdf".into(),
            stored_name: "file-1-1.pdf".into(),
            size: 3,
        },
        uploaded_by: UserId::random(),
        uploader_name: "Ada".into(),
        download_count: 0,
        created_at: Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 0).single().expect("valid"),
    }
}

#[rstest]
fn valid_draft_becomes_metadata(draft: MetadataDraft) {
    let metadata = ResourceMetadata::try_from(draft).expect("valid metadata");
    assert_eq!(metadata.title(), "Midterm 2024");
    assert_eq!(metadata.resource_type(), ResourceType::Notes);
    assert_eq!(metadata.description(), "");
}

#[rstest]
#[case::title(|d: &mut MetadataDraft| d.title = None)]
#[case::subject(|d: &mut MetadataDraft| d.subject = Some("  ".into()))]
#[case::year(|d: &mut MetadataDraft| d.year = None)]
#[case::college(|d: &mut MetadataDraft| d.college = Some(String::new()))]
#[case::kind(|d: &mut MetadataDraft| d.resource_type = None)]
fn missing_fields_are_rejected(mut draft: MetadataDraft, #[case] strip: fn(&mut MetadataDraft)) {
    strip(&mut draft);
    assert_eq!(
        ResourceMetadata::try_from(draft),
        Err(MetadataValidationError::MissingFields)
    );
}

#[rstest]
#[case("notes")]
#[case("Exam")]
#[case("QuestionPaper")]
fn unknown_type_is_rejected(mut draft: MetadataDraft, #[case] label: &str) {
    draft.resource_type = Some(label.into());
    assert_eq!(
        ResourceMetadata::try_from(draft),
        Err(MetadataValidationError::InvalidType)
    );
}

#[rstest]
fn type_labels_round_trip() {
    for kind in ResourceType::ALL {
        assert_eq!(kind.as_str().parse::<ResourceType>(), Ok(kind));
    }
    assert_eq!(
        "Question Paper".parse::<ResourceType>(),
        Ok(ResourceType::QuestionPaper)
    );
}

#[rstest]
#[case("a.pdf", Some(DocumentFormat::Pdf))]
#[case("A.PDF", Some(DocumentFormat::Pdf))]
#[case("report.Doc", Some(DocumentFormat::Doc))]
#[case("thesis.final.docx", Some(DocumentFormat::Docx))]
#[case("virus.exe", None)]
#[case("archive.pdf.zip", None)]
#[case("noextension", None)]
#[case(".pdf", None)]
fn format_follows_extension(#[case] name: &str, #[case] expected: Option<DocumentFormat>) {
    assert_eq!(DocumentFormat::from_file_name(name), expected);
}

#[rstest]
#[case(0)]
#[case(DEFAULT_MAX_UPLOAD_BYTES + 1)]
#[case(u64::MAX)]
fn bad_extension_wins_over_size(#[case] size: u64) {
    let policy = UploadPolicy::default();
    assert_eq!(
        policy.check("malware.exe", size),
        Err(UploadRejection::UnsupportedFileType)
    );
}

#[rstest]
#[case("a.pdf")]
#[case("a.doc")]
#[case("a.docx")]
fn one_byte_over_the_ceiling_is_too_large(#[case] name: &str) {
    let policy = UploadPolicy::default();
    assert_eq!(
        policy.check(name, DEFAULT_MAX_UPLOAD_BYTES + 1),
        Err(UploadRejection::TooLarge {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES
        })
    );
    assert!(policy.check(name, DEFAULT_MAX_UPLOAD_BYTES).is_ok());
}

#[rstest]
#[case(DEFAULT_MAX_UPLOAD_BYTES, "File size too large. Maximum size is 10MB.")]
#[case(25 * 1024 * 1024, "File size too large. Maximum size is 25MB.")]
#[case(512 * 1024, "File size too large. Maximum size is 512KB.")]
#[case(16, "File size too large. Maximum size is 16 bytes.")]
fn too_large_message_names_the_configured_ceiling(#[case] max_bytes: u64, #[case] expected: &str) {
    let rejection = UploadPolicy::new(max_bytes)
        .check_size(max_bytes + 1)
        .expect_err("over the ceiling");
    assert_eq!(rejection.to_string(), expected);
}

#[rstest]
fn storage_names_keep_the_canonical_extension() {
    let at = Utc.timestamp_millis_opt(1_700_000_000_123).single().expect("valid");
    assert_eq!(
        storage_name(at, 987_654_321, DocumentFormat::Pdf),
        "file-1700000000123-987654321.pdf"
    );
}

#[rstest]
fn upload_date_is_utc_calendar_date(draft: MetadataDraft) {
    let resource = resource_with(ResourceMetadata::try_from(draft).expect("valid"));
    assert_eq!(resource.upload_date(), "2024-03-09");
}

#[rstest]
#[case(ResourceFilter::default(), true)]
#[case(ResourceFilter { subject: Some("Physics".into()), ..ResourceFilter::default() }, true)]
#[case(ResourceFilter { subject: Some("physics".into()), ..ResourceFilter::default() }, false)]
#[case(ResourceFilter { year: Some("2023".into()), ..ResourceFilter::default() }, false)]
#[case(ResourceFilter { resource_type: Some("Notes".into()), ..ResourceFilter::default() }, true)]
#[case(ResourceFilter { resource_type: Some("Syllabus".into()), ..ResourceFilter::default() }, false)]
#[case(ResourceFilter { resource_type: Some("notes".into()), ..ResourceFilter::default() }, false)]
#[case(ResourceFilter { resource_type: Some("Slides".into()), ..ResourceFilter::default() }, false)]
#[case(ResourceFilter { search: Some("MIDTERM".into()), ..ResourceFilter::default() }, true)]
#[case(ResourceFilter { search: Some("chemistry x".into()), ..ResourceFilter::default() }, true)]
#[case(ResourceFilter { search: Some("chemistry".into()), ..ResourceFilter::default() }, false)]
#[case(ResourceFilter { search: Some("mid".into()), ..ResourceFilter::default() }, false)]
#[case(ResourceFilter { search: Some("!!".into()), ..ResourceFilter::default() }, false)]
fn filter_matching(draft: MetadataDraft, #[case] filter: ResourceFilter, #[case] expected: bool) {
    let resource = resource_with(ResourceMetadata::try_from(draft).expect("valid"));
    assert_eq!(filter.matches(&resource), expected);
}

#[rstest]
fn subjects_rank_by_count_then_name() {
    let counts = ["Maths", "Art", "Biology", "Chemistry", "Drama", "Physics"]
        .into_iter()
        .zip([4_u64, 2, 2, 1, 1, 7])
        .map(|(subject, count)| SubjectCount {
            subject: subject.into(),
            count,
        })
        .collect();
    let ranked: Vec<String> = rank_subjects(counts)
        .into_iter()
        .map(|entry| entry.subject)
        .collect();
    assert_eq!(ranked, ["Physics", "Maths", "Art", "Biology", "Chemistry"]);
}

#[rstest]
fn years_sort_numerically_descending() {
    let values = FilterValues::from_unsorted(
        vec![],
        vec!["2021".into(), "2024".into(), "2023".into(), "2024".into()],
        vec![],
        vec![],
    );
    assert_eq!(values.years, ["2024", "2023", "2021"]);
}

#[rstest]
fn numeric_years_precede_free_text() {
    let values = FilterValues::from_unsorted(
        vec![],
        vec!["Final".into(), "999".into(), "2020".into(), "Another".into()],
        vec![],
        vec![],
    );
    assert_eq!(values.years, ["2020", "999", "Another", "Final"]);
}

#[rstest]
fn other_values_sort_ascending_without_duplicates() {
    let values = FilterValues::from_unsorted(
        vec!["Physics".into(), "Art".into(), "Physics".into()],
        vec![],
        vec!["Y".into(), "X".into()],
        vec!["Syllabus".into(), "Notes".into()],
    );
    assert_eq!(values.subjects, ["Art", "Physics"]);
    assert_eq!(values.colleges, ["X", "Y"]);
    assert_eq!(values.types, ["Notes", "Syllabus"]);
}
