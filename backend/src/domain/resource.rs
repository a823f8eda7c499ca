//! Shared study documents and the values used to query them.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{DisplayName, UserId};

/// Default upload ceiling: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
/// Number of subjects reported in [`ResourceStats::top_subjects`].
pub const TOP_SUBJECTS_LIMIT: usize = 5;
/// Number of uploads reported in [`ResourceStats::recent_uploads`].
pub const RECENT_UPLOADS_LIMIT: usize = 5;

/// Stable resource identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId(Uuid);

impl ResourceId {
    /// Parse an identifier from its UUID text; `None` when malformed.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw).ok().map(Self)
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Kind of study document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceType {
    QuestionPaper,
    Notes,
    Solutions,
    Syllabus,
}

impl ResourceType {
    /// Every variant, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::QuestionPaper,
        Self::Notes,
        Self::Solutions,
        Self::Syllabus,
    ];

    /// Label used on the wire and in storage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::QuestionPaper => "Question Paper",
            Self::Notes => "Notes",
            Self::Solutions => "Solutions",
            Self::Syllabus => "Syllabus",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a label names no [`ResourceType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownResourceType(pub String);

impl fmt::Display for UnknownResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown resource type '{}'", self.0)
    }
}

impl std::error::Error for UnknownResourceType {}

impl FromStr for ResourceType {
    type Err = UnknownResourceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownResourceType(s.to_owned()))
    }
}

/// Validation failures for upload metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataValidationError {
    /// Title, subject, year, college or type was absent or blank.
    MissingFields,
    /// The type label is not one of the [`ResourceType`] labels.
    InvalidType,
}

impl fmt::Display for MetadataValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFields => {
                write!(f, "Title, subject, year, college, and type are required")
            }
            Self::InvalidType => write!(
                f,
                "Type must be one of: Question Paper, Notes, Solutions, Syllabus"
            ),
        }
    }
}

impl std::error::Error for MetadataValidationError {}

/// Descriptive fields supplied with an upload.
///
/// ## Invariants
/// - `title`, `subject`, `year` and `college` are trimmed and non-empty.
/// - `description` is trimmed and may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMetadata {
    title: String,
    subject: String,
    year: String,
    college: String,
    resource_type: ResourceType,
    description: String,
}

/// Raw upload fields as they arrive from a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataDraft {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub year: Option<String>,
    pub college: Option<String>,
    pub resource_type: Option<String>,
    pub description: Option<String>,
}

fn required(value: Option<&String>) -> Result<String, MetadataValidationError> {
    value
        .map(|raw| raw.trim())
        .filter(|trimmed| !trimmed.is_empty())
        .map(str::to_owned)
        .ok_or(MetadataValidationError::MissingFields)
}

impl TryFrom<MetadataDraft> for ResourceMetadata {
    type Error = MetadataValidationError;

    fn try_from(draft: MetadataDraft) -> Result<Self, Self::Error> {
        let title = required(draft.title.as_ref())?;
        let subject = required(draft.subject.as_ref())?;
        let year = required(draft.year.as_ref())?;
        let college = required(draft.college.as_ref())?;
        let resource_type = required(draft.resource_type.as_ref())?
            .parse()
            .map_err(|_| MetadataValidationError::InvalidType)?;
        let description = draft
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_owned();

        Ok(Self {
            title,
            subject,
            year,
            college,
            resource_type,
            description,
        })
    }
}

impl ResourceMetadata {
    /// Document title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Subject the document belongs to.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Free-text academic year.
    #[must_use]
    pub fn year(&self) -> &str {
        &self.year
    }

    /// College the document comes from.
    #[must_use]
    pub fn college(&self) -> &str {
        &self.college
    }

    /// Document kind.
    #[must_use]
    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// Optional description; empty when not supplied.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Accepted document formats, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Doc,
    Docx,
}

impl DocumentFormat {
    /// Detect the format from a client-supplied file name, ignoring case.
    ///
    /// # Examples
    /// ```
    /// use synapse::domain::DocumentFormat;
    ///
    /// assert_eq!(DocumentFormat::from_file_name("Notes.PDF"), Some(DocumentFormat::Pdf));
    /// assert_eq!(DocumentFormat::from_file_name("notes.pdf.exe"), None);
    /// assert_eq!(DocumentFormat::from_file_name("pdf"), None);
    /// ```
    #[must_use]
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (stem, extension) = name.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "doc" => Some(Self::Doc),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    /// Extension including the leading dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Doc => ".doc",
            Self::Docx => ".docx",
        }
    }
}

/// Build a collision-resistant storage name from a timestamp and a random
/// suffix, keeping the document's extension.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use synapse::domain::{DocumentFormat, storage_name};
///
/// let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
/// assert_eq!(
///     storage_name(at, 42, DocumentFormat::Docx),
///     "file-1700000000000-42.docx"
/// );
/// ```
#[must_use]
pub fn storage_name(at: DateTime<Utc>, suffix: u32, format: DocumentFormat) -> String {
    format!(
        "file-{}-{}{}",
        at.timestamp_millis(),
        suffix,
        format.extension()
    )
}

/// Limits applied to incoming documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    max_bytes: u64,
}

/// Reasons an upload is refused before it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadRejection {
    /// Extension outside `.pdf`, `.doc`, `.docx`.
    UnsupportedFileType,
    /// More bytes than the policy allows.
    TooLarge {
        /// Ceiling that was exceeded.
        max_bytes: u64,
    },
}

/// Human-readable byte ceiling: whole mebibytes as `MB`, whole kibibytes as
/// `KB`, anything else in bytes.
fn describe_ceiling(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * KIB;
    match bytes {
        0 => "0 bytes".to_owned(),
        b if b % MIB == 0 => format!("{}MB", b / MIB),
        b if b % KIB == 0 => format!("{}KB", b / KIB),
        b => format!("{b} bytes"),
    }
}

impl fmt::Display for UploadRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFileType => write!(f, "Only PDF, DOC, and DOCX files are allowed"),
            Self::TooLarge { max_bytes } => write!(
                f,
                "File size too large. Maximum size is {}.",
                describe_ceiling(*max_bytes)
            ),
        }
    }
}

impl std::error::Error for UploadRejection {}

impl UploadPolicy {
    /// Policy with a custom byte ceiling.
    #[must_use]
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Largest accepted upload in bytes.
    #[must_use]
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Check the file name; the extension is judged before any size check.
    pub fn check_name(&self, original_name: &str) -> Result<DocumentFormat, UploadRejection> {
        DocumentFormat::from_file_name(original_name).ok_or(UploadRejection::UnsupportedFileType)
    }

    /// Check a running or final byte count.
    pub fn check_size(&self, size: u64) -> Result<(), UploadRejection> {
        if size > self.max_bytes {
            return Err(UploadRejection::TooLarge {
                max_bytes: self.max_bytes,
            });
        }
        Ok(())
    }

    /// Check name then size.
    pub fn check(&self, original_name: &str, size: u64) -> Result<DocumentFormat, UploadRejection> {
        let format = self.check_name(original_name)?;
        self.check_size(size)?;
        Ok(format)
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UPLOAD_BYTES)
    }
}

/// Document bytes received from a client.
#[derive(Clone, PartialEq, Eq)]
pub struct IncomingFile {
    /// Name the client gave the file.
    pub original_name: String,
    /// Full file content.
    pub content: bytes::Bytes,
}

impl fmt::Debug for IncomingFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncomingFile")
            .field("original_name", &self.original_name)
            .field("len", &self.content.len())
            .finish()
    }
}

/// Location and size of a document held by a blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Client-supplied name, used for the download filename.
    pub original_name: String,
    /// Generated name inside the upload directory.
    pub stored_name: String,
    /// Content length in bytes.
    pub size: u64,
}

/// Everything needed to persist a newly uploaded resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResource {
    pub id: ResourceId,
    pub metadata: ResourceMetadata,
    pub file: StoredFile,
    pub uploaded_by: UserId,
    pub uploader_name: DisplayName,
    pub created_at: DateTime<Utc>,
}

/// A shared document with its download counter.
///
/// `uploader_name` is a copy of the uploader's display name taken at upload
/// time; `uploaded_by` is a lookup key, not an ownership edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub id: ResourceId,
    pub metadata: ResourceMetadata,
    pub file: StoredFile,
    pub uploaded_by: UserId,
    pub uploader_name: String,
    pub download_count: u64,
    pub created_at: DateTime<Utc>,
}

impl Resource {
    /// Materialise a fresh record with a zero download counter.
    #[must_use]
    pub fn from_new(new: NewResource) -> Self {
        Self {
            id: new.id,
            metadata: new.metadata,
            file: new.file,
            uploaded_by: new.uploaded_by,
            uploader_name: new.uploader_name.as_str().to_owned(),
            download_count: 0,
            created_at: new.created_at,
        }
    }

    /// Creation date rendered as `YYYY-MM-DD` in UTC.
    #[must_use]
    pub fn upload_date(&self) -> String {
        format_upload_date(self.created_at)
    }
}

/// Render a timestamp as the `YYYY-MM-DD` date shown to clients.
#[must_use]
pub fn format_upload_date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// Listing filter. Absent fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceFilter {
    /// Matches when any search token appears as a word in the title,
    /// subject or college.
    pub search: Option<String>,
    pub subject: Option<String>,
    pub year: Option<String>,
    pub college: Option<String>,
    /// Compared against the type label; an unknown label matches nothing.
    pub resource_type: Option<String>,
}

impl ResourceFilter {
    /// Lower-cased search tokens; empty when no search was requested.
    #[must_use]
    pub fn search_tokens(&self) -> Vec<String> {
        self.search
            .as_deref()
            .map(|query| {
                query
                    .split(|c: char| !c.is_alphanumeric())
                    .filter(|token| !token.is_empty())
                    .map(str::to_lowercase)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether `resource` satisfies every present constraint.
    ///
    /// Used by in-process adapters; SQL adapters express the same rules in
    /// their queries.
    #[must_use]
    pub fn matches(&self, resource: &Resource) -> bool {
        let metadata = &resource.metadata;
        let exact = |wanted: Option<&String>, actual: &str| wanted.is_none_or(|w| w == actual);
        exact(self.subject.as_ref(), metadata.subject())
            && exact(self.year.as_ref(), metadata.year())
            && exact(self.college.as_ref(), metadata.college())
            && exact(
                self.resource_type.as_ref(),
                metadata.resource_type().as_str(),
            )
            && self.matches_search(metadata)
    }

    fn matches_search(&self, metadata: &ResourceMetadata) -> bool {
        if self.search.is_none() {
            return true;
        }
        let tokens = self.search_tokens();
        let haystack: Vec<String> = [metadata.title(), metadata.subject(), metadata.college()]
            .iter()
            .flat_map(|field| {
                field
                    .split(|c: char| !c.is_alphanumeric())
                    .filter(|word| !word.is_empty())
                    .map(str::to_lowercase)
                    .collect::<Vec<_>>()
            })
            .collect();
        tokens.iter().any(|token| haystack.contains(token))
    }
}

/// Number of resources filed under a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectCount {
    pub subject: String,
    pub count: u64,
}

/// Summary of a recent upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentUpload {
    pub title: String,
    pub subject: String,
    pub uploader_name: String,
    pub created_at: DateTime<Utc>,
}

/// Resource-side aggregates, before user counts are joined in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogueTotals {
    pub total_resources: u64,
    pub total_downloads: u64,
    pub top_subjects: Vec<SubjectCount>,
    pub recent_uploads: Vec<RecentUpload>,
}

/// Aggregate figures across the whole catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceStats {
    pub total_resources: u64,
    pub total_users: u64,
    pub total_downloads: u64,
    /// At most [`TOP_SUBJECTS_LIMIT`] entries, most resources first, ties by
    /// subject name.
    pub top_subjects: Vec<SubjectCount>,
    /// At most [`RECENT_UPLOADS_LIMIT`] entries, newest first.
    pub recent_uploads: Vec<RecentUpload>,
}

impl ResourceStats {
    /// Combine resource aggregates with the registered user count.
    #[must_use]
    pub fn new(totals: CatalogueTotals, total_users: u64) -> Self {
        Self {
            total_resources: totals.total_resources,
            total_users,
            total_downloads: totals.total_downloads,
            top_subjects: totals.top_subjects,
            recent_uploads: totals.recent_uploads,
        }
    }
}

/// Order subject counts by count descending, then subject ascending, and
/// keep the first [`TOP_SUBJECTS_LIMIT`].
#[must_use]
pub fn rank_subjects(mut counts: Vec<SubjectCount>) -> Vec<SubjectCount> {
    counts.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.subject.cmp(&b.subject))
    });
    counts.truncate(TOP_SUBJECTS_LIMIT);
    counts
}

/// Distinct values present across all resources, ready for filter menus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterValues {
    /// Ascending.
    pub subjects: Vec<String>,
    /// Numeric years descending, then any non-numeric values ascending.
    pub years: Vec<String>,
    /// Ascending.
    pub colleges: Vec<String>,
    /// Ascending by label.
    pub types: Vec<String>,
}

impl FilterValues {
    /// Sort and de-duplicate raw values.
    #[must_use]
    pub fn from_unsorted(
        subjects: Vec<String>,
        years: Vec<String>,
        colleges: Vec<String>,
        types: Vec<String>,
    ) -> Self {
        let mut years = years;
        years.sort_by(|a, b| compare_years(a, b));
        years.dedup();
        Self {
            subjects: sorted_unique(subjects),
            years,
            colleges: sorted_unique(colleges),
            types: sorted_unique(types),
        }
    }
}

fn sorted_unique(mut values: Vec<String>) -> Vec<String> {
    values.sort();
    values.dedup();
    values
}

/// Year ordering: integers descending first, then other text ascending.
///
/// # Examples
/// ```
/// use synapse::domain::compare_years;
///
/// let mut years = vec!["2021", "2024", "9", "2023"];
/// years.sort_by(|a, b| compare_years(a, b));
/// assert_eq!(years, ["2024", "2023", "2021", "9"]);
/// ```
#[must_use]
pub fn compare_years(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<i64>(), b.trim().parse::<i64>()) {
        (Ok(x), Ok(y)) => y.cmp(&x).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests;
