//! PostgreSQL-backed [`ResourceRepository`].
//!
//! Listing filters are expressed in SQL: exact matches on subject, year,
//! college and type, plus a `simple` full-text match over title, subject and
//! college where any search token may match. Download counting is a single
//! `UPDATE ... RETURNING` so concurrent increments are never lost.

use async_trait::async_trait;
use diesel::dsl::{count_star, sql};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Bool, Text};
use diesel_async::RunQueryDsl;
use pagination::{PageRequest, Paginated};

use crate::domain::ports::{ResourcePersistenceError, ResourceRepository};
use crate::domain::{
    CatalogueTotals, FilterValues, MetadataDraft, NewResource, RECENT_UPLOADS_LIMIT, RecentUpload,
    Resource, ResourceFilter, ResourceId, ResourceMetadata, StoredFile, SubjectCount, UserId,
    rank_subjects,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewResourceRow, RecentUploadRow, ResourceRow};
use super::pool::{DbPool, PoolError};
use super::schema::resources;

/// Diesel implementation of the resource port.
#[derive(Clone)]
pub struct DieselResourceRepository {
    pool: DbPool,
}

impl DieselResourceRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> ResourcePersistenceError {
    map_pool_error(error, ResourcePersistenceError::connection)
}

fn diesel_error(error: diesel::result::Error) -> ResourcePersistenceError {
    map_diesel_error(
        error,
        ResourcePersistenceError::query,
        ResourcePersistenceError::connection,
    )
}

fn non_negative(value: i64, column: &str) -> Result<u64, ResourcePersistenceError> {
    u64::try_from(value)
        .map_err(|_| ResourcePersistenceError::query(format!("negative {column} in database")))
}

fn row_to_resource(row: ResourceRow) -> Result<Resource, ResourcePersistenceError> {
    let metadata = ResourceMetadata::try_from(MetadataDraft {
        title: Some(row.title),
        subject: Some(row.subject),
        year: Some(row.year),
        college: Some(row.college),
        resource_type: Some(row.resource_type),
        description: Some(row.description),
    })
    .map_err(|err| ResourcePersistenceError::query(format!("invalid stored resource: {err}")))?;

    Ok(Resource {
        id: ResourceId::from_uuid(row.id),
        metadata,
        file: StoredFile {
            original_name: row.file_name,
            stored_name: row.stored_name,
            size: non_negative(row.file_size, "file_size")?,
        },
        uploaded_by: UserId::from_uuid(row.uploaded_by),
        uploader_name: row.uploader_name,
        download_count: non_negative(row.download_count, "download_count")?,
        created_at: row.created_at,
    })
}

/// `to_tsquery` operand matching any of `tokens`. Tokens are alphanumeric,
/// so no escaping is required.
fn any_token_query(tokens: &[String]) -> String {
    tokens.join(" | ")
}

fn filtered(filter: &ResourceFilter) -> resources::BoxedQuery<'static, Pg> {
    let mut query = resources::table.into_boxed();
    if let Some(subject) = &filter.subject {
        query = query.filter(resources::subject.eq(subject.clone()));
    }
    if let Some(year) = &filter.year {
        query = query.filter(resources::year.eq(year.clone()));
    }
    if let Some(college) = &filter.college {
        query = query.filter(resources::college.eq(college.clone()));
    }
    if let Some(kind) = &filter.resource_type {
        query = query.filter(resources::resource_type.eq(kind.clone()));
    }
    if filter.search.is_some() {
        let tokens = filter.search_tokens();
        if tokens.is_empty() {
            query = query.filter(sql::<Bool>("FALSE"));
        } else {
            query = query.filter(
                sql::<Bool>(
                    "to_tsvector('simple', title || ' ' || subject || ' ' || college) \
                     @@ to_tsquery('simple', ",
                )
                .bind::<Text, _>(any_token_query(&tokens))
                .sql(")"),
            );
        }
    }
    query
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl ResourceRepository for DieselResourceRepository {
    async fn insert(&self, resource: &NewResource) -> Result<Resource, ResourcePersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let metadata = &resource.metadata;
        let row = NewResourceRow {
            id: *resource.id.as_uuid(),
            title: metadata.title(),
            subject: metadata.subject(),
            year: metadata.year(),
            college: metadata.college(),
            resource_type: metadata.resource_type().as_str(),
            description: metadata.description(),
            file_name: &resource.file.original_name,
            stored_name: &resource.file.stored_name,
            file_size: to_i64(resource.file.size),
            uploaded_by: *resource.uploaded_by.as_uuid(),
            uploader_name: resource.uploader_name.as_str(),
            created_at: resource.created_at,
        };

        let stored: ResourceRow = diesel::insert_into(resources::table)
            .values(&row)
            .returning(ResourceRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;

        row_to_resource(stored)
    }

    async fn find_by_id(
        &self,
        id: &ResourceId,
    ) -> Result<Option<Resource>, ResourcePersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row: Option<ResourceRow> = resources::table
            .find(id.as_uuid())
            .select(ResourceRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.map(row_to_resource).transpose()
    }

    async fn list(
        &self,
        filter: &ResourceFilter,
        page: PageRequest,
    ) -> Result<Paginated<Resource>, ResourcePersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let total: i64 = filtered(filter)
            .select(count_star())
            .first(&mut conn)
            .await
            .map_err(diesel_error)?;

        let rows: Vec<ResourceRow> = filtered(filter)
            .order((resources::created_at.desc(), resources::id.desc()))
            .limit(i64::from(page.limit()))
            .offset(to_i64(page.offset()))
            .select(ResourceRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;

        let items = rows
            .into_iter()
            .map(row_to_resource)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Paginated::new(items, page, non_negative(total, "count")?))
    }

    async fn increment_downloads(
        &self,
        id: &ResourceId,
    ) -> Result<Option<Resource>, ResourcePersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row: Option<ResourceRow> = diesel::update(resources::table.find(id.as_uuid()))
            .set(resources::download_count.eq(resources::download_count + 1))
            .returning(ResourceRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.map(row_to_resource).transpose()
    }

    async fn totals(&self) -> Result<CatalogueTotals, ResourcePersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let total_resources: i64 = resources::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;

        let total_downloads: i64 = resources::table
            .select(sql::<BigInt>("COALESCE(SUM(download_count), 0)::bigint"))
            .first(&mut conn)
            .await
            .map_err(diesel_error)?;

        let grouped: Vec<(String, i64)> = resources::table
            .group_by(resources::subject)
            .select((resources::subject, count_star()))
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;

        let recent: Vec<RecentUploadRow> = resources::table
            .order((resources::created_at.desc(), resources::id.desc()))
            .limit(to_i64(RECENT_UPLOADS_LIMIT as u64))
            .select(RecentUploadRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;

        let subject_counts = grouped
            .into_iter()
            .map(|(subject, count)| {
                Ok(SubjectCount {
                    subject,
                    count: non_negative(count, "count")?,
                })
            })
            .collect::<Result<Vec<_>, ResourcePersistenceError>>()?;

        Ok(CatalogueTotals {
            total_resources: non_negative(total_resources, "count")?,
            total_downloads: non_negative(total_downloads, "download_count")?,
            top_subjects: rank_subjects(subject_counts),
            recent_uploads: recent
                .into_iter()
                .map(|row| RecentUpload {
                    title: row.title,
                    subject: row.subject,
                    uploader_name: row.uploader_name,
                    created_at: row.created_at,
                })
                .collect(),
        })
    }

    async fn filter_values(&self) -> Result<FilterValues, ResourcePersistenceError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let subjects: Vec<String> = resources::table
            .select(resources::subject)
            .distinct()
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        let years: Vec<String> = resources::table
            .select(resources::year)
            .distinct()
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        let colleges: Vec<String> = resources::table
            .select(resources::college)
            .distinct()
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        let types: Vec<String> = resources::table
            .select(resources::resource_type)
            .distinct()
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;

        Ok(FilterValues::from_unsorted(subjects, years, colleges, types))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResourceType;
    use crate::test_support::fixture_timestamp;
    use diesel::debug_query;
    use rstest::rstest;
    use uuid::Uuid;

    fn row() -> ResourceRow {
        ResourceRow {
            id: Uuid::new_v4(),
            title: "Quantum Midterm".to_owned(),
            subject: "Physics".to_owned(),
            year: "2024".to_owned(),
            college: "MIT".to_owned(),
            resource_type: "Question Paper".to_owned(),
            description: String::new(),
            file_name: "midterm.pdf".to_owned(),
            stored_name: "file-1-1.pdf".to_owned(),
            file_size: 2048,
            uploaded_by: Uuid::new_v4(),
            uploader_name: "Ada".to_owned(),
            download_count: 3,
            created_at: fixture_timestamp(),
        }
    }

    fn rendered(filter: &ResourceFilter) -> String {
        debug_query::<Pg, _>(&filtered(filter).select(resources::id)).to_string()
    }

    #[rstest]
    fn rows_convert_to_resources() {
        let resource = row_to_resource(row()).expect("valid row");
        assert_eq!(resource.metadata.resource_type(), ResourceType::QuestionPaper);
        assert_eq!(resource.file.size, 2048);
        assert_eq!(resource.download_count, 3);
        assert_eq!(resource.uploader_name, "Ada");
    }

    #[rstest]
    #[case(ResourceRow { resource_type: "Poster".to_owned(), ..row() })]
    #[case(ResourceRow { download_count: -1, ..row() })]
    #[case(ResourceRow { file_size: -5, ..row() })]
    fn corrupt_rows_are_query_errors(#[case] row: ResourceRow) {
        assert!(matches!(
            row_to_resource(row),
            Err(ResourcePersistenceError::Query { .. })
        ));
    }

    #[rstest]
    fn search_tokens_are_or_joined() {
        let tokens = vec!["quantum".to_owned(), "mit".to_owned()];
        assert_eq!(any_token_query(&tokens), "quantum | mit");
    }

    #[rstest]
    fn unfiltered_query_has_no_where_clause() {
        assert!(!rendered(&ResourceFilter::default()).contains("WHERE"));
    }

    #[rstest]
    fn exact_filters_and_search_reach_sql() {
        let filter = ResourceFilter {
            search: Some("Quantum, MIT!".to_owned()),
            subject: Some("Physics".to_owned()),
            resource_type: Some("Notes".to_owned()),
            ..ResourceFilter::default()
        };
        let sql = rendered(&filter);
        assert!(sql.contains("\"resources\".\"subject\" = $1"), "{sql}");
        assert!(sql.contains("\"resources\".\"resource_type\" = $2"), "{sql}");
        assert!(sql.contains("to_tsquery('simple', $3)"), "{sql}");
        assert!(sql.contains("quantum | mit"), "{sql}");
    }

    #[rstest]
    fn search_without_tokens_matches_nothing() {
        let filter = ResourceFilter {
            search: Some("!!!".to_owned()),
            ..ResourceFilter::default()
        };
        assert!(rendered(&filter).contains("FALSE"));
    }
}
