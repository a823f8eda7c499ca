//! Diesel table definitions. Must match `backend/migrations` exactly.

diesel::table! {
    /// Registered accounts. `email` is stored lower-cased and is unique.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        email -> Varchar,
        password_hash -> Varchar,
        college -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Uploaded documents. `download_count` only ever grows.
    resources (id) {
        id -> Uuid,
        title -> Varchar,
        subject -> Varchar,
        year -> Varchar,
        college -> Varchar,
        resource_type -> Varchar,
        description -> Text,
        file_name -> Varchar,
        stored_name -> Varchar,
        file_size -> Int8,
        uploaded_by -> Uuid,
        uploader_name -> Varchar,
        download_count -> Int8,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(resources -> users (uploaded_by));
diesel::allow_tables_to_appear_in_same_query!(resources, users);
