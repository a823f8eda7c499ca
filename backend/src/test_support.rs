//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for `cfg(test)` and behind the `test-support` feature.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

/// Instant reported by [`FixtureClock::default`]: 2024-03-09T12:00:00Z.
pub fn fixture_timestamp() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).single() {
        Some(at) => at,
        None => panic!("fixture timestamp must be unambiguous"),
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl FixtureClock {
    /// Freeze the clock at `utc_now`.
    pub fn at(utc_now: DateTime<Utc>) -> Self {
        Self { utc_now }
    }
}

impl Default for FixtureClock {
    fn default() -> Self {
        Self::at(fixture_timestamp())
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// Clock that tests move forward explicitly.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    pub fn advance_days(&self, days: i64) {
        *self.lock_clock() += TimeDelta::days(days);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Default for MutableClock {
    fn default() -> Self {
        Self::new(fixture_timestamp())
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

pub mod cap_fs {
    //! Capability-safe filesystem helpers for tests.
    //!
    //! The backend forbids direct `std::fs` calls; these helpers go through
    //! `cap_std::fs::Dir` instead.

    use std::io;
    use std::path::Path;

    use cap_std::{ambient_authority, fs::Dir};

    /// Names of the regular files directly inside `directory`, sorted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use synapse::test_support::cap_fs::file_names;
    ///
    /// let scratch = tempfile::tempdir()?;
    /// assert!(file_names(scratch.path())?.is_empty());
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn file_names(directory: &Path) -> io::Result<Vec<String>> {
        let directory = Dir::open_ambient_dir(directory, ambient_authority())?;
        let mut names = Vec::new();
        for entry in directory.entries()? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Read a whole file inside `directory`.
    pub fn read_file(directory: &Path, name: &str) -> io::Result<Vec<u8>> {
        let directory = Dir::open_ambient_dir(directory, ambient_authority())?;
        directory.read(name)
    }

    /// Delete a file inside `directory`.
    pub fn remove_file(directory: &Path, name: &str) -> io::Result<()> {
        let directory = Dir::open_ambient_dir(directory, ambient_authority())?;
        directory.remove_file(name)
    }
}

pub mod http {
    //! In-memory application harness for HTTP tests.

    use std::path::Path;
    use std::sync::Arc;

    use actix_web::body::{BoxBody, EitherBody};
    use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
    use actix_web::{App, web};
    use mockable::Clock;
    use tempfile::TempDir;

    use super::FixtureClock;
    use crate::domain::UploadPolicy;
    use crate::inbound::http::health::HealthState;
    use crate::inbound::http::state::HttpState;
    use crate::outbound::security::SigningKey;
    use crate::server::{AppDependencies, StateDependencies, build_app, build_in_memory_state};

    /// bcrypt cost used by tests; the minimum the algorithm accepts.
    pub const TEST_BCRYPT_COST: u32 = 4;
    /// Signing key shared by every test application.
    pub const TEST_SIGNING_KEY: &[u8] = b"synapse-test-signing-key-0123456789";
    /// Origin allowed by the CORS layer of test applications.
    pub const TEST_FRONTEND_URL: &str = "http://localhost:3000";

    /// Application state backed by in-memory repositories and a temporary
    /// upload directory that is removed on drop.
    pub struct TestApp {
        http_state: web::Data<HttpState>,
        health_state: web::Data<HealthState>,
        upload_dir: TempDir,
    }

    impl TestApp {
        /// Default upload policy and a frozen clock.
        pub fn new() -> Self {
            Self::with_options(UploadPolicy::default(), Arc::new(FixtureClock::default()))
        }

        /// Custom upload policy and clock.
        pub fn with_options(policy: UploadPolicy, clock: Arc<dyn Clock>) -> Self {
            let upload_dir = match tempfile::tempdir() {
                Ok(dir) => dir,
                Err(err) => panic!("create upload dir: {err}"),
            };
            let state = build_in_memory_state(StateDependencies {
                signing_key: SigningKey::new(TEST_SIGNING_KEY.to_vec()),
                bcrypt_cost: TEST_BCRYPT_COST,
                upload_dir: upload_dir.path().to_path_buf(),
                upload_policy: policy,
                clock,
            });
            let http_state = match state {
                Ok(state) => web::Data::new(state),
                Err(err) => panic!("build in-memory state: {err}"),
            };
            let health_state = web::Data::new(HealthState::new());
            health_state.mark_ready();
            Self {
                http_state,
                health_state,
                upload_dir,
            }
        }

        /// Directory holding uploaded files.
        pub fn upload_dir(&self) -> &Path {
            self.upload_dir.path()
        }

        /// Shared HTTP state, for tests that inspect ports directly.
        pub fn http_state(&self) -> web::Data<HttpState> {
            self.http_state.clone()
        }

        /// Full application as served in production, minus the listener.
        pub fn app(
            &self,
        ) -> App<
            impl ServiceFactory<
                ServiceRequest,
                Config = (),
                Response = ServiceResponse<EitherBody<BoxBody>>,
                Error = actix_web::Error,
                InitError = (),
            > + use<>,
        > {
            build_app(AppDependencies {
                health_state: self.health_state.clone(),
                http_state: self.http_state.clone(),
                frontend_url: TEST_FRONTEND_URL.to_owned(),
            })
        }
    }

    impl Default for TestApp {
        fn default() -> Self {
            Self::new()
        }
    }

    /// Boundary used by [`MultipartForm`].
    pub const MULTIPART_BOUNDARY: &str = "synapse-test-boundary";

    /// Hand-built `multipart/form-data` body.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use synapse::test_support::http::MultipartForm;
    ///
    /// let form = MultipartForm::new()
    ///     .text("title", "Calculus notes")
    ///     .file("file", "notes.pdf", b"%PDF-1.4");
    /// assert!(form.content_type().starts_with("multipart/form-data"));
    /// ```
    #[derive(Debug, Clone, Default)]
    pub struct MultipartForm {
        body: Vec<u8>,
    }

    impl MultipartForm {
        pub fn new() -> Self {
            Self::default()
        }

        /// Append a text field.
        pub fn text(self, name: &str, value: &str) -> Self {
            self.text_bytes(name, value.as_bytes())
        }

        /// Append a text field from raw bytes, which need not be UTF-8.
        pub fn text_bytes(mut self, name: &str, value: &[u8]) -> Self {
            self.body.extend_from_slice(
                format!(
                    "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )
                .as_bytes(),
            );
            self.body.extend_from_slice(value);
            self.body.extend_from_slice(b"\r\n");
            self
        }

        /// Append a file part.
        pub fn file(mut self, name: &str, file_name: &str, content: &[u8]) -> Self {
            self.body.extend_from_slice(
                format!(
                    "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            self.body.extend_from_slice(content);
            self.body.extend_from_slice(b"\r\n");
            self
        }

        /// Value for the `Content-Type` request header.
        pub fn content_type(&self) -> String {
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}")
        }

        /// Body bytes including the closing boundary.
        pub fn into_body(mut self) -> Vec<u8> {
            self.body
                .extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
            self.body
        }
    }

    /// Form with every metadata field filled in and no file part.
    pub fn metadata_form(title: &str, subject: &str, year: &str) -> MultipartForm {
        MultipartForm::new()
            .text("title", title)
            .text("subject", subject)
            .text("year", year)
            .text("college", "MIT")
            .text("type", "Notes")
    }
}
