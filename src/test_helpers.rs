//! Fakes and utilities for testing the pipeline and the macro
use crate::connections::ConnectionDescriptor;
use crate::service::{BulkUploader, ConnectionCatalog, ProjectProvisioner};
use crate::transfer::Transfer;
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use httptest::{matchers::*, responders::*, Expectation};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

const PLAINTEXT_BODY: &[u8] = b"hello, world";

const GZIPPED_BODY: &[u8] = &[
    31u8, 139, 8, 0, 0, 0, 0, 0, 0, 255, 203, 72, 205, 201, 201, 215, 81, 40, 207, 47, 202, 73, 1,
    0, 58, 114, 171, 255, 12, 0, 0, 0,
];

/// Event logger, used to log events from various places and then assert on them.
#[derive(Default, Clone)]
pub(crate) struct Logger {
    logged: Arc<Mutex<Vec<String>>>,
}

impl Logger {
    pub(crate) fn log<S: Into<String>>(&self, message: S) {
        self.logged.lock().unwrap().push(message.into())
    }

    pub(crate) fn assert(&self, expected: Vec<String>) {
        assert_eq!(*self.logged.lock().unwrap(), expected);
    }
}

/// List a directory as `name=size` entries, sorted and comma-separated.
pub(crate) fn describe_dir(dir: &Path) -> Result<String> {
    let mut entries = vec![];
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        entries.push(format!(
            "{}={}",
            entry.file_name().to_string_lossy(),
            entry.metadata()?.len()
        ));
    }
    entries.sort();
    Ok(entries.join(","))
}

/// Fake transfer serving fixed bodies by URL; any other URL fails as if it were a 404.
pub(crate) struct FakeTransfer {
    logger: Logger,
    bodies: HashMap<String, Vec<u8>>,
}

impl FakeTransfer {
    pub(crate) fn new(logger: Logger) -> Self {
        Self {
            logger,
            bodies: HashMap::new(),
        }
    }

    pub(crate) fn serve(mut self, url: &str, body: &[u8]) -> Self {
        self.bodies.insert(url.to_owned(), body.to_vec());
        self
    }
}

#[async_trait]
impl Transfer for FakeTransfer {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<()> {
        let name = destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.logger.log(format!("fetch {} {}", url, name));
        let body = self
            .bodies
            .get(url)
            .ok_or_else(|| anyhow!("404 Not Found: {}", url))?;
        tokio::fs::write(destination, body).await?;
        Ok(())
    }
}

/// Fake uploader that records the directory contents it was asked to upload.
#[derive(Clone)]
pub(crate) struct FakeUploader {
    logger: Logger,
    uploads: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl FakeUploader {
    pub(crate) fn new(logger: Logger) -> Self {
        Self {
            logger,
            uploads: Arc::new(Mutex::new(vec![])),
            fail: false,
        }
    }

    pub(crate) fn failing(logger: Logger) -> Self {
        Self {
            fail: true,
            ..Self::new(logger)
        }
    }

    /// The directory listings seen by each upload call.
    pub(crate) fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl BulkUploader for FakeUploader {
    async fn upload_directory(&self, source: &Path) -> Result<()> {
        let listing = describe_dir(source)?;
        self.logger.log(format!("upload {}", listing));
        self.uploads.lock().unwrap().push(listing);
        if self.fail {
            bail!("managed folder is read-only");
        }
        Ok(())
    }
}

/// Fake platform provisioner, logging each call.
pub(crate) struct FakeProvisioner {
    pub(crate) logger: Logger,
    pub(crate) user: String,
    pub(crate) existing_keys: Vec<String>,
    pub(crate) uploader: FakeUploader,
    pub(crate) fail_create: bool,
    pub(crate) fail_list: bool,
}

impl FakeProvisioner {
    pub(crate) fn new(logger: Logger) -> Self {
        Self {
            uploader: FakeUploader::new(logger.clone()),
            logger,
            user: "alice".to_owned(),
            existing_keys: vec![],
            fail_create: false,
            fail_list: false,
        }
    }
}

#[async_trait]
impl ProjectProvisioner for FakeProvisioner {
    async fn current_user(&self) -> Result<String> {
        Ok(self.user.clone())
    }

    async fn list_project_keys(&self) -> Result<Vec<String>> {
        if self.fail_list {
            bail!("project list unavailable");
        }
        Ok(self.existing_keys.clone())
    }

    async fn create_project(&self, key: &str, name: &str, owner: &str) -> Result<()> {
        self.logger
            .log(format!("create_project {} {:?} {}", key, name, owner));
        if self.fail_create {
            bail!("not allowed to create projects");
        }
        Ok(())
    }

    async fn move_to_folder(&self, key: &str, folder_id: &str) -> Result<()> {
        self.logger
            .log(format!("move_to_folder {} {}", key, folder_id));
        Ok(())
    }

    async fn create_managed_folder(
        &self,
        key: &str,
        folder_name: &str,
    ) -> Result<Box<dyn BulkUploader>> {
        self.logger
            .log(format!("create_managed_folder {} {}", key, folder_name));
        Ok(Box::new(self.uploader.clone()))
    }
}

/// Fake connection catalog over a fixed list of descriptors.
pub(crate) struct FakeCatalog {
    pub(crate) connections: Vec<ConnectionDescriptor>,
}

#[async_trait]
impl ConnectionCatalog for FakeCatalog {
    async fn list_connections(&self) -> Result<Vec<String>> {
        Ok(self.connections.iter().map(|c| c.name.clone()).collect())
    }

    async fn connection_settings(&self, name: &str) -> Result<ConnectionDescriptor> {
        self.connections
            .iter()
            .find(|c| c.name == name)
            .cloned()
            .ok_or_else(|| anyhow!("no such connection {}", name))
    }
}

/// A fake server of data blobs.  Serves b"hello, world" at `/data`.
pub(crate) struct FakeDataServer {
    server: httptest::Server,
}

impl FakeDataServer {
    /// Build an httptest::Server that responds with a sequence of responses.  For 200,
    /// the body is "hello, world".
    pub(crate) fn new(gzip_encoded: bool, responses: &[u16]) -> Self {
        let server = httptest::Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/data"))
                .times(..=responses.len())
                .respond_with(cycle(
                    responses
                        .iter()
                        .map(|response| {
                            let responder: Box<dyn Responder> = Box::new(if *response == 200 {
                                if gzip_encoded {
                                    status_code(200)
                                        .append_header("Content-Type", "text/plain")
                                        .append_header("Content-Encoding", "gzip")
                                        .body(GZIPPED_BODY)
                                } else {
                                    status_code(200)
                                        .append_header("Content-Type", "text/plain")
                                        .body(PLAINTEXT_BODY)
                                }
                            } else {
                                status_code(*response).body(&b""[..])
                            });
                            responder
                        })
                        .collect(),
                )),
        );
        Self { server }
    }

    pub(crate) fn data_url(&self) -> String {
        self.server.url_str("/data")
    }
}
