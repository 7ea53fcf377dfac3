// src/pipeline/publish.rs

//! Feed publishing: local write, then the environment-gated remote upload.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::Result;
use crate::models::{Config, Environment, Publication, RemoteConfig, RemoteStatus};
use crate::storage::{FEED_CONTENT_TYPE, RemoteSink, Upload, write_feed};

/// Writes the rendered feed and mirrors it to the remote sink.
pub struct Publisher {
    environment: Environment,
    output_path: PathBuf,
    file_name: String,
    remote: RemoteConfig,
    sink: Option<Arc<dyn RemoteSink>>,
}

impl Publisher {
    pub fn new(config: &Config, sink: Option<Arc<dyn RemoteSink>>) -> Result<Self> {
        Ok(Self {
            environment: config.environment,
            output_path: config.feed.output_path.clone(),
            file_name: config.feed.file_name()?,
            remote: config.remote.clone(),
            sink,
        })
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Publish the document.
    ///
    /// A local write failure aborts. A remote failure is reported in the
    /// returned [`Publication`] and leaves the local file in place.
    pub async fn publish(&self, bytes: Vec<u8>) -> Result<Publication> {
        write_feed(&self.output_path, &bytes).await?;
        let size = bytes.len();
        let remote = self.upload(bytes).await;

        Ok(Publication {
            local_path: self.output_path.clone(),
            bytes: size,
            remote,
        })
    }

    async fn upload(&self, bytes: Vec<u8>) -> RemoteStatus {
        if !self.remote.enabled {
            return RemoteStatus::Disabled;
        }
        if !self.environment.is_production() {
            log::warn!(
                "Skipping remote upload in {} environment",
                self.environment
            );
            return RemoteStatus::Skipped {
                reason: format!("{} environment", self.environment),
            };
        }
        let Some(sink) = &self.sink else {
            log::warn!("Remote upload enabled but no sink is available");
            return RemoteStatus::Skipped {
                reason: "no remote sink available".to_string(),
            };
        };

        let upload = Upload {
            key: self.remote.object_key(&self.file_name),
            body: bytes,
            content_type: FEED_CONTENT_TYPE,
            public_read: true,
        };
        match sink.put_object(upload).await {
            Ok(location) => RemoteStatus::Uploaded { location },
            Err(e) => {
                log::error!("Remote upload failed: {}", e);
                RemoteStatus::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::AppError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Sink that records uploads in memory.
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub uploads: Mutex<Vec<Upload>>,
    }

    #[async_trait]
    impl RemoteSink for RecordingSink {
        async fn put_object(&self, upload: Upload) -> Result<String> {
            let location = format!("memory://{}", upload.key);
            self.uploads.lock().unwrap().push(upload);
            Ok(location)
        }
    }

    /// Sink that always fails.
    pub(crate) struct FailingSink;

    #[async_trait]
    impl RemoteSink for FailingSink {
        async fn put_object(&self, _upload: Upload) -> Result<String> {
            Err(AppError::remote("access denied"))
        }
    }

    fn config(tmp: &TempDir, environment: Environment, enabled: bool) -> Config {
        let mut config = Config {
            environment,
            ..Config::default()
        };
        config.feed.output_path = tmp.path().join("out").join("evening_talks.xml");
        config.remote.enabled = enabled;
        config.remote.bucket = "feeds".into();
        config.remote.prefix = "podcasts".into();
        config
    }

    #[tokio::test]
    async fn test_production_uploads_with_key_and_acl() {
        let tmp = TempDir::new().unwrap();
        let sink = Arc::new(RecordingSink::default());
        let publisher = Publisher::new(
            &config(&tmp, Environment::Production, true),
            Some(sink.clone()),
        )
        .unwrap();

        let publication = publisher.publish(b"<rss/>".to_vec()).await.unwrap();

        assert_eq!(
            publication.remote,
            RemoteStatus::Uploaded {
                location: "memory://podcasts/evening_talks.xml".into()
            }
        );
        assert_eq!(publication.bytes, 6);
        let uploads = sink.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].key, "podcasts/evening_talks.xml");
        assert_eq!(uploads[0].content_type, "application/xml");
        assert!(uploads[0].public_read);
        assert_eq!(uploads[0].body, b"<rss/>");
        assert_eq!(
            std::fs::read(publisher.output_path()).unwrap(),
            b"<rss/>".to_vec()
        );
    }

    #[tokio::test]
    async fn test_development_skips_upload() {
        let tmp = TempDir::new().unwrap();
        let sink = Arc::new(RecordingSink::default());
        let publisher = Publisher::new(
            &config(&tmp, Environment::Development, true),
            Some(sink.clone()),
        )
        .unwrap();

        let publication = publisher.publish(b"<rss/>".to_vec()).await.unwrap();

        assert!(matches!(publication.remote, RemoteStatus::Skipped { .. }));
        assert!(sink.uploads.lock().unwrap().is_empty());
        assert!(publisher.output_path().exists());
    }

    #[tokio::test]
    async fn test_disabled_remote() {
        let tmp = TempDir::new().unwrap();
        let publisher =
            Publisher::new(&config(&tmp, Environment::Production, false), None).unwrap();

        let publication = publisher.publish(b"<rss/>".to_vec()).await.unwrap();
        assert_eq!(publication.remote, RemoteStatus::Disabled);
    }

    #[tokio::test]
    async fn test_enabled_without_sink_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let publisher =
            Publisher::new(&config(&tmp, Environment::Production, true), None).unwrap();

        let publication = publisher.publish(b"<rss/>".to_vec()).await.unwrap();
        assert!(matches!(publication.remote, RemoteStatus::Skipped { .. }));
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_local_file() {
        let tmp = TempDir::new().unwrap();
        let publisher = Publisher::new(
            &config(&tmp, Environment::Production, true),
            Some(Arc::new(FailingSink)),
        )
        .unwrap();

        let publication = publisher.publish(b"<rss/>".to_vec()).await.unwrap();

        match publication.remote {
            RemoteStatus::Failed { error } => assert!(error.contains("access denied")),
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(
            std::fs::read(publisher.output_path()).unwrap(),
            b"<rss/>".to_vec()
        );
    }

    #[tokio::test]
    async fn test_overwrites_previous_feed() {
        let tmp = TempDir::new().unwrap();
        let publisher =
            Publisher::new(&config(&tmp, Environment::Test, false), None).unwrap();

        publisher.publish(b"old".to_vec()).await.unwrap();
        publisher.publish(b"new".to_vec()).await.unwrap();

        assert_eq!(std::fs::read(publisher.output_path()).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_local_write_failure_aborts() {
        let tmp = TempDir::new().unwrap();
        // A regular file where the output directory should be
        std::fs::write(tmp.path().join("out"), b"blocker").unwrap();
        let sink = Arc::new(RecordingSink::default());
        let publisher = Publisher::new(
            &config(&tmp, Environment::Production, true),
            Some(sink.clone()),
        )
        .unwrap();

        let err = publisher.publish(b"<rss/>".to_vec()).await.unwrap_err();
        assert!(matches!(err, AppError::LocalWrite { .. }));
        assert!(sink.uploads.lock().unwrap().is_empty());
    }
}
