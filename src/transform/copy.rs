// src/transform/copy.rs

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::fs::FileSystem;
use crate::transform::{TransformJob, TransformOutput, Transformer};
use crate::types::BoxFuture;

/// Copies every input to `dest`, keeping its path relative to the glob base.
#[derive(Debug, Clone)]
pub struct CopyTransformer {
    fs: Arc<dyn FileSystem>,
}

impl CopyTransformer {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    fn copy_all(&self, job: &TransformJob) -> Result<TransformOutput> {
        let mut written = Vec::with_capacity(job.inputs.len());
        self.fs.create_dir_all(&job.dest)?;

        for input in &job.inputs {
            let target = job.dest.join(input.relative());
            debug!(task = %job.task, from = ?input.path, to = ?target, "copying");
            self.fs.copy(&input.path, &target)?;
            written.push(target);
        }

        Ok(TransformOutput { written })
    }
}

impl Transformer for CopyTransformer {
    fn transform<'a>(&'a self, job: &'a TransformJob) -> BoxFuture<'a, Result<TransformOutput>> {
        Box::pin(async move { self.copy_all(job) })
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::env::{BuildEnv, BuildVersion};
    use crate::fs::mock::MockFileSystem;
    use crate::watch::MatchedFile;

    #[tokio::test]
    async fn copies_inputs_preserving_subdirectories() {
        let fs = MockFileSystem::new();
        fs.add_file("/p/source/static/robots.txt", b"ok".to_vec());
        fs.add_file("/p/source/static/fonts/a.woff", b"font".to_vec());

        let job = TransformJob {
            task: "static".to_string(),
            inputs: vec![
                MatchedFile {
                    path: PathBuf::from("/p/source/static/robots.txt"),
                    base: PathBuf::from("/p/source/static"),
                },
                MatchedFile {
                    path: PathBuf::from("/p/source/static/fonts/a.woff"),
                    base: PathBuf::from("/p/source/static"),
                },
            ],
            dest: PathBuf::from("/p/dist"),
            params: toml::Table::new(),
            env: Arc::new(BuildEnv::new("/p", false, BuildVersion::fixed("v1"))),
        };

        let copier = CopyTransformer::new(Arc::new(fs.clone()));
        let out = copier.transform(&job).await.unwrap();

        assert_eq!(out.written.len(), 2);
        assert_eq!(fs.contents("/p/dist/robots.txt"), Some(b"ok".to_vec()));
        assert!(fs.is_file(Path::new("/p/dist/fonts/a.woff")));
    }
}
