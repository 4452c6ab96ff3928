// Local directory source for offline work with downloaded exports
use crate::application::measurement_source::MeasurementSource;
use crate::domain::error::{DashboardError, DashboardResult};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone)]
pub struct LocalDirectorySource {
    directory: PathBuf,
}

impl LocalDirectorySource {
    pub fn new(directory: PathBuf) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl MeasurementSource for LocalDirectorySource {
    async fn fetch(&self, file_name: &str) -> DashboardResult<String> {
        // only plain file names, never paths out of the directory
        let mut components = Path::new(file_name).components();
        if !matches!((components.next(), components.next()), (Some(Component::Normal(_)), None)) {
            return Err(DashboardError::source_unavailable(
                file_name,
                "not a plain file name",
            ));
        }

        let path = self.directory.join(file_name);
        tokio::fs::read_to_string(&path).await.map_err(|e| {
            DashboardError::source_unavailable(file_name, format!("{}: {}", path.display(), e))
        })
    }

    fn describe(&self) -> String {
        self.directory.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_file_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("V1_data.csv"), "\ta\n0\t1\n").unwrap();

        let source = LocalDirectorySource::new(dir.path().to_path_buf());
        assert_eq!(source.fetch("V1_data.csv").await.unwrap(), "\ta\n0\t1\n");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalDirectorySource::new(dir.path().to_path_buf());
        let err = source.fetch("V2_data.csv").await.unwrap_err();
        assert!(matches!(err, DashboardError::SourceUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_rejects_paths() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalDirectorySource::new(dir.path().to_path_buf());
        for name in ["../secret.csv", "nested/V1_data.csv", "/etc/passwd", ""] {
            let err = source.fetch(name).await.unwrap_err();
            assert!(err.to_string().contains("not a plain file name"), "{}", name);
        }
    }
}
