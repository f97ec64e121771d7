// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export orchestrator — validates input, drives the chosen backend to
// completion, and delivers a deterministically named artifact. Each export
// notifies its caller of start, success, and failure; CPU-heavy rendering
// runs off the async scheduler. Concurrent exports share no mutable state.

use std::path::{Path, PathBuf};

use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info, instrument};

use vitawerk_core::config::AppConfig;
use vitawerk_core::error::{Result, VitawerkError};
use vitawerk_core::resume::{PersonalInfo, ResumeRecord, ResumeStore};
use vitawerk_core::types::{BackendKind, ExportEvent};
use vitawerk_layout::compose::compose;

use crate::backend::{RenderBackend, RenderOptions, RenderedDocument};
use crate::pdf::{RasterBackend, VectorBackend};
use crate::printview::PrintViewBackend;

/// The final exported output handed back to the caller.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub backend: BackendKind,
    pub document: RenderedDocument,
}

/// Deterministic artifact name: `{firstName}_{lastName}_Resume.<ext>`.
/// Blank name components collapse to empty segments, not errors.
pub fn artifact_file_name(info: &PersonalInfo, extension: &str) -> String {
    format!(
        "{}_{}_Resume.{}",
        info.first_name.trim(),
        info.last_name.trim(),
        extension
    )
}

fn backend_for(kind: BackendKind) -> Box<dyn RenderBackend> {
    match kind {
        BackendKind::Raster => Box::new(RasterBackend),
        BackendKind::Vector => Box::new(VectorBackend),
        BackendKind::PrintView => Box::new(PrintViewBackend),
    }
}

/// Drives exports. Cheap to construct; holds no state beyond configuration
/// and an optional progress channel.
pub struct Exporter {
    config: AppConfig,
    events: Option<UnboundedSender<ExportEvent>>,
}

impl Exporter {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            events: None,
        }
    }

    /// Attach a progress channel. Each export sends `Started` followed by
    /// exactly one of `Succeeded` or `Failed`.
    pub fn with_events(mut self, sender: UnboundedSender<ExportEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn emit(&self, event: ExportEvent) {
        if let Some(tx) = &self.events {
            // A dropped receiver must never fail an export.
            let _ = tx.send(event);
        }
    }

    /// Export with the configured default backend.
    pub async fn export_default(&self, record: &ResumeRecord) -> Result<ExportArtifact> {
        self.export(record, self.config.default_backend).await
    }

    /// Export `record` through `backend`.
    #[instrument(skip_all, fields(backend = ?backend))]
    pub async fn export(
        &self,
        record: &ResumeRecord,
        backend: BackendKind,
    ) -> Result<ExportArtifact> {
        self.emit(ExportEvent::Started { backend });
        match self.run(record, backend).await {
            Ok(artifact) => {
                info!(file = %artifact.file_name, "export complete");
                self.emit(ExportEvent::Succeeded {
                    file_name: artifact.file_name.clone(),
                });
                Ok(artifact)
            }
            Err(err) => {
                error!(error = %err, "export failed");
                self.emit(ExportEvent::Failed {
                    reason: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Export the store's current record; an empty store is the input error.
    pub async fn export_current(
        &self,
        store: &ResumeStore,
        backend: BackendKind,
    ) -> Result<ExportArtifact> {
        match store.record() {
            Some(record) => self.export(record, backend).await,
            None => {
                self.emit(ExportEvent::Started { backend });
                let err = VitawerkError::Input("no resume record loaded".into());
                self.emit(ExportEvent::Failed {
                    reason: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Export a PDF backend's artifact into `dir`, atomically.
    ///
    /// The bytes land in a temp file first and move into place on success,
    /// so a failed export never leaves a partial artifact behind. The
    /// print-view backend writes no file by design.
    pub async fn export_to_dir(
        &self,
        record: &ResumeRecord,
        backend: BackendKind,
        dir: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let artifact = self.export(record, backend).await?;
        let RenderedDocument::Pdf { bytes, .. } = &artifact.document else {
            return Err(VitawerkError::Input(
                "the print-view backend opens in a viewing context and writes no file".into(),
            ));
        };

        let path = dir.as_ref().join(&artifact.file_name);
        let mut tmp = tempfile::NamedTempFile::new_in(dir.as_ref())?;
        std::io::Write::write_all(&mut tmp, bytes)?;
        tmp.persist(&path)
            .map_err(|err| VitawerkError::Io(err.error))?;
        info!(path = %path.display(), "artifact written");
        Ok(path)
    }

    /// Compose → render → package, strictly in that order per invocation.
    async fn run(&self, record: &ResumeRecord, backend: BackendKind) -> Result<ExportArtifact> {
        let file_name = artifact_file_name(&record.personal_info, backend.extension());
        let opts = RenderOptions::from_config(&self.config);

        let document = match backend {
            // Markup serialisation is cheap; render inline.
            BackendKind::PrintView => {
                let tree = compose(record);
                backend_for(backend).render(record, &tree, &opts)?
            }
            // Snapshotting and PDF encoding are not.
            BackendKind::Raster | BackendKind::Vector => {
                let record = record.clone();
                tokio::task::spawn_blocking(move || {
                    let tree = compose(&record);
                    backend_for(backend).render(&record, &tree, &opts)
                })
                .await
                .map_err(|err| VitawerkError::Render(format!("render task failed: {err}")))??
            }
        };

        Ok(ExportArtifact {
            file_name,
            backend,
            document,
        })
    }
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("vitawerk=debug")
            .with_test_writer()
            .try_init();
    }

    fn ada() -> ResumeRecord {
        let mut record = ResumeRecord::new();
        record.personal_info.first_name = "Ada".into();
        record.personal_info.last_name = "Lovelace".into();
        record
    }

    #[test]
    fn artifact_names_collapse_blank_segments() {
        let mut info = PersonalInfo::default();
        assert_eq!(artifact_file_name(&info, "pdf"), "__Resume.pdf");
        info.first_name = "Ada".into();
        info.last_name = "Lovelace".into();
        assert_eq!(artifact_file_name(&info, "pdf"), "Ada_Lovelace_Resume.pdf");
        assert_eq!(artifact_file_name(&info, "html"), "Ada_Lovelace_Resume.html");
    }

    #[tokio::test]
    async fn name_only_record_exports_header_only_pdf() {
        init_tracing();
        let exporter = Exporter::new(AppConfig::default());
        let artifact = exporter.export(&ada(), BackendKind::Vector).await.unwrap();
        assert_eq!(artifact.file_name, "Ada_Lovelace_Resume.pdf");
        let RenderedDocument::Pdf { bytes, page_count } = &artifact.document else {
            panic!("vector export must produce a PDF");
        };
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(*page_count, 1);
    }

    #[tokio::test]
    async fn successful_export_signals_started_then_succeeded() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let exporter = Exporter::new(AppConfig::default()).with_events(tx);
        exporter.export(&ada(), BackendKind::Vector).await.unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            ExportEvent::Started {
                backend: BackendKind::Vector
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            ExportEvent::Succeeded {
                file_name: "Ada_Lovelace_Resume.pdf".into()
            }
        );
        assert!(rx.try_recv().is_err(), "exactly two events per export");
    }

    #[tokio::test]
    async fn empty_store_is_an_input_error() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let exporter = Exporter::new(AppConfig::default()).with_events(tx);
        let store = ResumeStore::new();

        let err = exporter
            .export_current(&store, BackendKind::Vector)
            .await
            .unwrap_err();
        assert!(matches!(err, VitawerkError::Input(_)));

        assert!(matches!(
            rx.try_recv().unwrap(),
            ExportEvent::Started { .. }
        ));
        assert!(matches!(rx.try_recv().unwrap(), ExportEvent::Failed { .. }));
    }

    #[tokio::test]
    async fn loaded_store_exports_normally() {
        let exporter = Exporter::new(AppConfig::default());
        let store = ResumeStore::open(ada());
        let artifact = exporter
            .export_current(&store, BackendKind::Vector)
            .await
            .unwrap();
        assert_eq!(artifact.file_name, "Ada_Lovelace_Resume.pdf");
    }

    #[tokio::test]
    async fn export_to_dir_writes_the_named_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(AppConfig::default());
        let path = exporter
            .export_to_dir(&ada(), BackendKind::Vector, dir.path())
            .await
            .unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "Ada_Lovelace_Resume.pdf"
        );
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn print_view_never_writes_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(AppConfig::default());
        let err = exporter
            .export_to_dir(&ada(), BackendKind::PrintView, dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, VitawerkError::Input(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn print_view_export_is_named_html() {
        let exporter = Exporter::new(AppConfig::default());
        let artifact = exporter
            .export(&ada(), BackendKind::PrintView)
            .await
            .unwrap();
        assert_eq!(artifact.file_name, "Ada_Lovelace_Resume.html");
        assert!(matches!(artifact.document, RenderedDocument::Html(_)));
    }

    #[tokio::test]
    async fn concurrent_exports_are_independent() {
        let exporter = Exporter::new(AppConfig::default());
        let record = ada();
        let (a, b) = tokio::join!(
            exporter.export(&record, BackendKind::Vector),
            exporter.export(&record, BackendKind::PrintView),
        );
        assert_eq!(a.unwrap().file_name, "Ada_Lovelace_Resume.pdf");
        assert_eq!(b.unwrap().file_name, "Ada_Lovelace_Resume.html");
    }
}
