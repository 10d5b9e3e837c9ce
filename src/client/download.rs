//! Download orchestration: fetch, progress milestones, save and finalization.

use crate::error::{Result, SaveError};
use crate::progress::ProgressHandle;
use crate::types::{DownloadJob, Event, JobId, SavedFile, Variant};
use tokio::task::JoinHandle;

use super::AudioClient;

/// Final progress text of a successful download
pub(crate) const COMPLETE_TEXT: &str = "Download complete!";

impl AudioClient {
    /// Handle a click on one of the rendered download actions
    ///
    /// Starts an independent job for the action's [`DownloadJob`] and returns its handle.
    /// Clicks are not deduplicated: every call starts a new job. Returns `None` if no
    /// result has been rendered yet.
    pub fn click_download(&self, variant: Variant) -> Option<JoinHandle<Result<SavedFile>>> {
        let view = self.surface.result()?;
        let job = view.action(variant).job.clone();

        let client = self.clone();
        Some(self.jobs.spawn(async move { client.handle_download(job).await }))
    }

    /// Run one download end-to-end
    ///
    /// Opens a progress overlay, fetches the audio, saves it and reports the outcome. On
    /// success the overlay closes (followed by a success notification) after
    /// `overlay_close_delay`; on failure it closes immediately and an error notification
    /// is shown. The overlay is never left open.
    pub async fn handle_download(&self, job: DownloadJob) -> Result<SavedFile> {
        let id = self.next_job_id();
        tracing::info!(
            download_id = id.get(),
            variant = %job.variant,
            title = %job.title,
            endpoint = %job.endpoint,
            "starting download"
        );
        self.emit_event(Event::DownloadStarted {
            id,
            variant: job.variant,
            title: job.title.clone(),
        });

        let progress = self.progress.open(&job.title, job.variant);

        match self.run_download(id, &job, &progress).await {
            Ok(saved) => {
                tracing::info!(
                    download_id = id.get(),
                    location = %saved.location.display(),
                    bytes = saved.bytes,
                    "download complete"
                );

                let notifier = self.notifier.clone();
                let event_tx = self.event_tx.clone();
                let message = format!("{} download complete: \"{}\"", job.variant, job.title);
                self.scheduler
                    .schedule(self.config.timing.overlay_close_delay, move || {
                        progress.close();
                        notifier.success(message);
                        event_tx
                            .send(Event::DownloadComplete {
                                id,
                                variant: job.variant,
                                title: job.title,
                            })
                            .ok();
                    });

                Ok(saved)
            }
            Err(e) => {
                progress.close();
                tracing::error!(
                    download_id = id.get(),
                    variant = %job.variant,
                    error = %e,
                    code = e.error_code(),
                    "download failed"
                );
                self.notifier
                    .error(format!("Download failed ({}): {}", job.variant, e));
                self.emit_event(Event::DownloadFailed {
                    id,
                    variant: job.variant,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run_download(
        &self,
        id: JobId,
        job: &DownloadJob,
        progress: &ProgressHandle,
    ) -> Result<SavedFile> {
        self.report(id, progress, &format!("Preparing {} download...", job.variant), 10);

        let body = self.service.fetch_audio(&job.endpoint).await?;

        match job.variant {
            Variant::Enhanced => self.report(
                id,
                progress,
                "Processing audio (normalization, EQ, compression)...",
                50,
            ),
            Variant::Original => self.report(id, progress, "Downloading file...", 40),
        }

        let data = body.into_bytes().await?;
        self.report(id, progress, "Saving file...", 90);

        let saved = self.save_blob(data, &job.filename).await?;
        self.emit_event(Event::DownloadSaved {
            id,
            location: saved.location.clone(),
            bytes: saved.bytes,
        });

        self.report(id, progress, COMPLETE_TEXT, 100);
        Ok(saved)
    }

    /// Hand `data` to the save target through an object URL and a temporary save anchor
    ///
    /// Both are released `object_url_release_delay` after the save is triggered, whatever
    /// its outcome.
    async fn save_blob(&self, data: Vec<u8>, filename: &str) -> Result<SavedFile> {
        let object_url = self.surface.create_object_url(data);
        let anchor = self.surface.append_save_anchor(&object_url, filename);

        let blob = self
            .surface
            .resolve_object_url(object_url.as_str())
            .ok_or_else(|| SaveError::Released(object_url.as_str().to_string()))?;

        self.scheduler
            .schedule(self.config.timing.object_url_release_delay, move || {
                drop(anchor);
                drop(object_url);
            });

        self.saver.save(filename, &blob).await
    }

    fn report(&self, id: JobId, progress: &ProgressHandle, text: &str, percentage: u8) {
        progress.update(text, percentage);
        self.emit_event(Event::DownloadProgress {
            id,
            text: text.to_string(),
            percentage,
        });
    }
}
