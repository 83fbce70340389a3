use std::path::{Path, PathBuf};

use futures::{stream::BoxStream, StreamExt};
use tokio::io::AsyncWriteExt;

use crate::{
    api::{ByteStream, DocumentClient},
    domain::{AppError, FetchOutcome, TransferProgress},
};

#[derive(Debug, Clone)]
pub enum FetchEvent {
    Progress(TransferProgress),
    Completed(FetchOutcome),
    Failed(AppError),
}

#[derive(Clone, Default)]
pub struct Fetcher {
    client: DocumentClient,
}

impl Fetcher {
    /// Creates the download directory; an existing directory is fine.
    pub async fn prepare_destination(dir: &Path) -> Result<(), AppError> {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            AppError::Io(format!(
                "Failed to create directory {}: {}",
                dir.display(),
                e
            ))
        })
    }

    /// Downloads `source` to `destination`, calling `on_progress` for every chunk.
    pub async fn fetch<F>(
        &self,
        source: &str,
        destination: &Path,
        mut on_progress: F,
    ) -> Result<FetchOutcome, AppError>
    where
        F: FnMut(TransferProgress),
    {
        let mut events = self.fetch_stream(source.to_string(), destination.to_path_buf());

        while let Some(event) = events.next().await {
            match event {
                FetchEvent::Progress(progress) => on_progress(progress),
                FetchEvent::Completed(outcome) => return Ok(outcome),
                FetchEvent::Failed(err) => return Err(err),
            }
        }

        Err(AppError::Transfer("Download ended unexpectedly".to_string()))
    }

    /// Event stream for a single transfer attempt.
    ///
    /// Bytes go to a sibling `.part` file that is renamed onto `destination`
    /// only once the body has been fully written and synced; on failure the
    /// partial file is removed. The last event is always `Completed` or `Failed`.
    pub fn fetch_stream(
        &self,
        url: String,
        destination: PathBuf,
    ) -> BoxStream<'static, FetchEvent> {
        futures::stream::unfold(
            FetchRuntimeState::Start {
                client: self.client.clone(),
                url,
                destination,
            },
            |state| async move {
                match state {
                    FetchRuntimeState::Start {
                        client,
                        url,
                        destination,
                    } => {
                        if let Some(parent) = destination.parent() {
                            if let Err(e) = Self::prepare_destination(parent).await {
                                return Some((FetchEvent::Failed(e), FetchRuntimeState::Finished));
                            }
                        }

                        let (status, total_size, stream) = match client.open_stream(&url).await {
                            Ok(opened) => opened,
                            Err(e) => {
                                tracing::warn!("Request for {} failed: {}", url, e);
                                return Some((
                                    FetchEvent::Failed(e.into()),
                                    FetchRuntimeState::Finished,
                                ));
                            }
                        };

                        let part_path = part_path_for(&destination);
                        let file = match tokio::fs::File::create(&part_path).await {
                            Ok(file) => file,
                            Err(e) => {
                                return Some((
                                    FetchEvent::Failed(AppError::Io(format!(
                                        "Failed to create file: {}",
                                        e
                                    ))),
                                    FetchRuntimeState::Finished,
                                ));
                            }
                        };

                        let total = total_size.unwrap_or(0);
                        tracing::debug!(status, total, "Transfer started");

                        Some((
                            FetchEvent::Progress(TransferProgress::new(0, total)),
                            FetchRuntimeState::Downloading {
                                file,
                                stream,
                                written: 0,
                                total,
                                status,
                                part_path,
                                destination,
                            },
                        ))
                    }
                    FetchRuntimeState::Downloading {
                        mut file,
                        mut stream,
                        mut written,
                        total,
                        status,
                        part_path,
                        destination,
                    } => match stream.next().await {
                        Some(Ok(chunk)) => {
                            if let Err(e) = file.write_all(&chunk).await {
                                drop(file);
                                discard_partial(&part_path).await;
                                return Some((
                                    FetchEvent::Failed(AppError::Io(format!(
                                        "Write error: {}",
                                        e
                                    ))),
                                    FetchRuntimeState::Finished,
                                ));
                            }

                            written += chunk.len() as u64;

                            Some((
                                FetchEvent::Progress(TransferProgress::new(written, total)),
                                FetchRuntimeState::Downloading {
                                    file,
                                    stream,
                                    written,
                                    total,
                                    status,
                                    part_path,
                                    destination,
                                },
                            ))
                        }
                        Some(Err(e)) => {
                            drop(file);
                            discard_partial(&part_path).await;
                            Some((FetchEvent::Failed(e.into()), FetchRuntimeState::Finished))
                        }
                        None => {
                            let finished = async {
                                file.sync_all().await.map_err(|e| {
                                    AppError::Io(format!("Failed to sync file: {}", e))
                                })?;
                                drop(file);
                                tokio::fs::rename(&part_path, &destination).await.map_err(|e| {
                                    AppError::Io(format!("Failed to move file into place: {}", e))
                                })
                            };

                            match finished.await {
                                Ok(()) => Some((
                                    FetchEvent::Completed(FetchOutcome {
                                        final_path: destination,
                                        status_code: status,
                                    }),
                                    FetchRuntimeState::Finished,
                                )),
                                Err(e) => {
                                    discard_partial(&part_path).await;
                                    Some((FetchEvent::Failed(e), FetchRuntimeState::Finished))
                                }
                            }
                        }
                    },
                    FetchRuntimeState::Finished => None,
                }
            },
        )
        .boxed()
    }
}

enum FetchRuntimeState {
    Start {
        client: DocumentClient,
        url: String,
        destination: PathBuf,
    },
    Downloading {
        file: tokio::fs::File,
        stream: ByteStream,
        written: u64,
        total: u64,
        status: u16,
        part_path: PathBuf,
        destination: PathBuf,
    },
    Finished,
}

fn part_path_for(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    destination.with_file_name(name)
}

async fn discard_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::debug!("Could not remove partial file {}: {}", path.display(), e);
    }
}
