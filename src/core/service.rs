use crate::core::decoder::{PortStream, DEFAULT_MAX_RECORD_BYTES};
use crate::domain::model::{Port, SyncReport};
use crate::domain::ports::{PortDomainService, PortRepository};
use crate::utils::error::{PortError, Result, StoreError};
use async_trait::async_trait;
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;

/// 同步引擎：本身不保存狀態，所有資料都在 `PortRepository`
pub struct PortService<R: PortRepository> {
    repository: R,
    max_record_bytes: usize,
}

impl<R: PortRepository> PortService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            max_record_bytes: DEFAULT_MAX_RECORD_BYTES,
        }
    }

    pub fn with_max_record_bytes(mut self, max_record_bytes: usize) -> Self {
        self.max_record_bytes = max_record_bytes;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    async fn upsert(&self, unloc: String, port: Port, report: &mut SyncReport) -> Result<()> {
        match self.repository.get(&unloc).await {
            Err(StoreError::NotFound { .. }) => {
                self.repository
                    .create(&unloc, port)
                    .await
                    .map_err(|source| PortError::Create {
                        unloc: unloc.clone(),
                        source,
                    })?;
                tracing::debug!(unloc = %unloc, "created port");
                report.created += 1;
            }
            Err(source) => return Err(PortError::Lookup { unloc, source }),
            Ok(_) => {
                self.repository
                    .update(&unloc, port)
                    .await
                    .map_err(|source| PortError::Update {
                        unloc: unloc.clone(),
                        source,
                    })?;
                tracing::debug!(unloc = %unloc, "updated port");
                report.updated += 1;
            }
        }
        Ok(())
    }

    async fn apply_all(
        &self,
        ports: &mut (dyn AsyncRead + Unpin + Send),
        cancel: &CancellationToken,
        report: &mut SyncReport,
    ) -> Result<()> {
        let mut stream = PortStream::new(ports).with_max_record_bytes(self.max_record_bytes);
        stream.open().await?;

        // 每筆之間檢查取消；已寫入的資料不回滾
        while let Some((unloc, port)) = stream.next_entry().await? {
            if cancel.is_cancelled() {
                return Err(PortError::Cancelled {
                    applied: report.applied(),
                });
            }
            self.upsert(unloc, port, report).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl<R: PortRepository> PortDomainService for PortService<R> {
    async fn sync_ports(
        &self,
        ports: &mut (dyn AsyncRead + Unpin + Send),
        cancel: &CancellationToken,
    ) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        match self.apply_all(ports, cancel, &mut report).await {
            Ok(()) => {
                tracing::info!(
                    created = report.created,
                    updated = report.updated,
                    "ports synchronized"
                );
                Ok(report)
            }
            Err(e) => {
                tracing::warn!(
                    kind = ?e.kind(),
                    applied = report.applied(),
                    "port sync aborted: {}",
                    e
                );
                Err(e)
            }
        }
    }

    async fn get_port(&self, unloc: &str) -> Result<Port> {
        if unloc.trim().is_empty() {
            return Err(PortError::InvalidUnloc);
        }

        self.repository.get(unloc).await.map_err(|e| match e {
            StoreError::NotFound { unloc } => PortError::NotFound { unloc },
            source => PortError::Lookup {
                unloc: unloc.to_string(),
                source,
            },
        })
    }
}
