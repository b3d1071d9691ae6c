//! # 接收流水线（IngestionPipeline）
//!
//! ## 设计思路
//!
//! 一次粘贴或一次选择构成一个批次，处理链路固定为：
//! 1. 门禁：`本批数量 + 当前数量 > max-count` 时提示并整批放弃
//! 2. 编码：批内文件并发编码，全部成功后才进入插入阶段
//! 3. 插入：按原始顺序渲染节点、追加列表、派发 `uploadChange`
//! 4. 上传：配置了 `action` 时每个文件独立上传，完成后派发 `afterUpload`
//!
//! ## 实现思路
//!
//! - 编码在阻塞线程池并发执行，再按原始下标依次等待结果，插入顺序与选择顺序一致。
//! - 任一文件编码失败，整批返回 `WidgetError::Encode`，不渲染任何节点。
//! - 门禁只读取批次开始时的数量：两个几乎同时开始的批次可能共同越过上限，
//!   这是保留的已知行为，不在这里加原子计数。
//! - 上传是“发出即不管”：失败只记录告警并通过任务句柄返回，不回滚已插入条目。

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tokio::task::JoinHandle;

use super::instance::WidgetCore;
use crate::error::WidgetError;
use crate::events::WidgetEvent;
use crate::file_list::{FileEntry, ListedPicture, PictureId};
use crate::ingest::{IngestSource, RawFile};
use crate::lock::lock;

/// 单个文件的上传任务。
pub type UploadTask = JoinHandle<Result<Value, WidgetError>>;

/// 一个批次的处理结果。
#[derive(Debug)]
pub enum IngestOutcome {
    /// 批次被接收；`uploads` 仅在配置了 `action` 时非空。
    Accepted {
        ids: Vec<PictureId>,
        uploads: Vec<UploadTask>,
    },
    /// 超过数量上限，已提示用户。
    Rejected { max: u64 },
    /// 空批次、非文件粘贴、组件未挂载或批次在编码期间被卸载。
    Ignored,
}

impl IngestOutcome {
    pub fn accepted_ids(&self) -> &[PictureId] {
        match self {
            Self::Accepted { ids, .. } => ids,
            _ => &[],
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// 等待全部上传任务结束，按文件顺序返回结果。
    pub async fn wait_uploads(self) -> Vec<Result<Value, WidgetError>> {
        let Self::Accepted { uploads, .. } = self else {
            return Vec::new();
        };

        let mut results = Vec::with_capacity(uploads.len());
        for task in uploads {
            let result = task
                .await
                .unwrap_or_else(|e| Err(WidgetError::Upload(format!("上传任务执行失败：{e}"))));
            results.push(result);
        }
        results
    }
}

impl WidgetCore {
    pub(super) async fn ingest(self: &Arc<Self>, source: IngestSource) -> Result<IngestOutcome, WidgetError> {
        let label = source.label();

        if !self.is_mounted() {
            log::debug!("组件未挂载，忽略 {label} 批次");
            return Ok(IngestOutcome::Ignored);
        }

        let token = self.mount_token();
        let batch = source.into_batch();
        if batch.is_empty() {
            log::debug!("{label} 批次没有可接收的文件");
            return Ok(IngestOutcome::Ignored);
        }

        let config = self.config_snapshot();
        let current = lock(&self.files, "文件列表").count();
        if let Some(max) = config.max_count.exceeded_limit(batch.len(), current) {
            let err = WidgetError::CapacityExceeded { max };
            log::info!(
                "🚫 {label} 批次被数量门禁拒绝 - 本批 {} 张，已有 {current} 张，上限 {max}",
                batch.len()
            );
            self.notifier.info(&err.to_string());
            return Ok(IngestOutcome::Rejected { max });
        }

        let total_start = Instant::now();

        let encode_start = Instant::now();
        let previews = self.encode_batch(&batch).await?;
        let encode_elapsed = encode_start.elapsed();

        let insert_start = Instant::now();
        let accepted = {
            let mut files = lock(&self.files, "文件列表");
            if !self.is_live(token) {
                log::warn!("⚠️ {label} 批次编码期间组件已卸载，丢弃 {} 张", batch.len());
                return Ok(IngestOutcome::Ignored);
            }

            let mut accepted = Vec::with_capacity(batch.len());
            for (file, preview) in batch.into_iter().zip(previews) {
                let id = files.reserve_id();
                self.view.render_picture(id, &preview, &config, Some(&file));
                files.append(ListedPicture {
                    id,
                    preview,
                    entry: FileEntry::Captured(file.clone()),
                });
                accepted.push((id, file));
            }
            accepted
        };

        // 整批插入完成、释放锁之后再按顺序派发。
        for (_, file) in &accepted {
            self.events.emit(WidgetEvent::UploadChange { file: file.clone() });
        }
        let insert_elapsed = insert_start.elapsed();

        let uploads = match &config.action {
            Some(action) => accepted
                .iter()
                .map(|(_, file)| self.spawn_upload(action.clone(), file.clone()))
                .collect(),
            None => Vec::new(),
        };

        log::info!(
            "✅ {label} 批次接收完成 - {} 张 encode={}ms insert={}ms total={}ms upload={}",
            accepted.len(),
            encode_elapsed.as_millis(),
            insert_elapsed.as_millis(),
            total_start.elapsed().as_millis(),
            uploads.len()
        );

        Ok(IngestOutcome::Accepted {
            ids: accepted.into_iter().map(|(id, _)| id).collect(),
            uploads,
        })
    }

    /// 并发编码整批文件，结果按原始顺序返回；任一失败整批失败。
    async fn encode_batch(&self, batch: &[RawFile]) -> Result<Vec<String>, WidgetError> {
        let tasks: Vec<_> = batch
            .iter()
            .cloned()
            .map(|file| {
                let encoder = Arc::clone(&self.encoder);
                tokio::task::spawn_blocking(move || encoder.encode(&file))
            })
            .collect();

        let mut previews = Vec::with_capacity(tasks.len());
        for (index, task) in tasks.into_iter().enumerate() {
            let preview = task
                .await
                .map_err(|e| WidgetError::Encode(format!("编码线程执行失败：{e}")))?
                .map_err(|err| {
                    log::warn!("❌ 第 {} 个文件编码失败，整批放弃：{err}", index + 1);
                    err
                })?;
            previews.push(preview);
        }

        Ok(previews)
    }

    fn spawn_upload(self: &Arc<Self>, action: String, file: RawFile) -> UploadTask {
        let core = Arc::clone(self);
        tokio::spawn(async move {
            match core.uploader.upload(&action, &file).await {
                Ok(body) => {
                    core.events.emit(WidgetEvent::AfterUpload(body.clone()));
                    Ok(body)
                }
                Err(err) => {
                    log::warn!("⚠️ 上传失败（不重试，已接收条目保留）- {}：{err}", file.name);
                    Err(err)
                }
            }
        })
    }
}
