//! # 组件句柄（ImageUpload）
//!
//! ## 设计思路
//!
//! `ImageUpload` 是宿主唯一持有的对象，相当于自定义元素本身：
//! - 生命周期回调映射为 `start()` / `stop()`
//! - `attributeChangedCallback` 映射为 `attribute_changed()`
//! - 四个 DOM 监听统一进入 `handle()`，由路由决定走向
//!
//! ## 实现思路
//!
//! 句柄内部只有一个 `Arc<WidgetCore>`，克隆开销很小，
//! 可以直接移动进宿主的事件回调或异步任务。

use std::sync::Arc;

use serde_json::Value;

use super::instance::WidgetCore;
use super::pipeline::IngestOutcome;
use super::WidgetHost;
use crate::config::{AttributeName, ConfigStore, WidgetConfig};
use crate::error::WidgetError;
use crate::file_list::{FileEntry, ListedPicture, PictureId};
use crate::ingest::{HttpUploader, IngestSource, UploaderConfig};
use crate::lock::{lock, write};
use crate::router::{DomEvent, Route};

/// `handle()` 的处理结果。
#[derive(Debug)]
pub enum Handled {
    /// 监听未挂载、目标无意义或组件未挂载。
    Ignored,
    Ingested(IngestOutcome),
    PreviewOpened(PictureId),
    Deleted(Option<FileEntry>),
    FilePickerOpened,
}

/// 图片上传组件实例。
#[derive(Clone)]
pub struct ImageUpload {
    core: Arc<WidgetCore>,
}

impl ImageUpload {
    /// 使用默认配置创建组件。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use std::sync::Arc;
    /// use image_upload::events::ChannelSink;
    /// use image_upload::router::CountingListenerHost;
    /// use image_upload::view::{LogNotifier, MemoryView};
    /// use image_upload::widget::{ImageUpload, WidgetHost};
    ///
    /// let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    /// let host = WidgetHost::new(
    ///     Arc::new(MemoryView::new()),
    ///     Arc::new(LogNotifier),
    ///     Arc::new(ChannelSink::new(tx)),
    ///     Arc::new(CountingListenerHost::new()),
    /// );
    /// let widget = ImageUpload::new(host)?;
    /// widget.start();
    /// # Ok::<(), image_upload::error::WidgetError>(())
    /// ```
    pub fn new(host: WidgetHost) -> Result<Self, WidgetError> {
        Self::with_config(host, ConfigStore::new(), UploaderConfig::default())
    }

    /// 使用已有属性与上传配置创建组件。
    pub fn with_config(
        host: WidgetHost,
        config: ConfigStore,
        uploader: UploaderConfig,
    ) -> Result<Self, WidgetError> {
        let uploader = HttpUploader::new(uploader)?;
        Ok(Self {
            core: Arc::new(WidgetCore::new(config, host, uploader)),
        })
    }

    /// 挂载：渲染模板、播种列表、挂载监听。重复调用不会重复挂载。
    pub fn start(&self) {
        self.core.start();
    }

    /// 卸载：移除监听并丢弃列表；编码中的批次完成后不会再插入。
    pub fn stop(&self) {
        self.core.stop();
    }

    pub fn is_mounted(&self) -> bool {
        self.core.is_mounted()
    }

    /// 属性变化回调。
    ///
    /// 新旧值相同时不做任何事；`file-list` 变化且已挂载时重建列表。
    pub fn attribute_changed(
        &self,
        name: &str,
        old: Option<&str>,
        new: Option<&str>,
    ) -> Result<(), WidgetError> {
        if old == new {
            return Ok(());
        }

        let name = AttributeName::parse(name)?;
        let changed = write(&self.core.config, "配置").set(name, new)?;
        if changed && name == AttributeName::FileList {
            self.reseed_if_mounted();
        }
        Ok(())
    }

    /// 以结构化值设置 `file-list`（宿主直接传数组时使用）。
    pub fn set_file_list(&self, value: Value) -> Result<(), WidgetError> {
        let changed = write(&self.core.config, "配置").set_file_list_value(value)?;
        if changed {
            self.reseed_if_mounted();
        }
        Ok(())
    }

    fn reseed_if_mounted(&self) {
        if !self.core.is_mounted() {
            return;
        }
        let config = self.core.config_snapshot();
        let seeded = self.core.reseed(&config);
        log::info!("🌱 file-list 已更新，重新播种 {seeded} 张");
    }

    /// 处理一次 DOM 事件。
    ///
    /// 数量超限只提示用户，不作为错误返回；编码失败会记录并返回。
    pub async fn handle(&self, event: DomEvent) -> Result<Handled, WidgetError> {
        let Some(route) = self.core.router.route(event) else {
            return Ok(Handled::Ignored);
        };

        match route {
            Route::Ingest(source) => match self.core.ingest(source).await {
                Ok(outcome) => Ok(Handled::Ingested(outcome)),
                Err(err) => {
                    log::error!("❌ 批次处理失败 [{}:{}]：{err}", err.stage(), err.code());
                    Err(err)
                }
            },
            Route::OpenPreview(id) => Ok(if self.core.open_preview(id) {
                Handled::PreviewOpened(id)
            } else {
                Handled::Ignored
            }),
            Route::Delete(id) => Ok(Handled::Deleted(self.core.delete(id))),
            Route::OpenFilePicker => {
                self.core.view.open_file_picker();
                Ok(Handled::FilePickerOpened)
            }
        }
    }

    /// 直接提交一个批次，不经过监听路由。
    pub async fn ingest(&self, source: IngestSource) -> Result<IngestOutcome, WidgetError> {
        self.core.ingest(source).await
    }

    /// 按 id 删除，未命中时 `afterDelete` 的 `file` 为 `null`。
    pub fn delete(&self, id: Option<PictureId>) -> Option<FileEntry> {
        self.core.delete(id)
    }

    pub fn open_preview(&self, id: PictureId) -> bool {
        self.core.open_preview(id)
    }

    pub fn config(&self) -> WidgetConfig {
        self.core.config_snapshot()
    }

    /// 当前列表中的全部条目，按插入顺序。
    pub fn file_list(&self) -> Vec<FileEntry> {
        lock(&self.core.files, "文件列表").entries()
    }

    pub fn listed(&self) -> Vec<ListedPicture> {
        lock(&self.core.files, "文件列表").all().to_vec()
    }

    pub fn count(&self) -> usize {
        lock(&self.core.files, "文件列表").count()
    }

    /// 当前挂载的监听数量。
    pub fn active_listeners(&self) -> usize {
        self.core.router.active_count()
    }
}
