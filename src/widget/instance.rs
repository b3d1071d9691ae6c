//! # 组件核心状态
//!
//! ## 设计思路
//!
//! `WidgetCore` 持有单个组件实例的全部状态与协作者，不与任何宿主运行时绑定。
//! 挂载 / 卸载显式建模为 `start()` / `stop()`：
//! 1. `start()`：渲染模板 → 按 `file-list` 播种列表 → 挂载四个监听
//! 2. `stop()`：移除监听 → 标记失活并推进挂载代次 → 丢弃列表与视图节点
//!
//! ## 实现思路
//!
//! - 异步续体（编码完成、上传完成）在触碰列表或视图前检查“是否仍处于同一次挂载”，
//!   由 `mounted` 标志与 `generation` 代次共同判断。
//! - 列表与视图的修改总在同一把 `files` 锁内完成，保证两者逐一对齐。
//! - 事件在释放锁之后派发，宿主在回调里读取组件状态不会死锁。

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::config::{ConfigStore, WidgetConfig};
use crate::events::{EventSink, WidgetEvent};
use crate::file_list::{FileEntry, FileListState, ListedPicture, PictureId};
use crate::ingest::{HttpUploader, PreviewEncoder};
use crate::lock::{lock, read};
use crate::router::EventRouter;
use crate::view::{Notifier, PictureView};

use super::WidgetHost;

/// 一次挂载的标识，批次开始时捕获，插入前校验。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MountToken(u64);

pub(crate) struct WidgetCore {
    pub(super) config: RwLock<ConfigStore>,
    pub(super) files: Mutex<FileListState>,
    pub(super) view: Arc<dyn PictureView>,
    pub(super) notifier: Arc<dyn Notifier>,
    pub(super) events: Arc<dyn EventSink>,
    pub(super) encoder: Arc<dyn PreviewEncoder>,
    pub(super) uploader: HttpUploader,
    pub(super) router: EventRouter,
    mounted: AtomicBool,
    generation: AtomicU64,
}

impl WidgetCore {
    pub(super) fn new(config: ConfigStore, host: WidgetHost, uploader: HttpUploader) -> Self {
        Self {
            config: RwLock::new(config),
            files: Mutex::new(FileListState::new()),
            view: host.view,
            notifier: host.notifier,
            events: host.events,
            encoder: host.encoder,
            uploader,
            router: EventRouter::new(host.listeners),
            mounted: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    /// 获取配置快照，单个批次内使用同一份配置。
    pub(super) fn config_snapshot(&self) -> WidgetConfig {
        read(&self.config, "配置").config().clone()
    }

    pub(super) fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    pub(super) fn mount_token(&self) -> MountToken {
        MountToken(self.generation.load(Ordering::SeqCst))
    }

    /// 续体是否仍属于当前挂载。
    pub(super) fn is_live(&self, token: MountToken) -> bool {
        self.is_mounted() && self.generation.load(Ordering::SeqCst) == token.0
    }

    pub(super) fn start(&self) {
        if self.mounted.swap(true, Ordering::SeqCst) {
            self.router.start();
            return;
        }

        let config = self.config_snapshot();
        self.view.mount(&config);
        let seeded = self.reseed(&config);
        self.router.start();

        log::info!("🚀 组件已挂载 - 初始图片 {seeded} 张");
    }

    pub(super) fn stop(&self) {
        self.router.stop();

        if !self.mounted.swap(false, Ordering::SeqCst) {
            return;
        }
        self.generation.fetch_add(1, Ordering::SeqCst);

        let discarded = {
            let mut files = lock(&self.files, "文件列表");
            let discarded = files.clear().len();
            self.view.unmount();
            discarded
        };

        log::info!("🛑 组件已卸载 - 丢弃图片 {discarded} 张");
    }

    /// 用配置中的 `file-list` 重建列表，返回播种数量。
    ///
    /// 播种不经过数量门禁，也不派发 `uploadChange`。组件已卸载时不做任何事。
    pub(super) fn reseed(&self, config: &WidgetConfig) -> usize {
        let mut files = lock(&self.files, "文件列表");
        if !self.is_mounted() {
            log::debug!("组件已卸载，跳过播种");
            return 0;
        }

        for previous in files.clear() {
            self.view.remove_picture(previous.id);
        }

        for seed in &config.file_list {
            let Some(preview) = seed.preview() else {
                log::warn!("⚠️ 初始条目缺少可用的预览地址，已跳过：{}", seed.0);
                continue;
            };

            let id = files.reserve_id();
            self.view.render_picture(id, &preview, config, None);
            files.append(ListedPicture {
                id,
                preview,
                entry: FileEntry::Seeded(seed.clone()),
            });
        }

        files.count()
    }

    /// 删除流程：按 id 定位下标，移除列表条目与视图节点，派发 `afterDelete`。
    pub(super) fn delete(&self, id: Option<PictureId>) -> Option<FileEntry> {
        let removed = {
            let mut files = lock(&self.files, "文件列表");
            let removed = id
                .and_then(|id| files.position_of(id))
                .and_then(|index| files.remove_at(index));
            if let Some(id) = id {
                self.view.remove_picture(id);
            }
            removed
        };

        match &removed {
            Some(picture) => log::info!("🗑️ 已删除图片 - {:?}", picture.id),
            None => log::warn!("⚠️ 删除目标未找到：{id:?}"),
        }

        let file = removed.map(|picture| picture.entry);
        self.events.emit(WidgetEvent::AfterDelete { file: file.clone() });
        file
    }

    /// 打开全屏预览；返回是否找到对应图片。
    pub(super) fn open_preview(&self, id: PictureId) -> bool {
        let preview = lock(&self.files, "文件列表")
            .get(id)
            .map(|picture| picture.preview.clone());

        match preview {
            Some(preview) => {
                self.view.open_preview(&preview);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AttributeName;
    use crate::events::ChannelSink;
    use crate::ingest::UploaderConfig;
    use crate::router::CountingListenerHost;
    use crate::view::{MemoryNotifier, MemoryView};

    fn core_with_seeds(view: Arc<MemoryView>) -> WidgetCore {
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let host = WidgetHost::new(
            view,
            Arc::new(MemoryNotifier::new()),
            Arc::new(ChannelSink::new(tx)),
            Arc::new(CountingListenerHost::new()),
        );
        let mut config = ConfigStore::new();
        config
            .set(AttributeName::FileList, Some(r#"["a.png","b.png"]"#))
            .expect("valid seeds");
        let uploader = HttpUploader::new(UploaderConfig::default()).expect("uploader init failed");
        WidgetCore::new(config, host, uploader)
    }

    #[test]
    fn reseed_after_stop_leaves_list_empty() {
        let view = Arc::new(MemoryView::new());
        let core = core_with_seeds(view.clone());
        core.start();
        assert_eq!(lock(&core.files, "文件列表").count(), 2);

        let config = core.config_snapshot();
        core.stop();

        assert_eq!(core.reseed(&config), 0);
        assert_eq!(lock(&core.files, "文件列表").count(), 0);
        assert_eq!(view.rendered_count(), 0);
    }

    #[test]
    fn reseed_while_mounted_keeps_list_and_view_aligned() {
        let view = Arc::new(MemoryView::new());
        let core = core_with_seeds(view.clone());
        core.start();

        let config = core.config_snapshot();
        assert_eq!(core.reseed(&config), 2);
        assert_eq!(view.rendered_count(), 2);

        let listed: Vec<PictureId> = lock(&core.files, "文件列表").all().iter().map(|p| p.id).collect();
        assert_eq!(listed, view.rendered_ids());
    }
}
