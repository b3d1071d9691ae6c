//! # 上传组件（widget）
//!
//! ## 设计思路
//!
//! 对外只暴露 `ImageUpload` 一个句柄，宿主通过它完成：
//! 1. 生命周期：`start()` / `stop()`（对应 connected / disconnected）
//! 2. 属性变化：`attribute_changed()`
//! 3. DOM 事件：`handle()`（粘贴、列表点击、按钮点击、文件选择）
//!
//! 宿主能力（视图、提示、事件派发、监听注册、预览编码）打包为 `WidgetHost` 注入，
//! 同一进程内可以存在任意多个互不影响的实例。
//!
//! ## 实现思路
//!
//! - `instance`：实例状态、挂载代次、播种与删除
//! - `pipeline`：批次的门禁、编码、插入与上传
//! - `element`：对外句柄与事件分发

use std::sync::Arc;

use crate::events::EventSink;
use crate::ingest::{DataUrlEncoder, PreviewEncoder};
use crate::router::ListenerHost;
use crate::view::{Notifier, PictureView};

mod element;
mod instance;
mod pipeline;

pub use element::{Handled, ImageUpload};
pub use pipeline::{IngestOutcome, UploadTask};

/// 宿主注入的全部协作者。
#[derive(Clone)]
pub struct WidgetHost {
    pub view: Arc<dyn PictureView>,
    pub notifier: Arc<dyn Notifier>,
    pub events: Arc<dyn EventSink>,
    pub listeners: Arc<dyn ListenerHost>,
    pub encoder: Arc<dyn PreviewEncoder>,
}

impl WidgetHost {
    /// 使用默认的 Data URL 编码器。
    pub fn new(
        view: Arc<dyn PictureView>,
        notifier: Arc<dyn Notifier>,
        events: Arc<dyn EventSink>,
        listeners: Arc<dyn ListenerHost>,
    ) -> Self {
        Self {
            view,
            notifier,
            events,
            listeners,
            encoder: Arc::new(DataUrlEncoder::default()),
        }
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn PreviewEncoder>) -> Self {
        self.encoder = encoder;
        self
    }
}
