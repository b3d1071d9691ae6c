//! # 事件桥（NotificationBridge）
//!
//! ## 设计思路
//!
//! 组件对宿主页面只暴露三个公开事件：
//!
//! | 事件 | detail |
//! |------|--------|
//! | `uploadChange` | `{ file }`：一个刚被接收的文件 |
//! | `afterUpload` | 上传接口返回的 JSON，原样透传 |
//! | `afterDelete` | `{ file }`：被删除的条目，未命中时为 `null` |
//!
//! 事件通过 `EventSink` 交给宿主派发；序列化形态为 `{"type": ..., "detail": ...}`，
//! 与浏览器 `CustomEvent` 的结构一致。

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;

use crate::file_list::FileEntry;
use crate::ingest::RawFile;

pub const UPLOAD_CHANGE_EVENT: &str = "uploadChange";
pub const AFTER_UPLOAD_EVENT: &str = "afterUpload";
pub const AFTER_DELETE_EVENT: &str = "afterDelete";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "detail")]
pub enum WidgetEvent {
    #[serde(rename = "uploadChange")]
    UploadChange { file: RawFile },
    #[serde(rename = "afterUpload")]
    AfterUpload(Value),
    #[serde(rename = "afterDelete")]
    AfterDelete { file: Option<FileEntry> },
}

impl WidgetEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::UploadChange { .. } => UPLOAD_CHANGE_EVENT,
            Self::AfterUpload(_) => AFTER_UPLOAD_EVENT,
            Self::AfterDelete { .. } => AFTER_DELETE_EVENT,
        }
    }
}

/// 宿主侧的事件派发出口。
pub trait EventSink: Send + Sync {
    fn emit(&self, event: WidgetEvent);
}

/// 将事件写入 tokio 无界通道，供宿主（或测试）异步消费。
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: UnboundedSender<WidgetEvent>,
}

impl ChannelSink {
    pub fn new(sender: UnboundedSender<WidgetEvent>) -> Self {
        Self { sender }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: WidgetEvent) {
        let name = event.name();
        if self.sender.send(event).is_err() {
            log::warn!("事件接收端已关闭，丢弃事件：{name}");
        }
    }
}
