//! # 视图与提示协作者
//!
//! ## 设计思路
//!
//! HTML/CSS 模板、图片节点渲染、全屏预览与轻提示都属于宿主侧能力，
//! 这里只定义组件需要的最小接口：
//!
//! - `PictureView`：模板挂载、图片节点增删、预览、唤起文件选择框
//! - `Notifier`：面向用户的轻提示（只用于数量超限）
//!
//! 同时提供无界面实现 `MemoryView` / `MemoryNotifier`，
//! 供命令行演示与测试使用，也可作为宿主接入时的参考。

use std::sync::Mutex;

use crate::config::WidgetConfig;
use crate::file_list::PictureId;
use crate::ingest::RawFile;
use crate::lock::lock;

/// 图片列表视图（模板协作者）。
///
/// 每个渲染出的图片节点都携带 `PictureId`，删除与预览都按 id 定位。
pub trait PictureView: Send + Sync {
    /// 按配置渲染组件模板（上传区、列表容器、按钮、隐藏的文件输入框）。
    fn mount(&self, config: &WidgetConfig);

    /// 移除模板，之后的渲染请求应被忽略。
    fn unmount(&self);

    fn render_picture(&self, id: PictureId, preview: &str, config: &WidgetConfig, file: Option<&RawFile>);

    /// 移除节点；节点不存在时返回 `false`。
    fn remove_picture(&self, id: PictureId) -> bool;

    /// 当前已渲染的图片节点数量。
    fn rendered_count(&self) -> usize;

    fn open_preview(&self, preview: &str);

    /// 以编程方式点击隐藏的文件输入框。
    fn open_file_picker(&self);
}

/// 用户可见的轻提示。
pub trait Notifier: Send + Sync {
    fn info(&self, message: &str);
}

/// 只写日志的提示实现。
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn info(&self, message: &str) {
        log::info!("💬 {message}");
    }
}

/// 记录全部提示文本的实现。
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    messages: Mutex<Vec<String>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        lock(&self.messages, "提示记录").clone()
    }
}

impl Notifier for MemoryNotifier {
    fn info(&self, message: &str) {
        lock(&self.messages, "提示记录").push(message.to_string());
    }
}

/// 内存中的一个图片节点。
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPicture {
    pub id: PictureId,
    pub src: String,
    pub width: String,
    pub height: String,
    /// 原始文件名（仅捕获的文件有）。
    pub title: Option<String>,
}

#[derive(Debug, Default)]
struct MemoryViewState {
    mounted: bool,
    mount_count: usize,
    pictures: Vec<RenderedPicture>,
    opened_previews: Vec<String>,
    file_picker_opens: usize,
}

/// 无界面的图片列表实现。
#[derive(Debug, Default)]
pub struct MemoryView {
    state: Mutex<MemoryViewState>,
}

impl MemoryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_mounted(&self) -> bool {
        lock(&self.state, "视图状态").mounted
    }

    /// 模板被挂载的累计次数。
    pub fn mount_count(&self) -> usize {
        lock(&self.state, "视图状态").mount_count
    }

    pub fn pictures(&self) -> Vec<RenderedPicture> {
        lock(&self.state, "视图状态").pictures.clone()
    }

    pub fn rendered_ids(&self) -> Vec<PictureId> {
        lock(&self.state, "视图状态")
            .pictures
            .iter()
            .map(|picture| picture.id)
            .collect()
    }

    pub fn opened_previews(&self) -> Vec<String> {
        lock(&self.state, "视图状态").opened_previews.clone()
    }

    pub fn file_picker_opens(&self) -> usize {
        lock(&self.state, "视图状态").file_picker_opens
    }
}

impl PictureView for MemoryView {
    fn mount(&self, config: &WidgetConfig) {
        let mut state = lock(&self.state, "视图状态");
        state.mounted = true;
        state.mount_count += 1;
        state.pictures.clear();
        log::debug!(
            "🧱 模板已挂载 - {}x{} list-type={}",
            config.width.to_css(),
            config.height.to_css(),
            config.list_type.as_str()
        );
    }

    fn unmount(&self) {
        let mut state = lock(&self.state, "视图状态");
        state.mounted = false;
        state.pictures.clear();
    }

    fn render_picture(&self, id: PictureId, preview: &str, config: &WidgetConfig, file: Option<&RawFile>) {
        let mut state = lock(&self.state, "视图状态");
        if !state.mounted {
            log::debug!("视图未挂载，忽略图片节点渲染：{id:?}");
            return;
        }

        state.pictures.push(RenderedPicture {
            id,
            src: preview.to_string(),
            width: config.picture_width.to_css(),
            height: config.picture_height.to_css(),
            title: file.map(|file| file.name.clone()),
        });
    }

    fn remove_picture(&self, id: PictureId) -> bool {
        let mut state = lock(&self.state, "视图状态");
        let before = state.pictures.len();
        state.pictures.retain(|picture| picture.id != id);
        state.pictures.len() != before
    }

    fn rendered_count(&self) -> usize {
        lock(&self.state, "视图状态").pictures.len()
    }

    fn open_preview(&self, preview: &str) {
        lock(&self.state, "视图状态").opened_previews.push(preview.to_string());
    }

    fn open_file_picker(&self) {
        lock(&self.state, "视图状态").file_picker_opens += 1;
    }
}
