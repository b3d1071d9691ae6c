//! # 事件路由（EventRouter）
//!
//! ## 设计思路
//!
//! 组件在宿主 DOM 上只挂四个监听：
//!
//! | 目标 | 事件 | 路由 |
//! |------|------|------|
//! | 上传区 | `paste` | 粘贴流水线 |
//! | 图片列表 | `click` | 事件委托：预览 / 删除 / 忽略 |
//! | 上传按钮 | `click` | 唤起隐藏的文件输入框 |
//! | 文件输入框 | `change` | 选择流水线 |
//!
//! 挂载周期内每个监听恰好一份；`start()` / `stop()` 必须对称，
//! 反复挂载卸载既不能泄漏也不能重复触发。
//!
//! ## 实现思路
//!
//! - 已挂载的监听记录在集合里，`start()` 只添加缺失的，`stop()` 只移除已添加的，
//!   因此宿主收到的 add / remove 调用始终成对。
//! - `route()` 只处理已挂载监听对应的事件，卸载后到达的事件直接丢弃。
//! - 列表点击先判断“图片项 / 图片”，再判断“删除按钮”，都不匹配则忽略。

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use crate::file_list::PictureId;
use crate::ingest::{ClipboardItem, IngestSource, RawFile};
use crate::lock::lock;

/// 监听挂载的位置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListenerTarget {
    /// 接收粘贴的上传区域。
    UploadTarget,
    /// 图片列表容器（点击委托）。
    PictureList,
    UploadButton,
    /// 隐藏的 `<input type="file">`。
    FileInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DomEventKind {
    Paste,
    Click,
    Change,
}

impl DomEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Paste => "paste",
            Self::Click => "click",
            Self::Change => "change",
        }
    }
}

/// 一个监听：目标 + 事件类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Binding {
    pub target: ListenerTarget,
    pub kind: DomEventKind,
}

/// 组件挂载的全部监听。
pub const BINDINGS: [Binding; 4] = [
    Binding {
        target: ListenerTarget::UploadTarget,
        kind: DomEventKind::Paste,
    },
    Binding {
        target: ListenerTarget::PictureList,
        kind: DomEventKind::Click,
    },
    Binding {
        target: ListenerTarget::UploadButton,
        kind: DomEventKind::Click,
    },
    Binding {
        target: ListenerTarget::FileInput,
        kind: DomEventKind::Change,
    },
];

/// 宿主 DOM 的监听注册表。
pub trait ListenerHost: Send + Sync {
    fn add_listener(&self, binding: Binding);
    fn remove_listener(&self, binding: Binding);
}

/// 只记录调用的监听注册表，用于无界面运行与泄漏检查。
#[derive(Debug, Default)]
pub struct CountingListenerHost {
    state: Mutex<CountingState>,
}

#[derive(Debug, Default)]
struct CountingState {
    active: Vec<Binding>,
    added: usize,
    removed: usize,
}

impl CountingListenerHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前仍挂着的监听（含重复项，若发生重复添加会在这里体现）。
    pub fn active(&self) -> Vec<Binding> {
        lock(&self.state, "监听注册表").active.clone()
    }

    pub fn added(&self) -> usize {
        lock(&self.state, "监听注册表").added
    }

    pub fn removed(&self) -> usize {
        lock(&self.state, "监听注册表").removed
    }
}

impl ListenerHost for CountingListenerHost {
    fn add_listener(&self, binding: Binding) {
        let mut state = lock(&self.state, "监听注册表");
        state.active.push(binding);
        state.added += 1;
    }

    fn remove_listener(&self, binding: Binding) {
        let mut state = lock(&self.state, "监听注册表");
        if let Some(index) = state.active.iter().position(|active| *active == binding) {
            state.active.remove(index);
        }
        state.removed += 1;
    }
}

/// 点击目标在组件内的语义分类。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRole {
    PictureItem,
    PictureImage,
    DeleteIcon,
    Other,
}

/// 列表点击的目标：分类 + 所属图片节点的 id。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickTarget {
    pub role: TargetRole,
    pub picture: Option<PictureId>,
}

impl ClickTarget {
    pub fn new(role: TargetRole, picture: Option<PictureId>) -> Self {
        Self { role, picture }
    }
}

/// 组件监听到的 DOM 事件。
#[derive(Debug, Clone, PartialEq)]
pub enum DomEvent {
    Paste(Vec<ClipboardItem>),
    ListClick(ClickTarget),
    UploadButtonClick,
    InputChange(Vec<RawFile>),
}

impl DomEvent {
    pub fn binding(&self) -> Binding {
        let (target, kind) = match self {
            Self::Paste(_) => (ListenerTarget::UploadTarget, DomEventKind::Paste),
            Self::ListClick(_) => (ListenerTarget::PictureList, DomEventKind::Click),
            Self::UploadButtonClick => (ListenerTarget::UploadButton, DomEventKind::Click),
            Self::InputChange(_) => (ListenerTarget::FileInput, DomEventKind::Change),
        };
        Binding { target, kind }
    }
}

/// 路由结果。
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Ingest(IngestSource),
    OpenPreview(PictureId),
    /// 删除按钮所属图片；找不到所属图片时为 `None`。
    Delete(Option<PictureId>),
    OpenFilePicker,
}

pub struct EventRouter {
    host: Arc<dyn ListenerHost>,
    attached: Mutex<BTreeSet<Binding>>,
}

impl EventRouter {
    pub fn new(host: Arc<dyn ListenerHost>) -> Self {
        Self {
            host,
            attached: Mutex::new(BTreeSet::new()),
        }
    }

    /// 挂载四个监听，已挂载的跳过。返回本次新增数量。
    pub fn start(&self) -> usize {
        let mut attached = lock(&self.attached, "路由监听");
        let mut added = 0;
        for binding in BINDINGS {
            if attached.insert(binding) {
                self.host.add_listener(binding);
                added += 1;
            }
        }
        log::debug!("🔌 事件监听已挂载：新增 {added} 个");
        added
    }

    /// 移除已挂载的监听。返回本次移除数量。
    pub fn stop(&self) -> usize {
        let mut attached = lock(&self.attached, "路由监听");
        let removed = attached.len();
        for binding in std::mem::take(&mut *attached) {
            self.host.remove_listener(binding);
        }
        log::debug!("🔌 事件监听已移除：{removed} 个");
        removed
    }

    pub fn active_count(&self) -> usize {
        lock(&self.attached, "路由监听").len()
    }

    /// 将 DOM 事件路由为组件动作；对应监听未挂载或点击目标无意义时返回 `None`。
    pub fn route(&self, event: DomEvent) -> Option<Route> {
        let binding = event.binding();
        if !lock(&self.attached, "路由监听").contains(&binding) {
            log::debug!("监听未挂载，丢弃事件：{:?} {}", binding.target, binding.kind.as_str());
            return None;
        }

        match event {
            DomEvent::Paste(items) => Some(Route::Ingest(IngestSource::Paste(items))),
            DomEvent::ListClick(target) => route_list_click(target),
            DomEvent::UploadButtonClick => Some(Route::OpenFilePicker),
            DomEvent::InputChange(files) => Some(Route::Ingest(IngestSource::Selection(files))),
        }
    }
}

fn route_list_click(target: ClickTarget) -> Option<Route> {
    match target.role {
        TargetRole::PictureItem | TargetRole::PictureImage => target.picture.map(Route::OpenPreview),
        TargetRole::DeleteIcon => Some(Route::Delete(target.picture)),
        TargetRole::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> (Arc<CountingListenerHost>, EventRouter) {
        let host = Arc::new(CountingListenerHost::new());
        let router = EventRouter::new(host.clone());
        (host, router)
    }

    #[test]
    fn start_attaches_each_binding_once() {
        let (host, router) = router();
        assert_eq!(router.start(), 4);
        assert_eq!(router.start(), 0);
        assert_eq!(host.active().len(), 4);
        assert_eq!(host.added(), 4);
    }

    #[test]
    fn repeated_cycles_leave_no_listeners() {
        let (host, router) = router();
        for _ in 0..2 {
            router.start();
            router.stop();
        }
        assert!(host.active().is_empty());
        assert_eq!(host.added(), host.removed());
        assert_eq!(router.active_count(), 0);
        assert_eq!(router.stop(), 0);
    }

    #[test]
    fn events_are_dropped_while_detached() {
        let (_host, router) = router();
        assert_eq!(router.route(DomEvent::UploadButtonClick), None);

        router.start();
        assert_eq!(router.route(DomEvent::UploadButtonClick), Some(Route::OpenFilePicker));

        router.stop();
        assert_eq!(router.route(DomEvent::UploadButtonClick), None);
    }

    #[test]
    fn list_click_checks_item_before_delete() {
        let (_host, router) = router();
        router.start();
        let id = PictureId(7);

        let image = DomEvent::ListClick(ClickTarget::new(TargetRole::PictureImage, Some(id)));
        assert_eq!(router.route(image), Some(Route::OpenPreview(id)));

        let item = DomEvent::ListClick(ClickTarget::new(TargetRole::PictureItem, Some(id)));
        assert_eq!(router.route(item), Some(Route::OpenPreview(id)));

        let delete = DomEvent::ListClick(ClickTarget::new(TargetRole::DeleteIcon, Some(id)));
        assert_eq!(router.route(delete), Some(Route::Delete(Some(id))));

        let orphan = DomEvent::ListClick(ClickTarget::new(TargetRole::DeleteIcon, None));
        assert_eq!(router.route(orphan), Some(Route::Delete(None)));

        let other = DomEvent::ListClick(ClickTarget::new(TargetRole::Other, Some(id)));
        assert_eq!(router.route(other), None);
    }

    #[test]
    fn input_change_routes_to_selection() {
        let (_host, router) = router();
        router.start();
        let file = RawFile::with_mime("a.png", "image/png", b"x".to_vec());

        let routed = router.route(DomEvent::InputChange(vec![file.clone()]));
        assert_eq!(routed, Some(Route::Ingest(IngestSource::Selection(vec![file]))));
    }
}
