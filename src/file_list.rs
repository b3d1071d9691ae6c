//! # 文件列表状态（FileListState）
//!
//! ## 设计思路
//!
//! 已接收文件的唯一可信来源。顺序即用户操作顺序，且必须与已渲染的图片节点逐一对齐。
//!
//! 每个条目在插入时分配一个稳定的 `PictureId`，渲染出的节点携带同一个 id，
//! 删除时按 id 定位下标，而不是在 DOM 中做祖先查找与节点引用比较。
//!
//! ## 实现思路
//!
//! - id 在单个实例内单调递增，`clear()` 不重置，旧节点的点击不会命中新条目。
//! - `remove_at` 对越界下标静默返回 `None`。

use serde::Serialize;

use crate::config::SeedEntry;
use crate::ingest::RawFile;

/// 图片节点与列表条目共享的稳定标识。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PictureId(pub u64);

/// 一个已接收的条目。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FileEntry {
    /// 挂载时由 `file-list` 提供的已知引用。
    Seeded(SeedEntry),
    /// 本次会话中粘贴或选择的文件。
    Captured(RawFile),
}

impl FileEntry {
    pub fn as_captured(&self) -> Option<&RawFile> {
        match self {
            Self::Captured(file) => Some(file),
            Self::Seeded(_) => None,
        }
    }
}

/// 列表中的一项：id + 预览字符串 + 条目本身。
#[derive(Debug, Clone, PartialEq)]
pub struct ListedPicture {
    pub id: PictureId,
    pub preview: String,
    pub entry: FileEntry,
}

#[derive(Debug, Default)]
pub struct FileListState {
    items: Vec<ListedPicture>,
    next_id: u64,
}

impl FileListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预留下一个 id，供渲染节点使用。
    pub fn reserve_id(&mut self) -> PictureId {
        let id = PictureId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    pub fn append(&mut self, picture: ListedPicture) {
        self.items.push(picture);
    }

    /// 按下标移除；下标无对应条目时不做任何事。
    pub fn remove_at(&mut self, index: usize) -> Option<ListedPicture> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn all(&self) -> &[ListedPicture] {
        &self.items
    }

    /// 按插入顺序输出全部条目。
    pub fn entries(&self) -> Vec<FileEntry> {
        self.items.iter().map(|item| item.entry.clone()).collect()
    }

    pub fn position_of(&self, id: PictureId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    pub fn get(&self, id: PictureId) -> Option<&ListedPicture> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn clear(&mut self) -> Vec<ListedPicture> {
        std::mem::take(&mut self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded(state: &mut FileListState, url: &str) -> PictureId {
        let id = state.reserve_id();
        state.append(ListedPicture {
            id,
            preview: url.to_string(),
            entry: FileEntry::Seeded(SeedEntry(json!({ "url": url }))),
        });
        id
    }

    #[test]
    fn remove_at_keeps_relative_order() {
        let mut state = FileListState::new();
        let a = seeded(&mut state, "a.png");
        let b = seeded(&mut state, "b.png");
        let c = seeded(&mut state, "c.png");

        let removed = state.remove_at(1).expect("middle entry exists");
        assert_eq!(removed.id, b);
        let ids: Vec<_> = state.all().iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn remove_at_out_of_range_is_silent() {
        let mut state = FileListState::new();
        seeded(&mut state, "a.png");
        assert!(state.remove_at(5).is_none());
        assert_eq!(state.count(), 1);
    }

    #[test]
    fn ids_stay_unique_across_clear() {
        let mut state = FileListState::new();
        let first = seeded(&mut state, "a.png");
        state.clear();
        let second = seeded(&mut state, "a.png");

        assert_ne!(first, second);
        assert_eq!(state.position_of(first), None);
        assert_eq!(state.position_of(second), Some(0));
    }

    #[test]
    fn seeded_entry_serializes_verbatim() {
        let entry = FileEntry::Seeded(SeedEntry(json!({"url": "a.png", "uid": 7})));
        assert_eq!(
            serde_json::to_value(&entry).expect("serialize failed"),
            json!({"url": "a.png", "uid": 7})
        );
    }
}
