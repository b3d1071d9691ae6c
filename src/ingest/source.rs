//! # 输入来源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入语义”和“流水线中间结果”解耦：
//! - `RawFile` 表示一次捕获得到的二进制文件（粘贴或选择）
//! - `ClipboardItem` 表示剪贴板中的一项，只有文件型才会进入流水线
//! - `IngestSource` 表示一次批次的来源（粘贴 / 选择）

use bytes::Bytes;
use serde::Serialize;

const FALLBACK_MIME: &str = "application/octet-stream";

/// 本次会话中捕获的原始文件。
///
/// 序列化时只输出元信息，不输出字节内容。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawFile {
    pub name: String,
    #[serde(rename = "type")]
    pub mime: String,
    pub size: u64,
    #[serde(skip)]
    pub bytes: Bytes,
}

impl RawFile {
    /// 根据文件签名推断 MIME 类型。
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let mime = infer::get(&bytes)
            .map(|kind| kind.mime_type())
            .unwrap_or(FALLBACK_MIME)
            .to_string();
        Self::with_mime(name, mime, bytes)
    }

    /// 使用宿主提供的 MIME 类型（如浏览器 `File.type`）。
    pub fn with_mime(name: impl Into<String>, mime: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            mime: mime.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }
}

/// 剪贴板中的一项。
#[derive(Debug, Clone, PartialEq)]
pub enum ClipboardItem {
    /// 可以取出文件的项（截图、复制的图片文件等）。
    File(RawFile),
    /// 纯文本 / HTML 等非文件内容。
    Text(String),
}

impl ClipboardItem {
    pub fn as_file(&self) -> Option<&RawFile> {
        match self {
            Self::File(file) => Some(file),
            Self::Text(_) => None,
        }
    }
}

/// 一个批次的输入来源。
#[derive(Debug, Clone, PartialEq)]
pub enum IngestSource {
    /// 粘贴事件携带的全部剪贴板项（只会使用第一项）。
    Paste(Vec<ClipboardItem>),
    /// 文件选择框一次选中的全部文件。
    Selection(Vec<RawFile>),
}

impl IngestSource {
    /// 取出本批次真正参与处理的文件。
    ///
    /// 粘贴只看第一项，且必须是文件型；否则返回空批次。
    pub(crate) fn into_batch(self) -> Vec<RawFile> {
        match self {
            Self::Paste(items) => items
                .first()
                .and_then(ClipboardItem::as_file)
                .cloned()
                .into_iter()
                .collect(),
            Self::Selection(files) => files,
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Paste(_) => "paste",
            Self::Selection(_) => "selection",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 12] = [137, 80, 78, 71, 13, 10, 26, 10, 0, 0, 0, 13];

    #[test]
    fn raw_file_infers_mime_from_signature() {
        let file = RawFile::new("shot.png", PNG_HEADER.to_vec());
        assert_eq!(file.mime, "image/png");
        assert_eq!(file.size, 12);

        let text = RawFile::new("notes.txt", b"hello".to_vec());
        assert_eq!(text.mime, "application/octet-stream");
    }

    #[test]
    fn paste_only_uses_first_file_item() {
        let first = RawFile::new("a.png", PNG_HEADER.to_vec());
        let second = RawFile::new("b.png", PNG_HEADER.to_vec());
        let batch = IngestSource::Paste(vec![
            ClipboardItem::File(first.clone()),
            ClipboardItem::File(second),
        ])
        .into_batch();
        assert_eq!(batch, vec![first]);

        let batch = IngestSource::Paste(vec![
            ClipboardItem::Text("hello".to_string()),
            ClipboardItem::File(RawFile::new("c.png", PNG_HEADER.to_vec())),
        ])
        .into_batch();
        assert!(batch.is_empty());

        assert!(IngestSource::Paste(Vec::new()).into_batch().is_empty());
    }

    #[test]
    fn raw_file_serializes_metadata_only() {
        let file = RawFile::with_mime("a.png", "image/png", PNG_HEADER.to_vec());
        let json = serde_json::to_value(&file).expect("serialize failed");
        assert_eq!(json, serde_json::json!({"name": "a.png", "type": "image/png", "size": 12}));
    }
}
