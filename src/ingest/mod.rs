//! # 文件接收模块（ingest）
//!
//! ## 设计思路
//!
//! 把“文件从哪里来 → 怎样变成预览 → 怎样送到服务端”拆成独立子模块：
//!
//! - `source`：粘贴 / 选择的输入模型与批次提取
//! - `encoder`：二进制 → Data URL 预览
//! - `uploader`：multipart 上传与响应解析
//! - `config`：上传客户端的超时配置
//!
//! 批次的编排（门禁、顺序、事件）不在这里，见 `widget::pipeline`。
//!
//! ## 调用链
//!
//! ```text
//! DomEvent（paste / change）
//!    ↓
//! source.rs（提取批次）
//!    ↓
//! widget/pipeline.rs（门禁 → 编码 → 插入 → 事件）
//!    ├─ encoder.rs（spawn_blocking 并发编码）
//!    └─ uploader.rs（每个文件独立上传）
//! ```

mod config;
mod encoder;
mod source;
mod uploader;

pub use config::UploaderConfig;
pub use encoder::{DataUrlEncoder, PreviewEncoder};
pub use source::{ClipboardItem, IngestSource, RawFile};
pub use uploader::{HttpUploader, UPLOAD_FIELD};
