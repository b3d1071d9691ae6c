//! # 预览编码模块
//!
//! ## 设计思路
//!
//! 二进制 → 可预览字符串的转换属于外部协作者，通过 `PreviewEncoder` 注入。
//! 默认实现 `DataUrlEncoder` 输出 `data:<mime>;base64,<payload>`，
//! 与浏览器 `FileReader.readAsDataURL` 的结果形态一致。
//!
//! ## 实现思路
//!
//! - 编码是 CPU 密集操作，流水线在阻塞线程池中调用，因此 trait 保持同步。
//! - 空内容编码为 `data:<mime>;base64,`；超出体积上限视为编码失败，由流水线整批放弃。

use base64::{Engine as _, engine::general_purpose};

use super::source::RawFile;
use crate::error::WidgetError;

/// 将原始文件编码为可直接用作 `<img src>` 的字符串。
pub trait PreviewEncoder: Send + Sync {
    fn encode(&self, file: &RawFile) -> Result<String, WidgetError>;
}

/// 默认编码器：Base64 Data URL。
#[derive(Debug, Clone)]
pub struct DataUrlEncoder {
    /// 允许编码的最大原始体积（字节）。
    pub max_file_size: u64,
}

impl Default for DataUrlEncoder {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
        }
    }
}

impl PreviewEncoder for DataUrlEncoder {
    fn encode(&self, file: &RawFile) -> Result<String, WidgetError> {
        if file.size > self.max_file_size {
            return Err(WidgetError::Encode(format!(
                "文件过大：{} {:.2} MB（限制：{:.2} MB）",
                file.name,
                file.size as f64 / 1024.0 / 1024.0,
                self.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        let payload = general_purpose::STANDARD.encode(&file.bytes);
        Ok(format!("data:{};base64,{payload}", file.mime))
    }
}
