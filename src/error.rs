//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 组件内所有可失败的操作统一返回 `Result<T, WidgetError>`，
//! 宿主可以按分支匹配，也可以通过 `code()` / `stage()` 获得稳定的机器可读标识。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 容量超限属于“用户可见”错误：由组件自行提示，`handle` 不会向宿主抛出。
//! - 编码失败必须回传给批次调用方；上传失败只记录日志并通过任务句柄返回。
//! - 实现 `Serialize` 将错误序列化为字符串，便于宿主直接转发。

use serde::Serialize;

/// 组件级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    /// 本批次加入后会超过 `max-count`
    #[error("upload image count may not exceed {max}")]
    CapacityExceeded { max: u64 },

    /// 二进制 → 预览字符串编码失败，整批放弃
    #[error("编码错误：{0}")]
    Encode(String),

    /// 网络上传失败（请求失败 / 非 2xx / 响应不是 JSON）
    #[error("上传错误：{0}")]
    Upload(String),

    /// 属性值无法解析
    #[error("属性 `{name}` 取值无效：{reason}")]
    InvalidAttribute { name: &'static str, reason: String },

    /// 不在白名单中的属性名
    #[error("未知属性：{0}")]
    UnknownAttribute(String),
}

impl WidgetError {
    /// 稳定错误码，供宿主分支处理。
    pub fn code(&self) -> &'static str {
        match self {
            Self::CapacityExceeded { .. } => "E_CAPACITY",
            Self::Encode(_) => "E_ENCODE",
            Self::Upload(_) => "E_UPLOAD",
            Self::InvalidAttribute { .. } => "E_INVALID_ATTRIBUTE",
            Self::UnknownAttribute(_) => "E_UNKNOWN_ATTRIBUTE",
        }
    }

    /// 出错所在的处理阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::CapacityExceeded { .. } => "gate",
            Self::Encode(_) => "capture",
            Self::Upload(_) => "upload",
            Self::InvalidAttribute { .. } | Self::UnknownAttribute(_) => "config",
        }
    }
}

impl Serialize for WidgetError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_message_has_fixed_shape() {
        let err = WidgetError::CapacityExceeded { max: 2 };
        assert_eq!(err.to_string(), "upload image count may not exceed 2");
        assert_eq!(err.code(), "E_CAPACITY");
        assert_eq!(err.stage(), "gate");
    }

    #[test]
    fn error_serializes_as_display_string() {
        let err = WidgetError::Upload("HTTP 500".to_string());
        let json = serde_json::to_string(&err).expect("serialize failed");
        assert_eq!(json, "\"上传错误：HTTP 500\"");
    }
}
