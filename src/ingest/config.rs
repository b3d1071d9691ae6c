//! # 上传配置
//!
//! 网络上传只有超时两个可调参数；上传本身不重试（失败即结束）。

/// HTTP 上传客户端配置。
#[derive(Debug, Clone)]
pub struct UploaderConfig {
    /// 单次上传请求的总超时（秒）。
    pub request_timeout_secs: u64,
    /// 建立连接（TCP/TLS）超时（秒）。
    pub connect_timeout_secs: u64,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 8,
        }
    }
}
