//! # 网络上传模块
//!
//! ## 设计思路
//!
//! 每个已接收的文件独立发起一次 `multipart/form-data` POST，字段名固定为 `file`。
//! 上传与接收解耦：失败不回滚已插入的预览，也不重试。
//!
//! ## 实现思路
//!
//! - 复用同一个 `reqwest::Client`（内部为 `Arc`，克隆开销很小）。
//! - 非 2xx 状态与非 JSON 响应都映射为 `WidgetError::Upload`。
//! - 日志中的地址去掉 query / fragment，避免泄露令牌。

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde_json::Value;

use super::config::UploaderConfig;
use super::source::RawFile;
use crate::error::WidgetError;

/// 上传表单中的文件字段名。
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Clone)]
pub struct HttpUploader {
    client: reqwest::Client,
}

impl HttpUploader {
    pub fn new(config: UploaderConfig) -> Result<Self, WidgetError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| WidgetError::Upload(format!("无法创建 HTTP 客户端：{e}")))?;

        Ok(Self { client })
    }

    /// 上传单个文件，返回解析后的 JSON 响应体。
    pub async fn upload(&self, action: &str, file: &RawFile) -> Result<Value, WidgetError> {
        let target = redact_url_for_log(action);
        log::info!("📤 开始上传 - {} -> {}", file.name, target);

        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.mime)
            .map_err(|e| WidgetError::Upload(format!("无效的 MIME 类型 {}：{e}", file.mime)))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .client
            .post(action)
            .multipart(form)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, &target))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WidgetError::Upload(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status_message(status.as_u16())
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| WidgetError::Upload(format!("读取响应失败：{e}")))?;

        let parsed = serde_json::from_slice::<Value>(&body)
            .map_err(|e| WidgetError::Upload(format!("响应不是有效 JSON：{e}")))?;

        log::info!("✅ 上传完成 - {} ({} bytes)", file.name, file.size);
        Ok(parsed)
    }
}

fn map_reqwest_error(e: reqwest::Error, target: &str) -> WidgetError {
    if e.is_timeout() {
        WidgetError::Upload(format!("上传超时：{target}"))
    } else if e.is_connect() {
        WidgetError::Upload(format!("无法连接：{target}"))
    } else {
        WidgetError::Upload(format!("请求失败：{target}"))
    }
}

fn status_message(code: u16) -> &'static str {
    match code {
        404 => "未找到",
        403 => "访问被拒绝",
        413 => "文件过大",
        500..=599 => "服务器错误",
        _ => "请求失败",
    }
}

fn redact_url_for_log(url: &str) -> String {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return "<invalid-url>".to_string();
    };

    let host = parsed.host_str().unwrap_or("<unknown-host>");
    let port = parsed.port().map(|p| format!(":{p}")).unwrap_or_default();

    format!("{}://{}{}{}", parsed.scheme(), host, port, parsed.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// 读取一次完整的 HTTP 请求（请求头 + Content-Length 指定的请求体）。
    fn read_http_request(stream: &mut std::net::TcpStream) -> String {
        let mut buffer = Vec::new();
        let mut chunk = [0_u8; 4096];

        loop {
            let read = stream.read(&mut chunk).expect("read request failed");
            if read == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..read]);

            let text = String::from_utf8_lossy(&buffer);
            let Some(header_end) = text.find("\r\n\r\n") else {
                continue;
            };

            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.trim()
                        .eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                });

            match content_length {
                Some(len) if buffer.len() >= header_end + 4 + len => break,
                Some(_) => continue,
                None if text.ends_with("--\r\n") => break,
                None => continue,
            }
        }

        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// 启动只应答一次的本地 HTTP 服务，返回地址与“收到的请求”。
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server failed");
        let addr = listener.local_addr().expect("read local addr failed");

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept failed");
            let request = read_http_request(&mut stream);

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream
                .write_all(response.as_bytes())
                .expect("write response failed");
            stream.flush().expect("flush failed");
            request
        });

        (format!("http://127.0.0.1:{}/upload?token=secret", addr.port()), server)
    }

    #[tokio::test]
    async fn upload_posts_multipart_file_field_and_parses_json() {
        let (url, server) = serve_once("200 OK", r#"{"url":"https://cdn.example.com/a.png"}"#);
        let uploader = HttpUploader::new(UploaderConfig::default()).expect("uploader init failed");
        let file = RawFile::with_mime("a.png", "image/png", b"fake-png".to_vec());

        let body = uploader.upload(&url, &file).await.expect("upload should succeed");
        let request = server.join().expect("server thread failed");

        assert_eq!(body, serde_json::json!({"url": "https://cdn.example.com/a.png"}));
        assert!(request.starts_with("POST /upload?token=secret"));
        assert!(request.contains("multipart/form-data"));
        assert!(request.contains("name=\"file\""));
        assert!(request.contains("filename=\"a.png\""));
        assert!(request.contains("fake-png"));
    }

    #[tokio::test]
    async fn upload_treats_non_2xx_as_failure() {
        let (url, server) = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#);
        let uploader = HttpUploader::new(UploaderConfig::default()).expect("uploader init failed");
        let file = RawFile::with_mime("a.png", "image/png", b"fake-png".to_vec());

        let result = uploader.upload(&url, &file).await;
        server.join().expect("server thread failed");

        assert!(matches!(result, Err(WidgetError::Upload(_))));
    }

    #[tokio::test]
    async fn upload_rejects_non_json_body() {
        let (url, server) = serve_once("200 OK", "ok");
        let uploader = HttpUploader::new(UploaderConfig::default()).expect("uploader init failed");
        let file = RawFile::with_mime("a.png", "image/png", b"fake-png".to_vec());

        let result = uploader.upload(&url, &file).await;
        server.join().expect("server thread failed");

        assert!(matches!(result, Err(WidgetError::Upload(_))));
    }

    #[test]
    fn redact_url_for_log_removes_query_and_fragment() {
        assert_eq!(
            redact_url_for_log("https://example.com:8443/upload?token=abc#x"),
            "https://example.com:8443/upload"
        );
        assert_eq!(redact_url_for_log("not a url"), "<invalid-url>");
    }
}
