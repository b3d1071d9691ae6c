//! # 图片上传组件 — 无界面演示入口
//!
//! 把命令行给出的图片作为一次“文件选择”交给组件，
//! 可选上传到 `--action` 指定的地址，并把派发的每个事件以 JSON 打印到标准输出。
//!
//! ```text
//! image-upload [--action URL] [--max-count N] [--file-list JSON] <图片路径>...
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use image_upload::config::ConfigStore;
use image_upload::error::WidgetError;
use image_upload::events::ChannelSink;
use image_upload::ingest::{RawFile, UploaderConfig};
use image_upload::router::{CountingListenerHost, DomEvent};
use image_upload::view::{LogNotifier, MemoryView};
use image_upload::widget::{Handled, ImageUpload, WidgetHost};

#[derive(Debug, Default)]
struct DemoArgs {
    attributes: Vec<(&'static str, String)>,
    paths: Vec<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<DemoArgs, String> {
    let mut parsed = DemoArgs::default();

    while let Some(arg) = args.next() {
        let attribute = match arg.as_str() {
            "--action" => "action",
            "--max-count" => "max-count",
            "--file-list" => "file-list",
            flag if flag.starts_with("--") => return Err(format!("未知参数：{flag}")),
            _ => {
                parsed.paths.push(PathBuf::from(&arg));
                continue;
            }
        };
        let value = args.next().ok_or_else(|| format!("{arg} 缺少取值"))?;
        parsed.attributes.push((attribute, value));
    }

    Ok(parsed)
}

fn read_files(paths: &[PathBuf]) -> Result<Vec<RawFile>, String> {
    paths
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path).map_err(|e| format!("读取 {} 失败：{e}", path.display()))?;
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Ok(RawFile::new(name, bytes))
        })
        .collect()
}

async fn run(args: DemoArgs, files: Vec<RawFile>) -> Result<(), WidgetError> {
    let config = ConfigStore::from_attributes(
        args.attributes
            .iter()
            .map(|(name, value)| (*name, value.as_str())),
    )?;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let view = Arc::new(MemoryView::new());
    let host = WidgetHost::new(
        view.clone(),
        Arc::new(LogNotifier),
        Arc::new(ChannelSink::new(tx)),
        Arc::new(CountingListenerHost::new()),
    );

    let widget = ImageUpload::with_config(host, config, UploaderConfig::default())?;
    widget.start();

    if let Handled::Ingested(outcome) = widget.handle(DomEvent::InputChange(files)).await? {
        for result in outcome.wait_uploads().await {
            if let Err(err) = result {
                log::warn!("⚠️ [{}] {err}", err.code());
            }
        }
    }

    log::info!("📋 当前列表 {} 张，已渲染 {} 张", widget.count(), view.pictures().len());
    widget.stop();
    drop(widget);

    while let Ok(event) = rx.try_recv() {
        match serde_json::to_string(&event) {
            Ok(json) => println!("{json}"),
            Err(e) => log::warn!("事件序列化失败：{e}"),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (args, files) = match parse_args(std::env::args().skip(1))
        .and_then(|args| read_files(&args.paths).map(|files| (args, files)))
    {
        Ok(parsed) => parsed,
        Err(message) => {
            log::error!("❌ {message}");
            std::process::exit(2);
        }
    };

    if let Err(err) = run(args, files).await {
        log::error!("❌ [{}:{}] {err}", err.stage(), err.code());
        std::process::exit(1);
    }
}
