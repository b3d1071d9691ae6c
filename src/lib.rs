//! # 图片上传组件 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 宿主页面（自定义元素外壳）                │
//! │                                                          │
//! │  属性变化 ── connected/disconnected ── DOM 事件          │
//! │       ↕                ↕                    ↕            │
//! │  PictureView ── Notifier ── EventSink ── ListenerHost    │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ WidgetHost（协作者注入）
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            组件核心 (Rust)                       │
//! │                                                          │
//! │  ┌─ config ───── ConfigStore（属性白名单 + 强类型配置）   │
//! │  │                                                       │
//! │  ├─ router ───── 四个监听的挂载 / 卸载与事件路由          │
//! │  │                                                       │
//! │  ├─ widget ───── ImageUpload 句柄                        │
//! │  │   └─ pipeline  门禁 → 编码 → 插入 → 上传               │
//! │  │                                                       │
//! │  ├─ ingest       输入模型 / Data URL 编码 / multipart 上传│
//! │  ├─ file_list    已接收文件（与图片节点逐一对齐）         │
//! │  └─ events       uploadChange / afterUpload / afterDelete │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `WidgetError`，带稳定错误码与阶段 |
//! | [`config`] | 属性白名单、默认值与强制转换规则 |
//! | [`file_list`] | 有序文件列表与稳定的 `PictureId` |
//! | [`ingest`] | 粘贴 / 选择输入、预览编码、网络上传 |
//! | [`router`] | DOM 监听生命周期与点击委托 |
//! | [`events`] | 对宿主派发的三个公开事件 |
//! | [`view`] | 视图与提示协作者接口及无界面实现 |
//! | [`widget`] | 组件句柄 `ImageUpload` 与接收流水线 |

pub mod config;
pub mod error;
pub mod events;
pub mod file_list;
pub mod ingest;
mod lock;
pub mod router;
pub mod view;
pub mod widget;
