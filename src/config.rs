//! # 配置模块（ConfigStore）
//!
//! ## 设计思路
//!
//! 宿主通过字符串属性配置组件，这里将“自由字符串键值”收敛为：
//! - 封闭白名单 `AttributeName`（与 DOM 属性名一一对应）
//! - 强类型配置 `WidgetConfig`（每个字段都有明确的强制转换规则）
//!
//! 其余组件只读取 `WidgetConfig`，不接触原始字符串。
//!
//! ## 实现思路
//!
//! - `Default` 提供与原生组件一致的默认值。
//! - `ConfigStore::set` 同时保留原始文本，用于判断“值未变化”时直接跳过。
//! - 数值转换从不失败：无法解析的 `max-count` 视为不限数量。
//! - 只有 `file-list` 的 JSON 解析失败会返回错误，且不修改任何状态。

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::WidgetError;

/// 展示尺寸：数值按像素处理，其余保留为 CSS 文本（如 `100%`）。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Dimension {
    Pixels(f64),
    Css(String),
}

impl Dimension {
    fn coerce(raw: &str) -> Self {
        match parse_number(raw) {
            Some(value) => Self::Pixels(value),
            None => Self::Css(raw.trim().to_string()),
        }
    }

    /// 输出为可直接写入样式的文本。
    pub fn to_css(&self) -> String {
        match self {
            Self::Pixels(value) => format!("{value}px"),
            Self::Css(text) => text.clone(),
        }
    }
}

/// 列表展示形态，仅作为模板提示。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListType {
    Picture,
    PictureCard,
}

impl ListType {
    fn coerce(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "picture-card" => Self::PictureCard,
            "picture" => Self::Picture,
            other => {
                log::debug!("未知 list-type：{other}，回退为 picture");
                Self::Picture
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Picture => "picture",
            Self::PictureCard => "picture-card",
        }
    }
}

/// 最大图片数量。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaxCount {
    Unbounded,
    Limit(u64),
}

impl MaxCount {
    fn coerce(raw: &str) -> Self {
        let Some(value) = parse_number(raw) else {
            log::debug!("max-count 无法解析为数字：{raw:?}，视为不限数量");
            return Self::Unbounded;
        };

        if value == f64::INFINITY {
            Self::Unbounded
        } else if value <= 0.0 {
            Self::Limit(0)
        } else {
            Self::Limit(value.floor() as u64)
        }
    }

    /// 门禁判断：`incoming + current > max`。
    pub fn would_exceed(self, incoming: usize, current: usize) -> bool {
        self.exceeded_limit(incoming, current).is_some()
    }

    /// 超限时返回被越过的上限。
    pub fn exceeded_limit(self, incoming: usize, current: usize) -> Option<u64> {
        match self {
            Self::Unbounded => None,
            Self::Limit(max) => ((incoming as u64).saturating_add(current as u64) > max).then_some(max),
        }
    }
}

impl fmt::Display for MaxCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => f.write_str("unbounded"),
            Self::Limit(max) => write!(f, "{max}"),
        }
    }
}

/// 外部提供的初始条目：URL 字符串或 `{url, ...}` 对象，原样保留。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SeedEntry(pub Value);

impl SeedEntry {
    /// 用于渲染的预览地址。
    ///
    /// 对象取 `url` 字段，字符串取自身；其余形态没有可用预览。
    pub fn preview(&self) -> Option<String> {
        match &self.0 {
            Value::String(url) => Some(url.clone()),
            Value::Object(map) => map.get("url").and_then(Value::as_str).map(str::to_string),
            _ => None,
        }
    }
}

/// 组件配置的强类型视图。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub width: Dimension,
    pub height: Dimension,
    pub picture_width: Dimension,
    pub picture_height: Dimension,
    /// 上传地址；为空时完全不发起网络请求。
    pub action: Option<String>,
    pub list_type: ListType,
    /// 逗号分隔的扩展名 / MIME 过滤，仅供文件选择框参考。
    pub accept: String,
    pub multiple: bool,
    pub max_count: MaxCount,
    pub file_list: Vec<SeedEntry>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            width: Dimension::Css("100%".to_string()),
            height: Dimension::Pixels(200.0),
            picture_width: Dimension::Pixels(48.0),
            picture_height: Dimension::Pixels(48.0),
            action: None,
            list_type: ListType::Picture,
            accept: ".png,.jpg,.jpeg".to_string(),
            multiple: true,
            max_count: MaxCount::Unbounded,
            file_list: Vec::new(),
        }
    }
}

/// 可被监听的属性白名单。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeName {
    Width,
    Height,
    PictureWidth,
    PictureHeight,
    ListType,
    Accept,
    Multiple,
    Action,
    MaxCount,
    FileList,
}

impl AttributeName {
    /// 与宿主 `observedAttributes` 对应的完整列表。
    pub const ALL: [AttributeName; 10] = [
        Self::Width,
        Self::Height,
        Self::PictureWidth,
        Self::PictureHeight,
        Self::ListType,
        Self::Accept,
        Self::Multiple,
        Self::Action,
        Self::MaxCount,
        Self::FileList,
    ];

    /// 从 DOM 属性名解析。
    pub fn parse(name: &str) -> Result<Self, WidgetError> {
        Self::ALL
            .into_iter()
            .find(|attr| attr.as_str().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| WidgetError::UnknownAttribute(name.to_string()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Width => "width",
            Self::Height => "height",
            Self::PictureWidth => "picture-width",
            Self::PictureHeight => "picture-height",
            Self::ListType => "list-type",
            Self::Accept => "accept",
            Self::Multiple => "multiple",
            Self::Action => "action",
            Self::MaxCount => "max-count",
            Self::FileList => "file-list",
        }
    }
}

/// 配置存储：原始属性文本 + 强类型配置。
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    config: WidgetConfig,
    raw: HashMap<AttributeName, String>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由初始属性集合构建。
    ///
    /// # 示例
    /// ```rust
    /// use image_upload::config::{ConfigStore, MaxCount};
    ///
    /// let store = ConfigStore::from_attributes([("max-count", "2"), ("action", "")])?;
    /// assert_eq!(store.max_count(), MaxCount::Limit(2));
    /// assert!(store.config().action.is_none());
    /// # Ok::<(), image_upload::error::WidgetError>(())
    /// ```
    pub fn from_attributes<'a, I>(attributes: I) -> Result<Self, WidgetError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut store = Self::new();
        for (name, value) in attributes {
            store.set(AttributeName::parse(name)?, Some(value))?;
        }
        Ok(store)
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// 最近一次设置的原始属性文本。
    pub fn get(&self, name: AttributeName) -> Option<&str> {
        self.raw.get(&name).map(String::as_str)
    }

    pub fn max_count(&self) -> MaxCount {
        self.config.max_count
    }

    /// 设置属性；`None` 表示属性被移除，恢复默认值。
    ///
    /// 返回值表示配置是否发生变化；值未变化时不做任何事。
    pub fn set(&mut self, name: AttributeName, value: Option<&str>) -> Result<bool, WidgetError> {
        if self.get(name) == value {
            return Ok(false);
        }

        let defaults = WidgetConfig::default();
        match (name, value) {
            (AttributeName::Width, Some(raw)) => self.config.width = Dimension::coerce(raw),
            (AttributeName::Width, None) => self.config.width = defaults.width,
            (AttributeName::Height, Some(raw)) => self.config.height = Dimension::coerce(raw),
            (AttributeName::Height, None) => self.config.height = defaults.height,
            (AttributeName::PictureWidth, Some(raw)) => {
                self.config.picture_width = Dimension::coerce(raw)
            }
            (AttributeName::PictureWidth, None) => {
                self.config.picture_width = defaults.picture_width
            }
            (AttributeName::PictureHeight, Some(raw)) => {
                self.config.picture_height = Dimension::coerce(raw)
            }
            (AttributeName::PictureHeight, None) => {
                self.config.picture_height = defaults.picture_height
            }
            (AttributeName::ListType, Some(raw)) => self.config.list_type = ListType::coerce(raw),
            (AttributeName::ListType, None) => self.config.list_type = defaults.list_type,
            (AttributeName::Accept, Some(raw)) => self.config.accept = raw.to_string(),
            (AttributeName::Accept, None) => self.config.accept = defaults.accept,
            (AttributeName::Multiple, Some(raw)) => self.config.multiple = coerce_bool(raw),
            (AttributeName::Multiple, None) => self.config.multiple = defaults.multiple,
            (AttributeName::Action, Some(raw)) => {
                let trimmed = raw.trim();
                self.config.action = (!trimmed.is_empty()).then(|| trimmed.to_string());
            }
            (AttributeName::Action, None) => self.config.action = defaults.action,
            (AttributeName::MaxCount, Some(raw)) => self.config.max_count = MaxCount::coerce(raw),
            (AttributeName::MaxCount, None) => self.config.max_count = defaults.max_count,
            (AttributeName::FileList, Some(raw)) => self.config.file_list = parse_seeds(raw)?,
            (AttributeName::FileList, None) => self.config.file_list = defaults.file_list,
        }

        match value {
            Some(raw) => self.raw.insert(name, raw.to_string()),
            None => self.raw.remove(&name),
        };

        log::debug!("⚙️ 属性已更新：{}={:?}", name.as_str(), value);
        Ok(true)
    }

    /// 以结构化值设置 `file-list`（宿主直接传数组而非 JSON 文本）。
    pub fn set_file_list_value(&mut self, value: Value) -> Result<bool, WidgetError> {
        let text = value.to_string();
        if self.get(AttributeName::FileList) == Some(text.as_str()) {
            return Ok(false);
        }

        self.config.file_list = seeds_from_value(value)?;
        self.raw.insert(AttributeName::FileList, text);
        Ok(true)
    }
}

/// 解析 `file-list` 文本；空文本视为空列表。
pub fn parse_seeds(raw: &str) -> Result<Vec<SeedEntry>, WidgetError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let value: Value = serde_json::from_str(trimmed).map_err(|e| WidgetError::InvalidAttribute {
        name: AttributeName::FileList.as_str(),
        reason: format!("JSON 解析失败：{e}"),
    })?;

    seeds_from_value(value)
}

fn seeds_from_value(value: Value) -> Result<Vec<SeedEntry>, WidgetError> {
    match value {
        Value::Array(items) => Ok(items.into_iter().map(SeedEntry).collect()),
        // 被二次序列化的数组：`"[...]"`
        Value::String(text) => parse_seeds(&text),
        Value::Null => Ok(Vec::new()),
        other => Err(WidgetError::InvalidAttribute {
            name: AttributeName::FileList.as_str(),
            reason: format!("期望数组，实际为：{other}"),
        }),
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| !value.is_nan())
}

fn coerce_bool(raw: &str) -> bool {
    !matches!(raw.trim().to_ascii_lowercase().as_str(), "false" | "0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_widget_defaults() {
        let config = WidgetConfig::default();
        assert_eq!(config.width, Dimension::Css("100%".to_string()));
        assert_eq!(config.height, Dimension::Pixels(200.0));
        assert_eq!(config.accept, ".png,.jpg,.jpeg");
        assert!(config.multiple);
        assert_eq!(config.max_count, MaxCount::Unbounded);
        assert!(config.file_list.is_empty());
    }

    #[test]
    fn attribute_names_roundtrip() {
        for name in AttributeName::ALL {
            assert_eq!(AttributeName::parse(name.as_str()).expect("known name"), name);
        }
        assert!(matches!(
            AttributeName::parse("data-foo"),
            Err(WidgetError::UnknownAttribute(_))
        ));
    }

    #[test]
    fn set_is_noop_when_value_unchanged() {
        let mut store = ConfigStore::new();
        assert!(store.set(AttributeName::MaxCount, Some("3")).expect("set failed"));
        assert!(!store.set(AttributeName::MaxCount, Some("3")).expect("set failed"));
        assert_eq!(store.get(AttributeName::MaxCount), Some("3"));
    }

    #[test]
    fn max_count_coercion_is_loose() {
        assert_eq!(MaxCount::coerce("5"), MaxCount::Limit(5));
        assert_eq!(MaxCount::coerce(" 2.7 "), MaxCount::Limit(2));
        assert_eq!(MaxCount::coerce("-1"), MaxCount::Limit(0));
        assert_eq!(MaxCount::coerce("abc"), MaxCount::Unbounded);
        assert_eq!(MaxCount::coerce(""), MaxCount::Unbounded);
        assert_eq!(MaxCount::coerce("Infinity"), MaxCount::Unbounded);
    }

    #[test]
    fn gate_compares_sum_against_limit() {
        assert!(!MaxCount::Limit(2).would_exceed(2, 0));
        assert!(MaxCount::Limit(2).would_exceed(3, 0));
        assert!(MaxCount::Limit(2).would_exceed(1, 2));
        assert!(!MaxCount::Unbounded.would_exceed(usize::MAX, usize::MAX));
        assert_eq!(MaxCount::Limit(1).exceeded_limit(1, 1), Some(1));
        assert_eq!(MaxCount::Limit(1).exceeded_limit(1, 0), None);
        assert_eq!(MaxCount::Unbounded.exceeded_limit(9, 9), None);
    }

    #[test]
    fn removing_attribute_restores_default() {
        let mut store = ConfigStore::new();
        store.set(AttributeName::Multiple, Some("false")).expect("set failed");
        assert!(!store.config().multiple);

        store.set(AttributeName::Multiple, None).expect("remove failed");
        assert!(store.config().multiple);
        assert_eq!(store.get(AttributeName::Multiple), None);
    }

    #[test]
    fn dimensions_keep_css_text() {
        let mut store = ConfigStore::new();
        store.set(AttributeName::Width, Some("320")).expect("set failed");
        store.set(AttributeName::Height, Some("50vh")).expect("set failed");

        assert_eq!(store.config().width.to_css(), "320px");
        assert_eq!(store.config().height.to_css(), "50vh");
    }

    #[test]
    fn file_list_accepts_text_and_structured_forms() {
        let mut store = ConfigStore::new();
        store
            .set(AttributeName::FileList, Some(r#"[{"url":"a.png"},"b.png"]"#))
            .expect("text form should parse");
        assert_eq!(store.config().file_list.len(), 2);

        store
            .set_file_list_value(json!([{"url": "c.png", "name": "c"}]))
            .expect("structured form should parse");
        assert_eq!(store.config().file_list[0].preview().as_deref(), Some("c.png"));
    }

    #[test]
    fn invalid_file_list_leaves_store_untouched() {
        let mut store = ConfigStore::new();
        store
            .set(AttributeName::FileList, Some(r#"["a.png"]"#))
            .expect("valid list");

        let result = store.set(AttributeName::FileList, Some("[not json"));
        assert!(matches!(result, Err(WidgetError::InvalidAttribute { .. })));
        assert_eq!(store.config().file_list.len(), 1);
        assert_eq!(store.get(AttributeName::FileList), Some(r#"["a.png"]"#));
    }

    #[test]
    fn seed_preview_prefers_url_field() {
        assert_eq!(SeedEntry(json!("x.png")).preview().as_deref(), Some("x.png"));
        assert_eq!(SeedEntry(json!({"url": "y.png"})).preview().as_deref(), Some("y.png"));
        assert_eq!(SeedEntry(json!({"name": "z"})).preview(), None);
        assert_eq!(SeedEntry(json!(42)).preview(), None);
    }
}
