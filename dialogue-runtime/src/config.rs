//! # Config 模块
//!
//! 对话表现层的可调参数。
//!
//! 所有字段都有默认值，配置文件中缺失的字段会自动补齐：
//!
//! ```json
//! {
//!   "typewriter_interval": 0.05,
//!   "skip_interval": 0.1,
//!   "primary_character": "Blake",
//!   "name_colors": { "blake": "#FF0000" }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ColorParseError;

/// 名字颜色（RGB）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NameColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl NameColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for NameColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for NameColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ColorParseError {
            value: s.to_string(),
        };
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| err())
        };
        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for NameColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NameColor> for String {
    fn from(color: NameColor) -> Self {
        color.to_string()
    }
}

/// 表现层配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationConfig {
    /// 打字机每个字符的间隔（秒）
    #[serde(default = "default_typewriter_interval")]
    pub typewriter_interval: f32,

    /// 是否启用打字机效果（关闭时整行立即显示）
    #[serde(default = "default_true")]
    pub enable_typewriter: bool,

    /// 跳过模式下自动推进的间隔（秒）
    #[serde(default = "default_skip_interval")]
    pub skip_interval: f32,

    /// 跳过模式下打字机的加速倍数
    #[serde(default = "default_skip_typing_factor")]
    pub skip_typing_factor: f32,

    /// 说话者跳动高度
    #[serde(default = "default_hop_height")]
    pub hop_height: f32,

    /// 说话者跳动时长（秒）
    #[serde(default = "default_hop_duration")]
    pub hop_duration: f32,

    /// 主角名：该名字开头的立绘放在左侧，该说话者跳动左侧立绘
    #[serde(default = "default_primary_character")]
    pub primary_character: String,

    /// 是否给说话者名字上色
    #[serde(default = "default_true")]
    pub use_character_colors: bool,

    /// 名字颜色表（键为小写名字）
    #[serde(
        default = "default_name_colors",
        deserialize_with = "deserialize_name_colors"
    )]
    pub name_colors: BTreeMap<String, NameColor>,

    /// 不在颜色表中的名字使用的颜色
    #[serde(default = "default_name_color")]
    pub default_name_color: NameColor,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            typewriter_interval: default_typewriter_interval(),
            enable_typewriter: true,
            skip_interval: default_skip_interval(),
            skip_typing_factor: default_skip_typing_factor(),
            hop_height: default_hop_height(),
            hop_duration: default_hop_duration(),
            primary_character: default_primary_character(),
            use_character_colors: true,
            name_colors: default_name_colors(),
            default_name_color: default_name_color(),
        }
    }
}

impl PresentationConfig {
    /// 查找名字颜色（大小写不敏感）
    pub fn color_for(&self, name: &str) -> NameColor {
        self.name_colors
            .get(&name.to_lowercase())
            .copied()
            .unwrap_or(self.default_name_color)
    }

    /// 跳过模式下的打字机间隔
    pub fn skipping_typewriter_interval(&self) -> f32 {
        if self.skip_typing_factor > 0.0 {
            self.typewriter_interval / self.skip_typing_factor
        } else {
            self.typewriter_interval
        }
    }
}

/// 读取颜色表时把键统一为小写
fn deserialize_name_colors<'de, D>(deserializer: D) -> Result<BTreeMap<String, NameColor>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, NameColor>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(name, color)| (name.to_lowercase(), color))
        .collect())
}

// 默认值函数
fn default_true() -> bool {
    true
}

fn default_typewriter_interval() -> f32 {
    0.05
}

fn default_skip_interval() -> f32 {
    0.1
}

fn default_skip_typing_factor() -> f32 {
    10.0
}

fn default_hop_height() -> f32 {
    20.0
}

fn default_hop_duration() -> f32 {
    0.3
}

fn default_primary_character() -> String {
    "Blake".to_string()
}

fn default_name_color() -> NameColor {
    NameColor::rgb(0x00, 0x00, 0x00)
}

fn default_name_colors() -> BTreeMap<String, NameColor> {
    [
        ("blake", NameColor::rgb(0xFF, 0x00, 0x00)),
        ("ava", NameColor::rgb(0xFF, 0x00, 0xFF)),
        ("jellyfish", NameColor::rgb(0xFF, 0xEB, 0x04)),
        ("lydia", NameColor::rgb(0x00, 0x00, 0xFF)),
        ("vivian", NameColor::rgb(0xFF, 0x80, 0x00)),
        ("jay", NameColor::rgb(0x80, 0x00, 0xFF)),
        ("noah", NameColor::rgb(0x00, 0xFF, 0x00)),
    ]
    .into_iter()
    .map(|(name, color)| (name.to_string(), color))
    .collect()
}
