//! 故事行标签解析
//!
//! 标签格式为 `key: value`，按 `:` 分割后两侧去空白，必须恰好两段。
//! 不符合格式的标签直接丢弃。

/// 解析后的标签
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// `speaker: <name>`
    Speaker(String),
    /// `sprite: <name>`
    Sprite(String),
    /// `third_sprite: <name>`
    ThirdSprite(String),
    /// 格式正确但未识别的键
    Unknown { key: String, value: String },
}

impl Tag {
    /// 解析原始标签，格式错误返回 None
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split(':');
        let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
            return None;
        };
        let value = value.trim().to_string();

        Some(match key.trim() {
            "speaker" => Self::Speaker(value),
            "sprite" => Self::Sprite(value),
            "third_sprite" => Self::ThirdSprite(value),
            other => Self::Unknown {
                key: other.to_string(),
                value,
            },
        })
    }
}
