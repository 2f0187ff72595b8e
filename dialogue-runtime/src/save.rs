//! # Save 模块
//!
//! 存档/读档系统的数据模型。
//!
//! ## 设计原则
//!
//! - 所有存档数据必须可序列化（JSON）
//! - 必须有版本号，支持向后兼容检测
//! - 只保存对话进度（标记 + 播放计数）和历史，不保存进行中的会话

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SaveError;
use crate::history::History;
use crate::snapshot::DialogueSnapshot;

/// 存档格式版本
///
/// 版本号含义：
/// - MAJOR: 不兼容的格式变更
/// - MINOR: 向后兼容的新字段
pub const SAVE_VERSION_MAJOR: u32 = 1;
pub const SAVE_VERSION_MINOR: u32 = 0;

/// 存档版本信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveVersion {
    pub major: u32,
    pub minor: u32,
}

impl SaveVersion {
    /// 当前版本
    pub fn current() -> Self {
        Self {
            major: SAVE_VERSION_MAJOR,
            minor: SAVE_VERSION_MINOR,
        }
    }

    /// 检查是否兼容
    ///
    /// 兼容规则：
    /// - major 必须相同
    /// - minor 可以不同（向后兼容）
    pub fn is_compatible(&self) -> bool {
        self.major == SAVE_VERSION_MAJOR
    }
}

impl Default for SaveVersion {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for SaveVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// 存档元数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveMetadata {
    /// 存档槽位号（1-based）
    pub slot: u32,
    /// 保存时间（Unix 秒，由 Host 格式化显示）
    pub timestamp: u64,
    /// 存档说明（用于列表显示）
    #[serde(default)]
    pub label: Option<String>,
    /// 游戏时长（秒）
    #[serde(default)]
    pub play_time_secs: u64,
}

impl SaveMetadata {
    pub fn new(slot: u32) -> Self {
        Self {
            slot,
            timestamp: unix_now(),
            label: None,
            play_time_secs: 0,
        }
    }
}

/// 存档数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    /// 存档格式版本
    pub version: SaveVersion,
    /// 存档元数据
    pub metadata: SaveMetadata,
    /// 对话进度
    pub dialogue: DialogueSnapshot,
    /// 历史记录
    #[serde(default)]
    pub history: History,
}

impl SaveData {
    pub fn new(slot: u32, dialogue: DialogueSnapshot) -> Self {
        Self {
            version: SaveVersion::current(),
            metadata: SaveMetadata::new(slot),
            dialogue,
            history: History::new(),
        }
    }

    /// 设置存档说明
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.metadata.label = Some(label.into());
        self
    }

    /// 设置游戏时长
    pub fn with_play_time(mut self, secs: u64) -> Self {
        self.metadata.play_time_secs = secs;
        self
    }

    /// 设置历史记录
    pub fn with_history(mut self, history: History) -> Self {
        self.history = history;
        self
    }

    /// 序列化为 JSON 字符串
    pub fn to_json(&self) -> Result<String, SaveError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SaveError::SerializationFailed(e.to_string()))
    }

    /// 从 JSON 字符串反序列化
    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        let data: SaveData = serde_json::from_str(json)
            .map_err(|e| SaveError::DeserializationFailed(e.to_string()))?;

        if !data.version.is_compatible() {
            return Err(SaveError::IncompatibleVersion {
                save_version: data.version.to_string(),
                current_version: SaveVersion::current().to_string(),
            });
        }

        Ok(data)
    }
}

fn unix_now() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
