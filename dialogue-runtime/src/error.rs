//! # Error 模块
//!
//! 定义 dialogue-runtime 中使用的错误类型。
//!
//! 运行时操作（选择节点、推进对话、打字机）不返回错误：
//! 配置缺失只记录警告，误用是安全的 no-op。
//! 错误只出现在数据格式边界（内容包、存档、快照键）。

use thiserror::Error;

/// 内容包错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContentError {
    /// JSON 解析失败
    #[error("内容包解析失败: {0}")]
    Parse(String),

    /// 脚本 ID 重复
    #[error("脚本 '{id}' 重复定义")]
    DuplicateScript { id: String },
}

/// 快照键错误
///
/// 快照中的播放计数键格式为 `<entityId>_<nodeIndex>`。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotKeyError {
    /// 缺少 `_` 分隔符
    #[error("快照键 '{key}' 缺少 '_' 分隔符")]
    MissingSeparator { key: String },

    /// 实体 ID 为空
    #[error("快照键 '{key}' 的实体 ID 为空")]
    EmptyEntity { key: String },

    /// 节点索引不是非负整数
    #[error("快照键 '{key}' 的节点索引无效")]
    InvalidIndex { key: String },
}

/// 存档错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SaveError {
    /// 序列化失败
    #[error("序列化失败: {0}")]
    SerializationFailed(String),

    /// 反序列化失败
    #[error("反序列化失败: {0}")]
    DeserializationFailed(String),

    /// 版本不兼容
    #[error("存档版本不兼容: 存档版本 {save_version} vs 当前版本 {current_version}")]
    IncompatibleVersion {
        save_version: String,
        current_version: String,
    },

    /// 文件操作失败
    #[error("文件操作失败: {0}")]
    IoError(String),

    /// 存档不存在
    #[error("存档不存在: {0}")]
    NotFound(String),
}

/// 颜色解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("无效的颜色值 '{value}'，应为 #RRGGBB")]
pub struct ColorParseError {
    pub value: String,
}
