//! # Node 模块
//!
//! 对话节点与对话来源的静态数据模型。
//!
//! - [`DialogueNode`]：作者定义的一段可选对话内容及其门槛
//! - [`DialogueSource`]：一个可交互实体持有的有序节点列表
//!
//! 节点顺序即优先级：选择时从前往后扫描，第一个满足条件的节点胜出。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ledger::{EntityId, PlayCountKey};

/// 无限播放次数
pub const UNLIMITED_PLAYS: i32 = -1;

/// 脚本引用
///
/// 对故事引擎而言是不透明的内容句柄，由 [`crate::story::StoryLoader`] 解析。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScriptRef(String);

impl ScriptRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScriptRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScriptRef {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// 对话节点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueNode {
    /// 选中后要播放的脚本
    pub script: ScriptRef,
    /// 必须全部存在的标记（空列表表示无门槛）
    pub required_flags: Vec<String>,
    /// 选中时设置的标记
    pub unlocks_flags: Vec<String>,
    /// 最大播放次数，负数表示无限
    pub max_plays: i32,
}

impl DialogueNode {
    /// 创建无门槛、无限次数的节点
    pub fn new(script: impl Into<ScriptRef>) -> Self {
        Self {
            script: script.into(),
            required_flags: Vec::new(),
            unlocks_flags: Vec::new(),
            max_plays: UNLIMITED_PLAYS,
        }
    }

    /// 添加前置标记
    pub fn requires(mut self, flag: impl Into<String>) -> Self {
        self.required_flags.push(flag.into());
        self
    }

    /// 添加解锁标记
    pub fn unlocks(mut self, flag: impl Into<String>) -> Self {
        self.unlocks_flags.push(flag.into());
        self
    }

    /// 设置最大播放次数
    pub fn with_max_plays(mut self, max_plays: i32) -> Self {
        self.max_plays = max_plays;
        self
    }

    /// 是否无限次数
    pub fn is_unlimited(&self) -> bool {
        self.max_plays < 0
    }

    /// 是否没有任何前置标记（空字符串不算）
    pub fn has_no_requirements(&self) -> bool {
        self.required_flags.iter().all(String::is_empty)
    }
}

/// 节点被选中时的回调，参数为节点索引
pub type NodePlayedCallback = Box<dyn FnMut(usize)>;

/// 对话来源（可交互实体）
///
/// 节点槽位可以为空（作者内容中的 `null` 条目）：空槽位保留索引，
/// 选择时跳过，这样后续节点的存档键保持稳定。
pub struct DialogueSource {
    display_name: String,
    entity: EntityId,
    slots: Vec<Option<DialogueNode>>,
    on_node_played: Option<NodePlayedCallback>,
}

impl DialogueSource {
    /// 创建对话来源
    ///
    /// `stable_id` 为空时使用运行时 ID，播放计数不能存档。
    pub fn new(display_name: impl Into<String>, stable_id: &str) -> Self {
        Self {
            display_name: display_name.into(),
            entity: EntityId::from_stable_id(stable_id),
            slots: Vec::new(),
            on_node_played: None,
        }
    }

    /// 追加节点
    pub fn with_node(mut self, node: DialogueNode) -> Self {
        self.slots.push(Some(node));
        self
    }

    /// 追加空槽位
    pub fn with_vacant_slot(mut self) -> Self {
        self.slots.push(None);
        self
    }

    /// 追加槽位
    pub fn push_slot(&mut self, node: Option<DialogueNode>) {
        self.slots.push(node);
    }

    /// 设置节点选中回调
    pub fn on_node_played(mut self, callback: impl FnMut(usize) + 'static) -> Self {
        self.on_node_played = Some(Box::new(callback));
        self
    }

    /// 替换节点选中回调
    pub fn set_on_node_played(&mut self, callback: impl FnMut(usize) + 'static) {
        self.on_node_played = Some(Box::new(callback));
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn entity(&self) -> &EntityId {
        &self.entity
    }

    /// 稳定 ID（运行时 ID 返回 None）
    pub fn stable_id(&self) -> Option<&str> {
        match &self.entity {
            EntityId::Stable(id) => Some(id),
            EntityId::Runtime(_) => None,
        }
    }

    /// 槽位数量（包括空槽位）
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// 获取指定索引的节点
    pub fn node(&self, index: usize) -> Option<&DialogueNode> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// 按顺序遍历非空节点
    pub fn nodes(&self) -> impl Iterator<Item = (usize, &DialogueNode)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|node| (i, node)))
    }

    /// 节点的播放计数键
    pub fn play_count_key(&self, index: usize) -> PlayCountKey {
        PlayCountKey::new(self.entity.clone(), index)
    }

    pub(crate) fn notify_node_played(&mut self, index: usize) {
        if let Some(callback) = self.on_node_played.as_mut() {
            callback(index);
        }
    }
}

impl fmt::Debug for DialogueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogueSource")
            .field("display_name", &self.display_name)
            .field("entity", &self.entity)
            .field("slots", &self.slots)
            .field("has_callback", &self.on_node_played.is_some())
            .finish()
    }
}
