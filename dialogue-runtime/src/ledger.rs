//! # Ledger 模块
//!
//! 记录每个对话来源（实体）每个节点的播放次数。
//!
//! ## 键的构成
//!
//! 键 = (实体 ID, 节点索引)，序列化形式为 `<entityId>_<nodeIndex>`。
//!
//! 实体 ID 优先使用作者指定的稳定 ID。稳定 ID 为空时回退到
//! 进程内分配的运行时 ID：它**不能**跨进程持久化，读档后不会
//! 与任何来源重新匹配。这是已知限制，不是 bug。

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::SnapshotKeyError;

/// 运行时 ID 的序列化前缀
const RUNTIME_ID_PREFIX: &str = "runtime#";

static NEXT_RUNTIME_ID: AtomicU64 = AtomicU64::new(1);

/// 实体标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityId {
    /// 作者指定的稳定 ID（可存档）
    Stable(String),
    /// 运行时分配的 ID（不可存档）
    Runtime(u64),
}

impl EntityId {
    /// 根据作者提供的稳定 ID 创建实体标识
    ///
    /// 空字符串回退到新分配的运行时 ID。
    pub fn from_stable_id(stable_id: &str) -> Self {
        if stable_id.is_empty() {
            Self::allocate_runtime()
        } else {
            Self::Stable(stable_id.to_string())
        }
    }

    /// 分配一个新的运行时 ID
    pub fn allocate_runtime() -> Self {
        Self::Runtime(NEXT_RUNTIME_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// 是否可以跨进程持久化
    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::Stable(_))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stable(id) => write!(f, "{}", id),
            Self::Runtime(n) => write!(f, "{}{}", RUNTIME_ID_PREFIX, n),
        }
    }
}

/// 播放计数键
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayCountKey {
    pub entity: EntityId,
    pub node_index: usize,
}

impl PlayCountKey {
    pub fn new(entity: EntityId, node_index: usize) -> Self {
        Self { entity, node_index }
    }
}

impl fmt::Display for PlayCountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.entity, self.node_index)
    }
}

impl FromStr for PlayCountKey {
    type Err = SnapshotKeyError;

    /// 以最后一个 `_` 分割，稳定 ID 本身可以包含 `_`
    ///
    /// 实体部分总是解析为稳定 ID：运行时 ID 读回后不与任何来源匹配。
    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let (entity, index) = key
            .rsplit_once('_')
            .ok_or_else(|| SnapshotKeyError::MissingSeparator {
                key: key.to_string(),
            })?;

        if entity.is_empty() {
            return Err(SnapshotKeyError::EmptyEntity {
                key: key.to_string(),
            });
        }

        let node_index = index
            .parse::<usize>()
            .map_err(|_| SnapshotKeyError::InvalidIndex {
                key: key.to_string(),
            })?;

        Ok(Self::new(EntityId::Stable(entity.to_string()), node_index))
    }
}

/// 播放计数账本
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayCountLedger {
    counts: HashMap<PlayCountKey, u32>,
}

impl PlayCountLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取播放次数（未记录为 0）
    pub fn get(&self, key: &PlayCountKey) -> u32 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// 设置播放次数
    pub fn set(&mut self, key: PlayCountKey, count: u32) {
        self.counts.insert(key, count);
    }

    /// 播放次数加一，返回新值
    pub fn increment(&mut self, key: PlayCountKey) -> u32 {
        let count = self.counts.entry(key).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// 清空账本
    pub fn clear(&mut self) {
        self.counts.clear();
    }

    /// 遍历所有记录（无序）
    pub fn iter(&self) -> impl Iterator<Item = (&PlayCountKey, u32)> {
        self.counts.iter().map(|(k, v)| (k, *v))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stable_id_falls_back_to_runtime() {
        let a = EntityId::from_stable_id("");
        let b = EntityId::from_stable_id("");

        assert!(!a.is_persistent());
        assert_ne!(a, b);
        assert!(EntityId::from_stable_id("ava").is_persistent());
    }

    #[test]
    fn test_key_display_and_parse() {
        let key = PlayCountKey::new(EntityId::Stable("old_lady".to_string()), 3);
        assert_eq!(key.to_string(), "old_lady_3");

        let parsed: PlayCountKey = "old_lady_3".parse().unwrap();
        assert_eq!(parsed, key);

        let restored: PlayCountKey = "runtime#12_0".parse().unwrap();
        assert_eq!(restored.entity, EntityId::Stable("runtime#12".to_string()));
        assert_ne!(restored.entity, EntityId::Runtime(12));
        assert_eq!(restored.node_index, 0);
    }

    #[test]
    fn test_key_parse_errors() {
        assert!(matches!(
            "nounderscore".parse::<PlayCountKey>(),
            Err(SnapshotKeyError::MissingSeparator { .. })
        ));
        assert!(matches!(
            "_4".parse::<PlayCountKey>(),
            Err(SnapshotKeyError::EmptyEntity { .. })
        ));
        assert!(matches!(
            "ava_x".parse::<PlayCountKey>(),
            Err(SnapshotKeyError::InvalidIndex { .. })
        ));
        assert!(matches!(
            "ava_-1".parse::<PlayCountKey>(),
            Err(SnapshotKeyError::InvalidIndex { .. })
        ));
    }

    #[test]
    fn test_ledger_increment() {
        let mut ledger = PlayCountLedger::new();
        let key = PlayCountKey::new(EntityId::Stable("ava".to_string()), 0);

        assert_eq!(ledger.get(&key), 0);
        assert_eq!(ledger.increment(key.clone()), 1);
        assert_eq!(ledger.increment(key.clone()), 2);
        assert_eq!(ledger.get(&key), 2);

        ledger.clear();
        assert!(ledger.is_empty());
        assert_eq!(ledger.get(&key), 0);
    }
}
