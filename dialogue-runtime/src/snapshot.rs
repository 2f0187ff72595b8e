//! # Snapshot 模块
//!
//! 对话进度（标记 + 播放计数）的扁平可序列化快照。
//!
//! ```json
//! {
//!   "flags": ["met_ava", "met_lydia"],
//!   "play_counts": { "ava_0": 1, "lydia_2": 3 }
//! }
//! ```
//!
//! 标记按字典序排列，播放计数按键排序，同一状态的快照输出稳定。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::flags::FlagStore;
use crate::ledger::{PlayCountKey, PlayCountLedger};

/// 对话进度快照
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueSnapshot {
    /// 已设置的标记
    #[serde(default)]
    pub flags: Vec<String>,
    /// 播放计数：`<entityId>_<nodeIndex>` -> 次数
    #[serde(default)]
    pub play_counts: BTreeMap<String, u32>,
}

impl DialogueSnapshot {
    /// 从当前状态捕获快照
    pub fn capture(flags: &FlagStore, ledger: &PlayCountLedger) -> Self {
        Self {
            flags: flags.iter().map(str::to_string).collect(),
            play_counts: ledger
                .iter()
                .map(|(key, count)| (key.to_string(), count))
                .collect(),
        }
    }

    /// 重建标记存储与播放计数账本
    ///
    /// 格式错误的键会被跳过并记录警告，不会导致整个快照失效。
    pub fn rebuild(&self) -> (FlagStore, PlayCountLedger) {
        let flags = self.flags.iter().map(String::as_str).collect();

        let mut ledger = PlayCountLedger::new();
        for (raw_key, count) in &self.play_counts {
            match raw_key.parse::<PlayCountKey>() {
                Ok(key) => ledger.set(key, *count),
                Err(e) => warn!(key = %raw_key, error = %e, "跳过无效的播放计数键"),
            }
        }

        (flags, ledger)
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty() && self.play_counts.is_empty()
    }
}
