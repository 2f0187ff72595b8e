//! # Selector 模块
//!
//! 节点选择器：根据全局标记与播放计数，为对话来源挑选下一个要播放的节点。
//!
//! ## 选择规则
//!
//! ```text
//! eligible(node) = 所有 required_flags 都已设置
//!                  && (max_plays < 0 || play_count < max_plays)
//! ```
//!
//! 按节点顺序扫描，第一个 eligible 的节点胜出。选中后：
//!
//! 1. 播放计数 +1
//! 2. 设置所有 unlocks_flags
//! 3. 通知来源的节点回调
//!
//! 判定阶段是纯函数，提交阶段不会失败，因此调用方看到的要么是
//! 全部副作用，要么什么都没发生。

use tracing::debug;

use crate::flags::FlagStore;
use crate::ledger::PlayCountLedger;
use crate::node::{DialogueNode, DialogueSource, ScriptRef};
use crate::snapshot::DialogueSnapshot;

/// 节点被拒绝的原因
#[derive(Debug, Clone, PartialEq, Eq)]
enum Rejection {
    MissingFlag(String),
    Exhausted { played: u32, max_plays: i32 },
}

/// 节点选择器
///
/// 独占标记存储与播放计数账本。
#[derive(Debug, Clone, Default)]
pub struct NodeSelector {
    flags: FlagStore,
    ledger: PlayCountLedger,
}

impl NodeSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 判断指定节点当前是否可播放（不修改状态）
    ///
    /// 空槽位或越界索引返回 false。
    pub fn is_eligible(&self, source: &DialogueSource, index: usize) -> bool {
        source
            .node(index)
            .is_some_and(|node| self.evaluate(source, index, node).is_ok())
    }

    /// 返回第一个可播放节点的索引（不修改状态）
    pub fn peek(&self, source: &DialogueSource) -> Option<usize> {
        source
            .nodes()
            .find(|(index, node)| self.evaluate(source, *index, node).is_ok())
            .map(|(index, _)| index)
    }

    /// 选择并提交
    ///
    /// 返回选中节点的脚本引用；没有可播放节点时返回 None 且不修改任何状态。
    pub fn select_and_commit(&mut self, source: &mut DialogueSource) -> Option<ScriptRef> {
        debug!(
            source = %source.display_name(),
            flags = ?self.flags.iter().collect::<Vec<_>>(),
            "开始选择对话节点"
        );

        let mut selected = None;
        for (index, node) in source.nodes() {
            match self.evaluate(source, index, node) {
                Ok(()) => {
                    selected = Some(index);
                    break;
                }
                Err(Rejection::MissingFlag(flag)) => {
                    debug!(index, flag = %flag, "节点被拒绝：缺少前置标记");
                }
                Err(Rejection::Exhausted { played, max_plays }) => {
                    debug!(index, played, max_plays, "节点被拒绝：播放次数已用尽");
                }
            }
        }

        let Some(index) = selected else {
            debug!(source = %source.display_name(), "没有可播放的节点");
            return None;
        };

        let node = source.node(index)?.clone();
        let count = self.ledger.increment(source.play_count_key(index));
        for flag in &node.unlocks_flags {
            self.flags.set(flag);
        }
        debug!(index, script = %node.script, play_count = count, "节点已选中");

        source.notify_node_played(index);
        Some(node.script)
    }

    fn evaluate(
        &self,
        source: &DialogueSource,
        index: usize,
        node: &DialogueNode,
    ) -> Result<(), Rejection> {
        if let Some(missing) = node
            .required_flags
            .iter()
            .find(|flag| !flag.is_empty() && !self.flags.contains(flag))
        {
            return Err(Rejection::MissingFlag(missing.clone()));
        }

        if !node.is_unlimited() {
            let played = self.ledger.get(&source.play_count_key(index));
            if i64::from(played) >= i64::from(node.max_plays) {
                return Err(Rejection::Exhausted {
                    played,
                    max_plays: node.max_plays,
                });
            }
        }

        Ok(())
    }

    /// 指定节点的播放次数
    pub fn play_count(&self, source: &DialogueSource, index: usize) -> u32 {
        self.ledger.get(&source.play_count_key(index))
    }

    /// 设置标记（外部事件使用）
    pub fn set_flag(&mut self, flag: &str) {
        self.flags.set(flag);
    }

    /// 清除标记
    pub fn clear_flag(&mut self, flag: &str) {
        self.flags.clear(flag);
    }

    /// 标记是否存在
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn flags(&self) -> &FlagStore {
        &self.flags
    }

    /// 清空所有标记与播放计数
    pub fn reset(&mut self) {
        self.flags.clear_all();
        self.ledger.clear();
        debug!("对话进度已重置");
    }

    /// 导出快照
    pub fn snapshot(&self) -> DialogueSnapshot {
        DialogueSnapshot::capture(&self.flags, &self.ledger)
    }

    /// 从快照恢复（完全替换当前状态，不合并）
    pub fn restore(&mut self, snapshot: &DialogueSnapshot) {
        let (flags, ledger) = snapshot.rebuild();
        self.flags = flags;
        self.ledger = ledger;
        debug!(
            flags = self.flags.len(),
            play_counts = self.ledger.len(),
            "对话进度已从快照恢复"
        );
    }
}
