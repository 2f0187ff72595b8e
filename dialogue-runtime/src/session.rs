//! # Session 模块
//!
//! 对话上下文：把节点选择器、表现控制器和故事加载器组合在一起，
//! 处理"与实体交互"这一入口。
//!
//! ```text
//! interact(source)
//!   ├─ 会话进行中 → Busy（不做选择）
//!   ├─ select_and_commit → None → NothingToSay
//!   ├─ loader.load(script) → None → MissingStory（选择已提交）
//!   └─ begin_session → Started
//! ```

use tracing::{info, warn};

use crate::history::HistoryEvent;
use crate::input::FrameInput;
use crate::node::{DialogueSource, ScriptRef};
use crate::presentation::{PresentationController, PresentationEvent};
use crate::save::SaveData;
use crate::selector::NodeSelector;
use crate::snapshot::DialogueSnapshot;
use crate::story::StoryLoader;

/// 交互结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractOutcome {
    /// 开始播放脚本
    Started(ScriptRef),
    /// 没有可播放的节点
    NothingToSay,
    /// 已有会话进行中，本次交互被忽略
    Busy,
    /// 节点已选中但脚本无法加载
    MissingStory(ScriptRef),
}

/// 对话上下文
pub struct DialogueContext {
    selector: NodeSelector,
    presenter: PresentationController,
    loader: Box<dyn StoryLoader>,
}

impl DialogueContext {
    pub fn new(loader: impl StoryLoader + 'static, presenter: PresentationController) -> Self {
        Self {
            selector: NodeSelector::new(),
            presenter,
            loader: Box::new(loader),
        }
    }

    /// 与对话来源交互
    pub fn interact(&mut self, source: &mut DialogueSource) -> InteractOutcome {
        if self.presenter.is_active() {
            return InteractOutcome::Busy;
        }

        let Some(script) = self.selector.select_and_commit(source) else {
            return InteractOutcome::NothingToSay;
        };

        self.presenter
            .history_mut()
            .push(HistoryEvent::node_played(source.display_name(), script.as_str()));

        let Some(story) = self.loader.load(&script) else {
            warn!(source = %source.display_name(), script = %script, "找不到脚本，无法开始对话");
            return InteractOutcome::MissingStory(script);
        };

        info!(source = %source.display_name(), script = %script, "开始对话");
        self.presenter.begin_session(story);
        InteractOutcome::Started(script)
    }

    /// 推进一帧
    pub fn update(&mut self, input: FrameInput, dt: f32) {
        self.presenter.update(input, dt);
    }

    /// 取走表现层事件
    pub fn take_events(&mut self) -> Vec<PresentationEvent> {
        self.presenter.take_events()
    }

    /// 新游戏：清空进度与历史
    pub fn reset(&mut self) {
        self.presenter.end_session();
        self.selector.reset();
        self.presenter.history_mut().clear();
    }

    pub fn snapshot(&self) -> DialogueSnapshot {
        self.selector.snapshot()
    }

    pub fn restore(&mut self, snapshot: &DialogueSnapshot) {
        self.selector.restore(snapshot);
    }

    /// 生成存档数据
    pub fn to_save_data(&self, slot: u32) -> SaveData {
        SaveData::new(slot, self.snapshot()).with_history(self.presenter.history().clone())
    }

    /// 应用存档数据
    ///
    /// 进行中的会话会被结束。
    pub fn apply_save_data(&mut self, save: &SaveData) {
        self.presenter.end_session();
        self.selector.restore(&save.dialogue);
        *self.presenter.history_mut() = save.history.clone();
        info!(slot = save.metadata.slot, "已读取存档");
    }

    pub fn is_in_dialogue(&self) -> bool {
        self.presenter.is_active()
    }

    pub fn selector(&self) -> &NodeSelector {
        &self.selector
    }

    pub fn selector_mut(&mut self) -> &mut NodeSelector {
        &mut self.selector
    }

    pub fn presenter(&self) -> &PresentationController {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut PresentationController {
        &mut self.presenter
    }
}
