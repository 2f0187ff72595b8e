//! # Camera 模块
//!
//! 根据游戏模式切换相机。
//!
//! 切换分两步：
//!
//! 1. 立即启用当前模式的相机，禁用另一个
//! 2. 下一帧 `update` 时设置优先级（活动相机高，另一个低）

use dialogue_runtime::GameMode;
use tracing::debug;

use crate::config::CameraConfig;

/// 支持优先级的相机
pub trait PriorityCamera {
    fn set_enabled(&mut self, enabled: bool);
    fn set_priority(&mut self, priority: i32);
}

/// 无渲染环境下的相机，只记录状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessCamera {
    pub name: String,
    pub enabled: bool,
    pub priority: i32,
}

impl HeadlessCamera {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: false,
            priority: 0,
        }
    }
}

impl PriorityCamera for HeadlessCamera {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        debug!(camera = %self.name, enabled, "相机启用状态变更");
    }

    fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
        debug!(camera = %self.name, priority, "相机优先级变更");
    }
}

/// 相机调度
pub struct CameraDirector<C: PriorityCamera> {
    walk: C,
    visual_novel: C,
    config: CameraConfig,
    mode: Option<GameMode>,
    pending: Option<GameMode>,
}

impl<C: PriorityCamera> CameraDirector<C> {
    pub fn new(walk: C, visual_novel: C, config: CameraConfig) -> Self {
        Self {
            walk,
            visual_novel,
            config,
            mode: None,
            pending: None,
        }
    }

    /// 游戏模式变化时调用；模式未变时不做任何事
    pub fn on_mode_changed(&mut self, mode: GameMode) {
        if self.mode != Some(mode) {
            self.switch_to(mode);
        }
    }

    /// 强制切换到指定模式的相机
    pub fn switch_to(&mut self, mode: GameMode) {
        let (active, inactive) = self.split_mut(mode);
        active.set_enabled(true);
        inactive.set_enabled(false);
        self.mode = Some(mode);
        self.pending = Some(mode);
    }

    /// 每帧调用：应用上一帧排队的优先级
    pub fn update(&mut self) {
        let Some(mode) = self.pending.take() else {
            return;
        };
        let (active_priority, inactive_priority) =
            (self.config.active_priority, self.config.inactive_priority);
        let (active, inactive) = self.split_mut(mode);
        active.set_priority(active_priority);
        inactive.set_priority(inactive_priority);
    }

    fn split_mut(&mut self, mode: GameMode) -> (&mut C, &mut C) {
        match mode {
            GameMode::Walk => (&mut self.walk, &mut self.visual_novel),
            GameMode::VisualNovel => (&mut self.visual_novel, &mut self.walk),
        }
    }

    pub fn mode(&self) -> Option<GameMode> {
        self.mode
    }

    pub fn has_pending_priority(&self) -> bool {
        self.pending.is_some()
    }

    pub fn camera(&self, mode: GameMode) -> &C {
        match mode {
            GameMode::Walk => &self.walk,
            GameMode::VisualNovel => &self.visual_novel,
        }
    }
}
