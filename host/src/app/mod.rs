//! # App 模块
//!
//! 应用状态与主循环逻辑。
//!
//! 每条终端命令被展开为若干帧，每帧：
//!
//! 1. 相机应用上一帧排队的优先级
//! 2. `DialogueContext::update(input, dt)`
//! 3. 取走表现层事件，同步相机模式并输出文本

mod save;

pub use save::*;

use std::fs;
use std::path::PathBuf;

use dialogue_runtime::{
    ContentError, ContentPack, DialogueContext, DialogueSource, DiagnosticLevel, FrameInput,
    HistoryEvent, InteractOutcome, PresentationController, PresentationEvent, analyze_content,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::camera::{CameraDirector, HeadlessCamera};
use crate::config::AppConfig;
use crate::input::HostCommand;
use crate::save_manager::SaveManager;

/// 启动错误
#[derive(Error, Debug)]
pub enum HostError {
    #[error("无法读取内容包 {path:?}: {source}")]
    ContentIo {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Content(#[from] ContentError),
}

/// 命令执行后的控制流
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// 应用状态
pub struct AppState {
    pub config: AppConfig,
    pub context: DialogueContext,
    pub sources: Vec<DialogueSource>,
    pub cameras: CameraDirector<HeadlessCamera>,
    pub save_manager: SaveManager,
    /// 累计模拟时长（秒）
    pub play_time: f64,
    /// 待输出的文本
    output: Vec<String>,
}

impl AppState {
    /// 从配置加载内容包并创建应用
    pub fn new(config: AppConfig) -> Result<Self, HostError> {
        let path = config.content_path.clone();
        let json = fs::read_to_string(&path).map_err(|source| HostError::ContentIo {
            path: path.clone(),
            source,
        })?;
        let pack = ContentPack::from_json(&json)?;
        info!(path = %path.display(), sources = pack.sources.len(), scripts = pack.scripts.len(), "内容包加载成功");
        Ok(Self::from_content(config, pack))
    }

    /// 从已解析的内容包创建应用
    pub fn from_content(config: AppConfig, pack: ContentPack) -> Self {
        log_diagnostics(&pack);

        let parts = pack.into_parts();
        let presenter = PresentationController::new(config.presentation.clone(), parts.sprites);
        let context = DialogueContext::new(parts.library, presenter);

        let mut sources = parts.sources;
        for source in &mut sources {
            let name = source.display_name().to_string();
            source.set_on_node_played(move |index| {
                debug!(source = %name, index, "对话节点已播放");
            });
        }

        let mut cameras = CameraDirector::new(
            HeadlessCamera::new("walk"),
            HeadlessCamera::new("visual_novel"),
            config.camera.clone(),
        );
        cameras.switch_to(context.presenter().mode());

        let save_manager = SaveManager::new(&config.saves_dir);

        Self {
            config,
            context,
            sources,
            cameras,
            save_manager,
            play_time: 0.0,
            output: Vec::new(),
        }
    }

    /// 执行一条命令
    pub fn execute(&mut self, command: HostCommand) -> Flow {
        match command {
            HostCommand::Interact(target) => self.interact(&target),
            HostCommand::Submit | HostCommand::Skip(_) | HostCommand::Wait(_) => {
                for input in command.frames(self.config.frame_dt) {
                    self.step(input);
                }
            }
            HostCommand::SetFlag(flag) => {
                self.context.selector_mut().set_flag(&flag);
                self.emit(format!("+ {}", flag));
            }
            HostCommand::ClearFlag(flag) => {
                self.context.selector_mut().clear_flag(&flag);
                self.emit(format!("- {}", flag));
            }
            HostCommand::Flags => {
                let flags: Vec<&str> = self.context.selector().flags().iter().collect();
                let line = if flags.is_empty() {
                    "(无标记)".to_string()
                } else {
                    flags.join(", ")
                };
                self.emit(line);
            }
            HostCommand::History(count) => self.show_history(count),
            HostCommand::Save(slot) => self.save_slot(slot),
            HostCommand::Load(slot) => self.load_slot(slot),
            HostCommand::Saves => self.list_saves(),
            HostCommand::Reset => {
                self.context.reset();
                self.play_time = 0.0;
                self.drain_events();
                self.emit("进度已重置");
            }
            HostCommand::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// 推进一帧
    pub fn step(&mut self, input: FrameInput) {
        let dt = self.config.frame_dt;
        self.cameras.update();
        self.context.update(input, dt);
        self.play_time += f64::from(dt);
        self.drain_events();
    }

    fn interact(&mut self, target: &str) {
        let Some(index) = self.find_source(target) else {
            self.emit(format!("没有找到对象: {}", target));
            return;
        };

        let source = &mut self.sources[index];
        let name = source.display_name().to_string();
        match self.context.interact(source) {
            InteractOutcome::Started(_) => {}
            InteractOutcome::NothingToSay => self.emit(format!("{} 没有什么要说的", name)),
            InteractOutcome::Busy => self.emit("对话进行中"),
            InteractOutcome::MissingStory(script) => {
                self.emit(format!("脚本缺失: {}", script))
            }
        }
        self.drain_events();
    }

    /// 按稳定 ID 或名字（大小写不敏感）查找对象
    fn find_source(&self, target: &str) -> Option<usize> {
        self.sources
            .iter()
            .position(|s| s.stable_id() == Some(target))
            .or_else(|| {
                self.sources
                    .iter()
                    .position(|s| s.display_name().eq_ignore_ascii_case(target))
            })
    }

    fn drain_events(&mut self) {
        for event in self.context.take_events() {
            if let PresentationEvent::ModeChanged { mode } = &event {
                self.cameras.on_mode_changed(*mode);
            }
            if let Some(line) = render_event(&event) {
                self.emit(line);
            }
        }
    }

    fn show_history(&mut self, count: usize) {
        let lines: Vec<String> = self
            .context
            .presenter()
            .history()
            .recent_lines(count)
            .into_iter()
            .filter_map(|event| match event {
                HistoryEvent::Line {
                    speaker: Some(speaker),
                    text,
                    ..
                } => Some(format!("{}: {}", speaker, text)),
                HistoryEvent::Line {
                    speaker: None,
                    text,
                    ..
                } => Some(text.clone()),
                HistoryEvent::NodePlayed { .. } => None,
            })
            .collect();
        for line in lines {
            self.emit(line);
        }
    }

    fn emit(&mut self, line: impl Into<String>) {
        self.output.push(line.into());
    }

    /// 取走待输出的文本
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }
}

/// 终端显示用的事件文本
fn render_event(event: &PresentationEvent) -> Option<String> {
    match event {
        PresentationEvent::LineStarted {
            speaker: Some(speaker),
            text,
        } => Some(format!("{}: {}", speaker, text)),
        PresentationEvent::LineStarted {
            speaker: None,
            text,
        } => Some(text.clone()),
        PresentationEvent::SpeakerChanged { .. } => None,
        other => Some(format!("[{}]", other)),
    }
}

fn log_diagnostics(pack: &ContentPack) {
    let result = analyze_content(pack);
    for diagnostic in &result.diagnostics {
        match diagnostic.level {
            DiagnosticLevel::Error | DiagnosticLevel::Warn => {
                warn!(diagnostic = %diagnostic, "内容检查")
            }
            DiagnosticLevel::Info => debug!(diagnostic = %diagnostic, "内容检查"),
        }
    }
    if !result.is_empty() {
        info!(
            errors = result.error_count(),
            warnings = result.warn_count(),
            "内容检查完成"
        );
    }
}
