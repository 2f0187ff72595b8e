//! 表现控制器
//!
//! 持有唯一的活动会话，从故事引擎拉取文本行，驱动打字机与跳过状态机。
//!
//! ## 状态
//!
//! ```text
//! Idle ──begin_session──▶ Active{typing?, skipping?} ──故事结束──▶ Idle
//! ```
//!
//! ## 单帧顺序（`update`）
//!
//! 1. 立绘跳动计时
//! 2. 输入处理：按住跳过时先强制完成打字，之后按固定节奏推进；
//!    否则确认键在打字时完成本行，不在打字时推进
//! 3. 本帧没有推进时，打字机计时
//!
//! 一帧内最多一次推进或一次字符显示。强制完成打字的那一帧不推进。

use tracing::{debug, warn};

use super::event::{GameMode, PresentationEvent};
use super::portrait::{Hop, Portrait, PortraitSlot, SpriteCatalog};
use super::speaker::speaker_label;
use super::tag::Tag;
use super::typewriter::Typewriter;
use crate::config::PresentationConfig;
use crate::history::{History, HistoryEvent};
use crate::input::FrameInput;
use crate::story::StoryEngine;

/// 表现控制器
pub struct PresentationController {
    config: PresentationConfig,
    sprites: SpriteCatalog,
    story: Option<Box<dyn StoryEngine>>,
    mode: GameMode,
    typewriter: Typewriter,
    /// 显示用的说话者标签
    speaker_label: String,
    /// 用于判断说话者是否切换
    current_speaker: String,
    portraits: [Portrait; 3],
    skipping: bool,
    skip_timer: f32,
    events: Vec<PresentationEvent>,
    history: History,
}

impl PresentationController {
    pub fn new(config: PresentationConfig, sprites: SpriteCatalog) -> Self {
        Self {
            config,
            sprites,
            story: None,
            mode: GameMode::Walk,
            typewriter: Typewriter::default(),
            speaker_label: String::new(),
            current_speaker: String::new(),
            portraits: Default::default(),
            skipping: false,
            skip_timer: 0.0,
            events: Vec::new(),
            history: History::new(),
        }
    }

    /// 替换历史记录容器（例如设置不同的上限）
    pub fn with_history(mut self, history: History) -> Self {
        self.history = history;
        self
    }

    // ========== 会话 ==========

    /// 开始会话
    ///
    /// 已有活动会话时不做任何事并返回 false。
    pub fn begin_session(&mut self, story: Box<dyn StoryEngine>) -> bool {
        if self.is_active() {
            warn!("已有对话正在进行，忽略新的会话");
            return false;
        }

        self.story = Some(story);
        self.set_mode(GameMode::VisualNovel);
        self.advance();
        true
    }

    /// 推进到下一行；故事结束时结束会话
    pub fn advance(&mut self) {
        let Some(story) = self.story.as_mut() else {
            return;
        };

        if !story.can_continue() {
            self.end_session();
            return;
        }

        let line = story.continue_line();
        for raw in &line.tags {
            match Tag::parse(raw) {
                Some(tag) => self.apply_tag(tag),
                None => debug!(tag = %raw, "丢弃格式错误的标签"),
            }
        }

        if self.config.enable_typewriter {
            let interval = self.typing_interval();
            self.typewriter.start(line.text.as_str(), interval);
        } else {
            self.typewriter.show(line.text.as_str());
        }

        let speaker = (!self.current_speaker.is_empty()).then(|| self.current_speaker.clone());
        self.history
            .push(HistoryEvent::line(speaker.clone(), line.text.as_str()));
        self.events.push(PresentationEvent::LineStarted {
            speaker,
            text: line.text,
        });
    }

    /// 立即显示整行；不在打字时是 no-op
    pub fn complete_typewriter(&mut self) {
        self.typewriter.complete();
    }

    /// 结束会话；空闲时是 no-op
    pub fn end_session(&mut self) {
        if self.story.take().is_none() {
            return;
        }

        self.typewriter.clear();
        self.speaker_label.clear();
        self.current_speaker.clear();
        for portrait in &mut self.portraits {
            portrait.hide();
        }
        self.skipping = false;
        self.skip_timer = 0.0;

        self.set_mode(GameMode::Walk);
        self.events.push(PresentationEvent::SessionEnded);
        debug!("对话会话结束");
    }

    // ========== 每帧更新 ==========

    /// 推进一帧
    pub fn update(&mut self, input: FrameInput, dt: f32) {
        if !self.is_active() {
            return;
        }

        for portrait in &mut self.portraits {
            portrait.tick(dt);
        }

        let mut advanced = false;
        if input.skip_held {
            self.skipping = true;
            let completed_now = self.typewriter.complete();
            self.skip_timer -= dt;
            if self.skip_timer <= 0.0 && !completed_now {
                self.skip_timer = self.config.skip_interval;
                self.advance();
                advanced = true;
            }
        } else {
            self.skipping = false;
            self.skip_timer = 0.0;
            if input.submit_pressed {
                if self.typewriter.is_typing() {
                    self.typewriter.complete();
                } else {
                    self.advance();
                    advanced = true;
                }
            }
        }

        if !advanced {
            let interval = self.typing_interval();
            self.typewriter.tick(dt, interval);
        }
    }

    fn typing_interval(&self) -> f32 {
        if self.skipping {
            self.config.skipping_typewriter_interval()
        } else {
            self.config.typewriter_interval
        }
    }

    // ========== 标签 ==========

    fn apply_tag(&mut self, tag: Tag) {
        match tag {
            Tag::Speaker(name) => self.set_speaker(name),
            Tag::Sprite(name) => {
                let slot = if name.starts_with(self.config.primary_character.as_str()) {
                    PortraitSlot::Left
                } else {
                    PortraitSlot::Right
                };
                self.set_portrait(slot, name);
            }
            Tag::ThirdSprite(name) => self.set_portrait(PortraitSlot::Center, name),
            Tag::Unknown { key, value } => {
                debug!(key = %key, value = %value, "未处理的标签");
            }
        }
    }

    fn set_speaker(&mut self, name: String) {
        if name.is_empty() {
            debug!("忽略空的说话者标签");
            return;
        }

        self.speaker_label = speaker_label(&name, &self.config);
        self.events.push(PresentationEvent::SpeakerChanged {
            name: name.clone(),
            label: self.speaker_label.clone(),
        });

        if self.current_speaker != name {
            if !self.skipping {
                self.trigger_hop(&name);
            }
            self.current_speaker = name;
        }
    }

    fn trigger_hop(&mut self, speaker: &str) {
        let slot = if speaker == self.config.primary_character {
            PortraitSlot::Left
        } else {
            PortraitSlot::Right
        };

        let portrait = &mut self.portraits[slot.index()];
        if portrait.sprite.is_some() {
            portrait.hop = Some(Hop::new(self.config.hop_height, self.config.hop_duration));
            self.events.push(PresentationEvent::HopStarted { slot });
        }
    }

    fn set_portrait(&mut self, slot: PortraitSlot, sprite: String) {
        if !self.sprites.contains(&sprite) {
            warn!(sprite = %sprite, slot = %slot, "立绘不存在，保持原状");
            return;
        }

        let portrait = &mut self.portraits[slot.index()];
        portrait.sprite = Some(sprite.clone());
        portrait.visible = true;
        self.events
            .push(PresentationEvent::PortraitChanged { slot, sprite });
    }

    fn set_mode(&mut self, mode: GameMode) {
        if self.mode != mode {
            self.mode = mode;
            self.events.push(PresentationEvent::ModeChanged { mode });
        }
    }

    // ========== 查询 ==========

    pub fn is_active(&self) -> bool {
        self.story.is_some()
    }

    pub fn is_typing(&self) -> bool {
        self.typewriter.is_typing()
    }

    pub fn is_skipping(&self) -> bool {
        self.skipping
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// 当前显示的文本（打字时为部分）
    pub fn displayed_text(&self) -> &str {
        self.typewriter.visible_text()
    }

    /// 当前行完整文本
    pub fn full_text(&self) -> &str {
        self.typewriter.content()
    }

    pub fn speaker_label(&self) -> &str {
        &self.speaker_label
    }

    pub fn current_speaker(&self) -> Option<&str> {
        (!self.current_speaker.is_empty()).then_some(self.current_speaker.as_str())
    }

    pub fn portrait(&self, slot: PortraitSlot) -> &Portrait {
        &self.portraits[slot.index()]
    }

    pub fn hop_offset(&self, slot: PortraitSlot) -> f32 {
        self.portrait(slot).hop_offset()
    }

    pub fn config(&self) -> &PresentationConfig {
        &self.config
    }

    pub fn sprites(&self) -> &SpriteCatalog {
        &self.sprites
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// 取走本帧积累的事件
    pub fn take_events(&mut self) -> Vec<PresentationEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::{ScriptedStory, StoryLine};

    const DT: f32 = 0.01;

    fn controller() -> PresentationController {
        let sprites: SpriteCatalog = ["Blake_neutral", "Ava_happy", "Jellyfish"]
            .into_iter()
            .collect();
        PresentationController::new(PresentationConfig::default(), sprites)
    }

    fn story(lines: Vec<StoryLine>) -> Box<dyn StoryEngine> {
        Box::new(ScriptedStory::new(lines))
    }

    fn two_lines() -> Box<dyn StoryEngine> {
        story(vec![
            StoryLine::new("First line")
                .with_tag("speaker: Ava")
                .with_tag("sprite: Ava_happy"),
            StoryLine::new("Second line").with_tag("speaker: Blake"),
        ])
    }

    #[test]
    fn test_begin_session_enters_visual_novel() {
        let mut pc = controller();
        assert!(pc.begin_session(two_lines()));

        assert!(pc.is_active());
        assert!(pc.is_typing());
        assert_eq!(pc.mode(), GameMode::VisualNovel);
        assert_eq!(pc.displayed_text(), "");
        assert_eq!(pc.full_text(), "First line");
        assert_eq!(pc.speaker_label(), "<color=#FF00FF>Ava</color>");
        assert_eq!(pc.current_speaker(), Some("Ava"));
    }

    #[test]
    fn test_empty_story_ends_immediately() {
        let mut pc = controller();
        pc.begin_session(story(Vec::new()));

        assert!(!pc.is_active());
        assert_eq!(pc.mode(), GameMode::Walk);
        assert_eq!(
            pc.take_events(),
            vec![
                PresentationEvent::ModeChanged {
                    mode: GameMode::VisualNovel
                },
                PresentationEvent::ModeChanged {
                    mode: GameMode::Walk
                },
                PresentationEvent::SessionEnded,
            ]
        );
    }

    #[test]
    fn test_begin_while_active_is_noop() {
        let mut pc = controller();
        pc.begin_session(two_lines());
        pc.take_events();

        assert!(!pc.begin_session(story(vec![StoryLine::new("other")])));
        assert_eq!(pc.full_text(), "First line");
        assert!(pc.take_events().is_empty());
    }

    #[test]
    fn test_complete_typewriter_idempotent() {
        let mut pc = controller();
        pc.complete_typewriter();
        assert!(!pc.is_active());
        assert_eq!(pc.displayed_text(), "");

        pc.begin_session(two_lines());
        pc.complete_typewriter();
        assert_eq!(pc.displayed_text(), "First line");
        assert!(!pc.is_typing());

        pc.complete_typewriter();
        assert_eq!(pc.displayed_text(), "First line");
        assert!(!pc.is_typing());
        assert!(pc.is_active());
    }

    #[test]
    fn test_submit_completes_then_advances() {
        let mut pc = controller();
        pc.begin_session(two_lines());

        pc.update(FrameInput::submit(), DT);
        assert_eq!(pc.displayed_text(), "First line");
        assert!(!pc.is_typing());

        pc.update(FrameInput::submit(), DT);
        assert_eq!(pc.full_text(), "Second line");
        assert!(pc.is_typing());

        pc.update(FrameInput::submit(), DT);
        pc.update(FrameInput::submit(), DT);
        assert!(!pc.is_active());
        assert_eq!(pc.mode(), GameMode::Walk);
        assert_eq!(pc.displayed_text(), "");
        assert_eq!(pc.speaker_label(), "");
        assert!(PortraitSlot::ALL.iter().all(|slot| !pc.portrait(*slot).visible));
        assert_eq!(
            pc.portrait(PortraitSlot::Right).sprite.as_deref(),
            Some("Ava_happy")
        );
    }

    #[test]
    fn test_typewriter_reveals_over_time() {
        let mut pc = controller();
        pc.begin_session(story(vec![StoryLine::new("abc")]));

        pc.update(FrameInput::idle(), 0.05);
        assert_eq!(pc.displayed_text(), "a");
        pc.update(FrameInput::idle(), 0.05);
        pc.update(FrameInput::idle(), 0.05);
        assert_eq!(pc.displayed_text(), "abc");
        assert!(pc.is_typing());
        pc.update(FrameInput::idle(), 0.05);
        assert!(!pc.is_typing());
    }

    #[test]
    fn test_typewriter_disabled_shows_instantly() {
        let config = PresentationConfig {
            enable_typewriter: false,
            ..PresentationConfig::default()
        };
        let mut pc = PresentationController::new(config, SpriteCatalog::new());
        pc.begin_session(story(vec![StoryLine::new("instant")]));

        assert!(!pc.is_typing());
        assert_eq!(pc.displayed_text(), "instant");
    }

    #[test]
    fn test_skip_completes_before_advancing() {
        let mut pc = controller();
        pc.begin_session(two_lines());
        assert!(pc.is_typing());

        pc.update(FrameInput::skip(), DT);
        assert!(pc.is_skipping());
        assert_eq!(pc.full_text(), "First line");
        assert_eq!(pc.displayed_text(), "First line");

        pc.update(FrameInput::skip(), DT);
        assert_eq!(pc.full_text(), "Second line");
    }

    #[test]
    fn test_skip_cadence() {
        let mut pc = controller();
        let lines = (0..5).map(|i| StoryLine::new(format!("line {}", i))).collect();
        pc.begin_session(story(lines));

        pc.update(FrameInput::skip(), DT);
        pc.update(FrameInput::skip(), DT);
        assert_eq!(pc.full_text(), "line 1");

        // 推进后计时器重置为 skip_interval，期间只完成打字
        for _ in 0..5 {
            pc.update(FrameInput::skip(), DT);
        }
        assert_eq!(pc.full_text(), "line 1");
        assert_eq!(pc.displayed_text(), "line 1");

        for _ in 0..6 {
            pc.update(FrameInput::skip(), DT);
        }
        assert_eq!(pc.full_text(), "line 2");
    }

    #[test]
    fn test_releasing_skip_resets_timer() {
        let mut pc = controller();
        let lines = (0..3).map(|i| StoryLine::new(format!("line {}", i))).collect();
        pc.begin_session(story(lines));

        pc.update(FrameInput::skip(), DT);
        pc.update(FrameInput::skip(), DT);
        assert_eq!(pc.full_text(), "line 1");

        pc.update(FrameInput::idle(), DT);
        assert!(!pc.is_skipping());

        pc.update(FrameInput::skip(), DT);
        pc.update(FrameInput::skip(), DT);
        assert_eq!(pc.full_text(), "line 2");
    }

    #[test]
    fn test_speaker_hop() {
        let mut pc = controller();
        pc.begin_session(story(vec![
            StoryLine::new("a").with_tag("sprite: Ava_happy"),
            StoryLine::new("b").with_tag("speaker: Ava"),
            StoryLine::new("c").with_tag("speaker: Ava"),
        ]));
        pc.take_events();

        pc.update(FrameInput::submit(), DT);
        pc.update(FrameInput::submit(), DT);
        let events = pc.take_events();
        assert!(events.contains(&PresentationEvent::HopStarted {
            slot: PortraitSlot::Right
        }));
        assert!(pc.hop_offset(PortraitSlot::Right) >= 0.0);

        pc.update(FrameInput::submit(), DT);
        pc.update(FrameInput::submit(), DT);
        let events = pc.take_events();
        assert!(!events
            .iter()
            .any(|e| matches!(e, PresentationEvent::HopStarted { .. })));
    }

    #[test]
    fn test_empty_speaker_tag_ignored() {
        let mut pc = controller();
        pc.begin_session(story(vec![
            StoryLine::new("a")
                .with_tag("sprite: Ava_happy")
                .with_tag("speaker: Ava"),
            StoryLine::new("b").with_tag("speaker:"),
        ]));
        let label = pc.speaker_label().to_string();
        pc.take_events();

        pc.update(FrameInput::submit(), DT);
        pc.update(FrameInput::submit(), DT);
        let events = pc.take_events();

        assert!(!events.iter().any(|e| matches!(
            e,
            PresentationEvent::SpeakerChanged { .. } | PresentationEvent::HopStarted { .. }
        )));
        assert_eq!(pc.speaker_label(), label);
        assert_eq!(pc.current_speaker(), Some("Ava"));
    }

    #[test]
    fn test_no_hop_without_sprite() {
        let mut pc = controller();
        pc.begin_session(story(vec![StoryLine::new("x").with_tag("speaker: Blake")]));

        let events = pc.take_events();
        assert!(!events
            .iter()
            .any(|e| matches!(e, PresentationEvent::HopStarted { .. })));
        assert_eq!(pc.current_speaker(), Some("Blake"));
    }

    #[test]
    fn test_no_hop_while_skipping() {
        let mut pc = controller();
        pc.begin_session(story(vec![
            StoryLine::new("a").with_tag("sprite: Blake_neutral"),
            StoryLine::new("b").with_tag("speaker: Blake"),
        ]));
        pc.take_events();

        pc.update(FrameInput::skip(), DT);
        pc.update(FrameInput::skip(), DT);

        assert_eq!(pc.current_speaker(), Some("Blake"));
        assert!(!pc
            .take_events()
            .iter()
            .any(|e| matches!(e, PresentationEvent::HopStarted { .. })));
    }

    #[test]
    fn test_first_speaker_hops_again_after_end() {
        let lines = || {
            story(vec![StoryLine::new("hi")
                .with_tag("sprite: Ava_happy")
                .with_tag("speaker: Ava")])
        };
        let mut pc = controller();

        pc.begin_session(lines());
        pc.update(FrameInput::submit(), DT);
        pc.update(FrameInput::submit(), DT);
        assert!(!pc.is_active());
        pc.take_events();

        pc.begin_session(lines());
        assert!(pc.take_events().contains(&PresentationEvent::HopStarted {
            slot: PortraitSlot::Right
        }));
    }

    #[test]
    fn test_sprite_routing() {
        let mut pc = controller();
        pc.begin_session(story(vec![StoryLine::new("x")
            .with_tag("sprite: Blake_neutral")
            .with_tag("sprite: Ava_happy")
            .with_tag("third_sprite: Jellyfish")]));

        assert_eq!(
            pc.portrait(PortraitSlot::Left).sprite.as_deref(),
            Some("Blake_neutral")
        );
        assert_eq!(
            pc.portrait(PortraitSlot::Right).sprite.as_deref(),
            Some("Ava_happy")
        );
        assert_eq!(
            pc.portrait(PortraitSlot::Center).sprite.as_deref(),
            Some("Jellyfish")
        );
        assert!(pc.portrait(PortraitSlot::Center).visible);
    }

    #[test]
    fn test_unknown_sprite_leaves_slot_unchanged() {
        let mut pc = controller();
        pc.begin_session(story(vec![
            StoryLine::new("a").with_tag("sprite: Ava_happy"),
            StoryLine::new("b").with_tag("sprite: Ava_missing"),
        ]));
        pc.update(FrameInput::submit(), DT);
        pc.update(FrameInput::submit(), DT);

        assert_eq!(pc.full_text(), "b");
        assert_eq!(
            pc.portrait(PortraitSlot::Right).sprite.as_deref(),
            Some("Ava_happy")
        );
    }

    #[test]
    fn test_malformed_and_unknown_tags_ignored() {
        let mut pc = controller();
        pc.begin_session(story(vec![StoryLine::new("x")
            .with_tag("speaker")
            .with_tag("a:b:c")
            .with_tag("emotion: sad")]));

        assert_eq!(pc.current_speaker(), None);
        assert_eq!(pc.speaker_label(), "");
    }

    #[test]
    fn test_lines_recorded_in_history() {
        let mut pc = controller();
        pc.begin_session(two_lines());
        pc.update(FrameInput::submit(), DT);
        pc.update(FrameInput::submit(), DT);

        assert_eq!(pc.history().line_count(), 2);
        assert!(matches!(
            &pc.history().events()[1],
            HistoryEvent::Line { speaker: Some(s), text, .. } if s == "Blake" && text == "Second line"
        ));
    }

    #[test]
    fn test_event_transcript() {
        let mut pc = controller();
        pc.begin_session(two_lines());
        for _ in 0..4 {
            pc.update(FrameInput::submit(), DT);
        }

        let transcript = pc
            .take_events()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");

        insta::assert_snapshot!(transcript, @r"
        mode visual_novel
        speaker <color=#FF00FF>Ava</color>
        portrait right Ava_happy
        line Ava: First line
        speaker <color=#FF0000>Blake</color>
        line Blake: Second line
        mode walk
        end
        ");
    }
}
