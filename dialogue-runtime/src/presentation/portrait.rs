//! 立绘槽位与说话者跳动动画

use std::collections::BTreeSet;
use std::f32::consts::FRAC_PI_2;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 立绘槽位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortraitSlot {
    /// 左侧（主角）
    Left,
    /// 右侧（其他角色）
    Right,
    /// 中间（第三角色）
    Center,
}

impl PortraitSlot {
    pub const ALL: [PortraitSlot; 3] = [Self::Left, Self::Right, Self::Center];

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
            Self::Center => 2,
        }
    }
}

impl fmt::Display for PortraitSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Center => "center",
        })
    }
}

/// 跳动动画
///
/// 前半程正弦缓出上升，后半程余弦缓入回落。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hop {
    elapsed: f32,
    duration: f32,
    height: f32,
}

impl Hop {
    pub fn new(height: f32, duration: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration: duration.max(0.0),
            height,
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.elapsed = (self.elapsed + dt).min(self.duration);
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// 当前竖直偏移
    pub fn offset(&self) -> f32 {
        if self.is_finished() {
            return 0.0;
        }
        let half = self.duration / 2.0;
        if self.elapsed < half {
            let progress = self.elapsed / half;
            self.height * (progress * FRAC_PI_2).sin()
        } else {
            let progress = (self.elapsed - half) / half;
            self.height * (progress * FRAC_PI_2).cos()
        }
    }
}

/// 单个立绘槽位的状态
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Portrait {
    /// 当前立绘（隐藏后保留）
    pub sprite: Option<String>,
    pub visible: bool,
    pub hop: Option<Hop>,
}

impl Portrait {
    /// 当前跳动偏移
    pub fn hop_offset(&self) -> f32 {
        self.hop.map_or(0.0, |hop| hop.offset())
    }

    pub(crate) fn tick(&mut self, dt: f32) {
        if let Some(hop) = self.hop.as_mut() {
            hop.tick(dt);
            if hop.is_finished() {
                self.hop = None;
            }
        }
    }

    pub(crate) fn hide(&mut self) {
        self.visible = false;
        self.hop = None;
    }
}

/// 可用立绘名称表
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpriteCatalog {
    names: BTreeSet<String>,
}

impl SpriteCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    /// 精确名称查找
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SpriteCatalog {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}
