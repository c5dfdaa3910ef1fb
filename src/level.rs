//! Level data and campaign progression
//!
//! Levels are plain JSON documents. Coordinates are `[x, y]` pairs with row 0
//! at the top of the grid.

use std::path::Path;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::error::LevelFileError;
use crate::sim::Color;

/// Sentinel checkpoint for White, which never has one
pub const NO_CHECKPOINT: IVec2 = IVec2::new(-1, -1);

/// Per-color placement for one level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ColorConfig {
    #[serde(default)]
    pub used: bool,
    #[serde(default)]
    pub start: IVec2,
    #[serde(default)]
    pub checkpoint: IVec2,
    #[serde(default)]
    pub end: IVec2,
}

impl ColorConfig {
    pub fn active(start: IVec2, checkpoint: IVec2, end: IVec2) -> Self {
        Self {
            used: true,
            start,
            checkpoint,
            end,
        }
    }

    fn unused_white() -> Self {
        Self {
            checkpoint: NO_CHECKPOINT,
            ..Self::default()
        }
    }
}

/// Immutable description of one puzzle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub blue: ColorConfig,
    #[serde(default)]
    pub red: ColorConfig,
    #[serde(default)]
    pub green: ColorConfig,
    #[serde(default)]
    pub yellow: ColorConfig,
    #[serde(default = "ColorConfig::unused_white")]
    pub white: ColorConfig,
    /// Set once the level has been solved
    #[serde(default)]
    pub completed: bool,
}

impl LevelConfig {
    /// Empty level with no active colors
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            name: None,
            width,
            height,
            blue: ColorConfig::default(),
            red: ColorConfig::default(),
            green: ColorConfig::default(),
            yellow: ColorConfig::default(),
            white: ColorConfig::unused_white(),
            completed: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Activate a color. For White the checkpoint argument is ignored.
    pub fn with_color(mut self, color: Color, start: IVec2, checkpoint: IVec2, end: IVec2) -> Self {
        let checkpoint = if color.has_checkpoint() {
            checkpoint
        } else {
            NO_CHECKPOINT
        };
        *self.color_mut(color) = ColorConfig::active(start, checkpoint, end);
        self
    }

    pub fn with_white(self, start: IVec2, end: IVec2) -> Self {
        self.with_color(Color::White, start, NO_CHECKPOINT, end)
    }

    pub fn color(&self, color: Color) -> &ColorConfig {
        match color {
            Color::Blue => &self.blue,
            Color::Red => &self.red,
            Color::Green => &self.green,
            Color::Yellow => &self.yellow,
            Color::White => &self.white,
        }
    }

    pub fn color_mut(&mut self, color: Color) -> &mut ColorConfig {
        match color {
            Color::Blue => &mut self.blue,
            Color::Red => &mut self.red,
            Color::Green => &mut self.green,
            Color::Yellow => &mut self.yellow,
            Color::White => &mut self.white,
        }
    }

    pub fn is_used(&self, color: Color) -> bool {
        self.color(color).used
    }

    /// Active colors in `Color::ALL` order
    pub fn active_colors(&self) -> impl Iterator<Item = Color> + '_ {
        Color::ALL.into_iter().filter(|&c| self.is_used(c))
    }

    pub fn from_json(json: &str) -> Result<Self, LevelFileError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelFileError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Ordered level sets with a cursor on the level being played
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Campaign {
    pub sets: Vec<Vec<LevelConfig>>,
    #[serde(skip)]
    set_index: usize,
    #[serde(skip)]
    level_index: usize,
}

impl Campaign {
    pub fn new(sets: Vec<Vec<LevelConfig>>) -> Self {
        Self {
            sets,
            set_index: 0,
            level_index: 0,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelFileError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Position of the current level as (set, index within set)
    pub fn cursor(&self) -> (usize, usize) {
        (self.set_index, self.level_index)
    }

    pub fn current(&self) -> Option<&LevelConfig> {
        self.sets.get(self.set_index)?.get(self.level_index)
    }

    /// Jump to a specific level. Returns `None` (cursor unchanged) if it doesn't exist.
    pub fn select(&mut self, set: usize, index: usize) -> Option<&LevelConfig> {
        self.sets.get(set)?.get(index)?;
        self.set_index = set;
        self.level_index = index;
        self.current()
    }

    /// Move to the next level, rolling over into the next non-empty set.
    /// Returns `None` and leaves the cursor alone on the last level.
    pub fn advance(&mut self) -> Option<&LevelConfig> {
        let (set, index) = self.next_cursor()?;
        self.set_index = set;
        self.level_index = index;
        self.current()
    }

    pub fn is_last(&self) -> bool {
        self.next_cursor().is_none()
    }

    fn next_cursor(&self) -> Option<(usize, usize)> {
        let current_len = self.sets.get(self.set_index).map_or(0, Vec::len);
        if self.level_index + 1 < current_len {
            return Some((self.set_index, self.level_index + 1));
        }
        (self.set_index + 1..self.sets.len())
            .find(|&s| !self.sets[s].is_empty())
            .map(|s| (s, 0))
    }

    pub fn mark_current_completed(&mut self) {
        if let Some(level) = self
            .sets
            .get_mut(self.set_index)
            .and_then(|set| set.get_mut(self.level_index))
        {
            level.completed = true;
        }
    }

    pub fn level_count(&self) -> usize {
        self.sets.iter().map(Vec::len).sum()
    }

    pub fn completed_count(&self) -> usize {
        self.sets.iter().flatten().filter(|l| l.completed).count()
    }

    pub fn reset_progress(&mut self) {
        for level in self.sets.iter_mut().flatten() {
            level.completed = false;
        }
    }

    /// Level's own name, or "Level {set}-{n}" with n counted from 1
    pub fn display_name(&self) -> String {
        match self.current().and_then(|l| l.name.as_deref()) {
            Some(name) => name.to_string(),
            None => format!("Level {}-{}", self.set_index, self.level_index + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny(name: Option<&str>) -> LevelConfig {
        let level = LevelConfig::new(3, 3).with_color(
            Color::Blue,
            IVec2::new(0, 0),
            IVec2::new(1, 0),
            IVec2::new(2, 0),
        );
        match name {
            Some(n) => level.named(n),
            None => level,
        }
    }

    #[test]
    fn test_json_defaults() {
        let level = LevelConfig::from_json(
            r#"{
                "width": 4,
                "height": 3,
                "red": { "used": true, "start": [0, 2], "checkpoint": [1, 1], "end": [3, 0] }
            }"#,
        )
        .unwrap();

        assert_eq!(level.width, 4);
        assert!(level.red.used);
        assert_eq!(level.red.end, IVec2::new(3, 0));
        assert!(!level.blue.used);
        assert_eq!(level.white.checkpoint, NO_CHECKPOINT);
        assert!(!level.completed);
        assert_eq!(level.active_colors().collect::<Vec<_>>(), vec![Color::Red]);
    }

    #[test]
    fn test_json_rejects_garbage() {
        assert!(matches!(
            LevelConfig::from_json("{ \"width\": 3 }"),
            Err(LevelFileError::Parse(_))
        ));
    }

    #[test]
    fn test_white_never_gets_checkpoint() {
        let level = LevelConfig::new(3, 3).with_color(
            Color::White,
            IVec2::ZERO,
            IVec2::new(1, 1),
            IVec2::new(2, 2),
        );
        assert!(level.white.used);
        assert_eq!(level.white.checkpoint, NO_CHECKPOINT);
    }

    #[test]
    fn test_campaign_advance_rolls_into_next_set() {
        let mut campaign = Campaign::new(vec![
            vec![tiny(None), tiny(None)],
            vec![],
            vec![tiny(Some("Finale"))],
        ]);
        assert_eq!(campaign.cursor(), (0, 0));
        assert_eq!(campaign.display_name(), "Level 0-1");

        assert!(campaign.advance().is_some());
        assert_eq!(campaign.display_name(), "Level 0-2");
        assert!(!campaign.is_last());

        assert!(campaign.advance().is_some());
        assert_eq!(campaign.cursor(), (2, 0));
        assert_eq!(campaign.display_name(), "Finale");
        assert!(campaign.is_last());

        assert!(campaign.advance().is_none());
        assert_eq!(campaign.cursor(), (2, 0));
    }

    #[test]
    fn test_campaign_progress() {
        let mut campaign = Campaign::new(vec![vec![tiny(None), tiny(None)]]);
        campaign.mark_current_completed();
        campaign.select(0, 1);
        campaign.mark_current_completed();
        assert_eq!(campaign.completed_count(), 2);
        assert_eq!(campaign.level_count(), 2);

        campaign.reset_progress();
        assert_eq!(campaign.completed_count(), 0);
        assert!(campaign.select(3, 0).is_none());
        assert_eq!(campaign.cursor(), (0, 1));
    }

    #[test]
    fn test_campaign_file() {
        let path =
            std::env::temp_dir().join(format!("beatgrid-campaign-{}.json", std::process::id()));
        let pack = Campaign::new(vec![vec![tiny(Some("One"))], vec![tiny(None)]]);
        std::fs::write(&path, serde_json::to_string(&pack).unwrap()).unwrap();

        let loaded = Campaign::load(&path).unwrap();
        assert_eq!(loaded.level_count(), 2);
        assert_eq!(loaded.cursor(), (0, 0));
        assert_eq!(loaded.display_name(), "One");
        let _ = std::fs::remove_file(&path);

        assert!(matches!(
            Campaign::load("/nonexistent/beatgrid/pack.json"),
            Err(LevelFileError::Io(_))
        ));
    }
}
