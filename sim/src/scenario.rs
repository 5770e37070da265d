use anyhow::{Context, ensure};
use serde::Deserialize;
use std::path::Path;
use tilepop_core::*;

pub const DEMO: &str = include_str!("../scenarios/demo.toml");

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
    pub piece_config: PieceConfig,
    pub notifiers: usize,
    pub pieces: Vec<PieceSpec>,
    pub actions: Vec<ScheduledAction>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            piece_config: PieceConfig::default(),
            notifiers: 1,
            pieces: Vec::new(),
            actions: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PieceSpec {
    pub kind: PieceKind,
    #[serde(default)]
    pub hardened: bool,
    #[serde(default)]
    pub position: Vec2,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduledAction {
    pub at: Seconds,
    #[serde(default)]
    pub piece: Option<usize>,
    pub action: Action,
}

#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
pub enum Action {
    MoveTo(Vec2),
    SetState(PieceState),
    Award(Points),
}

impl Action {
    const fn needs_piece(self) -> bool {
        !matches!(self, Self::Award(_))
    }
}

impl Scenario {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("loading scenario {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let mut scenario: Scenario = toml::from_str(text).context("invalid scenario TOML")?;
        scenario.validate()?;
        scenario
            .actions
            .sort_by(|a, b| a.at.total_cmp(&b.at));
        Ok(scenario)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.piece_config.move_speed.is_finite() && self.piece_config.move_speed > 0.0,
            "move_speed must be positive, got {}",
            self.piece_config.move_speed
        );
        for (index, scheduled) in self.actions.iter().enumerate() {
            ensure!(
                scheduled.at.is_finite() && scheduled.at >= 0.0,
                "action {} has invalid time {}",
                index,
                scheduled.at
            );
            match scheduled.piece {
                Some(piece) => ensure!(
                    piece < self.pieces.len(),
                    "action {} targets piece {} but only {} pieces exist",
                    index,
                    piece,
                    self.pieces.len()
                ),
                None => ensure!(
                    !scheduled.action.needs_piece(),
                    "action {} ({:?}) needs a piece",
                    index,
                    scheduled.action
                ),
            }
        }
        Ok(())
    }

    /// Time of the last scheduled action, zero for an empty schedule.
    pub fn last_action_at(&self) -> Seconds {
        self.actions
            .iter()
            .map(|scheduled| scheduled.at)
            .fold(0.0, f32::max)
    }
}
