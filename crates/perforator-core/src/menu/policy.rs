//! Per-variant button policies.
//!
//! Each operation is a total function of (node, phase, motion state) and
//! returns the node that becomes current. Missing edges keep the current node.

use log::debug;

use super::{Links, MenuTree, NodeId, NodeKind};
use crate::{
    input::Phase,
    motion::{Direction, MotionState},
    render::Screen,
};

/// Whether the display may be redrawn while a node is current.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RenderGate {
    Allowed,
    Suppressed,
}

/// Result of a SELECT edge.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Step {
    pub next: NodeId,
    /// Position to write to non-volatile storage after a calibration reset.
    pub persist_position: Option<i32>,
}

impl Step {
    const fn to(next: NodeId) -> Self {
        Self {
            next,
            persist_position: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Side {
    Left,
    Right,
}

impl Side {
    const fn direction(self) -> Direction {
        match self {
            Self::Left => Direction::Down,
            Self::Right => Direction::Up,
        }
    }

    const fn target_delta(self) -> i32 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }

    fn neighbor(self, links: &Links) -> Option<NodeId> {
        match self {
            Self::Left => links.prev,
            Self::Right => links.next,
        }
    }
}

impl MenuTree {
    /// Runs once when `id` becomes the current node.
    pub fn on_enter(&self, id: NodeId, motion: &mut MotionState) -> RenderGate {
        match self.get(id).map(|node| node.kind) {
            Some(NodeKind::SemiAutomaticMode) => {
                motion.snap_target_to_position();
                RenderGate::Allowed
            }
            Some(NodeKind::ScreenSaver) => RenderGate::Suppressed,
            _ => RenderGate::Allowed,
        }
    }

    /// BACK always halts the carriage, then returns to the wired parent.
    pub fn on_back(&self, id: NodeId, motion: &mut MotionState) -> NodeId {
        motion.halt();
        self.get(id).and_then(|node| node.links.back).unwrap_or(id)
    }

    pub fn on_select(&self, id: NodeId, motion: &mut MotionState, phase: Phase) -> Step {
        let Some(node) = self.get(id) else {
            return Step::to(id);
        };
        if phase == Phase::Release {
            return Step::to(id);
        }

        match node.kind {
            NodeKind::Calibration => {
                motion.reset_position();
                Step {
                    next: id,
                    persist_position: Some(motion.current_holes()),
                }
            }
            NodeKind::SemiAutomaticMode => {
                seek_or_halt(motion);
                Step::to(id)
            }
            NodeKind::Template { target_mm } => {
                if motion.is_running() {
                    motion.halt();
                } else {
                    let holes = motion.holes_for_distance(target_mm);
                    debug!("menu: template {} mm -> {} holes", target_mm, holes);
                    motion.set_target(holes);
                    motion.start_seek();
                }
                Step::to(id)
            }
            NodeKind::Container | NodeKind::ManualMode | NodeKind::ScreenSaver => {
                Step::to(node.links.select.unwrap_or(id))
            }
        }
    }

    pub fn on_left(&self, id: NodeId, motion: &mut MotionState, phase: Phase) -> NodeId {
        self.on_side(id, motion, phase, Side::Left)
    }

    pub fn on_right(&self, id: NodeId, motion: &mut MotionState, phase: Phase) -> NodeId {
        self.on_side(id, motion, phase, Side::Right)
    }

    fn on_side(&self, id: NodeId, motion: &mut MotionState, phase: Phase, side: Side) -> NodeId {
        let Some(node) = self.get(id) else {
            return id;
        };

        match (node.kind, phase) {
            (NodeKind::Calibration | NodeKind::ManualMode, Phase::Click) => {
                motion.start_jog(side.direction());
                id
            }
            (NodeKind::Calibration | NodeKind::ManualMode, Phase::Release) => {
                motion.end_jog();
                id
            }
            (NodeKind::SemiAutomaticMode, Phase::Click) => {
                motion.nudge_target(side.target_delta());
                id
            }
            (_, Phase::Click) => side.neighbor(&node.links).unwrap_or(id),
            (_, Phase::Release) => id,
        }
    }

    /// View model of `id`; never mutates motion state.
    pub fn screen(&self, id: NodeId, motion: &MotionState) -> Screen<'static> {
        let Some(node) = self.get(id) else {
            return Screen::Blank;
        };

        match node.kind {
            NodeKind::Container => Screen::Menu {
                title: node.title,
                position: node.position,
                siblings: node.siblings,
            },
            NodeKind::Calibration => Screen::Calibration {
                position_mm: motion.position_mm(),
            },
            NodeKind::ManualMode => Screen::ManualMode {
                position_mm: motion.position_mm(),
            },
            NodeKind::SemiAutomaticMode => Screen::SemiAutomatic {
                current_mm: motion.position_mm(),
                target_mm: motion.target_mm(),
                running: motion.is_running(),
            },
            NodeKind::Template { target_mm } => Screen::Template {
                title: node.title,
                target_mm,
                current_mm: motion.position_mm(),
                running: motion.is_running(),
            },
            NodeKind::ScreenSaver => Screen::Blank,
        }
    }

    /// True when the node's screen shows the live carriage position.
    pub fn shows_position(&self, id: NodeId) -> bool {
        matches!(
            self.get(id).map(|node| node.kind),
            Some(
                NodeKind::Calibration
                    | NodeKind::ManualMode
                    | NodeKind::SemiAutomaticMode
                    | NodeKind::Template { .. }
            )
        )
    }
}

fn seek_or_halt(motion: &mut MotionState) {
    if motion.is_running() {
        motion.halt();
    } else {
        motion.start_seek();
    }
}
