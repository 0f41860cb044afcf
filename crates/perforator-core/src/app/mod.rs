//! Dispatcher: owns the menu graph, the current node and the motion state,
//! and turns keypad edges into node transitions.

use log::{debug, info};

use crate::{
    input::{Button, InputEvent, InputProvider, Phase},
    menu::{MenuTree, NodeId, RenderGate},
    motion::MotionState,
    render::{DisplaySink, Screen, draw_screen},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickResult {
    NoRender,
    RenderRequested,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelConfig {
    /// Carriage travel per hole.
    pub mm_per_hole: f64,
    /// Idle time before the screen saver takes over; `None` disables it.
    pub screensaver_after_ms: Option<u64>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            mm_per_hole: 2.5,
            screensaver_after_ms: Some(60_000),
        }
    }
}

pub struct PanelApp<IN>
where
    IN: InputProvider,
{
    tree: MenuTree,
    input: IN,
    config: PanelConfig,
    current: NodeId,
    motion: MotionState,
    render_gate: RenderGate,
    pending_redraw: bool,
    last_input_ms: u64,
    last_drawn_holes: i32,
    pending_calibration_save: Option<i32>,
}

include!("view.rs");
include!("input.rs");
include!("runtime.rs");

#[cfg(test)]
mod tests;
