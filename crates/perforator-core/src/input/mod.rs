//! Input abstraction layer.

pub mod keypad;
pub mod mock;

/// Physical keypad buttons.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Button {
    Back,
    Select,
    Left,
    Right,
}

/// Edge of a button press.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Click,
    Release,
}

/// One button edge consumed by the dispatcher.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InputEvent {
    pub button: Button,
    pub phase: Phase,
}

impl InputEvent {
    pub const fn click(button: Button) -> Self {
        Self {
            button,
            phase: Phase::Click,
        }
    }

    pub const fn release(button: Button) -> Self {
        Self {
            button,
            phase: Phase::Release,
        }
    }
}

/// Polled input provider.
pub trait InputProvider {
    type Error;

    fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error>;
}
