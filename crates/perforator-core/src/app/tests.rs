use super::*;
use crate::{
    input::{Button, InputEvent, InputProvider, mock::MockInput},
    menu::{DEFAULT_TEMPLATES, MenuTree, RenderGate},
    motion::Direction,
    render::Screen,
    settings::{CalibrationStore, RamCalibrationStore},
};

struct ScriptedInput<'a> {
    events: &'a [InputEvent],
    cursor: usize,
}

impl<'a> ScriptedInput<'a> {
    const fn new(events: &'a [InputEvent]) -> Self {
        Self { events, cursor: 0 }
    }
}

impl InputProvider for ScriptedInput<'_> {
    type Error = ();

    fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error> {
        let Some(event) = self.events.get(self.cursor).copied() else {
            return Ok(None);
        };
        self.cursor = self.cursor.saturating_add(1);
        Ok(Some(event))
    }
}

struct BrokenInput {
    polls: usize,
}

impl InputProvider for BrokenInput {
    type Error = ();

    fn poll_event(&mut self) -> Result<Option<InputEvent>, Self::Error> {
        self.polls += 1;
        Err(())
    }
}

fn standard_tree() -> MenuTree {
    MenuTree::standard(&DEFAULT_TEMPLATES).unwrap()
}

fn idle_config() -> PanelConfig {
    PanelConfig {
        mm_per_hole: 2.5,
        screensaver_after_ms: None,
    }
}

fn app_at<IN: InputProvider>(input: IN, config: PanelConfig, title: &str) -> PanelApp<IN> {
    let tree = standard_tree();
    let target = tree.find(title).unwrap();
    let mut app = PanelApp::new(tree, input, config);
    app.current = target;
    app.render_gate = app.tree.on_enter(target, &mut app.motion);
    app
}

fn title_of<IN: InputProvider>(app: &PanelApp<IN>) -> &'static str {
    app.tree().get(app.current()).unwrap().title
}

#[test]
fn scripted_clicks_walk_into_a_template_and_start_it() {
    let events = [
        InputEvent::click(Button::Select),
        InputEvent::release(Button::Select),
        InputEvent::click(Button::Right),
        InputEvent::release(Button::Right),
        InputEvent::click(Button::Select),
        InputEvent::release(Button::Select),
        InputEvent::click(Button::Select),
        InputEvent::release(Button::Select),
    ];
    let mut app = PanelApp::new(standard_tree(), ScriptedInput::new(&events), idle_config());

    assert_eq!(app.tick(10), TickResult::RenderRequested);
    assert_eq!(title_of(&app), "100 mm");
    assert_eq!(app.motion().target_holes(), 40);
    assert!(app.motion().is_running());
    assert_eq!(app.motion().direction(), Direction::Up);
}

#[test]
fn back_from_a_running_template_halts_and_returns_to_templates() {
    let mut app = app_at(MockInput::new(), idle_config(), "250 mm");
    app.dispatch(InputEvent::click(Button::Select));
    assert!(app.motion().is_running());

    let next = app.dispatch(InputEvent::click(Button::Back));

    assert_eq!(next, app.tree().find("Templates").unwrap());
    assert!(!app.motion().is_running());
    assert!(app.motion().is_stopped());
}

#[test]
fn back_release_does_not_climb_a_second_level() {
    let mut app = app_at(MockInput::new(), idle_config(), "Manual mode");

    app.dispatch(InputEvent::click(Button::Back));
    app.dispatch(InputEvent::release(Button::Back));

    assert_eq!(title_of(&app), "Manual");
}

#[test]
fn entering_semi_automatic_snaps_target_to_position() {
    let mut app = app_at(MockInput::new(), idle_config(), "Semi-auto");
    app.restore_position(-5);
    app.motion_mut().set_target(17);

    app.dispatch(InputEvent::click(Button::Select));

    assert_eq!(title_of(&app), "Semi-automatic");
    assert_eq!(app.motion().target_holes(), 0);
}

#[test]
fn seek_halts_once_on_arrival() {
    let mut app = app_at(MockInput::new(), idle_config(), "Semi-automatic");
    app.dispatch(InputEvent::click(Button::Right));
    app.dispatch(InputEvent::click(Button::Right));
    app.dispatch(InputEvent::click(Button::Select));
    assert!(app.motion().is_seeking());
    let _ = app.tick(0);

    app.motion_mut().record_hole();
    let _ = app.tick(1);
    assert!(app.motion().is_running());

    app.motion_mut().record_hole();
    assert_eq!(app.tick(2), TickResult::RenderRequested);
    assert!(!app.motion().is_running());
    assert!(app.motion_mut().take_stop());

    assert_eq!(app.tick(3), TickResult::NoRender);
    assert!(!app.motion_mut().take_stop());
}

#[test]
fn settle_halts_between_sensor_and_stepper() {
    let mut app = app_at(MockInput::new(), idle_config(), "Semi-automatic");
    app.dispatch(InputEvent::click(Button::Right));
    app.dispatch(InputEvent::click(Button::Select));
    let _ = app.tick(0);

    app.motion_mut().record_hole();
    app.settle();

    assert!(!app.motion().is_running());
    assert!(app.motion_mut().take_stop());
    assert_eq!(app.tick(1), TickResult::RenderRequested);
}

#[test]
fn settle_leaves_an_unfinished_seek_running() {
    let mut app = app_at(MockInput::new(), idle_config(), "Semi-automatic");
    app.dispatch(InputEvent::click(Button::Right));
    app.dispatch(InputEvent::click(Button::Right));
    app.dispatch(InputEvent::click(Button::Select));

    app.motion_mut().record_hole();
    app.settle();

    assert!(app.motion().is_running());
    assert!(!app.motion_mut().take_stop());
}

#[test]
fn jog_in_manual_mode_does_not_stop_on_its_own() {
    let mut app = app_at(MockInput::new(), idle_config(), "Manual mode");
    app.dispatch(InputEvent::click(Button::Left));

    for now in 0..5 {
        app.motion_mut().record_hole();
        let _ = app.tick(now);
    }

    assert!(app.motion().is_running());
    assert_eq!(app.motion().current_holes(), -5);

    app.dispatch(InputEvent::release(Button::Left));
    assert!(!app.motion().is_running());
}

#[test]
fn position_change_requests_redraw_only_on_position_screens() {
    let mut app = app_at(MockInput::new(), idle_config(), "Calibrate");
    let _ = app.tick(0);
    assert_eq!(app.tick(1), TickResult::NoRender);

    app.motion_mut().record_hole();
    assert_eq!(app.tick(2), TickResult::RenderRequested);
    assert_eq!(app.tick(3), TickResult::NoRender);

    app.dispatch(InputEvent::click(Button::Back));
    let _ = app.tick(4);
    app.motion_mut().record_hole();
    assert_eq!(app.tick(5), TickResult::NoRender);
}

#[test]
fn calibration_reset_hands_out_one_save_request() {
    let mut app = app_at(MockInput::new(), idle_config(), "Calibrate");
    app.restore_position(12);

    app.dispatch(InputEvent::click(Button::Select));

    assert_eq!(app.motion().current_holes(), 0);
    assert_eq!(app.take_calibration_save(), Some(0));
    assert_eq!(app.take_calibration_save(), None);
}

#[test]
fn saved_calibration_is_restored_on_the_next_boot() {
    let mut store = RamCalibrationStore::new();
    let mut app = app_at(MockInput::new(), idle_config(), "Calibrate");
    app.restore_position(-9);
    app.dispatch(InputEvent::click(Button::Select));
    if let Some(position) = app.take_calibration_save() {
        store.save(position).unwrap();
    }

    let mut rebooted = PanelApp::new(standard_tree(), MockInput::new(), idle_config());
    rebooted.restore_position(store.load().unwrap().unwrap_or(i32::MIN));

    assert_eq!(rebooted.motion().current_holes(), 0);
}

#[test]
fn screen_saver_engages_after_idle_timeout() {
    let config = PanelConfig {
        mm_per_hole: 2.5,
        screensaver_after_ms: Some(1_000),
    };
    let mut app = PanelApp::new(standard_tree(), MockInput::new(), config);

    assert_eq!(app.tick(0), TickResult::RenderRequested);
    assert_eq!(app.tick(999), TickResult::NoRender);
    assert_eq!(app.tick(1_000), TickResult::RenderRequested);

    assert_eq!(title_of(&app), "Screen saver");
    assert_eq!(app.render_gate(), RenderGate::Suppressed);
    let mut blank = false;
    app.with_screen(|screen| blank = screen == Screen::Blank);
    assert!(blank);

    app.motion_mut().restore_position(3);
    assert_eq!(app.tick(2_000), TickResult::NoRender);
}

#[test]
fn screen_saver_waits_while_the_carriage_runs() {
    let config = PanelConfig {
        mm_per_hole: 2.5,
        screensaver_after_ms: Some(1_000),
    };
    let mut app = app_at(MockInput::new(), config, "Manual mode");
    app.dispatch(InputEvent::click(Button::Right));

    let _ = app.tick(5_000);

    assert_eq!(title_of(&app), "Manual mode");
    assert!(app.motion().is_running());
}

#[test]
fn select_on_screen_saver_returns_to_main_menu() {
    let events = [InputEvent::click(Button::Select)];
    let config = PanelConfig {
        mm_per_hole: 2.5,
        screensaver_after_ms: Some(1_000),
    };
    let mut app = app_at(ScriptedInput::new(&events), config, "Screen saver");
    assert_eq!(app.render_gate(), RenderGate::Suppressed);

    assert_eq!(app.tick(10), TickResult::RenderRequested);

    assert_eq!(title_of(&app), "Perforator");
    assert_eq!(app.render_gate(), RenderGate::Allowed);
}

#[test]
fn provider_error_stops_the_drain_for_that_tick() {
    let mut app = PanelApp::new(standard_tree(), BrokenInput { polls: 0 }, idle_config());

    let _ = app.tick(0);
    let _ = app.tick(1);

    assert_eq!(app.input.polls, 2);
    assert_eq!(app.current(), app.tree().root());
}
