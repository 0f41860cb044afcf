impl<IN> PanelApp<IN>
where
    IN: InputProvider,
{
    pub fn tick(&mut self, now_ms: u64) -> TickResult {
        self.process_inputs(now_ms);
        self.halt_on_arrival();
        self.engage_screen_saver_if_idle(now_ms);

        let holes = self.motion.current_holes();
        if holes != self.last_drawn_holes
            && self.render_gate == RenderGate::Allowed
            && self.tree.shows_position(self.current)
        {
            self.pending_redraw = true;
        }

        if self.pending_redraw {
            self.pending_redraw = false;
            self.last_drawn_holes = holes;
            TickResult::RenderRequested
        } else {
            TickResult::NoRender
        }
    }

    /// Position restored from non-volatile storage at boot.
    pub fn restore_position(&mut self, holes: i32) {
        self.motion.restore_position(holes);
        self.last_drawn_holes = holes;
        self.pending_redraw = true;
    }

    /// Arrival check for the sensor/stepper half of the loop pass: halts a
    /// seek whose target the hole sensor just reached, before the stepper
    /// gets to pulse again.
    pub fn settle(&mut self) {
        self.halt_on_arrival();
    }

    /// Position to persist after a calibration reset, handed out once.
    pub fn take_calibration_save(&mut self) -> Option<i32> {
        self.pending_calibration_save.take()
    }

    fn halt_on_arrival(&mut self) {
        if self.motion.seek_arrived() {
            debug!(
                "motion: arrived at {} (target {})",
                self.motion.current_holes(),
                self.motion.target_holes()
            );
            self.motion.halt();
            if self.render_gate == RenderGate::Allowed {
                self.pending_redraw = true;
            }
        }
    }

    fn engage_screen_saver_if_idle(&mut self, now_ms: u64) {
        let Some(timeout_ms) = self.config.screensaver_after_ms else {
            return;
        };
        let Some(saver) = self.tree.screen_saver() else {
            return;
        };

        if self.current != saver
            && !self.motion.is_running()
            && now_ms.saturating_sub(self.last_input_ms) >= timeout_ms
        {
            info!("ui: screen saver after {}ms idle", timeout_ms);
            self.enter(saver);
        }
    }
}
