impl<IN> PanelApp<IN>
where
    IN: InputProvider,
{
    pub fn new(tree: MenuTree, input: IN, config: PanelConfig) -> Self {
        let mut motion = MotionState::new(config.mm_per_hole);
        let current = tree.root();
        let render_gate = tree.on_enter(current, &mut motion);

        Self {
            tree,
            input,
            config,
            current,
            motion,
            render_gate,
            pending_redraw: true,
            last_input_ms: 0,
            last_drawn_holes: 0,
            pending_calibration_save: None,
        }
    }

    pub fn current(&self) -> NodeId {
        self.current
    }

    pub fn tree(&self) -> &MenuTree {
        &self.tree
    }

    pub fn motion(&self) -> &MotionState {
        &self.motion
    }

    /// Hook for the hole sensor and stepper driver, which run between ticks.
    pub fn motion_mut(&mut self) -> &mut MotionState {
        &mut self.motion
    }

    pub fn render_gate(&self) -> RenderGate {
        self.render_gate
    }

    pub fn with_screen<F>(&self, f: F)
    where
        F: FnOnce(Screen<'_>),
    {
        f(self.tree.screen(self.current, &self.motion));
    }

    /// Draws the current node onto `sink`.
    pub fn draw<D>(&self, sink: &mut D)
    where
        D: DisplaySink + ?Sized,
    {
        self.with_screen(|screen| draw_screen(screen, sink));
    }
}
