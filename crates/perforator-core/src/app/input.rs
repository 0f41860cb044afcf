impl<IN> PanelApp<IN>
where
    IN: InputProvider,
{
    fn process_inputs(&mut self, now_ms: u64) {
        loop {
            match self.input.poll_event() {
                Ok(Some(event)) => {
                    self.last_input_ms = now_ms;
                    self.dispatch(event);
                }
                Ok(None) => break,
                Err(_) => {
                    info!("input: provider error, skipping remaining events this tick");
                    break;
                }
            }
        }
    }

    /// Routes one keypad edge to the current node and makes the returned node
    /// current.
    pub fn dispatch(&mut self, event: InputEvent) -> NodeId {
        let from = self.current;
        let next = match (event.button, event.phase) {
            (Button::Back, Phase::Click) => self.tree.on_back(from, &mut self.motion),
            (Button::Back, Phase::Release) => from,
            (Button::Select, phase) => {
                let step = self.tree.on_select(from, &mut self.motion, phase);
                if let Some(position) = step.persist_position {
                    self.pending_calibration_save = Some(position);
                }
                step.next
            }
            (Button::Left, phase) => self.tree.on_left(from, &mut self.motion, phase),
            (Button::Right, phase) => self.tree.on_right(from, &mut self.motion, phase),
        };

        if next != from {
            self.enter(next);
        } else if self.render_gate == RenderGate::Allowed {
            self.pending_redraw = true;
        }

        next
    }

    fn enter(&mut self, next: NodeId) {
        debug!(
            "ui-nav: {:?} -> {:?} ({})",
            self.current,
            next,
            self.tree.get(next).map(|node| node.title).unwrap_or("?")
        );
        self.current = next;
        self.render_gate = self.tree.on_enter(next, &mut self.motion);
        self.pending_redraw = true;
    }
}
