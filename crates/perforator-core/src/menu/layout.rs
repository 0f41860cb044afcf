use super::{MenuError, MenuTree, NodeKind};

/// Preset run distance offered under the Templates menu.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TemplateSpec {
    pub title: &'static str,
    pub target_mm: f64,
}

impl TemplateSpec {
    pub const fn new(title: &'static str, target_mm: f64) -> Self {
        Self { title, target_mm }
    }
}

pub const DEFAULT_TEMPLATES: [TemplateSpec; 3] = [
    TemplateSpec::new("100 mm", 100.0),
    TemplateSpec::new("250 mm", 250.0),
    TemplateSpec::new("500 mm", 500.0),
];

const MAX_TEMPLATES: usize = 12;

impl MenuTree {
    /// Builds the machine's stock menu.
    ///
    /// ```text
    /// Perforator
    ///  └ Engine ⇄ Templates ⇄ Calibration
    /// Engine      └ Manual ⇄ Semi-auto
    /// Manual      └ manual mode window
    /// Semi-auto   └ semi-automatic window
    /// Templates   └ one window per template
    /// Calibration └ calibration window
    /// Screen saver: BACK and SELECT return to Perforator
    /// ```
    pub fn standard(templates: &[TemplateSpec]) -> Result<Self, MenuError> {
        if templates.is_empty() {
            return Err(MenuError::Empty);
        }
        if templates.len() > MAX_TEMPLATES {
            return Err(MenuError::Full);
        }

        let mut builder = MenuTree::builder();

        let main = builder.add("Perforator", NodeKind::Container)?;
        let engine = builder.add("Engine", NodeKind::Container)?;
        let templates_menu = builder.add("Templates", NodeKind::Container)?;
        let calibration_menu = builder.add("Calibration", NodeKind::Container)?;
        builder.row(Some(main), &[engine, templates_menu, calibration_menu])?;

        let manual_menu = builder.add("Manual", NodeKind::Container)?;
        let semi_menu = builder.add("Semi-auto", NodeKind::Container)?;
        builder.row(Some(engine), &[manual_menu, semi_menu])?;

        let manual = builder.add("Manual mode", NodeKind::ManualMode)?;
        builder.row(Some(manual_menu), &[manual])?;

        let semi = builder.add("Semi-automatic", NodeKind::SemiAutomaticMode)?;
        builder.row(Some(semi_menu), &[semi])?;

        let calibration = builder.add("Calibrate", NodeKind::Calibration)?;
        builder.row(Some(calibration_menu), &[calibration])?;

        let mut template_ids = heapless::Vec::<_, MAX_TEMPLATES>::new();
        for spec in templates {
            let id = builder.add(
                spec.title,
                NodeKind::Template {
                    target_mm: spec.target_mm,
                },
            )?;
            template_ids.push(id).map_err(|_| MenuError::Full)?;
        }
        builder.row(Some(templates_menu), &template_ids)?;

        let screen_saver = builder.add("Screen saver", NodeKind::ScreenSaver)?;
        let links = builder.links_mut(screen_saver)?;
        links.back = Some(main);
        links.select = Some(main);

        builder.build(main)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_tree_is_wired() {
        let tree = MenuTree::standard(&DEFAULT_TEMPLATES).unwrap();
        assert_eq!(tree.len(), 13);

        let main = tree.root();
        let engine = tree.find("Engine").unwrap();
        let templates = tree.find("Templates").unwrap();
        let calibration = tree.find("Calibration").unwrap();

        assert_eq!(tree.get(main).unwrap().links.select, Some(engine));
        assert_eq!(tree.get(main).unwrap().links.back, None);
        assert_eq!(tree.get(engine).unwrap().links.next, Some(templates));
        assert_eq!(tree.get(calibration).unwrap().links.prev, Some(templates));
        assert_eq!(tree.get(calibration).unwrap().links.next, None);

        let first = tree.find("100 mm").unwrap();
        let node = tree.get(first).unwrap();
        assert_eq!(node.kind, NodeKind::Template { target_mm: 100.0 });
        assert_eq!(node.links.back, Some(templates));
        assert_eq!(node.siblings, 3);

        let saver = tree.screen_saver().unwrap();
        assert_eq!(tree.get(saver).unwrap().links.select, Some(main));
    }

    #[test]
    fn template_count_is_bounded() {
        assert_eq!(MenuTree::standard(&[]).unwrap_err(), MenuError::Empty);
        let many = [TemplateSpec::new("t", 1.0); MAX_TEMPLATES + 1];
        assert_eq!(MenuTree::standard(&many).unwrap_err(), MenuError::Full);
    }
}
