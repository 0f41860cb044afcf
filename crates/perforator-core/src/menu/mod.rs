//! Menu graph.
//!
//! Every screen of the panel is a [`MenuNode`] in a fixed arena. Nodes refer
//! to each other through [`NodeId`] indices, so the parent/child/sibling
//! cycles need no owning pointers. The graph is wired once at boot and never
//! changes afterwards.

mod layout;
mod policy;

pub use layout::{DEFAULT_TEMPLATES, TemplateSpec};
pub use policy::{RenderGate, Step};

use heapless::Vec;

/// Arena capacity.
pub const MAX_NODES: usize = 24;

/// Stable index of a node inside its [`MenuTree`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct NodeId(u8);

impl NodeId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Neighbor edges, one per navigation button.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Links {
    /// BACK target, the statically assigned parent.
    pub back: Option<NodeId>,
    /// SELECT target.
    pub select: Option<NodeId>,
    /// LEFT target.
    pub prev: Option<NodeId>,
    /// RIGHT target.
    pub next: Option<NodeId>,
}

impl Links {
    fn targets(&self) -> [Option<NodeId>; 4] {
        [self.back, self.select, self.prev, self.next]
    }
}

/// Behaviour attached to a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NodeKind {
    /// Plain menu entry: SELECT descends, LEFT/RIGHT walk siblings.
    Container,
    /// Jog the carriage and zero the position counter.
    Calibration,
    /// Jog the carriage while a direction button is held.
    ManualMode,
    /// Edit a hole target and run to it.
    SemiAutomaticMode,
    /// Run to a preset distance.
    Template { target_mm: f64 },
    /// Blank screen shown while the panel is idle.
    ScreenSaver,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MenuNode {
    pub title: &'static str,
    pub ordinal: u8,
    /// Index among the nodes sharing this node's sibling row.
    pub position: u8,
    /// Length of the sibling row, 1 for a lone node.
    pub siblings: u8,
    pub links: Links,
    pub kind: NodeKind,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MenuError {
    /// More than [`MAX_NODES`] nodes were added.
    Full,
    /// An edge or row names a node that does not exist.
    DanglingLink,
    /// A tree or row that needs members got none.
    Empty,
}

/// Finished, immutable menu graph.
#[derive(Clone, Debug)]
pub struct MenuTree {
    nodes: Vec<MenuNode, MAX_NODES>,
    root: NodeId,
    screen_saver: Option<NodeId>,
}

impl MenuTree {
    pub fn builder() -> MenuBuilder {
        MenuBuilder::new()
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// First node of kind [`NodeKind::ScreenSaver`], if the tree has one.
    pub fn screen_saver(&self) -> Option<NodeId> {
        self.screen_saver
    }

    pub fn get(&self, id: NodeId) -> Option<&MenuNode> {
        self.nodes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks a node up by its title.
    pub fn find(&self, title: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.title == title)
            .map(|index| NodeId(index as u8))
    }
}

/// Incremental constructor for a [`MenuTree`].
#[derive(Clone, Debug, Default)]
pub struct MenuBuilder {
    nodes: Vec<MenuNode, MAX_NODES>,
}

impl MenuBuilder {
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Adds an unwired node.
    pub fn add(&mut self, title: &'static str, kind: NodeKind) -> Result<NodeId, MenuError> {
        let ordinal = self.nodes.len() as u8;
        self.nodes
            .push(MenuNode {
                title,
                ordinal,
                position: 0,
                siblings: 1,
                links: Links::default(),
                kind,
            })
            .map_err(|_| MenuError::Full)?;
        Ok(NodeId(ordinal))
    }

    pub fn links_mut(&mut self, id: NodeId) -> Result<&mut Links, MenuError> {
        self.nodes
            .get_mut(id.index())
            .map(|node| &mut node.links)
            .ok_or(MenuError::DanglingLink)
    }

    /// Wires `members` as one sibling row under `parent`.
    ///
    /// Members get their position, the row length, `prev`/`next` edges to
    /// their neighbours (the row does not wrap) and `back` to the parent. The
    /// parent's SELECT edge points at the first member.
    pub fn row(&mut self, parent: Option<NodeId>, members: &[NodeId]) -> Result<(), MenuError> {
        if let Some(parent) = parent {
            let first = members.first().copied();
            self.links_mut(parent)?.select = first;
        }

        let count = members.len() as u8;
        for (position, &id) in members.iter().enumerate() {
            let prev = position.checked_sub(1).map(|i| members[i]);
            let next = members.get(position + 1).copied();

            let node = self
                .nodes
                .get_mut(id.index())
                .ok_or(MenuError::DanglingLink)?;
            node.position = position as u8;
            node.siblings = count;
            node.links.back = parent;
            node.links.prev = prev;
            node.links.next = next;
        }

        Ok(())
    }

    /// Validates every edge and freezes the graph.
    pub fn build(self, root: NodeId) -> Result<MenuTree, MenuError> {
        if self.nodes.is_empty() {
            return Err(MenuError::Empty);
        }

        let len = self.nodes.len();
        if root.index() >= len {
            return Err(MenuError::DanglingLink);
        }
        let dangling = self
            .nodes
            .iter()
            .flat_map(|node| node.links.targets())
            .flatten()
            .any(|target| target.index() >= len);
        if dangling {
            return Err(MenuError::DanglingLink);
        }

        let screen_saver = self
            .nodes
            .iter()
            .position(|node| node.kind == NodeKind::ScreenSaver)
            .map(|index| NodeId(index as u8));

        Ok(MenuTree {
            nodes: self.nodes,
            root,
            screen_saver,
        })
    }
}
