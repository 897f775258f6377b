//! In-memory layout trees
//!
//! A [`FixtureTree`] is a [`GeometryProvider`] built from a flat list of
//! named nodes, either in code or from a TOML/JSON file:
//!
//! ```toml
//! [[nodes]]
//! name = "document"
//! element = false
//!
//! [[nodes]]
//! name = "list"
//! parent = "document"
//! width = 300.0
//! height = 200.0
//! scroll_height = 2000.0
//!
//! [[nodes]]
//! name = "item"
//! parent = "list"
//! offset_parent = "list"
//! top = 1200.0
//! width = 300.0
//! height = 40.0
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::scroll::GeometryProvider;
use crate::{Error, Result};

fn default_element() -> bool {
    true
}

/// One node as written in a fixture file
///
/// Client size defaults to the offset size minus a border on both sides;
/// scroll size defaults to the client size, which makes the node
/// non-scrollable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_parent: Option<String>,
    #[serde(default = "default_element")]
    pub element: bool,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub border_left: f64,
    #[serde(default)]
    pub border_top: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_height: Option<f64>,
    #[serde(default)]
    pub scroll_left: f64,
    #[serde(default)]
    pub scroll_top: f64,
}

impl FixtureNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            offset_parent: None,
            element: true,
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            border_left: 0.0,
            border_top: 0.0,
            client_width: None,
            client_height: None,
            scroll_width: None,
            scroll_height: None,
            scroll_left: 0.0,
            scroll_top: 0.0,
        }
    }

    /// A non-element root, such as a document; propagation stops below it
    pub fn document(name: impl Into<String>) -> Self {
        Self {
            element: false,
            ..Self::new(name)
        }
    }

    pub fn parent(mut self, name: impl Into<String>) -> Self {
        self.parent = Some(name.into());
        self
    }

    pub fn offset_parent(mut self, name: impl Into<String>) -> Self {
        self.offset_parent = Some(name.into());
        self
    }

    pub fn offset(mut self, left: f64, top: f64, width: f64, height: f64) -> Self {
        self.left = left;
        self.top = top;
        self.width = width;
        self.height = height;
        self
    }

    pub fn border(mut self, left: f64, top: f64) -> Self {
        self.border_left = left;
        self.border_top = top;
        self
    }

    pub fn client(mut self, width: f64, height: f64) -> Self {
        self.client_width = Some(width);
        self.client_height = Some(height);
        self
    }

    pub fn scroll_size(mut self, width: f64, height: f64) -> Self {
        self.scroll_width = Some(width);
        self.scroll_height = Some(height);
        self
    }

    pub fn scrolled(mut self, left: f64, top: f64) -> Self {
        self.scroll_left = left;
        self.scroll_top = top;
        self
    }
}

/// Contents of a fixture file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureSpec {
    #[serde(default)]
    pub nodes: Vec<FixtureNode>,
}

/// Index of a node within its [`FixtureTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Scroll offsets of one element, as reported by [`FixtureTree::snapshot`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeScroll {
    pub name: String,
    pub scroll_left: f64,
    pub scroll_top: f64,
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    parent: Option<NodeId>,
    offset_parent: Option<NodeId>,
    element: bool,
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    border_left: f64,
    border_top: f64,
    client_width: f64,
    client_height: f64,
    max_scroll_left: f64,
    max_scroll_top: f64,
    scroll_left: f64,
    scroll_top: f64,
}

/// Validated layout tree with mutable scroll offsets
#[derive(Debug, Clone)]
pub struct FixtureTree {
    nodes: Vec<Node>,
    index: HashMap<String, NodeId>,
}

impl FixtureTree {
    /// Build a tree, checking names, references and cycles
    pub fn from_nodes(nodes: Vec<FixtureNode>) -> Result<Self> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.name.clone(), NodeId(i)).is_some() {
                return Err(Error::Config(format!("Duplicate fixture node: {}", node.name)));
            }
        }

        let lookup = |name: &Option<String>| -> Result<Option<NodeId>> {
            name.as_ref()
                .map(|n| index.get(n).copied().ok_or_else(|| Error::UnknownElement(n.clone())))
                .transpose()
        };

        let mut resolved = Vec::with_capacity(nodes.len());
        for node in nodes {
            let client_width = node
                .client_width
                .unwrap_or((node.width - 2.0 * node.border_left).max(0.0));
            let client_height = node
                .client_height
                .unwrap_or((node.height - 2.0 * node.border_top).max(0.0));
            let max_scroll_left = (node.scroll_width.unwrap_or(client_width) - client_width).max(0.0);
            let max_scroll_top = (node.scroll_height.unwrap_or(client_height) - client_height).max(0.0);

            resolved.push(Node {
                parent: lookup(&node.parent)?,
                offset_parent: lookup(&node.offset_parent)?,
                element: node.element,
                left: node.left,
                top: node.top,
                width: node.width,
                height: node.height,
                border_left: node.border_left,
                border_top: node.border_top,
                client_width,
                client_height,
                max_scroll_left,
                max_scroll_top,
                scroll_left: node.scroll_left.clamp(0.0, max_scroll_left),
                scroll_top: node.scroll_top.clamp(0.0, max_scroll_top),
                name: node.name,
            });
        }

        let tree = Self {
            nodes: resolved,
            index,
        };
        tree.check_acyclic("parent", |n| n.parent)?;
        tree.check_acyclic("offset_parent", |n| n.offset_parent)?;
        tracing::debug!(nodes = tree.nodes.len(), "Fixture tree built");
        Ok(tree)
    }

    pub fn from_spec(spec: FixtureSpec) -> Result<Self> {
        Self::from_nodes(spec.nodes)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let spec: FixtureSpec = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse fixture: {}", e)))?;
        Self::from_spec(spec)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let spec: FixtureSpec = serde_json::from_str(content)?;
        Self::from_spec(spec)
    }

    /// Load a fixture file; `.json` files are read as JSON, anything else as TOML
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "Loading fixture");
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    /// Look a node up by name
    pub fn node(&self, name: &str) -> Result<NodeId> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownElement(name.to_string()))
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id.0].name
    }

    /// All nodes in declaration order
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Scroll offsets of every element, in declaration order
    pub fn snapshot(&self) -> Vec<NodeScroll> {
        self.nodes
            .iter()
            .filter(|n| n.element)
            .map(|n| NodeScroll {
                name: n.name.clone(),
                scroll_left: n.scroll_left,
                scroll_top: n.scroll_top,
            })
            .collect()
    }

    fn check_acyclic(&self, link: &str, next: impl Fn(&Node) -> Option<NodeId>) -> Result<()> {
        for start in self.nodes() {
            let mut current = next(&self.nodes[start.0]);
            let mut steps = 0;
            while let Some(id) = current {
                steps += 1;
                if id == start || steps > self.nodes.len() {
                    return Err(Error::Config(format!(
                        "Fixture node {} is its own {} ancestor",
                        self.name(start),
                        link
                    )));
                }
                current = next(&self.nodes[id.0]);
            }
        }
        Ok(())
    }
}

impl GeometryProvider for FixtureTree {
    type Node = NodeId;

    fn parent_node(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn is_element(&self, node: NodeId) -> bool {
        self.nodes[node.0].element
    }

    fn offset_parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].offset_parent
    }

    fn offset_left(&self, node: NodeId) -> f64 {
        self.nodes[node.0].left
    }

    fn offset_top(&self, node: NodeId) -> f64 {
        self.nodes[node.0].top
    }

    fn offset_width(&self, node: NodeId) -> f64 {
        self.nodes[node.0].width
    }

    fn offset_height(&self, node: NodeId) -> f64 {
        self.nodes[node.0].height
    }

    fn client_left(&self, node: NodeId) -> f64 {
        self.nodes[node.0].border_left
    }

    fn client_top(&self, node: NodeId) -> f64 {
        self.nodes[node.0].border_top
    }

    fn client_width(&self, node: NodeId) -> f64 {
        self.nodes[node.0].client_width
    }

    fn client_height(&self, node: NodeId) -> f64 {
        self.nodes[node.0].client_height
    }

    fn scroll_left(&self, node: NodeId) -> f64 {
        self.nodes[node.0].scroll_left
    }

    fn scroll_top(&self, node: NodeId) -> f64 {
        self.nodes[node.0].scroll_top
    }

    fn set_scroll_left(&mut self, node: NodeId, value: f64) {
        let node = &mut self.nodes[node.0];
        node.scroll_left = value.clamp(0.0, node.max_scroll_left);
    }

    fn set_scroll_top(&mut self, node: NodeId, value: f64) {
        let node = &mut self.nodes[node.0];
        node.scroll_top = value.clamp(0.0, node.max_scroll_top);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST: &str = r#"
[[nodes]]
name = "document"
element = false

[[nodes]]
name = "list"
parent = "document"
width = 300.0
height = 200.0
border_top = 2.0
scroll_height = 2000.0

[[nodes]]
name = "item"
parent = "list"
offset_parent = "list"
top = 1200.0
width = 300.0
height = 40.0
"#;

    #[test]
    fn test_from_toml() {
        let tree = FixtureTree::from_toml_str(LIST).unwrap();
        let list = tree.node("list").unwrap();
        let item = tree.node("item").unwrap();

        assert_eq!(tree.parent_node(item), Some(list));
        assert_eq!(tree.offset_parent(item), Some(list));
        assert!(!tree.is_element(tree.node("document").unwrap()));
        assert_eq!(tree.client_width(list), 300.0);
        assert_eq!(tree.client_height(list), 196.0);
        assert_eq!(tree.client_top(list), 2.0);
        assert_eq!(tree.name(item), "item");
    }

    #[test]
    fn test_from_json() {
        let json = r#"{"nodes": [
            {"name": "box", "width": 100.0, "height": 100.0, "scroll_height": 300.0, "scroll_top": 50.0}
        ]}"#;
        let tree = FixtureTree::from_json_str(json).unwrap();
        let node = tree.node("box").unwrap();
        assert!(tree.is_element(node));
        assert_eq!(tree.scroll_top(node), 50.0);
    }

    #[test]
    fn test_invalid_json_is_reported() {
        assert!(matches!(FixtureTree::from_json_str("{"), Err(Error::Json(_))));
        assert!(matches!(FixtureTree::from_toml_str("[[nodes]"), Err(Error::Config(_))));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = FixtureTree::from_nodes(vec![FixtureNode::new("a"), FixtureNode::new("a")]);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_unknown_reference_rejected() {
        let result = FixtureTree::from_nodes(vec![FixtureNode::new("a").parent("missing")]);
        match result {
            Err(Error::UnknownElement(name)) => assert_eq!(name, "missing"),
            other => panic!("unexpected: {:?}", other),
        }
        let tree = FixtureTree::from_nodes(vec![FixtureNode::new("a")]).unwrap();
        assert!(matches!(tree.node("b"), Err(Error::UnknownElement(_))));
    }

    #[test]
    fn test_cycles_rejected() {
        let parents = FixtureTree::from_nodes(vec![
            FixtureNode::new("a").parent("b"),
            FixtureNode::new("b").parent("a"),
        ]);
        assert!(matches!(parents, Err(Error::Config(_))));

        let offsets = FixtureTree::from_nodes(vec![FixtureNode::new("a").offset_parent("a")]);
        assert!(matches!(offsets, Err(Error::Config(_))));
    }

    #[test]
    fn test_scroll_writes_are_clamped() {
        let mut tree = FixtureTree::from_toml_str(LIST).unwrap();
        let list = tree.node("list").unwrap();

        tree.set_scroll_top(list, 5000.0);
        assert_eq!(tree.scroll_top(list), 1804.0);
        tree.set_scroll_top(list, -10.0);
        assert_eq!(tree.scroll_top(list), 0.0);
        tree.set_scroll_left(list, 20.0);
        assert_eq!(tree.scroll_left(list), 0.0);
    }

    #[test]
    fn test_initial_scroll_is_clamped() {
        let tree = FixtureTree::from_nodes(vec![FixtureNode::new("a")
            .offset(0.0, 0.0, 10.0, 10.0)
            .scroll_size(10.0, 20.0)
            .scrolled(5.0, 50.0)])
        .unwrap();
        let a = tree.node("a").unwrap();
        assert_eq!((tree.scroll_left(a), tree.scroll_top(a)), (0.0, 10.0));
    }

    #[test]
    fn test_snapshot_lists_elements() {
        let mut tree = FixtureTree::from_toml_str(LIST).unwrap();
        let list = tree.node("list").unwrap();
        tree.set_scroll_top(list, 100.0);

        let snapshot = tree.snapshot();
        let names: Vec<_> = snapshot.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["list", "item"]);
        assert_eq!(snapshot[0].scroll_top, 100.0);
    }

    #[test]
    fn test_load_by_extension() {
        let dir = std::env::temp_dir().join(format!("intoview-fixture-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let toml_path = dir.join("list.toml");
        std::fs::write(&toml_path, LIST).unwrap();
        let from_toml = FixtureTree::load(&toml_path).unwrap();
        assert_eq!(from_toml.nodes().count(), 3);

        let json_path = dir.join("list.json");
        let spec = FixtureSpec {
            nodes: vec![FixtureNode::new("only")],
        };
        std::fs::write(&json_path, serde_json::to_string(&spec).unwrap()).unwrap();
        let from_json = FixtureTree::load(&json_path).unwrap();
        assert!(from_json.node("only").is_ok());

        assert!(matches!(
            FixtureTree::load(&dir.join("missing.toml")),
            Err(Error::Io(_))
        ));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_scroll_into_view_on_loaded_fixture() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let tree = Rc::new(RefCell::new(FixtureTree::from_toml_str(LIST).unwrap()));
        let item = tree.borrow().node("item").unwrap();
        crate::scroll_into_view(&tree, Some(item), true, None, None).unwrap();

        // Item box 1200..1240 in a 196px viewport: centered at (1044 + 1200) / 2.
        let list = tree.borrow().node("list").unwrap();
        assert_eq!(tree.borrow().scroll_top(list), 1122.0);
    }
}
