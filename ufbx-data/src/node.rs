//! The generic parse tree node (spec §3, §4.5, §4.6).

use crate::strings::InternedStr;
use crate::value::NodeContent;

/// A single node of the raw FBX parse tree, shared by both front-ends.
///
/// During parsing these live in the loader's temporary arena; only the
/// handful that survive into the result scene (interned strings, a few
/// explicit result arrays) migrate to the result arena. In this port that
/// distinction is enforced by *who holds the `DomNode` tree*: the tree
/// itself is dropped at the end of `load()`, while anything a reader wants
/// to keep is copied out into an owned, `Arc`-backed scene type before that
/// happens.
#[derive(Clone, Debug)]
pub struct DomNode {
    pub name: InternedStr,
    pub content: NodeContent,
    pub children: Vec<DomNode>,
}

impl DomNode {
    pub fn new(name: InternedStr) -> Self {
        DomNode {
            name,
            content: NodeContent::default(),
            children: Vec::new(),
        }
    }

    pub fn find_child(&self, name: &str) -> Option<&DomNode> {
        self.children.iter().find(|c| c.name.as_str() == name)
    }

    pub fn find_children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a DomNode> + 'a {
        self.children.iter().filter(move |c| c.name.as_str() == name)
    }

    pub fn scalars(&self) -> &[crate::value::ScalarValue] {
        self.content.as_scalars().unwrap_or(&[])
    }

    pub fn array(&self) -> Option<&crate::value::DomArray> {
        self.content.as_array()
    }
}
