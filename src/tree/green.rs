//! Export to rowan green trees.
//!
//! Downstream tooling built on rowan (formatters, IDE layers) can consume a
//! parse result without knowing about grammar tables. Symbols map directly
//! onto rowan kinds, so `TableLanguage::kind_from_raw` round-trips.

use super::node::SyntaxNode;
use super::syntax_tree::SyntaxTree;
use crate::grammar::Symbol;
use rowan::{GreenNode, GreenNodeBuilder};
use std::str::Utf8Error;

/// Rowan language whose kinds are grammar [`Symbol`]s
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TableLanguage {}

impl rowan::Language for TableLanguage {
    type Kind = Symbol;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        Symbol::new(raw.0)
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind.raw())
    }
}

/// Type aliases for convenience
pub type RowanNode = rowan::SyntaxNode<TableLanguage>;
pub type RowanToken = rowan::SyntaxToken<TableLanguage>;

fn raw(node: SyntaxNode<'_>) -> rowan::SyntaxKind {
    rowan::SyntaxKind(node.symbol().raw())
}

impl SyntaxTree {
    /// Lossless green tree. Fails when a token's bytes are not UTF-8, since
    /// rowan stores token text as `str`.
    pub fn to_green(&self) -> Result<GreenNode, Utf8Error> {
        enum Step<'tree> {
            Enter(SyntaxNode<'tree>),
            Exit,
        }

        let mut builder = GreenNodeBuilder::new();
        let root = self.root();
        if root.subtree().is_leaf() {
            builder.start_node(raw(root));
            builder.token(raw(root), std::str::from_utf8(root.bytes())?);
            builder.finish_node();
            return Ok(builder.finish());
        }

        let mut steps = vec![Step::Enter(root)];
        while let Some(step) = steps.pop() {
            match step {
                Step::Enter(node) if node.subtree().is_leaf() => {
                    builder.token(raw(node), std::str::from_utf8(node.bytes())?);
                }
                Step::Enter(node) => {
                    builder.start_node(raw(node));
                    steps.push(Step::Exit);
                    let children: Vec<_> = node.children().collect();
                    steps.extend(children.into_iter().rev().map(Step::Enter));
                }
                Step::Exit => builder.finish_node(),
            }
        }
        Ok(builder.finish())
    }

    pub fn to_rowan(&self) -> Result<RowanNode, Utf8Error> {
        Ok(RowanNode::new_root(self.to_green()?))
    }
}
