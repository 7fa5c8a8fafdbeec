//! S-expression rendering.
//!
//! Only named nodes are printed, with field labels, in the format
//! tree-sitter uses for its corpus tests:
//!
//! ```text
//! (program (program) (let_statement name: (identifier) (ERROR (UNEXPECTED "?"))))
//! ```

use super::node::SyntaxNode;
use super::syntax_tree::SyntaxTree;

enum Step<'tree> {
    Enter(SyntaxNode<'tree>, Option<&'tree str>),
    Exit,
}

impl SyntaxTree {
    pub fn to_sexp(&self) -> String {
        self.root().to_sexp()
    }
}

impl SyntaxNode<'_> {
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        let mut steps = vec![Step::Enter(*self, None)];
        while let Some(step) = steps.pop() {
            let (node, field) = match step {
                Step::Enter(node, field) => (node, field),
                Step::Exit => {
                    out.push(')');
                    continue;
                }
            };

            let visible = node.is_named() || node.is_missing() || node.is_error();
            if !visible {
                push_children(node, &mut steps);
                continue;
            }

            if !out.is_empty() && !out.ends_with('(') {
                out.push(' ');
            }
            if let Some(field) = field {
                out.push_str(field);
                out.push_str(": ");
            }

            if node.is_missing() {
                if node.is_named() {
                    out.push_str(&format!("(MISSING {})", node.kind()));
                } else {
                    out.push_str(&format!("(MISSING {:?})", node.kind()));
                }
            } else if node.subtree().is_unrecognized() {
                let text = String::from_utf8_lossy(node.bytes());
                out.push_str(&format!("(UNEXPECTED {:?})", text));
            } else {
                out.push('(');
                out.push_str(node.kind());
                steps.push(Step::Exit);
                push_children(node, &mut steps);
            }
        }
        out
    }
}

fn push_children<'tree>(node: SyntaxNode<'tree>, steps: &mut Vec<Step<'tree>>) {
    let children: Vec<_> = node
        .children()
        .enumerate()
        .map(|(index, child)| Step::Enter(child, node.field_name_for_child(index)))
        .collect();
    steps.extend(children.into_iter().rev());
}
