//! Parse stack
//!
//! Items pushed on the stack are offered to the top frame first; see
//! [`StackItem::check`] for what a frame may do with them. Replacement items
//! are pushed depth first, so a frame collapsing into a node delivers that
//! node to the frame below before anything else arrives.

use std::collections::VecDeque;
use std::rc::Rc;

use super::items::{ArrayState, Env, ItemKind, Outcome, StackItem};
use super::parser::{ParseContext, MAX_NESTING};
use super::tree::NodeId;
use crate::utils::error::{ErrorKind, ParseResult, TexError};

#[derive(Debug)]
pub struct Stack {
    items: Vec<StackItem>,
}

impl Stack {
    /// A stack holding only the start frame
    pub fn new(env: Rc<Env>) -> Self {
        Stack {
            items: vec![StackItem::new(ItemKind::Start, env)],
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: StackItem, ctx: &mut ParseContext) -> ParseResult<()> {
        let mut queue = VecDeque::from([item]);
        while let Some(item) = queue.pop_front() {
            let Some(top) = self.items.last_mut() else {
                self.items.push(item);
                continue;
            };
            log::trace!("push {} onto {}", item.name(), top.name());
            match top.check(item, ctx)? {
                Outcome::Absorbed => {}
                Outcome::Push(item) => {
                    if self.items.len() + ctx.outer_frames >= MAX_NESTING {
                        return Err(TexError::simple(ErrorKind::MaxMacroSub1));
                    }
                    self.items.push(item);
                }
                Outcome::Replace(items) => {
                    self.items.pop();
                    for item in items.into_iter().rev() {
                        queue.push_front(item);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn top(&self) -> Option<&StackItem> {
        self.items.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut StackItem> {
        self.items.last_mut()
    }

    /// Remove the top frame without checks
    pub fn pop(&mut self) -> Option<StackItem> {
        self.items.pop()
    }

    /// Environment of the top frame
    pub fn env(&self) -> Rc<Env> {
        self.items.last().map(|t| Rc::clone(&t.env)).unwrap_or_default()
    }

    /// Environment of the top frame, for modification
    pub fn env_mut(&mut self) -> Option<&mut Env> {
        self.items.last_mut().map(|t| Rc::make_mut(&mut t.env))
    }

    /// Take the last finished node of the top frame
    pub fn prev(&mut self) -> Option<NodeId> {
        self.items.last_mut().and_then(|t| t.nodes.pop())
    }

    /// Innermost array frame, if any
    pub fn array(&self) -> Option<&ArrayState> {
        self.items.iter().rev().find_map(|item| match &item.kind {
            ItemKind::Array(state) => Some(state.as_ref()),
            _ => None,
        })
    }

    pub fn array_mut(&mut self) -> Option<&mut ArrayState> {
        self.items.iter_mut().rev().find_map(|item| match &mut item.kind {
            ItemKind::Array(state) => Some(state.as_mut()),
            _ => None,
        })
    }

    /// Innermost automatic fence, looking through style and fraction
    /// frames that its closer would end first
    pub fn auto_open_mut(&mut self) -> Option<&mut StackItem> {
        for item in self.items.iter_mut().rev() {
            match item.kind {
                ItemKind::AutoOpen { .. } => return Some(item),
                ItemKind::Style { .. } | ItemKind::Over(_) => continue,
                _ => return None,
            }
        }
        None
    }

    /// The finished root once the stop item has been pushed
    pub fn result(&self) -> Option<NodeId> {
        match self.items.as_slice() {
            [StackItem {
                kind: ItemKind::Mml(node),
                ..
            }] => Some(*node),
            _ => None,
        }
    }
}
