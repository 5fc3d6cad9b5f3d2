//! Drag-and-drop interpretation for the field tree
//!
//! Pointer events are reduced to three calls: [`DragController::start`],
//! [`DragController::over`] and [`DragController::drop`] (or `cancel`). Nothing is
//! mutated before the drop; `over` only classifies the target and pre-checks it.

use tracing::debug;

use super::tree::{SchemaTree, TreeError};
use crate::domain::FieldId;

/// Something the pointer can be over while dragging
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// The zone that moves a field back to the top level
    RootZone,
    /// The nested drop zone rendered inside a container field
    NestedZone(FieldId),
    /// Another field's own row
    Row(FieldId),
}

impl DropTarget {
    fn is_zone(&self) -> bool {
        matches!(self, DropTarget::RootZone | DropTarget::NestedZone(_))
    }
}

/// Pick the effective target among everything under the pointer.
///
/// Drop zones win over rows so that aiming at a nested zone never reorders.
pub fn resolve_collision(hits: &[DropTarget]) -> Option<DropTarget> {
    hits.iter()
        .find(|hit| hit.is_zone())
        .or_else(|| hits.first())
        .cloned()
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        source: FieldId,
    },
    OverTarget {
        source: FieldId,
        target: DropTarget,
        valid: bool,
    },
}

/// What a drop did to the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Moved {
        field: FieldId,
        parent: Option<FieldId>,
    },
    Reordered {
        parent: Option<FieldId>,
        from: usize,
        to: usize,
    },
    Rejected(TreeError),
    /// Nothing valid under the pointer, or no drag in progress
    Ignored,
}

enum DropPlan {
    Move(Option<FieldId>),
    Reorder {
        parent: Option<FieldId>,
        from: usize,
        to: usize,
    },
    Invalid(TreeError),
    Nothing,
}

fn plan(tree: &SchemaTree, source: &FieldId, target: &DropTarget) -> DropPlan {
    let checked = |parent: Option<FieldId>| match tree.check_move(source, parent.as_ref()) {
        Ok(()) => DropPlan::Move(parent),
        Err(e) => DropPlan::Invalid(e),
    };

    match target {
        DropTarget::RootZone => checked(None),
        DropTarget::NestedZone(owner) => checked(Some(owner.clone())),
        DropTarget::Row(row) if row == source => DropPlan::Nothing,
        DropTarget::Row(row) => match tree.get(row) {
            None => DropPlan::Invalid(TreeError::FieldNotFound(row.clone())),
            Some(field) if field.can_have_children() => checked(Some(row.clone())),
            Some(_) => {
                let parent = tree.parent_of(source);
                if parent != tree.parent_of(row) {
                    return DropPlan::Nothing;
                }
                match (tree.index_in_parent(source), tree.index_in_parent(row)) {
                    (Some(from), Some(to)) => DropPlan::Reorder {
                        parent: parent.cloned(),
                        from,
                        to,
                    },
                    _ => DropPlan::Nothing,
                }
            }
        },
    }
}

/// Drag gesture state machine
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        !matches!(self.state, DragState::Idle)
    }

    /// Target currently flagged invalid, for visual feedback
    pub fn invalid_target(&self) -> Option<&DropTarget> {
        match &self.state {
            DragState::OverTarget {
                target,
                valid: false,
                ..
            } => Some(target),
            _ => None,
        }
    }

    pub fn start(&mut self, source: FieldId) {
        debug!("Drag started for field {}", source);
        self.state = DragState::Dragging { source };
    }

    /// Pointer moved over `hits`; returns whether the resolved target would accept the drop.
    ///
    /// Only a target that fails the structural pre-check is flagged invalid. A row
    /// that is simply not a drop target leaves the gesture in `Dragging`.
    pub fn over(&mut self, tree: &SchemaTree, hits: &[DropTarget]) -> bool {
        let source = match &self.state {
            DragState::Idle => return false,
            DragState::Dragging { source } | DragState::OverTarget { source, .. } => {
                source.clone()
            }
        };
        let Some(target) = resolve_collision(hits) else {
            self.state = DragState::Dragging { source };
            return false;
        };
        let valid = match plan(tree, &source, &target) {
            DropPlan::Nothing => {
                self.state = DragState::Dragging { source };
                return false;
            }
            DropPlan::Invalid(_) => false,
            DropPlan::Move(_) | DropPlan::Reorder { .. } => true,
        };
        self.state = DragState::OverTarget {
            source,
            target,
            valid,
        };
        valid
    }

    /// Finish the gesture, applying the move or reorder under the pointer.
    ///
    /// The controller is back to idle afterwards whatever the outcome.
    pub fn drop(&mut self, tree: &mut SchemaTree) -> DropOutcome {
        let state = std::mem::take(&mut self.state);
        let DragState::OverTarget { source, target, .. } = state else {
            return DropOutcome::Ignored;
        };

        match plan(tree, &source, &target) {
            DropPlan::Move(parent) => match tree.move_field(&source, parent.as_ref()) {
                Ok(()) => DropOutcome::Moved {
                    field: source,
                    parent,
                },
                Err(e) => DropOutcome::Rejected(e),
            },
            DropPlan::Reorder { parent, from, to } => {
                match tree.reorder(parent.as_ref(), from, to) {
                    Ok(()) => DropOutcome::Reordered { parent, from, to },
                    Err(e) => DropOutcome::Rejected(e),
                }
            }
            DropPlan::Invalid(e) => {
                debug!("Drop of {} rejected: {}", source, e);
                DropOutcome::Rejected(e)
            }
            DropPlan::Nothing => DropOutcome::Ignored,
        }
    }

    /// Abandon the gesture without touching the tree
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}
