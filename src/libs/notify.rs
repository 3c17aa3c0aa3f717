//! Change notifications emitted after a successful write.
//!
//! Views do not subscribe to the store. A caller that wants to refresh after a
//! write either re-runs its queries or installs a hook on the workflow.

use crate::store::{ChildId, RecordId, RecordKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Inserted,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub kind: RecordKind,
    pub action: ChangeAction,
    pub child: ChildId,
    pub id: RecordId,
}

pub type ChangeHook = Box<dyn Fn(&Change) + Send + Sync>;

/// Optional hook plus a debug trace of every change.
#[derive(Default)]
pub struct Notifier {
    hook: Option<ChangeHook>,
}

impl Notifier {
    pub fn set(&mut self, hook: ChangeHook) {
        self.hook = Some(hook);
    }

    pub fn emit(&self, change: Change) {
        tracing::debug!(
            kind = %change.kind,
            action = ?change.action,
            child = %change.child,
            id = %change.id,
            "record changed"
        );
        if let Some(hook) = &self.hook {
            hook(&change);
        }
    }
}
