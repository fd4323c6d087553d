//! Confirm-then-undo state machine for user deletion.
//!
//! ```text
//! Idle ──begin──▶ AwaitingConfirmation ──confirm──▶ Confirmed ──ok──▶ Deleted ──expire──▶ Finalized
//!                        │                              │                │
//!                     expire                          fail             undo
//!                        ▼                              ▼                ▼
//!                      Idle                           Idle           Finalized (restored)
//! ```
//!
//! Each timed state is tagged with an epoch. Tick callbacks carry the epoch
//! they were scheduled under and are ignored once the flow has moved on, so a
//! stale timer can never drive a newer flow.

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{ClientError, User, UserId};

/// What the operator currently sees for the delete flow.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeletePrompt {
    /// Nothing pending.
    #[default]
    Hidden,
    /// "Delete <label>?" with a countdown before it lapses.
    Confirm {
        /// Name of the user about to be deleted.
        label: String,
        /// Ticks left to confirm.
        remaining: u32,
    },
    /// Deletion done; undo available until the countdown ends.
    Undo {
        /// Server-provided or default undo text.
        message: String,
        /// Ticks left to undo.
        remaining: u32,
    },
}

/// How a delete flow ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The confirmation window lapsed; nothing was deleted.
    Expired,
    /// The user was deleted and the undo window closed.
    Deleted,
    /// The deletion was undone.
    Restored,
    /// The delete or the restore request failed.
    Failed(ClientError),
    /// The store was dropped before the flow ended.
    Abandoned,
}

/// Handle resolving once the flow it was issued for ends.
#[derive(Debug)]
pub struct DeleteTicket {
    receiver: oneshot::Receiver<DeleteOutcome>,
}

impl DeleteTicket {
    /// Wait for the flow to end.
    pub async fn outcome(self) -> DeleteOutcome {
        self.receiver.await.unwrap_or(DeleteOutcome::Abandoned)
    }
}

/// One-shot outcome sender for a flow.
#[derive(Debug, Default)]
pub(crate) struct FlowResolver(Option<oneshot::Sender<DeleteOutcome>>);

impl FlowResolver {
    pub(crate) fn resolve(&mut self, outcome: DeleteOutcome) {
        if let Some(sender) = self.0.take()
            && sender.send(outcome).is_err()
        {
            debug!("delete ticket dropped before outcome");
        }
    }
}

/// User targeted by the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DeleteTarget {
    pub(crate) id: UserId,
    pub(crate) label: String,
}

/// A removed record and the index it occupied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RemovedUser {
    pub(crate) user: User,
    pub(crate) position: usize,
}

/// A removed record handed back for restoration, with its flow's resolver.
#[derive(Debug)]
pub(crate) struct UndoClaim {
    pub(crate) removed: RemovedUser,
    pub(crate) resolver: FlowResolver,
}

/// Timer to start after a transition: the epoch to tag ticks with and the
/// token that stops it.
#[derive(Debug, Clone)]
pub(crate) struct TimerLease {
    pub(crate) epoch: u64,
    pub(crate) token: CancellationToken,
}

#[derive(Debug)]
enum FlowState {
    Idle,
    AwaitingConfirmation {
        target: DeleteTarget,
        remaining: u32,
        timer: CancellationToken,
    },
    Confirmed {
        target: DeleteTarget,
    },
    Deleted {
        removed: RemovedUser,
        message: String,
        remaining: u32,
        timer: CancellationToken,
    },
    Finalized,
}

#[derive(Debug)]
pub(crate) struct DeleteFlow {
    state: FlowState,
    epoch: u64,
    resolver: FlowResolver,
}

impl DeleteFlow {
    pub(crate) const fn new() -> Self {
        Self {
            state: FlowState::Idle,
            epoch: 0,
            resolver: FlowResolver(None),
        }
    }

    /// Start a flow for `target`. An open undo window is finalized first;
    /// a flow awaiting confirmation or in flight rejects the request.
    pub(crate) fn begin(
        &mut self,
        target: DeleteTarget,
        ticks: u32,
    ) -> Result<(TimerLease, DeleteTicket), ClientError> {
        match &self.state {
            FlowState::AwaitingConfirmation { .. } | FlowState::Confirmed { .. } => {
                return Err(ClientError::DeleteFlowBusy);
            }
            FlowState::Deleted { timer, .. } => {
                timer.cancel();
                self.resolver.resolve(DeleteOutcome::Deleted);
            }
            FlowState::Idle | FlowState::Finalized => {}
        }

        let (sender, receiver) = oneshot::channel();
        self.resolver = FlowResolver(Some(sender));
        let lease = self.next_lease();
        self.state = FlowState::AwaitingConfirmation {
            target,
            remaining: ticks,
            timer: lease.token.clone(),
        };
        Ok((lease, DeleteTicket { receiver }))
    }

    /// Apply a confirmation tick; returns whether the prompt changed.
    pub(crate) fn confirm_tick(&mut self, epoch: u64, left: u32) -> bool {
        if epoch != self.epoch {
            return false;
        }
        let FlowState::AwaitingConfirmation { remaining, .. } = &mut self.state else {
            return false;
        };
        *remaining = left;
        if left == 0 {
            self.state = FlowState::Idle;
            self.resolver.resolve(DeleteOutcome::Expired);
        }
        true
    }

    /// Accept the confirmation; yields the target to delete.
    pub(crate) fn confirm(&mut self) -> Option<DeleteTarget> {
        let FlowState::AwaitingConfirmation { target, timer, .. } = &self.state else {
            return None;
        };
        timer.cancel();
        let target = target.clone();
        self.state = FlowState::Confirmed {
            target: target.clone(),
        };
        Some(target)
    }

    /// Whether the delete request for `id` is the one in flight.
    fn is_in_flight(&self, id: &UserId) -> bool {
        matches!(&self.state, FlowState::Confirmed { target } if &target.id == id)
    }

    /// The delete request for `id` failed; the record stays and the flow ends.
    pub(crate) fn deletion_failed(&mut self, id: &UserId, error: ClientError) {
        if self.is_in_flight(id) {
            self.state = FlowState::Idle;
            self.resolver.resolve(DeleteOutcome::Failed(error));
        }
    }

    /// The delete request succeeded. Opens the undo window when a record was
    /// captured; otherwise the flow finalizes immediately.
    pub(crate) fn deletion_succeeded(
        &mut self,
        id: &UserId,
        removed: Option<RemovedUser>,
        message: String,
        ticks: u32,
    ) -> Option<TimerLease> {
        if !self.is_in_flight(id) {
            return None;
        }
        match removed {
            Some(removed) if ticks > 0 => {
                let lease = self.next_lease();
                self.state = FlowState::Deleted {
                    removed,
                    message,
                    remaining: ticks,
                    timer: lease.token.clone(),
                };
                Some(lease)
            }
            _ => {
                self.state = FlowState::Finalized;
                self.resolver.resolve(DeleteOutcome::Deleted);
                None
            }
        }
    }

    /// Apply an undo tick; returns whether the prompt changed.
    pub(crate) fn undo_tick(&mut self, epoch: u64, left: u32) -> bool {
        if epoch != self.epoch {
            return false;
        }
        let FlowState::Deleted { remaining, .. } = &mut self.state else {
            return false;
        };
        *remaining = left;
        if left == 0 {
            self.state = FlowState::Finalized;
            self.resolver.resolve(DeleteOutcome::Deleted);
        }
        true
    }

    /// Close the undo window and hand back the removed record.
    pub(crate) fn take_for_undo(&mut self) -> Option<UndoClaim> {
        if !matches!(self.state, FlowState::Deleted { .. }) {
            return None;
        }
        let FlowState::Deleted { removed, timer, .. } =
            std::mem::replace(&mut self.state, FlowState::Finalized)
        else {
            return None;
        };
        timer.cancel();
        Some(UndoClaim {
            removed,
            resolver: std::mem::take(&mut self.resolver),
        })
    }

    pub(crate) fn prompt(&self) -> DeletePrompt {
        match &self.state {
            FlowState::AwaitingConfirmation {
                target, remaining, ..
            } => DeletePrompt::Confirm {
                label: target.label.clone(),
                remaining: *remaining,
            },
            FlowState::Deleted {
                message, remaining, ..
            } => DeletePrompt::Undo {
                message: message.clone(),
                remaining: *remaining,
            },
            FlowState::Idle | FlowState::Confirmed { .. } | FlowState::Finalized => {
                DeletePrompt::Hidden
            }
        }
    }

    /// Cancel any running timer and resolve the flow as abandoned.
    pub(crate) fn abandon(&mut self) {
        match &self.state {
            FlowState::AwaitingConfirmation { timer, .. } | FlowState::Deleted { timer, .. } => {
                timer.cancel();
            }
            FlowState::Idle | FlowState::Confirmed { .. } | FlowState::Finalized => {}
        }
        self.resolver.resolve(DeleteOutcome::Abandoned);
    }

    fn next_lease(&mut self) -> TimerLease {
        self.epoch = self.epoch.wrapping_add(1);
        TimerLease {
            epoch: self.epoch,
            token: CancellationToken::new(),
        }
    }
}
