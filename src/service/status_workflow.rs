// service/status_workflow.rs
//! Two-party status negotiation. One side proposes, the other confirms or
//! rejects; staff with override rights can set a status directly.

use crate::{
    dtos::workrequestdtos::UpdateStatusDto,
    error::ClientError,
    models::{
        usermodel::Session,
        workrequestmodel::{StatusState, WorkRequest, WorkRequestStatus},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    Propose(WorkRequestStatus),
    Confirm,
    Reject,
    Override(WorkRequestStatus),
}

/// The request to send and the state the server is expected to answer with.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusPlan {
    pub payload: UpdateStatusDto,
    pub expected: StatusState,
}

fn pending_of(
    id: i64,
    state: &StatusState,
    actor_id: i64,
) -> Result<(WorkRequestStatus, WorkRequestStatus), ClientError> {
    match *state {
        StatusState::Settled(_) => Err(ClientError::NoPendingChange(id)),
        StatusState::ProposedChange { proposer_id, .. } if proposer_id == actor_id => {
            Err(ClientError::SelfConfirmation(actor_id))
        }
        StatusState::ProposedChange {
            current, proposed, ..
        } => Ok((current, proposed)),
    }
}

/// Applies `action` by `actor` to `state` without touching the network.
pub fn apply(
    id: i64,
    state: &StatusState,
    actor: &Session,
    action: StatusAction,
) -> Result<StatusState, ClientError> {
    let current = state.current();
    if current.is_terminal() {
        return Err(ClientError::RequestClosed(id));
    }

    match action {
        StatusAction::Propose(next) => {
            if state.pending().is_some() {
                return Err(ClientError::ChangeAlreadyPending(id));
            }
            if !current.can_move_to(next) {
                return Err(ClientError::InvalidStatusTransition {
                    id,
                    from: current,
                    to: next,
                });
            }
            Ok(StatusState::ProposedChange {
                current,
                proposed: next,
                proposer_id: actor.user_id(),
            })
        }
        StatusAction::Confirm => {
            let (_, proposed) = pending_of(id, state, actor.user_id())?;
            Ok(StatusState::Settled(proposed))
        }
        StatusAction::Reject => {
            let (current, _) = pending_of(id, state, actor.user_id())?;
            Ok(StatusState::Settled(current))
        }
        StatusAction::Override(next) => {
            if !actor.role().can_override_status() {
                return Err(ClientError::PermissionDenied(format!(
                    "{} cannot set work request status directly",
                    actor.role().to_str()
                )));
            }
            if next == current && state.pending().is_none() {
                return Err(ClientError::InvalidStatusTransition {
                    id,
                    from: current,
                    to: next,
                });
            }
            Ok(StatusState::Settled(next))
        }
    }
}

/// Validates `action` against `request` and builds the status update body.
pub fn plan(
    request: &WorkRequest,
    actor: &Session,
    action: StatusAction,
) -> Result<StatusPlan, ClientError> {
    let expected = apply(request.id, &request.state, actor, action)?;

    let payload = match action {
        StatusAction::Propose(next) | StatusAction::Override(next) => {
            UpdateStatusDto::propose(next)
        }
        StatusAction::Confirm => match request.state.pending() {
            Some((proposed, _)) => UpdateStatusDto::confirm(proposed),
            None => return Err(ClientError::NoPendingChange(request.id)),
        },
        StatusAction::Reject => match request.state.pending() {
            Some((proposed, _)) => UpdateStatusDto::reject(proposed),
            None => return Err(ClientError::NoPendingChange(request.id)),
        },
    };

    Ok(StatusPlan { payload, expected })
}
