use crate::error::TaskError;

/// How a `submit` call was handled. Submission never fails outright; a
/// rejected command has already been reported in the conversation.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Blank command, nothing was sent.
    Ignored,
    Accepted { task_id: String },
    Rejected(TaskError),
    /// A newer submission or `dispose` overtook this one while it was in flight.
    Superseded,
}

impl SubmitOutcome {
    pub fn task_id(&self) -> Option<&str> {
        match self {
            SubmitOutcome::Accepted { task_id } => Some(task_id),
            _ => None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted { .. })
    }
}
