use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The lifecycle of a scheduled post.
///
/// Transitions only move forward: `pending -> generating -> completed | failed`.
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "schedule_status", rename_all = "lowercase")]
pub enum Status {
	Pending,
	Generating,
	Completed,
	Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move a scheduled post from {from} to {to}")]
pub struct TransitionError {
	pub from: Status,
	pub to: Status,
}

impl Status {
	/// Returns the next status, or an error if the move is not allowed.
	pub fn transition(self, to: Self) -> Result<Self, TransitionError> {
		match (self, to) {
			(from, to) if from.is_terminal() => Err(TransitionError { from, to }),
			(Self::Pending, Self::Generating)
			| (Self::Generating, Self::Completed | Self::Failed) => Ok(to),
			(from, to) => Err(TransitionError { from, to }),
		}
	}

	/// Whether the row has left the queue for good.
	pub fn is_terminal(self) -> bool {
		matches!(self, Self::Completed | Self::Failed)
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Pending => "pending",
			Self::Generating => "generating",
			Self::Completed => "completed",
			Self::Failed => "failed",
		}
	}
}

impl std::fmt::Display for Status {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
