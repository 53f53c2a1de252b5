use thiserror::Error;
use twilight_http::response::DeserializeBodyError;
use twilight_validate::{message::MessageValidationError, request::ValidationError};

/// Failure while producing or delivering a single notification.
///
/// None of these are fatal to the bot, the event router logs them and moves on.
#[derive(Debug, Error)]
pub enum Error {
	#[error("discord request failed")]
	Discord(#[from] twilight_http::Error),
	#[error("failed to deserialize discord response")]
	Deserialize(#[from] DeserializeBodyError),
	#[error("request rejected before sending")]
	Validation(#[from] ValidationError),
	#[error("message rejected before sending")]
	Message(#[from] MessageValidationError),
	#[error("discord returned a webhook without a token")]
	WebhookToken,
	#[error("failed to access the configuration file")]
	Io(#[from] std::io::Error),
	#[error("failed to (de)serialize the configuration file")]
	Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
