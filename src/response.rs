use twilight_model::{
	channel::message::{AllowedMentions, MessageFlags},
	http::interaction::{InteractionResponse, InteractionResponseType},
};
use twilight_util::builder::InteractionResponseDataBuilder;

/// Emojis used in responses
pub struct Emoji;

impl Emoji {
	pub const CHECK_MARK: &'static str = "\u{2705}";
	pub const WARNING: &'static str = "\u{26A0}\u{FE0F}";
}

/// Markdown / prettier unicode symbols
pub struct Markdown;

impl Markdown {
	pub const BULLET_POINT: &'static str = "\u{2022}";
}

/// Interaction responses, only visible to the invoking user.
pub struct Response;

impl Response {
	/// Message that renders mentions without pinging anyone.
	pub fn message(msg: impl Into<String>) -> InteractionResponse {
		InteractionResponse {
			kind: InteractionResponseType::ChannelMessageWithSource,
			data: Some(
				InteractionResponseDataBuilder::new()
					.allowed_mentions(AllowedMentions::default())
					.content(msg)
					.flags(MessageFlags::EPHEMERAL)
					.build(),
			),
		}
	}
}
