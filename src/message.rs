//! Recently seen messages, kept so deletions can be logged after the fact.

use std::collections::{HashMap, VecDeque};

use twilight_model::{
	channel::{Channel, ChannelType, Message},
	id::{
		marker::{AttachmentMarker, ChannelMarker, GuildMarker, MessageMarker, RoleMarker, UserMarker},
		Id,
	},
};
use url::Url;

use crate::snapshot::UserSnapshot;

pub const DEFAULT_CAPACITY: usize = 10_000;

/// File extensions Discord embeds inline.
pub const MEDIA_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "mp4", "mp3", "webp", "mov", "webm"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MentionedUser {
	pub id: Id<UserMarker>,
	pub bot: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
	pub id: Id<AttachmentMarker>,
	pub filename: String,
	pub url: String,
	/// Bytes.
	pub size: u64,
}

impl Attachment {
	pub fn extension(&self) -> Option<String> {
		extension(&self.filename)
	}

	pub fn is_media(&self) -> bool {
		self.extension()
			.is_some_and(|ext| MEDIA_EXTENSIONS.contains(&ext.as_str()))
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageSnapshot {
	pub id: Id<MessageMarker>,
	pub guild_id: Id<GuildMarker>,
	pub channel_id: Id<ChannelMarker>,
	pub channel_name: Option<String>,
	/// Sent in a guild text channel, rather than a thread or a voice channel's chat.
	pub text_channel: bool,
	pub author: UserSnapshot,
	pub content: String,
	/// Unix milliseconds.
	pub created_at: i64,
	pub attachments: Vec<Attachment>,
	pub mentioned_users: Vec<MentionedUser>,
	pub mentioned_roles: Vec<Id<RoleMarker>>,
	pub replied_user: Option<MentionedUser>,
}

impl MessageSnapshot {
	/// Returns `None` for DMs and messages sent by bots.
	///
	/// `channel` is the cached channel the message was sent in.
	pub fn new(message: &Message, channel: Option<&Channel>) -> Option<Self> {
		if message.author.bot {
			return None;
		}

		Some(Self {
			id: message.id,
			guild_id: message.guild_id?,
			channel_id: message.channel_id,
			channel_name: channel.and_then(|channel| channel.name.clone()),
			text_channel: channel.is_some_and(|channel| channel.kind == ChannelType::GuildText),
			author: UserSnapshot::new(&message.author),
			content: message.content.clone(),
			created_at: message.timestamp.as_micros() / 1000,
			attachments: message
				.attachments
				.iter()
				.map(|attachment| Attachment {
					id: attachment.id,
					filename: attachment.filename.clone(),
					url: attachment.url.clone(),
					size: attachment.size,
				})
				.collect(),
			mentioned_users: message
				.mentions
				.iter()
				.map(|mention| MentionedUser {
					id: mention.id,
					bot: mention.bot,
				})
				.collect(),
			mentioned_roles: message.mention_roles.clone(),
			replied_user: message.referenced_message.as_ref().map(|replied| MentionedUser {
				id: replied.author.id,
				bot: replied.author.bot,
			}),
		})
	}

	/// Mentions a human or a role.
	pub fn ghost_ping(&self) -> bool {
		self.mentioned_users.iter().any(|user| !user.bot) || !self.mentioned_roles.is_empty()
	}

	/// Replies to a human.
	pub fn reply_ping(&self) -> bool {
		self.replied_user.is_some_and(|user| !user.bot)
	}

	/// Whether deleting the message at `now` (unix milliseconds) warrants pinging
	/// moderators.
	pub fn should_ping(&self, now: i64, threshold_secs: u64) -> bool {
		let threshold = i64::try_from(threshold_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
		now - self.created_at <= threshold && (self.ghost_ping() || self.reply_ping())
	}

	pub fn media_urls(&self) -> Vec<MediaUrl> {
		media_urls(&self.content)
	}
}

/// A link in message content that Discord would embed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaUrl {
	/// Links straight to a media file.
	File(String),
	/// Tenor page, not displayable in an embed.
	Tenor(String),
}

pub fn media_urls(content: &str) -> Vec<MediaUrl> {
	content
		.split_whitespace()
		.filter_map(|token| {
			let url = Url::parse(token).ok()?;
			if !matches!(url.scheme(), "http" | "https") {
				return None;
			}

			let host = url.host_str()?;
			if host == "tenor.com" || host.ends_with(".tenor.com") {
				return Some(MediaUrl::Tenor(token.to_owned()));
			}

			let ext = extension(url.path())?;
			MEDIA_EXTENSIONS
				.contains(&ext.as_str())
				.then(|| MediaUrl::File(token.to_owned()))
		})
		.collect()
}

/// Lowercased extension of a file name or URL path.
pub fn extension(name: &str) -> Option<String> {
	let file = name.rsplit('/').next()?;
	let (stem, ext) = file.rsplit_once('.')?;
	(!stem.is_empty() && !ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

/// Bounded FIFO of [`MessageSnapshot`]s.
#[derive(Debug)]
pub struct MessageTracker {
	capacity: usize,
	order: VecDeque<Id<MessageMarker>>,
	messages: HashMap<Id<MessageMarker>, MessageSnapshot>,
}

impl MessageTracker {
	pub fn new(capacity: usize) -> Self {
		Self {
			capacity,
			order: VecDeque::with_capacity(capacity),
			messages: HashMap::with_capacity(capacity),
		}
	}

	/// Evicts the oldest message when full.
	pub fn insert(&mut self, message: MessageSnapshot) {
		if self.capacity == 0 {
			return;
		}

		if self.messages.insert(message.id, message.clone()).is_some() {
			return;
		}
		self.order.push_back(message.id);

		while self.order.len() > self.capacity {
			if let Some(oldest) = self.order.pop_front() {
				self.messages.remove(&oldest);
			}
		}
	}

	/// Replaces a tracked message's content, e.g. after an edit.
	pub fn edit(&mut self, id: Id<MessageMarker>, content: String) {
		if let Some(message) = self.messages.get_mut(&id) {
			message.content = content;
		}
	}

	pub fn remove(&mut self, id: Id<MessageMarker>) -> Option<MessageSnapshot> {
		let message = self.messages.remove(&id)?;
		self.order.retain(|&tracked| tracked != id);
		Some(message)
	}

	#[cfg(test)]
	pub fn len(&self) -> usize {
		self.messages.len()
	}
}
