//! Formatting notifications and handing them off for delivery.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{event, instrument, Level as LogLevel};
use twilight_model::{
	channel::message::Embed,
	id::{
		marker::{ChannelMarker, GuildMarker, RoleMarker},
		Id,
	},
	util::Timestamp,
};
use twilight_util::builder::embed::{
	EmbedAuthorBuilder, EmbedBuilder, EmbedFieldBuilder, EmbedFooterBuilder, ImageSource,
};

use twilight_validate::embed::{chars, EMBED_TOTAL_LENGTH};

use crate::{config::ConfigStore, diff::DESCRIPTION_LIMIT, error::Result, format};

/// Maximum number of embeds in one message.
pub const MAX_EMBEDS: usize = 10;

/// Severity, shown as the embed's color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
	Info,
	Update,
	Alert,
	Media,
}

impl Level {
	pub const fn color(self) -> u32 {
		match self {
			Self::Info => 0x00_a3_5a,
			Self::Update => 0xff_ce_5c,
			Self::Alert => 0xff_00_00,
			Self::Media => 0x00_af_9c,
		}
	}
}

/// One embed of a [`Notification`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEmbed {
	pub level: Level,
	pub author: String,
	pub icon_url: Option<String>,
	pub description: String,
	pub footer: Option<String>,
	pub image: Option<String>,
	pub fields: Vec<(String, String)>,
}

impl LogEmbed {
	pub fn new(level: Level, author: impl Into<String>, description: impl Into<String>) -> Self {
		Self {
			level,
			author: author.into(),
			icon_url: None,
			description: description.into(),
			footer: None,
			image: None,
			fields: Vec::new(),
		}
	}

	#[must_use]
	pub fn icon_url(mut self, url: Option<String>) -> Self {
		self.icon_url = url;
		self
	}

	#[must_use]
	pub fn footer(mut self, footer: impl Into<String>) -> Self {
		self.footer = Some(footer.into());
		self
	}

	#[must_use]
	pub fn image(mut self, url: impl Into<String>) -> Self {
		self.image = Some(url.into());
		self
	}

	#[must_use]
	pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.fields.push((name.into(), value.into()));
		self
	}

	/// Image URLs Discord wouldn't accept are left out.
	fn build(&self, timestamp: Option<Timestamp>) -> Embed {
		let image = |url: &str| match ImageSource::url(url) {
			Ok(source) => Some(source),
			Err(e) => {
				event!(LogLevel::DEBUG, error = &e as &dyn std::error::Error, url, "dropping image");
				None
			}
		};

		let author_name = truncate(&self.author, 256);
		let footer = self.footer.as_deref().map(|footer| truncate(footer, 2048));
		let fields = self
			.fields
			.iter()
			.map(|(name, value)| (truncate(name, 256), truncate(value, 1024)))
			.collect::<Vec<_>>();

		// the description gives way so a single embed always fits in a message
		let used = author_name.chars().count()
			+ footer.as_deref().map_or(0, |footer| footer.chars().count())
			+ fields
				.iter()
				.map(|(name, value)| name.chars().count() + value.chars().count())
				.sum::<usize>();
		let description_limit = DESCRIPTION_LIMIT.min(EMBED_TOTAL_LENGTH.saturating_sub(used));

		let mut author = EmbedAuthorBuilder::new(author_name);
		if let Some(icon) = self.icon_url.as_deref().and_then(image) {
			author = author.icon_url(icon);
		}

		let mut builder = EmbedBuilder::new()
			.author(author)
			.color(self.level.color())
			.description(truncate(&self.description, description_limit));
		if let Some(footer) = footer {
			builder = builder.footer(EmbedFooterBuilder::new(footer));
		}
		if let Some(source) = self.image.as_deref().and_then(image) {
			builder = builder.image(source);
		}
		for (name, value) in fields {
			builder = builder.field(EmbedFieldBuilder::new(name, value));
		}
		if let Some(timestamp) = timestamp {
			builder = builder.timestamp(timestamp);
		}

		builder.build()
	}
}

fn truncate(value: &str, max: usize) -> String {
	value.chars().take(max).collect()
}

/// Something worth telling a guild's moderators about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
	pub embeds: Vec<LogEmbed>,
	pub content: String,
	/// Mention the guild's moderator role, if one is configured.
	pub ping_mod_role: bool,
}

impl Notification {
	pub fn new(embed: LogEmbed) -> Self {
		Self {
			embeds: vec![embed],
			content: String::new(),
			ping_mod_role: false,
		}
	}

	#[must_use]
	pub fn embed(mut self, embed: LogEmbed) -> Self {
		self.embeds.push(embed);
		self
	}

	#[must_use]
	pub fn content(mut self, content: impl Into<String>) -> Self {
		self.content = content.into();
		self
	}

	#[must_use]
	pub const fn ping_mod_role(mut self, ping: bool) -> Self {
		self.ping_mod_role = ping;
		self
	}
}

/// A rendered notification ready to be posted.
#[derive(Clone, Debug, PartialEq)]
pub struct Payload {
	pub content: String,
	pub embeds: Vec<Embed>,
	/// Only role that may be mentioned, nothing is mentioned if `None`.
	pub mention_role: Option<Id<RoleMarker>>,
}

impl Payload {
	/// Render a notification as one or more messages, each within Discord's embed count
	/// and total length limits.
	///
	/// Only the first message carries the content and the moderator ping.
	fn split(notification: Notification, mod_role: Option<Id<RoleMarker>>) -> Vec<Self> {
		let timestamp = Timestamp::from_secs(chrono::Utc::now().timestamp()).ok();

		let mention_role = mod_role.filter(|_| notification.ping_mod_role);
		let content = match mention_role {
			Some(role) => format::role_mention(role),
			None => notification.content,
		};

		let mut batches = vec![Vec::new()];
		let mut length = 0;
		for embed in &notification.embeds {
			let embed = embed.build(timestamp);
			let embed_length = chars(&embed);

			let batch = batches.last().map_or(0, Vec::len);
			if batch == MAX_EMBEDS || (batch > 0 && length + embed_length > EMBED_TOTAL_LENGTH) {
				batches.push(Vec::new());
				length = 0;
			}

			length += embed_length;
			if let Some(batch) = batches.last_mut() {
				batch.push(embed);
			}
		}

		let mut payloads = batches.into_iter().map(|embeds| Self {
			content: String::new(),
			embeds,
			mention_role: None,
		});
		let first = payloads.next().map(|first| Self {
			content,
			mention_role,
			..first
		});
		first.into_iter().chain(payloads).collect()
	}
}

/// Posts payloads to a channel.
#[async_trait]
pub trait Delivery: Send + Sync {
	async fn deliver(&self, channel: Id<ChannelMarker>, payload: &Payload) -> Result<()>;
}

/// Sends notifications to each guild's configured log channel.
pub struct Emitter {
	config: Arc<ConfigStore>,
	delivery: Box<dyn Delivery>,
}

impl Emitter {
	pub fn new(config: Arc<ConfigStore>, delivery: impl Delivery + 'static) -> Self {
		Self {
			config,
			delivery: Box::new(delivery),
		}
	}

	/// Does nothing for guilds without a log channel.
	///
	/// Notifications too large for one message are sent as several, in order.
	#[instrument(skip(self, notification), fields(%guild, embeds = notification.embeds.len()))]
	pub async fn emit(&self, guild: Id<GuildMarker>, notification: Notification) -> Result<()> {
		let Some(config) = self.config.get(guild).await else {
			return Ok(());
		};
		let Some(channel) = config.log_channel else {
			return Ok(());
		};

		for payload in Payload::split(notification, config.mod_role) {
			self.delivery.deliver(channel, &payload).await?;
		}
		Ok(())
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use tokio::sync::Mutex;

	use super::*;
	use crate::config::ConfigUpdate;

	/// Records every payload instead of sending it.
	#[derive(Clone, Default)]
	pub struct Recorder(pub Arc<Mutex<Vec<(Id<ChannelMarker>, Payload)>>>);

	impl Recorder {
		pub async fn take(&self) -> Vec<(Id<ChannelMarker>, Payload)> {
			std::mem::take(&mut *self.0.lock().await)
		}
	}

	#[async_trait]
	impl Delivery for Recorder {
		async fn deliver(&self, channel: Id<ChannelMarker>, payload: &Payload) -> Result<()> {
			self.0.lock().await.push((channel, payload.clone()));
			Ok(())
		}
	}

	pub const GUILD: Id<GuildMarker> = Id::new(1);
	pub const LOG_CHANNEL: Id<ChannelMarker> = Id::new(100);
	pub const MOD_ROLE: Id<RoleMarker> = Id::new(200);

	pub async fn configured() -> Arc<ConfigStore> {
		let config = Arc::new(ConfigStore::in_memory());
		config
			.update(
				GUILD,
				&[
					ConfigUpdate::SetLogChannel(LOG_CHANNEL),
					ConfigUpdate::SetModRole(MOD_ROLE),
				],
			)
			.await
			.unwrap();
		config
	}

	fn embed() -> LogEmbed {
		LogEmbed::new(Level::Alert, "mod", "Banned <@5>")
			.icon_url(Some("https://cdn.discordapp.com/embed/avatars/0.png".to_owned()))
			.footer("ID: 5")
			.field("Reason", "spam")
	}

	#[tokio::test]
	async fn no_log_channel_is_noop() {
		let recorder = Recorder::default();
		let emitter = Emitter::new(Arc::new(ConfigStore::in_memory()), recorder.clone());

		emitter.emit(GUILD, Notification::new(embed())).await.unwrap();
		assert!(recorder.take().await.is_empty());
	}

	#[tokio::test]
	async fn renders_embed() {
		let recorder = Recorder::default();
		let emitter = Emitter::new(configured().await, recorder.clone());

		emitter
			.emit(GUILD, Notification::new(embed()).content("hello"))
			.await
			.unwrap();

		let sent = recorder.take().await;
		let (channel, payload) = &sent[0];
		assert_eq!(*channel, LOG_CHANNEL);
		assert_eq!(payload.content, "hello");
		assert_eq!(payload.mention_role, None);

		let embed = &payload.embeds[0];
		assert_eq!(embed.color, Some(Level::Alert.color()));
		assert_eq!(embed.description.as_deref(), Some("Banned <@5>"));
		assert_eq!(embed.author.as_ref().map(|a| a.name.as_str()), Some("mod"));
		assert_eq!(embed.footer.as_ref().map(|f| f.text.as_str()), Some("ID: 5"));
		assert_eq!(embed.fields[0].value, "spam");
		assert!(embed.timestamp.is_some());
	}

	#[tokio::test]
	async fn pings_mod_role() {
		let recorder = Recorder::default();
		let emitter = Emitter::new(configured().await, recorder.clone());

		emitter
			.emit(
				GUILD,
				Notification::new(embed())
					.content("(ghostping)")
					.ping_mod_role(true),
			)
			.await
			.unwrap();

		let (_, payload) = recorder.take().await.remove(0);
		assert_eq!(payload.content, "<@&200>");
		assert_eq!(payload.mention_role, Some(MOD_ROLE));
	}

	#[tokio::test]
	async fn splits_past_embed_count() {
		let recorder = Recorder::default();
		let emitter = Emitter::new(configured().await, recorder.clone());

		let notification = (0..12)
			.fold(Notification::new(embed()), |n, _| n.embed(embed()))
			.ping_mod_role(true);
		emitter.emit(GUILD, notification).await.unwrap();

		let sent = recorder.take().await;
		assert_eq!(sent.len(), 2);
		assert_eq!(sent[0].1.embeds.len(), MAX_EMBEDS);
		assert_eq!(sent[1].1.embeds.len(), 3);
		assert_eq!(sent[0].1.mention_role, Some(MOD_ROLE));
		assert_eq!(sent[1].1.mention_role, None);
		assert!(sent[1].1.content.is_empty());
	}

	#[tokio::test]
	async fn splits_past_total_length() {
		let recorder = Recorder::default();
		let emitter = Emitter::new(configured().await, recorder.clone());

		// a long message with nine attachments
		let attachment = |i: usize| {
			LogEmbed::new(Level::Media, "Attachment", "y".repeat(300))
				.field("ID", format!("`{i}`"))
				.field("URL", format!("https://cdn.discordapp.com/attachments/1/2/file{i}.pdf"))
				.field("Name", format!("`file{i}.pdf`"))
				.field("Size", "`2.000mb`")
		};
		let notification = (0..9).fold(
			Notification::new(LogEmbed::new(
				Level::Media,
				"Message from user#0001",
				"x".repeat(4000),
			)),
			|n, i| n.embed(attachment(i)),
		);
		emitter.emit(GUILD, notification).await.unwrap();

		let sent = recorder.take().await;
		assert!(sent.len() > 1);
		assert_eq!(
			sent.iter().map(|(_, payload)| payload.embeds.len()).sum::<usize>(),
			10
		);
		for (_, payload) in &sent {
			twilight_validate::message::embeds(&payload.embeds).unwrap();
		}
	}

	#[test]
	fn oversized_embed_fits() {
		let embed = LogEmbed::new(Level::Info, "a".repeat(300), "b".repeat(5000))
			.footer("c".repeat(3000))
			.build(None);
		assert_eq!(embed.description.as_deref().map(str::len), Some(6000 - 256 - 2048));
		twilight_validate::message::embeds(&[embed]).unwrap();
	}

	#[test]
	fn invalid_image_is_dropped() {
		let embed = LogEmbed::new(Level::Media, "user", "")
			.image("not a url")
			.build(None);
		assert!(embed.image.is_none());
		assert_eq!(embed.color, Some(Level::Media.color()));
	}
}
