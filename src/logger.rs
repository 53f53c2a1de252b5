//! The moderation logger: one handler per guild mutation.
//!
//! Handlers work on [snapshots](crate::snapshot) so they never touch the gateway or the
//! cache directly. Update handlers diff before asking the audit log who did it, a
//! change that isn't reported never consumes an audit log entry.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{event, instrument, Level as LogLevel};
use twilight_model::id::{
	marker::{GuildMarker, MessageMarker},
	Id,
};

use crate::{
	audit::{AuditCategory, AuditCorrelator, AuditLogSource},
	config::ConfigStore,
	diff::member,
	error::Result,
	format::{
		bitrate, bold, bool_str, bytes, channel_mention, code_block, inline_code, region,
		sticker_format, user_mention,
	},
	message::{MediaUrl, MessageSnapshot, MessageTracker},
	notify::{Delivery, Emitter, Level, LogEmbed, Notification},
	snapshot::{
		ChannelKind, ChannelSnapshot, EmojiSnapshot, RoleSnapshot, Snapshot, StickerSnapshot,
		UserSnapshot,
	},
};

const NO_CONTENT: &str = "NO_CONTENT";

pub struct Logger {
	config: Arc<ConfigStore>,
	correlator: AuditCorrelator,
	emitter: Emitter,
	messages: Mutex<MessageTracker>,
}

impl Logger {
	pub fn new(
		config: Arc<ConfigStore>,
		source: impl AuditLogSource + 'static,
		delivery: impl Delivery + 'static,
		message_capacity: usize,
	) -> Self {
		Self {
			correlator: AuditCorrelator::new(source),
			emitter: Emitter::new(Arc::clone(&config), delivery),
			config,
			messages: Mutex::new(MessageTracker::new(message_capacity)),
		}
	}

	async fn attributed(
		&self,
		guild: Id<GuildMarker>,
		category: AuditCategory,
		level: Level,
		author: impl FnOnce(&str) -> String,
		description: String,
	) -> Result<LogEmbed> {
		let who = self.correlator.correlate(guild, category).await?;
		Ok(LogEmbed::new(level, author(&who.actor_tag), description).icon_url(who.actor_avatar_url))
	}

	#[instrument(skip_all, fields(guild_id = %channel.guild_id, channel.id = %channel.id))]
	pub async fn channel_create(&self, channel: ChannelSnapshot) -> Result<()> {
		let category = channel
			.parent
			.as_ref()
			.map_or("No Category", |parent| parent.name.as_str());

		let description = match &channel.kind {
			ChannelKind::Voice {
				bitrate: bits,
				region: rtc,
				..
			} => format!(
				"{}: {}\n{}: {}\n{}: {}",
				bold("Category"),
				inline_code(category),
				bold("Bitrate"),
				inline_code(bitrate(*bits)),
				bold("Region"),
				inline_code(region(rtc.as_deref())),
			),
			ChannelKind::Text { nsfw, .. } => format!(
				"{}: {}\n{}: {}",
				bold("Category"),
				inline_code(category),
				bold("NSFW"),
				inline_code(bool_str(*nsfw)),
			),
			ChannelKind::Category | ChannelKind::Other => String::new(),
		};

		let embed = self
			.attributed(
				channel.guild_id,
				AuditCategory::ChannelCreate,
				Level::Info,
				|tag| channel_line(&channel, "created", tag),
				description,
			)
			.await?;
		self.emitter
			.emit(channel.guild_id, Notification::new(embed))
			.await
	}

	#[instrument(skip_all, fields(guild_id = %channel.guild_id, channel.id = %channel.id))]
	pub async fn channel_delete(&self, channel: ChannelSnapshot) -> Result<()> {
		let embed = self
			.attributed(
				channel.guild_id,
				AuditCategory::ChannelDelete,
				Level::Update,
				|tag| channel_line(&channel, "deleted", tag),
				String::new(),
			)
			.await?;
		self.emitter
			.emit(channel.guild_id, Notification::new(embed))
			.await
	}

	#[instrument(skip_all, fields(guild_id = %role.guild_id, role.id = %role.id))]
	pub async fn role_create(&self, role: RoleSnapshot) -> Result<()> {
		let description = format!(
			"{}: {}\n{}",
			bold("Name"),
			inline_code(&role.name),
			role_summary(&role)
		);
		let embed = self
			.attributed(
				role.guild_id,
				AuditCategory::RoleCreate,
				Level::Info,
				|tag| format!("A new role was just created by {tag}"),
				description,
			)
			.await?;
		self.emitter.emit(role.guild_id, Notification::new(embed)).await
	}

	#[instrument(skip_all, fields(guild_id = %role.guild_id, role.id = %role.id))]
	pub async fn role_delete(&self, role: RoleSnapshot) -> Result<()> {
		let embed = self
			.attributed(
				role.guild_id,
				AuditCategory::RoleDelete,
				Level::Info,
				|tag| format!("The role \"{}\" was just deleted by {tag}", role.name),
				role_summary(&role),
			)
			.await?;
		self.emitter.emit(role.guild_id, Notification::new(embed)).await
	}

	/// `uploader` comes from the event itself and takes precedence over the audit log.
	#[instrument(skip_all, fields(guild_id = %emoji.guild_id, emoji.id = %emoji.id))]
	pub async fn emoji_create(
		&self,
		emoji: EmojiSnapshot,
		uploader: Option<UserSnapshot>,
	) -> Result<()> {
		let description = if emoji.animated {
			bold("Requires Nitro")
		} else {
			String::new()
		};

		let who = self
			.correlator
			.correlate(emoji.guild_id, AuditCategory::EmojiCreate)
			.await?;
		let (tag, icon) = match uploader {
			Some(user) => (user.tag, Some(user.avatar_url)),
			None => (who.actor_tag, who.actor_avatar_url),
		};

		let embed = LogEmbed::new(
			Level::Info,
			format!("The emote \"{}\" has been created by {tag}", emoji.name),
			description,
		)
		.icon_url(icon)
		.image(emoji.url());
		self.emitter
			.emit(emoji.guild_id, Notification::new(embed))
			.await
	}

	/// `emoji` is `None` if nothing was known about the deleted emoji.
	#[instrument(skip_all, fields(%guild_id))]
	pub async fn emoji_delete(
		&self,
		guild_id: Id<GuildMarker>,
		emoji: Option<EmojiSnapshot>,
	) -> Result<()> {
		let Some(emoji) = emoji else {
			let embed = LogEmbed::new(
				Level::Alert,
				"Unknown emote deleted",
				"An emote was deleted but I was unable to retrieve any information about it!",
			);
			return self.emitter.emit(guild_id, Notification::new(embed)).await;
		};

		let embed = self
			.attributed(
				guild_id,
				AuditCategory::EmojiDelete,
				Level::Update,
				|tag| format!("The emote \"{}\" has been deleted by {tag}", emoji.name),
				String::new(),
			)
			.await?;
		self.emitter
			.emit(guild_id, Notification::new(embed.image(emoji.url())))
			.await
	}

	#[instrument(skip_all, fields(guild_id = %sticker.guild_id, sticker.id = %sticker.id))]
	pub async fn sticker_create(
		&self,
		sticker: StickerSnapshot,
		uploader: Option<UserSnapshot>,
	) -> Result<()> {
		let who = self
			.correlator
			.correlate(sticker.guild_id, AuditCategory::StickerCreate)
			.await?;
		let (tag, icon) = match uploader {
			Some(user) => (user.tag, Some(user.avatar_url)),
			None => (who.actor_tag, who.actor_avatar_url),
		};

		let embed = LogEmbed::new(
			Level::Info,
			format!("The sticker \"{}\" was just created by {tag}", sticker.name),
			sticker_summary(&sticker),
		)
		.icon_url(icon)
		.image(sticker.url());
		self.emitter
			.emit(sticker.guild_id, Notification::new(embed))
			.await
	}

	#[instrument(skip_all, fields(guild_id = %sticker.guild_id, sticker.id = %sticker.id))]
	pub async fn sticker_delete(&self, sticker: StickerSnapshot) -> Result<()> {
		let embed = self
			.attributed(
				sticker.guild_id,
				AuditCategory::StickerDelete,
				Level::Update,
				|tag| format!("The sticker \"{}\" was just deleted by {tag}", sticker.name),
				sticker_summary(&sticker),
			)
			.await?;
		self.emitter
			.emit(sticker.guild_id, Notification::new(embed))
			.await
	}

	/// Report what changed between two snapshots of the same entity.
	#[instrument(skip_all, fields(guild_id = %old.guild_id(), kind = old.kind()))]
	pub async fn update(&self, old: Snapshot, new: Snapshot) -> Result<()> {
		let Some(changes) = old.diff(&new) else {
			event!(LogLevel::DEBUG, "suppressed");
			return Ok(());
		};

		// emoji and sticker updates arrive as the guild's whole list, members change for
		// many reasons the differ doesn't describe
		if changes.is_empty()
			&& matches!(
				old,
				Snapshot::Emoji(_) | Snapshot::Sticker(_) | Snapshot::Member(_)
			) {
			return Ok(());
		}

		let guild = old.guild_id();
		let category = match (&old, &new) {
			(Snapshot::Channel(_), _) => AuditCategory::ChannelUpdate,
			(Snapshot::Role(_), _) => AuditCategory::RoleUpdate,
			(Snapshot::Emoji(_), _) => AuditCategory::EmojiUpdate,
			(Snapshot::Sticker(_), _) => AuditCategory::StickerUpdate,
			(Snapshot::Member(old), Snapshot::Member(new)) if member::roles_only(old, new) => {
				AuditCategory::MemberRoleUpdate
			}
			(Snapshot::Member(_), _) => AuditCategory::MemberUpdate,
		};
		let who = self.correlator.correlate(guild, category).await?;
		let tag = &who.actor_tag;

		let count = changes.len();
		let plural = if count == 1 { "change" } else { "changes" };
		let (level, author, image) = match (&old, &new) {
			(Snapshot::Channel(old), _) => (
				Level::Update,
				format!("{tag} made {count} {plural} to \"{}\"", old.name),
				None,
			),
			(Snapshot::Role(old), _) => (
				Level::Update,
				format!("The role \"{}\" was just edited by {tag}", old.name),
				None,
			),
			(Snapshot::Emoji(old), Snapshot::Emoji(new)) => (
				Level::Info,
				format!(
					"The emote \"{}\" has been re-named to \"{}\" by {tag}",
					old.name, new.name
				),
				Some(new.url()),
			),
			(Snapshot::Sticker(old), _) => (
				Level::Update,
				format!("The sticker \"{}\" was just edited by {tag}", old.name),
				None,
			),
			(Snapshot::Member(old), _) => (
				Level::Update,
				format!("{tag} made {count} {plural} to \"{}\"", old.tag),
				None,
			),
			(old, new) => unreachable!("diffed a {} against a {}", old.kind(), new.kind()),
		};

		let mut embed = LogEmbed::new(level, author, changes.render())
			.icon_url(who.actor_avatar_url.clone());
		if let Some(image) = image {
			embed = embed.image(image);
		}
		self.emitter.emit(guild, Notification::new(embed)).await
	}

	#[instrument(skip_all, fields(%guild_id, user.id = %user.id))]
	pub async fn ban_add(&self, guild_id: Id<GuildMarker>, user: UserSnapshot) -> Result<()> {
		let who = self
			.correlator
			.correlate(guild_id, AuditCategory::MemberBanAdd)
			.await?;
		let reason = who.reason.as_deref().unwrap_or("No Reason Set");

		let embed = LogEmbed::new(
			Level::Alert,
			format!(
				"\"{}\" was banned for \"{reason}\" by {}",
				user.tag, who.actor_tag
			),
			format!("{}: {}", bold("User"), user_mention(user.id)),
		)
		.icon_url(who.actor_avatar_url.clone())
		.footer(format!("ID: {}", user.id));
		self.emitter.emit(guild_id, Notification::new(embed)).await
	}

	#[instrument(skip_all, fields(%guild_id, user.id = %user.id))]
	pub async fn ban_remove(&self, guild_id: Id<GuildMarker>, user: UserSnapshot) -> Result<()> {
		let who = self
			.correlator
			.correlate(guild_id, AuditCategory::MemberBanRemove)
			.await?;
		let reason = who.reason.as_deref().unwrap_or("No Reason Set");

		let embed = LogEmbed::new(
			Level::Alert,
			format!("\"{}\" has been un-banned by {}", user.tag, who.actor_tag),
			format!(
				"They were originally banned for the following reason:\n{}",
				bold(format_args!("\"{reason}\""))
			),
		)
		.icon_url(who.actor_avatar_url.clone())
		.footer(format!("ID: {}", user.id));
		self.emitter.emit(guild_id, Notification::new(embed)).await
	}

	/// Only reported if the latest kick targets `user`, members also leave on their own.
	#[instrument(skip_all, fields(%guild_id, user.id = %user.id))]
	pub async fn member_remove(&self, guild_id: Id<GuildMarker>, user: UserSnapshot) -> Result<()> {
		let who = self
			.correlator
			.correlate(guild_id, AuditCategory::MemberKick)
			.await?;
		if !who.targets(user.id) {
			return Ok(());
		}

		let embed = LogEmbed::new(
			Level::Alert,
			format!("{} was just kicked by {}", user.tag, who.actor_tag),
			format!(
				"{}\n{}",
				bold("Reason"),
				code_block(who.reason.as_deref().unwrap_or("NO_REASON"))
			),
		)
		.icon_url(who.actor_avatar_url.clone())
		.footer("Sometimes the user kicking is inaccurate as there is no new audit log entry");
		self.emitter.emit(guild_id, Notification::new(embed)).await
	}

	/// Remember a message so its deletion can be logged.
	pub async fn track(&self, message: MessageSnapshot) {
		self.messages.lock().await.insert(message);
	}

	pub async fn track_edit(&self, id: Id<MessageMarker>, content: String) {
		self.messages.lock().await.edit(id, content);
	}

	/// `now` is in unix milliseconds.
	#[instrument(skip(self))]
	pub async fn message_delete(&self, id: Id<MessageMarker>, now: i64) -> Result<()> {
		let Some(message) = self.messages.lock().await.remove(id) else {
			return Ok(());
		};
		let Some(config) = self.config.get(message.guild_id).await else {
			return Ok(());
		};
		if !message.text_channel || config.is_ignored(message.channel_id) {
			return Ok(());
		}

		let ghost_ping = message.ghost_ping();
		let reply_ping = message.reply_ping();
		let ping = message.should_ping(now, config.ghost_ping_seconds);

		#[allow(clippy::cast_precision_loss)]
		let minutes = (now - message.created_at) as f64 / 60_000.0;
		let channel = inline_code(channel_name(&message));
		let content = if message.content.is_empty() {
			NO_CONTENT
		} else {
			&message.content
		};

		let time_between = inline_code(format_args!("{minutes:.2}"));
		let (description, footer) = match message.replied_user {
			Some(replied) if reply_ping => (
				format!(
					"{}\n{}: {time_between} minutes\n{}: {}\n{}: {channel}\n{}:\n{content}",
					bold("Potential Ghost Ping"),
					bold("Time Between"),
					bold("Mentioned User"),
					user_mention(replied.id),
					bold("Channel"),
					bold("Content"),
				),
				Some("This mention was a message reply"),
			),
			_ if ghost_ping => (
				format!(
					"{}\n{}: {time_between} minutes\n{}: {channel}\n{}:\n{content}",
					bold("Potential Ghost Ping"),
					bold("Time Between"),
					bold("Channel"),
					bold("Content"),
				),
				None,
			),
			_ => (
				format!("{}: {channel}\n{}:\n{content}", bold("Channel"), bold("Content")),
				None,
			),
		};

		let mut embed = LogEmbed::new(
			Level::Info,
			format!("Deleted message from {}", message.author.tag),
			description,
		)
		.icon_url(Some(message.author.avatar_url.clone()));
		if let Some(footer) = footer {
			embed = embed.footer(footer);
		}

		let notification = Notification::new(embed).ping_mod_role(ping).content(
			if ghost_ping || reply_ping {
				"(ghostping)"
			} else {
				""
			},
		);
		self.emitter.emit(message.guild_id, notification).await
	}

	/// Mirror attachments and media links, plain text messages are ignored.
	#[instrument(skip_all, fields(guild_id = %message.guild_id, message.id = %message.id))]
	pub async fn message_create(&self, message: &MessageSnapshot) -> Result<()> {
		let Some(config) = self.config.get(message.guild_id).await else {
			return Ok(());
		};
		if config.is_ignored(message.channel_id) {
			return Ok(());
		}

		let mut urls = message.media_urls();
		if message.attachments.is_empty() && urls.is_empty() {
			return Ok(());
		}

		let author = &message.author;
		let icon = || Some(author.avatar_url.clone());
		let content = if message.content.is_empty() {
			NO_CONTENT
		} else {
			&message.content
		};

		let mut first = LogEmbed::new(
			Level::Info,
			format!("Message from {}", author.tag),
			format!(
				"{}: {}\n{}: {}\n{}:\n{content}",
				bold("Author"),
				inline_code(&author.tag),
				bold("Channel"),
				channel_mention(message.channel_id),
				bold("Content"),
			),
		)
		.icon_url(icon())
		.footer("Potentially malicious files are listed below in embeds if present");
		let mut rest = Vec::new();

		for attachment in &message.attachments {
			if attachment.is_media() {
				if first.image.is_none() {
					first = first.image(&attachment.url);
				} else {
					rest.push(
						LogEmbed::new(Level::Media, &author.tag, String::new())
							.icon_url(icon())
							.image(&attachment.url),
					);
				}
			} else {
				let (name, ext) = attachment
					.filename
					.rsplit_once('.')
					.unwrap_or((&attachment.filename, ""));
				rest.push(
					LogEmbed::new(
						Level::Media,
						&author.tag,
						format!(
							"{}: {}\n{}: {}\n{}: {}\n{}: {}\n{}: {}",
							bold("ID"),
							inline_code(attachment.id),
							bold("URL"),
							inline_code(&attachment.url),
							bold("Filename"),
							inline_code(name),
							bold("Extension"),
							inline_code(ext.to_ascii_lowercase()),
							bold("Size"),
							inline_code(bytes(attachment.size)),
						),
					)
					.icon_url(icon()),
				);
			}
		}

		if first.image.is_none() {
			match urls.first() {
				Some(MediaUrl::File(url)) => {
					first = first.image(url);
					urls.remove(0);
				}
				Some(MediaUrl::Tenor(_)) => {
					first = first.field(
						"Reason for missing media:",
						"Can not display tenor URLs on embeds",
					);
				}
				None => (),
			}
		}

		for url in urls {
			let embed = LogEmbed::new(Level::Media, &author.tag, String::new()).icon_url(icon());
			rest.push(match url {
				MediaUrl::Tenor(url) => LogEmbed {
					description: format!(
						"{}\n{}: {}",
						bold("Cannot display tenor URLs"),
						bold("Tenor URL"),
						inline_code(url)
					),
					..embed
				},
				MediaUrl::File(url) => {
					let file = url
						.split(['?', '#'])
						.next()
						.and_then(|path| path.rsplit('/').next())
						.unwrap_or_default();
					let (name, ext) = file.rsplit_once('.').unwrap_or((file, ""));
					LogEmbed {
						description: format!(
							"{}: {}\n{}: {}",
							bold("Name"),
							inline_code(name),
							bold("Extension"),
							inline_code(ext),
						),
						..embed
					}
					.image(url)
				}
			});
		}

		let notification = rest.into_iter().fold(Notification::new(first), Notification::embed);
		self.emitter.emit(message.guild_id, notification).await
	}
}

/// `Text channel "general" has been created by mod`
fn channel_line(channel: &ChannelSnapshot, action: &str, tag: &str) -> String {
	match channel.kind {
		ChannelKind::Category => {
			format!("Category \"{}\" has been {action} by {tag}", channel.name)
		}
		ref kind => format!(
			"{} channel \"{}\" has been {action} by {tag}",
			kind.label(),
			channel.name
		),
	}
}

fn role_summary(role: &RoleSnapshot) -> String {
	format!(
		"{}: {}\n{}: {}\n{}: {}\n{}: {}",
		bold("Color"),
		inline_code(role.hex_color()),
		bold("Hoist"),
		inline_code(bool_str(role.hoist)),
		bold("Mentionable"),
		inline_code(bool_str(role.mentionable)),
		bold("ID"),
		inline_code(role.id),
	)
}

fn sticker_summary(sticker: &StickerSnapshot) -> String {
	format!(
		"{}: {}\n{}: {}\n{}: {}",
		bold("Format"),
		inline_code(sticker_format(sticker.format)),
		bold("ID"),
		inline_code(sticker.id),
		bold("Description"),
		inline_code(&sticker.description),
	)
}

fn channel_name(message: &MessageSnapshot) -> String {
	message
		.channel_name
		.clone()
		.unwrap_or_else(|| message.channel_id.to_string())
}

#[cfg(test)]
mod tests {
	use twilight_model::{
		channel::message::sticker::StickerFormatType,
		id::marker::GenericMarker,
	};

	use super::*;
	use crate::{
		audit::tests::{entry, FixedSource},
		config::ConfigUpdate,
		diff::tests::{role, text_channel},
		message::{tests::message, Attachment, MentionedUser},
		notify::tests::{configured, Recorder, GUILD, LOG_CHANNEL, MOD_ROLE},
		snapshot::MemberSnapshot,
	};

	async fn logger(entries: Vec<crate::audit::AuditEntry>) -> (Logger, Recorder, FixedSource) {
		let recorder = Recorder::default();
		let source = FixedSource::new(entries);
		let logger = Logger::new(configured().await, source.clone(), recorder.clone(), 16);
		(logger, recorder, source)
	}

	fn description(sent: &[(Id<twilight_model::id::marker::ChannelMarker>, crate::notify::Payload)]) -> &str {
		sent[0].1.embeds[0].description.as_deref().unwrap_or_default()
	}

	fn author(sent: &[(Id<twilight_model::id::marker::ChannelMarker>, crate::notify::Payload)]) -> &str {
		sent[0].1.embeds[0]
			.author
			.as_ref()
			.map_or("", |author| author.name.as_str())
	}

	#[tokio::test]
	async fn reorder_emits_nothing() {
		let (logger, recorder, source) = logger(vec![entry(1, "mod")]).await;

		let old = text_channel();
		let mut new = old.clone();
		new.position += 1;

		logger
			.update(Snapshot::Channel(old), Snapshot::Channel(new))
			.await
			.unwrap();

		assert!(recorder.take().await.is_empty());
		assert_eq!(source.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn role_update() {
		let (logger, recorder, _) = logger(vec![entry(1, "mod")]).await;

		let old = role();
		let mut new = old.clone();
		new.hoist = true;

		logger
			.update(Snapshot::Role(old), Snapshot::Role(new))
			.await
			.unwrap();

		let sent = recorder.take().await;
		assert_eq!(sent[0].0, LOG_CHANNEL);
		assert_eq!(author(&sent), "The role \"Mod\" was just edited by mod");
		assert_eq!(description(&sent), "Changed hoist from **False** to **True**");
		assert_eq!(sent[0].1.embeds[0].color, Some(Level::Update.color()));
	}

	#[tokio::test]
	async fn channel_update_counts_changes() {
		let (logger, recorder, _) = logger(Vec::new()).await;

		let old = text_channel();
		let mut new = old.clone();
		new.name = "new".to_owned();

		logger
			.update(Snapshot::Channel(old), Snapshot::Channel(new))
			.await
			.unwrap();

		let sent = recorder.take().await;
		assert_eq!(author(&sent), "USR_FETCH_ERR made 1 change to \"general\"");
		assert_eq!(description(&sent), "Changed the name from **general** to **new**");
	}

	#[tokio::test]
	async fn unchanged_member_is_silent() {
		let (logger, recorder, _) = logger(vec![entry(1, "mod")]).await;
		let member = MemberSnapshot {
			guild_id: GUILD,
			user_id: Id::new(5),
			tag: "user".to_owned(),
			avatar_url: String::new(),
			nick: None,
			roles: Vec::new(),
			timeout_until: None,
		};

		logger
			.update(Snapshot::Member(member.clone()), Snapshot::Member(member))
			.await
			.unwrap();
		assert!(recorder.take().await.is_empty());
	}

	#[tokio::test]
	async fn channel_create_summary() {
		let (logger, recorder, _) = logger(vec![entry(1, "mod")]).await;

		logger.channel_create(text_channel()).await.unwrap();

		let sent = recorder.take().await;
		assert_eq!(
			author(&sent),
			"Text channel \"general\" has been created by mod"
		);
		assert_eq!(
			description(&sent),
			"**Category**: `No Category`\n**NSFW**: `False`"
		);
		assert_eq!(sent[0].1.embeds[0].color, Some(Level::Info.color()));
	}

	#[tokio::test]
	async fn sticker_delete_summary() {
		let (logger, recorder, _) = logger(vec![entry(1, "mod")]).await;

		logger
			.sticker_delete(StickerSnapshot {
				id: Id::new(40),
				guild_id: GUILD,
				name: "wave".to_owned(),
				description: "hi".to_owned(),
				format: StickerFormatType::Png,
			})
			.await
			.unwrap();

		let sent = recorder.take().await;
		assert_eq!(author(&sent), "The sticker \"wave\" was just deleted by mod");
		assert_eq!(
			description(&sent),
			"**Format**: `PNG`\n**ID**: `40`\n**Description**: `hi`"
		);
	}

	#[tokio::test]
	async fn unchanged_sticker_is_silent() {
		let (logger, recorder, source) = logger(vec![entry(1, "mod")]).await;

		let sticker = StickerSnapshot {
			id: Id::new(40),
			guild_id: GUILD,
			name: "wave".to_owned(),
			description: "hi".to_owned(),
			format: StickerFormatType::Png,
		};
		logger
			.update(Snapshot::Sticker(sticker.clone()), Snapshot::Sticker(sticker.clone()))
			.await
			.unwrap();

		assert!(recorder.take().await.is_empty());
		assert_eq!(source.calls.load(std::sync::atomic::Ordering::SeqCst), 0);

		let mut renamed = sticker.clone();
		renamed.name = "hello".to_owned();
		logger
			.update(Snapshot::Sticker(sticker), Snapshot::Sticker(renamed))
			.await
			.unwrap();

		let sent = recorder.take().await;
		assert_eq!(author(&sent), "The sticker \"wave\" was just edited by mod");
		assert_eq!(source.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn ban_reason_defaults() {
		let (logger, recorder, _) = logger(vec![entry(1, "mod")]).await;
		let user = UserSnapshot {
			id: Id::new(5),
			tag: "spammer".to_owned(),
			avatar_url: String::new(),
		};

		logger.ban_add(GUILD, user).await.unwrap();

		let sent = recorder.take().await;
		assert_eq!(
			author(&sent),
			"\"spammer\" was banned for \"No Reason Set\" by mod"
		);
		assert_eq!(sent[0].1.embeds[0].color, Some(Level::Alert.color()));
	}

	#[tokio::test]
	async fn kick_requires_matching_target() {
		let mut kick = entry(1, "mod");
		kick.target_id = Some(Id::<GenericMarker>::new(5));
		kick.reason = Some("rude".to_owned());
		let (logger, recorder, _) = logger(vec![kick]).await;

		let left = UserSnapshot {
			id: Id::new(6),
			tag: "leaver".to_owned(),
			avatar_url: String::new(),
		};
		logger.member_remove(GUILD, left).await.unwrap();
		assert!(recorder.take().await.is_empty());

		let kicked = UserSnapshot {
			id: Id::new(5),
			tag: "kicked".to_owned(),
			avatar_url: String::new(),
		};
		// the entry was consumed by the previous removal
		logger.member_remove(GUILD, kicked).await.unwrap();
		assert!(recorder.take().await.is_empty());
	}

	#[tokio::test]
	async fn kick_is_reported() {
		let mut kick = entry(1, "mod");
		kick.target_id = Some(Id::<GenericMarker>::new(5));
		kick.reason = Some("rude".to_owned());
		let (logger, recorder, _) = logger(vec![kick]).await;

		let kicked = UserSnapshot {
			id: Id::new(5),
			tag: "kicked".to_owned(),
			avatar_url: String::new(),
		};
		logger.member_remove(GUILD, kicked).await.unwrap();

		let sent = recorder.take().await;
		assert_eq!(author(&sent), "kicked was just kicked by mod");
		assert_eq!(description(&sent), "**Reason**\n```\nrude\n```");
	}

	#[tokio::test]
	async fn ghost_ping_pings_mod_role() {
		let (logger, recorder, _) = logger(Vec::new()).await;

		let mut msg = message(1);
		msg.mentioned_users.push(MentionedUser {
			id: Id::new(60),
			bot: false,
		});
		let created = msg.created_at;
		logger.track(msg).await;

		logger.message_delete(Id::new(1), created + 30_000).await.unwrap();

		let sent = recorder.take().await;
		assert_eq!(sent[0].1.content, "<@&200>");
		assert_eq!(sent[0].1.mention_role, Some(MOD_ROLE));
		assert_eq!(
			description(&sent),
			"**Potential Ghost Ping**\n**Time Between**: `0.50` minutes\n**Channel**: `general`\n**Content**:\nhello"
		);
	}

	#[tokio::test]
	async fn late_ghost_ping_is_flagged_without_ping() {
		let (logger, recorder, _) = logger(Vec::new()).await;

		let mut msg = message(1);
		msg.mentioned_roles.push(Id::new(70));
		let created = msg.created_at;
		logger.track(msg).await;

		logger
			.message_delete(Id::new(1), created + 181_000)
			.await
			.unwrap();

		let sent = recorder.take().await;
		assert_eq!(sent[0].1.content, "(ghostping)");
		assert_eq!(sent[0].1.mention_role, None);
	}

	#[tokio::test]
	async fn ignored_channel_deletions_are_silent() {
		let (logger, recorder, _) = logger(Vec::new()).await;
		logger
			.config
			.update(GUILD, &[ConfigUpdate::IgnoreChannel(Id::new(10))])
			.await
			.unwrap();

		let msg = message(1);
		let created = msg.created_at;
		logger.track(msg).await;
		logger.message_delete(Id::new(1), created).await.unwrap();
		// unknown message
		logger.message_delete(Id::new(2), created).await.unwrap();

		assert!(recorder.take().await.is_empty());
	}

	#[tokio::test]
	async fn voice_chat_deletions_are_silent() {
		let (logger, recorder, _) = logger(Vec::new()).await;

		let mut msg = message(1);
		msg.text_channel = false;
		msg.mentioned_roles.push(MOD_ROLE);
		let created = msg.created_at;
		logger.track(msg).await;
		logger.message_delete(Id::new(1), created).await.unwrap();

		assert!(recorder.take().await.is_empty());
	}

	#[tokio::test]
	async fn plain_deletion() {
		let (logger, recorder, _) = logger(Vec::new()).await;

		let mut msg = message(1);
		msg.content = String::new();
		let created = msg.created_at;
		logger.track(msg).await;
		logger.message_delete(Id::new(1), created).await.unwrap();

		let sent = recorder.take().await;
		assert_eq!(sent[0].1.content, "");
		assert_eq!(
			description(&sent),
			"**Channel**: `general`\n**Content**:\nNO_CONTENT"
		);
	}

	#[tokio::test]
	async fn media_message() {
		let (logger, recorder, _) = logger(Vec::new()).await;

		let mut msg = message(1);
		msg.content = "https://tenor.com/view/x https://example.com/a.webm".to_owned();
		msg.attachments = vec![
			Attachment {
				id: Id::new(2),
				filename: "cat.png".to_owned(),
				url: "https://cdn.discordapp.com/attachments/1/2/cat.png".to_owned(),
				size: 10,
			},
			Attachment {
				id: Id::new(3),
				filename: "setup.EXE".to_owned(),
				url: "https://cdn.discordapp.com/attachments/1/3/setup.EXE".to_owned(),
				size: 2048,
			},
		];

		logger.message_create(&msg).await.unwrap();

		let sent = recorder.take().await;
		let embeds = &sent[0].1.embeds;
		assert_eq!(embeds.len(), 4);
		assert_eq!(
			embeds[0].image.as_ref().map(|image| image.url.as_str()),
			Some("https://cdn.discordapp.com/attachments/1/2/cat.png")
		);
		assert!(embeds[1]
			.description
			.as_deref()
			.unwrap_or_default()
			.ends_with("**Extension**: `exe`\n**Size**: `2.000kb`"));
		assert!(embeds[2]
			.description
			.as_deref()
			.unwrap_or_default()
			.starts_with("**Cannot display tenor URLs**"));
		assert_eq!(
			embeds[3].description.as_deref(),
			Some("**Name**: `a`\n**Extension**: `webm`")
		);
		assert_eq!(embeds[3].color, Some(Level::Media.color()));
	}

	#[tokio::test]
	async fn text_message_is_ignored() {
		let (logger, recorder, _) = logger(Vec::new()).await;
		logger.message_create(&message(1)).await.unwrap();
		assert!(recorder.take().await.is_empty());
	}
}
