//! Incoming Discord events.

use std::{
	collections::{HashMap, HashSet},
	hash::Hash,
};

use futures_util::{future::BoxFuture, FutureExt};
use tracing::{event, Level};
use twilight_gateway::Event;
use twilight_model::{
	channel::Channel,
	id::{
		marker::{ChannelMarker, EmojiMarker, GuildMarker, StickerMarker},
		Id,
	},
};

use crate::{
	commands,
	error::Result,
	message::MessageSnapshot,
	snapshot::{
		ChannelSnapshot, EmojiSnapshot, MemberSnapshot, RoleSnapshot, Snapshot, StickerSnapshot,
		UserSnapshot,
	},
	Bot,
};

type Job = BoxFuture<'static, Result<()>>;

/// Process an event.
///
/// Called sequentially from the gateway loop: previous state is read from the cache
/// and the cache updated before any handler is spawned, so handlers never see state
/// newer than their event.
pub async fn process(bot: &'static Bot, event: Event) {
	let jobs = jobs(bot, &event).await;

	bot.cache.update(&event);

	for job in jobs {
		tokio::spawn(async move {
			if let Err(e) = job.await {
				event!(
					Level::ERROR,
					error = &e as &dyn std::error::Error,
					"failed to log event"
				);
			}
		});
	}
}

#[allow(clippy::too_many_lines)]
async fn jobs(bot: &'static Bot, event: &Event) -> Vec<Job> {
	let logger = &bot.logger;

	match event {
		Event::ChannelCreate(c) => channel(bot, &c.0)
			.map(|channel| logger.channel_create(channel).boxed())
			.into_iter()
			.collect(),
		Event::ChannelDelete(c) => channel(bot, &c.0)
			.map(|channel| logger.channel_delete(channel).boxed())
			.into_iter()
			.collect(),
		Event::ChannelUpdate(c) => {
			let old = bot
				.cache
				.channel(c.id)
				.map(|cached| cached.value().clone())
				.and_then(|cached| channel(bot, &cached));
			match (old, channel(bot, &c.0)) {
				(Some(old), Some(new)) => {
					vec![logger
						.update(Snapshot::Channel(old), Snapshot::Channel(new))
						.boxed()]
				}
				_ => Vec::new(),
			}
		}
		Event::RoleCreate(r) => {
			vec![logger.role_create(RoleSnapshot::new(r.guild_id, &r.role)).boxed()]
		}
		Event::RoleDelete(r) => bot
			.cache
			.role(r.role_id)
			.map(|cached| logger.role_delete(RoleSnapshot::new(r.guild_id, cached.resource())).boxed())
			.into_iter()
			.collect(),
		Event::RoleUpdate(r) => bot
			.cache
			.role(r.role.id)
			.map(|cached| {
				let old = RoleSnapshot::new(r.guild_id, cached.resource());
				let new = RoleSnapshot::new(r.guild_id, &r.role);
				logger.update(Snapshot::Role(old), Snapshot::Role(new)).boxed()
			})
			.into_iter()
			.collect(),
		Event::GuildEmojisUpdate(e) => {
			let Some(old) = cached_emojis(bot, e.guild_id) else {
				event!(Level::DEBUG, guild_id = %e.guild_id, "emojis not cached");
				return Vec::new();
			};
			let new = e
				.emojis
				.iter()
				.map(|emoji| {
					(
						emoji.id,
						EmojiSnapshot::new(e.guild_id, emoji),
						emoji.user.as_ref().map(UserSnapshot::new),
					)
				})
				.collect();

			let guild_id = e.guild_id;
			list_changes(old, new)
				.into_iter()
				.map(|change| match change {
					ListChange::Created(emoji, uploader) => {
						logger.emoji_create(emoji, uploader).boxed()
					}
					ListChange::Updated(old, new) => logger
						.update(Snapshot::Emoji(old), Snapshot::Emoji(new))
						.boxed(),
					ListChange::Deleted(emoji) => logger.emoji_delete(guild_id, emoji).boxed(),
				})
				.collect()
		}
		Event::GuildStickersUpdate(s) => {
			let Some(old) = cached_stickers(bot, s.guild_id) else {
				event!(Level::DEBUG, guild_id = %s.guild_id, "stickers not cached");
				return Vec::new();
			};
			let new = s
				.stickers
				.iter()
				.map(|sticker| {
					(
						sticker.id,
						StickerSnapshot::new(s.guild_id, sticker),
						sticker.user.as_ref().map(UserSnapshot::new),
					)
				})
				.collect();

			list_changes(old, new)
				.into_iter()
				.filter_map(|change| match change {
					ListChange::Created(sticker, uploader) => {
						Some(logger.sticker_create(sticker, uploader).boxed())
					}
					ListChange::Updated(old, new) => Some(
						logger
							.update(Snapshot::Sticker(old), Snapshot::Sticker(new))
							.boxed(),
					),
					ListChange::Deleted(Some(sticker)) => {
						Some(logger.sticker_delete(sticker).boxed())
					}
					ListChange::Deleted(None) => {
						event!(Level::DEBUG, guild_id = %s.guild_id, "uncached sticker deleted");
						None
					}
				})
				.collect()
		}
		Event::BanAdd(b) => vec![logger.ban_add(b.guild_id, UserSnapshot::new(&b.user)).boxed()],
		Event::BanRemove(b) => {
			vec![logger.ban_remove(b.guild_id, UserSnapshot::new(&b.user)).boxed()]
		}
		Event::MemberRemove(m) => {
			vec![logger.member_remove(m.guild_id, UserSnapshot::new(&m.user)).boxed()]
		}
		Event::MemberUpdate(m) => {
			let timeout = |until: Option<twilight_model::util::Timestamp>| {
				until.map(twilight_model::util::Timestamp::as_secs)
			};
			let old = bot.cache.member(m.guild_id, m.user.id).map(|cached| {
				MemberSnapshot::new(
					m.guild_id,
					&m.user,
					cached.nick(),
					cached.roles(),
					timeout(cached.communication_disabled_until()),
				)
			});
			let new = MemberSnapshot::new(
				m.guild_id,
				&m.user,
				m.nick.as_deref(),
				&m.roles,
				timeout(m.communication_disabled_until),
			);

			old.map(|old| logger.update(Snapshot::Member(old), Snapshot::Member(new)).boxed())
				.into_iter()
				.collect()
		}
		Event::MessageCreate(m) => {
			let message = {
				let channel = bot.cache.channel(m.channel_id);
				MessageSnapshot::new(&m.0, channel.as_deref())
			};
			let Some(message) = message else {
				return Vec::new();
			};

			logger.track(message.clone()).await;
			vec![async move { logger.message_create(&message).await }.boxed()]
		}
		Event::MessageUpdate(m) => {
			if let Some(content) = &m.content {
				logger.track_edit(m.id, content.clone()).await;
			}
			Vec::new()
		}
		Event::MessageDelete(m) => {
			let now = chrono::Utc::now().timestamp_millis();
			vec![logger.message_delete(m.id, now).boxed()]
		}
		Event::MessageDeleteBulk(m) => {
			let now = chrono::Utc::now().timestamp_millis();
			m.ids
				.iter()
				.map(|&id| logger.message_delete(id, now).boxed())
				.collect()
		}
		Event::InteractionCreate(i) => {
			let interaction = i.0.clone();
			vec![async move {
				commands::run(bot, interaction).await;
				Ok(())
			}
			.boxed()]
		}
		Event::Ready(r) => {
			event!(Level::INFO, guilds = %r.guilds.len(), user = %r.user.name);
			Vec::new()
		}
		_ => Vec::new(),
	}
}

/// Snapshot a guild channel, resolving its category's name from the cache.
fn channel(bot: &Bot, channel: &Channel) -> Option<ChannelSnapshot> {
	ChannelSnapshot::new(channel, |parent: Id<ChannelMarker>| {
		bot.cache.channel(parent).and_then(|parent| parent.name.clone())
	})
}

/// The guild's emoji IDs, paired with the emoji if it's still cached.
fn cached_emojis(
	bot: &Bot,
	guild: Id<GuildMarker>,
) -> Option<Vec<(Id<EmojiMarker>, Option<EmojiSnapshot>)>> {
	let ids: Vec<Id<EmojiMarker>> = bot.cache.guild_emojis(guild)?.iter().copied().collect();
	Some(
		ids.into_iter()
			.map(|id| {
				let snapshot = bot.cache.emoji(id).map(|cached| {
					let emoji = cached.resource();
					EmojiSnapshot {
						id: emoji.id(),
						guild_id: guild,
						name: emoji.name().to_owned(),
						animated: emoji.animated(),
					}
				});
				(id, snapshot)
			})
			.collect(),
	)
}

/// The guild's sticker IDs, paired with the sticker if it's still cached.
fn cached_stickers(
	bot: &Bot,
	guild: Id<GuildMarker>,
) -> Option<Vec<(Id<StickerMarker>, Option<StickerSnapshot>)>> {
	let ids: Vec<Id<StickerMarker>> = bot.cache.guild_stickers(guild)?.iter().copied().collect();
	Some(
		ids.into_iter()
			.map(|id| {
				let snapshot = bot.cache.sticker(id).map(|cached| {
					let sticker = cached.resource();
					StickerSnapshot {
						id: sticker.id(),
						guild_id: guild,
						name: sticker.name().to_owned(),
						description: sticker.description().to_owned(),
						format: sticker.format_type(),
					}
				});
				(id, snapshot)
			})
			.collect(),
	)
}

/// What happened to one entry of a guild's emoji or sticker list.
#[derive(Debug, PartialEq, Eq)]
enum ListChange<T> {
	Created(T, Option<UserSnapshot>),
	Updated(T, T),
	/// `None` if only the entry's ID was cached.
	Deleted(Option<T>),
}

/// Compare a cached list against the full list from an update event.
///
/// Entries that are unchanged, or whose previous state wasn't cached, produce nothing.
fn list_changes<K, T>(
	old: Vec<(K, Option<T>)>,
	new: Vec<(K, T, Option<UserSnapshot>)>,
) -> Vec<ListChange<T>>
where
	K: Copy + Eq + Hash,
	T: PartialEq,
{
	let current: HashSet<K> = new.iter().map(|(id, ..)| *id).collect();

	let mut previous = HashMap::with_capacity(old.len());
	let mut deleted = Vec::new();
	for (id, snapshot) in old {
		if current.contains(&id) {
			previous.insert(id, snapshot);
		} else {
			deleted.push(ListChange::Deleted(snapshot));
		}
	}

	let mut changes = Vec::new();
	for (id, new, uploader) in new {
		match previous.remove(&id) {
			None => changes.push(ListChange::Created(new, uploader)),
			Some(Some(old)) if old != new => changes.push(ListChange::Updated(old, new)),
			Some(_) => {}
		}
	}

	changes.extend(deleted);
	changes
}
