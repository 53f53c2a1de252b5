//! Flattened, diffable views of Discord entities.
//!
//! Snapshots are built once per event from `twilight-model` values and only carry the
//! fields [`crate::diff`] looks at.

use twilight_model::{
	channel::{
		message::sticker::{Sticker, StickerFormatType},
		permission_overwrite::{PermissionOverwrite, PermissionOverwriteType},
		Channel, ChannelType,
	},
	guild::{Emoji, Permissions, Role},
	id::{
		marker::{ChannelMarker, EmojiMarker, GuildMarker, RoleMarker, StickerMarker, UserMarker},
		Id,
	},
	user::User,
};

use crate::format;

#[derive(Clone, Debug, PartialEq)]
pub enum Snapshot {
	Channel(ChannelSnapshot),
	Role(RoleSnapshot),
	Emoji(EmojiSnapshot),
	Sticker(StickerSnapshot),
	Member(MemberSnapshot),
}

impl Snapshot {
	pub const fn kind(&self) -> &'static str {
		match self {
			Self::Channel(_) => "channel",
			Self::Role(_) => "role",
			Self::Emoji(_) => "emoji",
			Self::Sticker(_) => "sticker",
			Self::Member(_) => "member",
		}
	}

	pub const fn guild_id(&self) -> Id<GuildMarker> {
		match self {
			Self::Channel(channel) => channel.guild_id,
			Self::Role(role) => role.guild_id,
			Self::Emoji(emoji) => emoji.guild_id,
			Self::Sticker(sticker) => sticker.guild_id,
			Self::Member(member) => member.guild_id,
		}
	}
}

/// A user as shown in a notification's author line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserSnapshot {
	pub id: Id<UserMarker>,
	pub tag: String,
	pub avatar_url: String,
}

impl UserSnapshot {
	pub fn new(user: &User) -> Self {
		Self {
			id: user.id,
			tag: format::user_tag(user),
			avatar_url: format::avatar_url(user),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
	pub id: Id<ChannelMarker>,
	pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChannelSnapshot {
	pub id: Id<ChannelMarker>,
	pub guild_id: Id<GuildMarker>,
	pub name: String,
	pub position: i32,
	pub parent: Option<Category>,
	pub kind: ChannelKind,
	pub overwrites: Vec<Overwrite>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextLabel {
	Text,
	News,
	Forum,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoiceLabel {
	Voice,
	Stage,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChannelKind {
	Text {
		label: TextLabel,
		nsfw: bool,
		topic: Option<String>,
		/// Slowmode in seconds.
		slowmode: u16,
	},
	Voice {
		label: VoiceLabel,
		/// Bits per second.
		bitrate: u32,
		region: Option<String>,
	},
	Category,
	Other,
}

impl ChannelKind {
	pub const fn label(&self) -> &'static str {
		match self {
			Self::Text { label, .. } => match label {
				TextLabel::Text => "Text",
				TextLabel::News => "News",
				TextLabel::Forum => "Forum",
			},
			Self::Voice { label, .. } => match label {
				VoiceLabel::Voice => "Voice",
				VoiceLabel::Stage => "Stage",
			},
			Self::Category => "Category",
			Self::Other => "Other",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OverwriteTarget {
	Role(Id<RoleMarker>),
	Member(Id<UserMarker>),
}

impl OverwriteTarget {
	pub fn mention(self) -> String {
		match self {
			Self::Role(id) => format::role_mention(id),
			Self::Member(id) => format::user_mention(id),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Overwrite {
	pub target: OverwriteTarget,
	pub allow: Permissions,
	pub deny: Permissions,
}

impl Overwrite {
	fn new(overwrite: &PermissionOverwrite) -> Option<Self> {
		let target = match overwrite.kind {
			PermissionOverwriteType::Member => OverwriteTarget::Member(overwrite.id.cast()),
			PermissionOverwriteType::Role => OverwriteTarget::Role(overwrite.id.cast()),
			_ => return None,
		};
		Some(Self {
			target,
			allow: overwrite.allow,
			deny: overwrite.deny,
		})
	}
}

impl ChannelSnapshot {
	/// Returns `None` for DMs and threads.
	///
	/// `parent_name` resolves a category's name, usually from the cache.
	pub fn new<F>(channel: &Channel, parent_name: F) -> Option<Self>
	where
		F: FnOnce(Id<ChannelMarker>) -> Option<String>,
	{
		let text = |label| ChannelKind::Text {
			label,
			nsfw: channel.nsfw.unwrap_or_default(),
			topic: channel.topic.clone(),
			slowmode: channel.rate_limit_per_user.unwrap_or_default(),
		};
		let voice = |label| ChannelKind::Voice {
			label,
			bitrate: channel.bitrate.unwrap_or_default(),
			region: channel.rtc_region.clone(),
		};

		let kind = match channel.kind {
			ChannelType::GuildText => text(TextLabel::Text),
			ChannelType::GuildAnnouncement => text(TextLabel::News),
			ChannelType::GuildForum => text(TextLabel::Forum),
			ChannelType::GuildVoice => voice(VoiceLabel::Voice),
			ChannelType::GuildStageVoice => voice(VoiceLabel::Stage),
			ChannelType::GuildCategory => ChannelKind::Category,
			ChannelType::Private
			| ChannelType::Group
			| ChannelType::AnnouncementThread
			| ChannelType::PublicThread
			| ChannelType::PrivateThread => return None,
			_ => ChannelKind::Other,
		};

		let parent = channel.parent_id.and_then(|id| {
			parent_name(id).map(|name| Category { id, name })
		});

		Some(Self {
			id: channel.id,
			guild_id: channel.guild_id?,
			name: channel.name.clone().unwrap_or_default(),
			position: channel.position.unwrap_or_default(),
			parent,
			kind,
			overwrites: channel
				.permission_overwrites
				.iter()
				.flatten()
				.filter_map(Overwrite::new)
				.collect(),
		})
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleSnapshot {
	pub id: Id<RoleMarker>,
	pub guild_id: Id<GuildMarker>,
	pub name: String,
	pub color: u32,
	pub hoist: bool,
	pub mentionable: bool,
	pub permissions: Permissions,
	pub position: i64,
}

impl RoleSnapshot {
	pub fn new(guild_id: Id<GuildMarker>, role: &Role) -> Self {
		Self {
			id: role.id,
			guild_id,
			name: role.name.clone(),
			color: role.color,
			hoist: role.hoist,
			mentionable: role.mentionable,
			permissions: role.permissions,
			position: role.position,
		}
	}

	/// Color as `#rrggbb`.
	pub fn hex_color(&self) -> String {
		format!("#{:06x}", self.color)
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmojiSnapshot {
	pub id: Id<EmojiMarker>,
	pub guild_id: Id<GuildMarker>,
	pub name: String,
	pub animated: bool,
}

impl EmojiSnapshot {
	pub fn new(guild_id: Id<GuildMarker>, emoji: &Emoji) -> Self {
		Self {
			id: emoji.id,
			guild_id,
			name: emoji.name.clone(),
			animated: emoji.animated,
		}
	}

	pub fn url(&self) -> String {
		format::emoji_url(self.id, self.animated)
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StickerSnapshot {
	pub id: Id<StickerMarker>,
	pub guild_id: Id<GuildMarker>,
	pub name: String,
	pub description: String,
	pub format: StickerFormatType,
}

impl StickerSnapshot {
	pub fn new(guild_id: Id<GuildMarker>, sticker: &Sticker) -> Self {
		Self {
			id: sticker.id,
			guild_id,
			name: sticker.name.clone(),
			description: sticker.description.clone().unwrap_or_default(),
			format: sticker.format_type,
		}
	}

	pub fn url(&self) -> String {
		format::sticker_url(self.id, self.format)
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberSnapshot {
	pub guild_id: Id<GuildMarker>,
	pub user_id: Id<UserMarker>,
	pub tag: String,
	pub avatar_url: String,
	pub nick: Option<String>,
	/// Sorted.
	pub roles: Vec<Id<RoleMarker>>,
	/// Unix seconds.
	pub timeout_until: Option<i64>,
}

impl MemberSnapshot {
	pub fn new(
		guild_id: Id<GuildMarker>,
		user: &User,
		nick: Option<&str>,
		roles: &[Id<RoleMarker>],
		timeout_until: Option<i64>,
	) -> Self {
		let mut roles = roles.to_vec();
		roles.sort_unstable();
		Self {
			guild_id,
			user_id: user.id,
			tag: format::user_tag(user),
			avatar_url: format::avatar_url(user),
			nick: nick.map(ToOwned::to_owned),
			roles,
			timeout_until,
		}
	}
}
