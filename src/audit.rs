//! Attributing guild mutations to the moderator who made them.
//!
//! Discord doesn't say who changed something in the gateway event itself, so the most
//! recent audit log entry of the matching kind is fetched instead. An entry is only
//! ever attributed once per `(guild, category)`: the last attributed entry id is
//! remembered and skipped the next time around.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{event, instrument, Level};
use twilight_model::{
	guild::audit_log::AuditLogEventType,
	id::{
		marker::{AuditLogEntryMarker, GenericMarker, GuildMarker},
		Id,
	},
};

use crate::error::Result;

/// Kind of guild mutation, each mapping to one audit log action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuditCategory {
	ChannelCreate,
	ChannelUpdate,
	ChannelDelete,
	RoleCreate,
	RoleUpdate,
	RoleDelete,
	EmojiCreate,
	EmojiUpdate,
	EmojiDelete,
	StickerCreate,
	StickerUpdate,
	StickerDelete,
	MemberBanAdd,
	MemberBanRemove,
	MemberKick,
	MemberUpdate,
	MemberRoleUpdate,
}

impl AuditCategory {
	pub const fn action(self) -> AuditLogEventType {
		match self {
			Self::ChannelCreate => AuditLogEventType::ChannelCreate,
			Self::ChannelUpdate => AuditLogEventType::ChannelUpdate,
			Self::ChannelDelete => AuditLogEventType::ChannelDelete,
			Self::RoleCreate => AuditLogEventType::RoleCreate,
			Self::RoleUpdate => AuditLogEventType::RoleUpdate,
			Self::RoleDelete => AuditLogEventType::RoleDelete,
			Self::EmojiCreate => AuditLogEventType::EmojiCreate,
			Self::EmojiUpdate => AuditLogEventType::EmojiUpdate,
			Self::EmojiDelete => AuditLogEventType::EmojiDelete,
			Self::StickerCreate => AuditLogEventType::StickerCreate,
			Self::StickerUpdate => AuditLogEventType::StickerUpdate,
			Self::StickerDelete => AuditLogEventType::StickerDelete,
			Self::MemberBanAdd => AuditLogEventType::MemberBanAdd,
			Self::MemberBanRemove => AuditLogEventType::MemberBanRemove,
			Self::MemberKick => AuditLogEventType::MemberKick,
			Self::MemberUpdate => AuditLogEventType::MemberUpdate,
			Self::MemberRoleUpdate => AuditLogEventType::MemberRoleUpdate,
		}
	}
}

/// User who performed an audited action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Executor {
	pub tag: String,
	pub avatar_url: String,
}

/// An audit log entry as returned by an [`AuditLogSource`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditEntry {
	pub id: Id<AuditLogEntryMarker>,
	/// `None` if the executing user couldn't be resolved.
	pub executor: Option<Executor>,
	pub reason: Option<String>,
	pub target_id: Option<Id<GenericMarker>>,
}

/// Who is believed to have performed a mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditAttribution {
	pub actor_tag: String,
	pub actor_avatar_url: Option<String>,
	pub entry_id: Option<Id<AuditLogEntryMarker>>,
	pub reason: Option<String>,
	pub target_id: Option<Id<GenericMarker>>,
}

impl AuditAttribution {
	/// Actor tag used when no entry could be attributed.
	pub const UNKNOWN_ACTOR: &'static str = "USR_FETCH_ERR";

	pub fn unknown() -> Self {
		Self {
			actor_tag: Self::UNKNOWN_ACTOR.to_owned(),
			actor_avatar_url: None,
			entry_id: None,
			reason: None,
			target_id: None,
		}
	}

	/// Whether the attributed entry targets the entity with id `id`.
	pub fn targets<T>(&self, id: Id<T>) -> bool {
		self.target_id.map(Id::get) == Some(id.get())
	}
}

impl From<AuditEntry> for AuditAttribution {
	fn from(entry: AuditEntry) -> Self {
		let (actor_tag, actor_avatar_url) = match entry.executor {
			Some(executor) => (executor.tag, Some(executor.avatar_url)),
			None => (Self::UNKNOWN_ACTOR.to_owned(), None),
		};
		Self {
			actor_tag,
			actor_avatar_url,
			entry_id: Some(entry.id),
			reason: entry.reason,
			target_id: entry.target_id,
		}
	}
}

/// Somewhere to read a guild's audit log from.
#[async_trait]
pub trait AuditLogSource: Send + Sync {
	/// Most recent entries of `category`, newest first.
	async fn recent_entries(
		&self,
		guild: Id<GuildMarker>,
		category: AuditCategory,
	) -> Result<Vec<AuditEntry>>;
}

type Slot = Arc<Mutex<Option<Id<AuditLogEntryMarker>>>>;

/// Process wide cache of the last attributed entry per `(guild, category)`.
pub struct AuditCorrelator {
	source: Box<dyn AuditLogSource>,
	slots: Mutex<HashMap<(Id<GuildMarker>, AuditCategory), Slot>>,
}

impl AuditCorrelator {
	pub fn new(source: impl AuditLogSource + 'static) -> Self {
		Self {
			source: Box::new(source),
			slots: Mutex::default(),
		}
	}

	/// Attribute the latest `category` mutation in `guild`.
	///
	/// The slot's lock is held across the fetch so concurrent correlations of the same
	/// kind never attribute the same entry twice. On fetch failure the previously
	/// attributed entry is forgotten.
	#[instrument(skip(self), fields(%guild))]
	pub async fn correlate(
		&self,
		guild: Id<GuildMarker>,
		category: AuditCategory,
	) -> Result<AuditAttribution> {
		let slot = self
			.slots
			.lock()
			.await
			.entry((guild, category))
			.or_default()
			.clone();
		let mut last = slot.lock().await;

		let consumed = last.take();
		let entry = self
			.source
			.recent_entries(guild, category)
			.await?
			.into_iter()
			.find(|entry| Some(entry.id) != consumed);

		*last = entry.as_ref().map(|entry| entry.id);

		Ok(match entry {
			Some(entry) => entry.into(),
			None => {
				event!(Level::DEBUG, "no unattributed audit log entry");
				AuditAttribution::unknown()
			}
		})
	}
}
