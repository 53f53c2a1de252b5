//! Per-guild logger configuration and the JSON file it is persisted in.

use std::{
	collections::{BTreeMap, HashMap},
	io::ErrorKind,
	path::PathBuf,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::{
	fs,
	sync::{Mutex, RwLock},
};
use tracing::{event, instrument, Level};
use twilight_model::id::{
	marker::{ChannelMarker, GuildMarker, RoleMarker},
	Id,
};

use crate::error::Result;

pub const DEFAULT_GHOST_PING_SECONDS: u64 = 180;
pub const MAX_GHOST_PING_SECONDS: u64 = 86_400;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildConfig {
	/// Channel notifications are delivered to, logging is disabled without one.
	#[serde(default)]
	pub log_channel: Option<Id<ChannelMarker>>,
	/// Role pinged on suspected ghost pings.
	#[serde(default)]
	pub mod_role: Option<Id<RoleMarker>>,
	/// Channels whose messages aren't logged.
	#[serde(default)]
	pub ignored_channels: Vec<Id<ChannelMarker>>,
	/// Deleted mentions younger than this are treated as ghost pings.
	#[serde(default = "default_ghost_ping_seconds")]
	pub ghost_ping_seconds: u64,
}

const fn default_ghost_ping_seconds() -> u64 {
	DEFAULT_GHOST_PING_SECONDS
}

impl Default for GuildConfig {
	fn default() -> Self {
		Self {
			log_channel: None,
			mod_role: None,
			ignored_channels: Vec::new(),
			ghost_ping_seconds: DEFAULT_GHOST_PING_SECONDS,
		}
	}
}

impl GuildConfig {
	pub fn is_ignored(&self, channel: Id<ChannelMarker>) -> bool {
		self.log_channel == Some(channel) || self.ignored_channels.contains(&channel)
	}
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
	#[error("unknown configuration key `{0}`")]
	UnknownKey(String),
	#[error("`{0}` was given a value of the wrong type")]
	InvalidValue(&'static str),
	#[error("`{key}` must be between 1 and {max}, got {value}")]
	OutOfRange {
		key: &'static str,
		value: i64,
		max: u64,
	},
	#[error("only `log-channel` and `mod-role` can be cleared, got `{0}`")]
	NotClearable(String),
}

/// Value of a single configuration option.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
	Channel(Id<ChannelMarker>),
	Role(Id<RoleMarker>),
	Integer(i64),
	Text(String),
	/// A kind of value no key accepts.
	Unsupported,
}

/// A single validated change to a [`GuildConfig`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigUpdate {
	SetLogChannel(Id<ChannelMarker>),
	ClearLogChannel,
	SetModRole(Id<RoleMarker>),
	ClearModRole,
	IgnoreChannel(Id<ChannelMarker>),
	UnignoreChannel(Id<ChannelMarker>),
	SetGhostPingSeconds(u64),
}

impl ConfigUpdate {
	pub const LOG_CHANNEL: &'static str = "log-channel";
	pub const MOD_ROLE: &'static str = "mod-role";
	pub const IGNORE_CHANNEL: &'static str = "ignore-channel";
	pub const UNIGNORE_CHANNEL: &'static str = "unignore-channel";
	pub const GHOST_PING_SECONDS: &'static str = "ghost-ping-seconds";
	pub const CLEAR: &'static str = "clear";

	/// Validate a `key`, `value` pair.
	pub fn new(key: &str, value: Value) -> Result<Self, ConfigError> {
		match (key, value) {
			(Self::LOG_CHANNEL, Value::Channel(id)) => Ok(Self::SetLogChannel(id)),
			(Self::MOD_ROLE, Value::Role(id)) => Ok(Self::SetModRole(id)),
			(Self::IGNORE_CHANNEL, Value::Channel(id)) => Ok(Self::IgnoreChannel(id)),
			(Self::UNIGNORE_CHANNEL, Value::Channel(id)) => Ok(Self::UnignoreChannel(id)),
			(Self::GHOST_PING_SECONDS, Value::Integer(value)) => u64::try_from(value)
				.ok()
				.filter(|secs| (1..=MAX_GHOST_PING_SECONDS).contains(secs))
				.map(Self::SetGhostPingSeconds)
				.ok_or(ConfigError::OutOfRange {
					key: Self::GHOST_PING_SECONDS,
					value,
					max: MAX_GHOST_PING_SECONDS,
				}),
			(Self::CLEAR, Value::Text(field)) => match field.as_str() {
				Self::LOG_CHANNEL => Ok(Self::ClearLogChannel),
				Self::MOD_ROLE => Ok(Self::ClearModRole),
				_ => Err(ConfigError::NotClearable(field)),
			},
			(Self::LOG_CHANNEL, _) => Err(ConfigError::InvalidValue(Self::LOG_CHANNEL)),
			(Self::MOD_ROLE, _) => Err(ConfigError::InvalidValue(Self::MOD_ROLE)),
			(Self::IGNORE_CHANNEL, _) => Err(ConfigError::InvalidValue(Self::IGNORE_CHANNEL)),
			(Self::UNIGNORE_CHANNEL, _) => Err(ConfigError::InvalidValue(Self::UNIGNORE_CHANNEL)),
			(Self::GHOST_PING_SECONDS, _) => {
				Err(ConfigError::InvalidValue(Self::GHOST_PING_SECONDS))
			}
			(Self::CLEAR, _) => Err(ConfigError::InvalidValue(Self::CLEAR)),
			(key, _) => Err(ConfigError::UnknownKey(key.to_owned())),
		}
	}

	pub fn apply(&self, config: &mut GuildConfig) {
		match *self {
			Self::SetLogChannel(id) => config.log_channel = Some(id),
			Self::ClearLogChannel => config.log_channel = None,
			Self::SetModRole(id) => config.mod_role = Some(id),
			Self::ClearModRole => config.mod_role = None,
			Self::IgnoreChannel(id) => {
				if !config.ignored_channels.contains(&id) {
					config.ignored_channels.push(id);
				}
			}
			Self::UnignoreChannel(id) => config.ignored_channels.retain(|&c| c != id),
			Self::SetGhostPingSeconds(secs) => config.ghost_ping_seconds = secs,
		}
	}
}

/// Guild configurations, kept in memory and written through to a JSON file.
#[derive(Debug)]
pub struct ConfigStore {
	path: Option<PathBuf>,
	guilds: RwLock<HashMap<Id<GuildMarker>, GuildConfig>>,
	/// Serializes updates, held while writing to disk so readers aren't blocked.
	writer: Mutex<()>,
}

impl ConfigStore {
	/// Load the store from `path`, starting empty if the file doesn't exist yet.
	#[instrument]
	pub async fn load(path: PathBuf) -> Result<Self> {
		let guilds = match fs::read(&path).await {
			Ok(bytes) => serde_json::from_slice::<BTreeMap<u64, GuildConfig>>(&bytes)?
				.into_iter()
				.filter_map(|(id, config)| Some((Id::new_checked(id)?, config)))
				.collect(),
			Err(e) if e.kind() == ErrorKind::NotFound => {
				event!(Level::INFO, "no configuration file, starting empty");
				HashMap::new()
			}
			Err(e) => return Err(e.into()),
		};

		event!(Level::INFO, guilds = guilds.len(), "loaded configuration");
		Ok(Self {
			path: Some(path),
			guilds: RwLock::new(guilds),
			writer: Mutex::default(),
		})
	}

	/// A store that is never written to disk.
	#[cfg(test)]
	pub fn in_memory() -> Self {
		Self {
			path: None,
			guilds: RwLock::default(),
			writer: Mutex::default(),
		}
	}

	pub async fn get(&self, guild: Id<GuildMarker>) -> Option<GuildConfig> {
		self.guilds.read().await.get(&guild).cloned()
	}

	/// Apply `updates` in order and persist the result.
	///
	/// Nothing is changed if persisting fails. Reads see the previous configuration
	/// until the new one is on disk.
	#[instrument(skip(self))]
	pub async fn update(
		&self,
		guild: Id<GuildMarker>,
		updates: &[ConfigUpdate],
	) -> Result<GuildConfig> {
		let _writer = self.writer.lock().await;

		let mut guilds = self.guilds.read().await.clone();
		let config = guilds.entry(guild).or_default();
		for update in updates {
			update.apply(config);
		}
		let config = config.clone();

		self.persist(&guilds).await?;
		*self.guilds.write().await = guilds;

		Ok(config)
	}

	async fn persist(&self, guilds: &HashMap<Id<GuildMarker>, GuildConfig>) -> Result<()> {
		let Some(path) = &self.path else {
			return Ok(());
		};

		let on_disk = guilds
			.iter()
			.map(|(id, config)| (id.get(), config))
			.collect::<BTreeMap<_, _>>();
		let json = serde_json::to_vec_pretty(&on_disk)?;

		let tmp = path.with_extension("tmp");
		fs::write(&tmp, json).await?;
		fs::rename(&tmp, path).await?;
		Ok(())
	}
}
