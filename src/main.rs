//! Bot that mirrors guild moderation events (channel, role, emoji, sticker, member and
//! message changes) into a per-guild log channel, attributing them to whoever the audit
//! log says is responsible.

#![deny(clippy::inconsistent_struct_constructor)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]
#![warn(clippy::cargo, clippy::nursery, clippy::pedantic)]

use std::{env, ffi::OsStr, fs, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{event as log, instrument, Level};
use tracing_subscriber::EnvFilter;
use twilight_cache_inmemory::{InMemoryCache, ResourceType};
use twilight_gateway::{Config, EventTypeFlags, Intents, Shard, ShardId};
use twilight_http::Client;
use twilight_model::id::{marker::ApplicationMarker, Id};

use crate::{
	cli::{Args, Mode},
	config::ConfigStore,
	discord::{HttpAuditLog, WebhookDelivery},
	logger::Logger,
};

mod audit;
mod cli;
mod commands;
mod config;
mod diff;
mod discord;
mod error;
mod event;
mod format;
mod logger;
mod message;
mod notify;
mod permission;
mod response;
mod snapshot;

#[instrument]
/// Get token from systemd credential storage, falling back to env var.
fn token() -> Result<String> {
	let token = if let Some(credential_dir) = env::var_os("CREDENTIALS_DIRECTORY") {
		log!(Level::INFO, "using systemd credential storage");
		let path: PathBuf = [&credential_dir, OsStr::new("token")].iter().collect();
		fs::read_to_string(path)?
	} else {
		log!(Level::WARN, "falling back to `TOKEN` environment variable");
		env::var("TOKEN")?
	};

	Ok(token.trim().to_owned())
}

#[tokio::main]
async fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.init();

	let args = Args::parse();
	let token = token().context("reading token failed")?;

	let http = Arc::new(Client::new(token.clone()));
	let application_id = http
		.current_user_application()
		.await?
		.model()
		.await?
		.id;

	if let Some(mode) = &args.commands {
		let commands = match mode {
			Mode::Register => {
				log!(Level::INFO, "setting slash commands");
				commands::get().to_vec()
			}
			Mode::Unregister => {
				log!(Level::INFO, "removing all slash commands");
				Vec::new()
			}
		};
		http.interaction(application_id)
			.set_global_commands(&commands)
			.await
			.context("setting slash commands failed")?;
		return Ok(());
	}

	let (bot, mut shard) = Bot::new(args, http, application_id, token)
		.await
		.context("startup failed")?;

	// Listen to sigint (ctrl-c) and sigterm (docker/podman).
	let mut sigint = signal(SignalKind::interrupt())?;
	let mut sigterm = signal(SignalKind::terminate())?;

	tokio::select! {
		_ = bot.run(&mut shard) => (),
		_ = sigint.recv() => log!(Level::INFO, "received SIGINT"),
		_ = sigterm.recv() => log!(Level::INFO, "received SIGTERM"),
	};

	log!(Level::INFO, "shutting down");
	Ok(())
}

/// The bot's components.
pub struct Bot {
	pub application_id: Id<ApplicationMarker>,
	pub cache: InMemoryCache,
	pub config: Arc<ConfigStore>,
	pub http: Arc<Client>,
	pub logger: Logger,
}

impl Bot {
	/// Create a [`Bot`] and the [`Shard`] feeding it.
	async fn new(
		args: Args,
		http: Arc<Client>,
		application_id: Id<ApplicationMarker>,
		token: String,
	) -> Result<(&'static Self, Shard)> {
		let cache = {
			let resource_types = ResourceType::CHANNEL
				| ResourceType::EMOJI
				| ResourceType::GUILD
				| ResourceType::MEMBER
				| ResourceType::ROLE
				| ResourceType::STICKER
				| ResourceType::USER;
			InMemoryCache::builder()
				.resource_types(resource_types)
				.build()
		};

		let config = Arc::new(
			ConfigStore::load(args.config_path)
				.await
				.context("loading guild configuration failed")?,
		);

		let user_id = http.current_user().await?.model().await?.id;
		let logger = Logger::new(
			Arc::clone(&config),
			HttpAuditLog(Arc::clone(&http)),
			WebhookDelivery::new(Arc::clone(&http), user_id),
			args.message_capacity,
		);

		let shard = {
			let intents = Intents::GUILDS
				| Intents::GUILD_MEMBERS
				| Intents::GUILD_MODERATION
				| Intents::GUILD_EMOJIS_AND_STICKERS
				| Intents::GUILD_MESSAGES
				| Intents::MESSAGE_CONTENT;
			let events = EventTypeFlags::BAN_ADD
				| EventTypeFlags::BAN_REMOVE
				| EventTypeFlags::CHANNEL_CREATE
				| EventTypeFlags::CHANNEL_DELETE
				| EventTypeFlags::CHANNEL_UPDATE
				| EventTypeFlags::GUILD_CREATE
				| EventTypeFlags::GUILD_DELETE
				| EventTypeFlags::GUILD_EMOJIS_UPDATE
				| EventTypeFlags::GUILD_STICKERS_UPDATE
				| EventTypeFlags::GUILD_UPDATE
				| EventTypeFlags::INTERACTION_CREATE
				| EventTypeFlags::MEMBER_ADD
				| EventTypeFlags::MEMBER_CHUNK
				| EventTypeFlags::MEMBER_REMOVE
				| EventTypeFlags::MEMBER_UPDATE
				| EventTypeFlags::MESSAGE_CREATE
				| EventTypeFlags::MESSAGE_DELETE
				| EventTypeFlags::MESSAGE_DELETE_BULK
				| EventTypeFlags::MESSAGE_UPDATE
				| EventTypeFlags::READY
				| EventTypeFlags::ROLE_CREATE
				| EventTypeFlags::ROLE_DELETE
				| EventTypeFlags::ROLE_UPDATE;
			let config = Config::builder(token, intents).event_types(events).build();
			Shard::with_config(ShardId::ONE, config)
		};

		let bot = Box::leak(Box::new(Self {
			application_id,
			cache,
			config,
			http,
			logger,
		}));
		Ok((bot, shard))
	}

	/// Process the shard's events using [`event::process`].
	async fn run(&'static self, shard: &mut Shard) {
		log!(Level::INFO, "started main event loop");
		loop {
			let event = match shard.next_event().await {
				Ok(event) => event,
				Err(source) => {
					log!(
						Level::WARN,
						error = &source as &dyn std::error::Error,
						"error receiving event"
					);
					if source.is_fatal() {
						break;
					}
					continue;
				}
			};
			event::process(self, event).await;
		}
		log!(Level::ERROR, "event stream exhausted");
	}
}
