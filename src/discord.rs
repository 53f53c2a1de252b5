//! [`AuditLogSource`] and [`Delivery`] backed by the Discord REST API.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{event, instrument, Level};
use twilight_http::{error::ErrorType, Client};
use twilight_model::{
	channel::message::AllowedMentions,
	guild::audit_log::AuditLog,
	id::{
		marker::{ChannelMarker, GuildMarker, UserMarker, WebhookMarker},
		Id,
	},
};

use crate::{
	audit::{AuditCategory, AuditEntry, AuditLogSource, Executor},
	error::{Error, Result},
	format,
	notify::{Delivery, Payload},
};

/// Name given to webhooks the bot creates.
pub const WEBHOOK_NAME: &str = "Moderation Logger";

pub struct HttpAuditLog(pub Arc<Client>);

#[async_trait]
impl AuditLogSource for HttpAuditLog {
	async fn recent_entries(
		&self,
		guild: Id<GuildMarker>,
		category: AuditCategory,
	) -> Result<Vec<AuditEntry>> {
		let log = self
			.0
			.audit_log(guild)
			.action_type(category.action())
			.await?
			.model()
			.await?;

		Ok(entries(log))
	}
}

/// Entries of `log`, newest first, with executors resolved from the users it includes.
fn entries(log: AuditLog) -> Vec<AuditEntry> {
	let users = log.users;
	log.entries
		.into_iter()
		.map(|entry| AuditEntry {
			id: entry.id,
			executor: entry
				.user_id
				.and_then(|id| users.iter().find(|user| user.id == id))
				.map(|user| Executor {
					tag: format::user_tag(user),
					avatar_url: format::avatar_url(user),
				}),
			reason: entry.reason,
			target_id: entry.target_id,
		})
		.collect()
}

#[derive(Clone, Debug)]
struct Webhook {
	id: Id<WebhookMarker>,
	token: String,
}

/// Posts through one bot-owned webhook per log channel, created on first use.
pub struct WebhookDelivery {
	http: Arc<Client>,
	user_id: Id<UserMarker>,
	webhooks: Mutex<HashMap<Id<ChannelMarker>, Webhook>>,
}

impl WebhookDelivery {
	pub fn new(http: Arc<Client>, user_id: Id<UserMarker>) -> Self {
		Self {
			http,
			user_id,
			webhooks: Mutex::default(),
		}
	}

	/// Cached, existing or newly created webhook for `channel`.
	async fn webhook(&self, channel: Id<ChannelMarker>) -> Result<Webhook> {
		// held across creation so concurrent notifications don't create duplicates
		let mut webhooks = self.webhooks.lock().await;
		if let Some(webhook) = webhooks.get(&channel) {
			return Ok(webhook.clone());
		}

		let existing = self
			.http
			.channel_webhooks(channel)
			.await?
			.models()
			.await?
			.into_iter()
			.filter(|webhook| webhook.user.as_ref().map(|user| user.id) == Some(self.user_id))
			.find_map(|webhook| {
				Some(Webhook {
					id: webhook.id,
					token: webhook.token?,
				})
			});

		let webhook = match existing {
			Some(webhook) => webhook,
			None => {
				let created = self
					.http
					.create_webhook(channel, WEBHOOK_NAME)?
					.await?
					.model()
					.await?;
				event!(Level::INFO, %channel, "created webhook");
				Webhook {
					id: created.id,
					token: created.token.ok_or(Error::WebhookToken)?,
				}
			}
		};

		webhooks.insert(channel, webhook.clone());
		Ok(webhook)
	}
}

#[async_trait]
impl Delivery for WebhookDelivery {
	#[instrument(skip(self, payload))]
	async fn deliver(&self, channel: Id<ChannelMarker>, payload: &Payload) -> Result<()> {
		let webhook = self.webhook(channel).await?;

		let allowed_mentions = AllowedMentions {
			roles: payload.mention_role.into_iter().collect(),
			..AllowedMentions::default()
		};
		let mut request = self
			.http
			.execute_webhook(webhook.id, &webhook.token)
			.embeds(&payload.embeds)?
			.allowed_mentions(Some(&allowed_mentions));
		if !payload.content.is_empty() {
			request = request.content(&payload.content)?;
		}

		match request.await {
			Ok(_) => Ok(()),
			Err(e) => {
				if matches!(e.kind(), ErrorType::Response { status, .. } if status.get() == 404) {
					event!(Level::WARN, %channel, "webhook was deleted, recreating on next use");
					self.webhooks.lock().await.remove(&channel);
				}
				Err(e.into())
			}
		}
	}
}
