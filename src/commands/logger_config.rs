use std::fmt::Write;

use const_format::formatcp;
use twilight_model::{
	application::{
		command::{Command, CommandType},
		interaction::application_command::CommandOptionValue,
	},
	channel::ChannelType,
	guild::Permissions,
};
use twilight_util::builder::command::{
	ChannelBuilder, CommandBuilder, IntegerBuilder, RoleBuilder, StringBuilder,
};

use crate::{
	config::{ConfigUpdate, GuildConfig, Value, MAX_GHOST_PING_SECONDS},
	format,
	response::{Emoji, Markdown},
};

pub const NAME: &str = "logger-config";

const LOG_CHANNEL_TYPES: [ChannelType; 2] =
	[ChannelType::GuildText, ChannelType::GuildAnnouncement];

#[allow(clippy::cast_possible_wrap)]
pub fn define() -> Command {
	CommandBuilder::new(
		NAME,
		"View or change where and how moderation events are logged",
		CommandType::ChatInput,
	)
	.default_member_permissions(Permissions::ADMINISTRATOR)
	.dm_permission(false)
	.option(
		ChannelBuilder::new(ConfigUpdate::LOG_CHANNEL, "Channel to send logs to")
			.channel_types(LOG_CHANNEL_TYPES),
	)
	.option(RoleBuilder::new(
		ConfigUpdate::MOD_ROLE,
		"Role pinged on suspected ghost pings",
	))
	.option(ChannelBuilder::new(
		ConfigUpdate::IGNORE_CHANNEL,
		"Stop logging messages from this channel",
	))
	.option(ChannelBuilder::new(
		ConfigUpdate::UNIGNORE_CHANNEL,
		"Resume logging messages from this channel",
	))
	.option(
		IntegerBuilder::new(
			ConfigUpdate::GHOST_PING_SECONDS,
			"Deleted mentions younger than this many seconds are ghost pings",
		)
		.min_value(1)
		.max_value(MAX_GHOST_PING_SECONDS as i64),
	)
	.option(
		StringBuilder::new(ConfigUpdate::CLEAR, "Unset a setting").choices([
			(ConfigUpdate::LOG_CHANNEL, ConfigUpdate::LOG_CHANNEL),
			(ConfigUpdate::MOD_ROLE, ConfigUpdate::MOD_ROLE),
		]),
	)
	.build()
}

pub async fn run(ctx: super::Context) -> super::Result {
	let Some(guild) = ctx.interaction.guild_id else {
		return ctx
			.reply(formatcp!("{} **Only usable in servers**", Emoji::WARNING))
			.await;
	};

	let updates = ctx
		.data
		.options
		.iter()
		.map(|option| ConfigUpdate::new(&option.name, value(&option.value)))
		.collect::<Result<Vec<_>, _>>();

	let updates = match updates {
		Ok(updates) => updates,
		Err(e) => {
			tracing::info!(error = &e as &dyn std::error::Error, "rejected update");
			return ctx.reply(format!("{} **{e}**", Emoji::WARNING)).await;
		}
	};

	let config = if updates.is_empty() {
		ctx.bot.config.get(guild).await.unwrap_or_default()
	} else {
		let config = ctx.bot.config.update(guild, &updates).await?;
		tracing::info!(updates = updates.len(), "updated configuration");
		config
	};

	ctx.reply(describe(&config)).await
}

fn value(value: &CommandOptionValue) -> Value {
	match value {
		CommandOptionValue::Channel(id) => Value::Channel(*id),
		CommandOptionValue::Role(id) => Value::Role(*id),
		CommandOptionValue::Integer(int) => Value::Integer(*int),
		CommandOptionValue::String(text) => Value::Text(text.clone()),
		_ => Value::Unsupported,
	}
}

fn describe(config: &GuildConfig) -> String {
	let unset = || format::inline_code("None");

	let mut description = format!(
		"{} **Logger configuration**\n**Log channel**: {}\n**Moderator role**: {}\n**Ghost ping threshold**: {} seconds\n**Ignored channels**:",
		Emoji::CHECK_MARK,
		config.log_channel.map_or_else(unset, format::channel_mention),
		config.mod_role.map_or_else(unset, format::role_mention),
		format::inline_code(&config.ghost_ping_seconds.to_string()),
	);

	if config.ignored_channels.is_empty() {
		description.push(' ');
		description.push_str(&unset());
	}
	for channel in &config.ignored_channels {
		// writing to a String never fails
		let _ = write!(
			description,
			"\n{} {}",
			Markdown::BULLET_POINT,
			format::channel_mention(*channel)
		);
	}

	description
}
