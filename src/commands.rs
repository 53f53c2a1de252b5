//! Contains all commands.
//!
//! Commands are defined in submodules. Required items are `const NAME: &str` (matching
//! incoming), `fn define() -> Command` (registering) and `async fn run(ctx: Context) ->
//! Result` (executing incoming interactions).

use twilight_model::application::{
	command::Command,
	interaction::{application_command::CommandData, Interaction, InteractionData},
};

use crate::{response::Response, Bot};

mod logger_config;

type Result = anyhow::Result<()>;

pub struct Context {
	bot: &'static Bot,
	interaction: Interaction,
	data: CommandData,
}

impl Context {
	/// Respond with [`Response::message`].
	async fn reply(&self, message: impl Into<String>) -> Result {
		self.bot
			.http
			.interaction(self.bot.application_id)
			.create_response(
				self.interaction.id,
				&self.interaction.token,
				&Response::message(message),
			)
			.await?;
		Ok(())
	}
}

/// Match the interaction to a command and run it.
#[tracing::instrument(skip(bot, interaction), fields(guild_id, command.name))]
pub async fn run(bot: &'static Bot, mut interaction: Interaction) {
	let Some(InteractionData::ApplicationCommand(data)) = interaction.data.take() else {
		tracing::warn!(kind = ?interaction.kind, "unhandled interaction");
		return;
	};

	let span = tracing::Span::current();
	span.record("command.name", data.name.as_str());
	if let Some(guild_id) = interaction.guild_id {
		span.record("guild_id", guild_id.get());
	}

	let ctx = Context {
		bot,
		interaction,
		data: *data,
	};

	let res = match ctx.data.name.as_str() {
		logger_config::NAME => logger_config::run(ctx).await,
		_ => {
			tracing::warn!("unregistered");
			Ok(())
		}
	};

	match res {
		Ok(()) => tracing::info!("successfully ran"),
		Err(e) => tracing::error!(
			error = &*e as &dyn std::error::Error,
			"error running command"
		),
	}
}

/// Array with all command definitions.
pub fn get() -> [Command; 1] {
	[logger_config::define()]
}
