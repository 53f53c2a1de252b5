//! Permission keys the differ reports on and the three states of a channel overwrite.

use twilight_model::guild::Permissions;

use crate::format::inline_code;

/// Every reported permission with its display name, in rendering order.
///
/// Permissions are compared one key at a time so a change in Discord's bit layout
/// only ever affects the keys listed here.
pub const KEYS: &[(Permissions, &str)] = &[
	(Permissions::CREATE_INVITE, "Create Invite"),
	(Permissions::KICK_MEMBERS, "Kick Members"),
	(Permissions::BAN_MEMBERS, "Ban Members"),
	(Permissions::ADMINISTRATOR, "Administrator"),
	(Permissions::MANAGE_CHANNELS, "Manage Channels"),
	(Permissions::MANAGE_GUILD, "Manage Guild"),
	(Permissions::ADD_REACTIONS, "Add Reactions"),
	(Permissions::VIEW_AUDIT_LOG, "View Audit Log"),
	(Permissions::PRIORITY_SPEAKER, "Priority Speaker"),
	(Permissions::STREAM, "Stream"),
	(Permissions::VIEW_CHANNEL, "View Channel"),
	(Permissions::SEND_MESSAGES, "Send Messages"),
	(Permissions::SEND_TTS_MESSAGES, "Send TTS Messages"),
	(Permissions::MANAGE_MESSAGES, "Manage Messages"),
	(Permissions::EMBED_LINKS, "Embed Links"),
	(Permissions::ATTACH_FILES, "Attach Files"),
	(Permissions::READ_MESSAGE_HISTORY, "Read Message History"),
	(Permissions::MENTION_EVERYONE, "Mention Everyone"),
	(Permissions::USE_EXTERNAL_EMOJIS, "Use External Emojis"),
	(Permissions::VIEW_GUILD_INSIGHTS, "View Guild Insights"),
	(Permissions::CONNECT, "Connect"),
	(Permissions::SPEAK, "Speak"),
	(Permissions::MUTE_MEMBERS, "Mute Members"),
	(Permissions::DEAFEN_MEMBERS, "Deafen Members"),
	(Permissions::MOVE_MEMBERS, "Move Members"),
	(Permissions::USE_VAD, "Use Voice Activity"),
	(Permissions::CHANGE_NICKNAME, "Change Nickname"),
	(Permissions::MANAGE_NICKNAMES, "Manage Nicknames"),
	(Permissions::MANAGE_ROLES, "Manage Roles"),
	(Permissions::MANAGE_WEBHOOKS, "Manage Webhooks"),
	(Permissions::REQUEST_TO_SPEAK, "Request To Speak"),
	(Permissions::MANAGE_EVENTS, "Manage Events"),
	(Permissions::MANAGE_THREADS, "Manage Threads"),
	(Permissions::CREATE_PUBLIC_THREADS, "Create Public Threads"),
	(Permissions::CREATE_PRIVATE_THREADS, "Create Private Threads"),
	(Permissions::USE_EXTERNAL_STICKERS, "Use External Stickers"),
	(Permissions::SEND_MESSAGES_IN_THREADS, "Send Messages In Threads"),
	(Permissions::MODERATE_MEMBERS, "Moderate Members"),
];

/// State of a single permission key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
	Allow,
	Deny,
	/// Inherited, only meaningful for channel overwrites.
	Neutral,
}

impl State {
	/// State of `key` within an overwrite's allow and deny sets.
	pub fn overwrite(key: Permissions, allow: Permissions, deny: Permissions) -> Self {
		if allow.contains(key) {
			Self::Allow
		} else if deny.contains(key) {
			Self::Deny
		} else {
			Self::Neutral
		}
	}

	/// State of `key` within a role's permissions, which have no neutral state.
	pub fn role(key: Permissions, permissions: Permissions) -> Self {
		if permissions.contains(key) {
			Self::Allow
		} else {
			Self::Deny
		}
	}

	pub const fn glyph(self) -> &'static str {
		match self {
			Self::Allow => "\u{2705}",
			Self::Deny => "\u{274C}",
			Self::Neutral => "\u{2796}",
		}
	}
}

/// Renders one key's transition, `None` when the state did not change.
pub fn transition(name: &str, from: State, to: State) -> Option<String> {
	(from != to).then(|| {
		format!(
			"Set {} from {} to {}",
			inline_code(name),
			from.glyph(),
			to.glyph()
		)
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn overwrite_state() {
		let key = Permissions::SEND_MESSAGES;
		assert_eq!(State::overwrite(key, key, Permissions::empty()), State::Allow);
		assert_eq!(State::overwrite(key, Permissions::empty(), key), State::Deny);
		assert_eq!(
			State::overwrite(key, Permissions::empty(), Permissions::empty()),
			State::Neutral
		);
	}

	#[test]
	fn transition_glyphs() {
		assert_eq!(
			transition("Manage Messages", State::Deny, State::Allow).as_deref(),
			Some("Set `Manage Messages` from \u{274C} to \u{2705}")
		);
		assert_eq!(transition("Speak", State::Neutral, State::Neutral), None);
	}

	#[test]
	fn keys_are_distinct() {
		for (i, (a, _)) in KEYS.iter().enumerate() {
			for (b, _) in &KEYS[i + 1..] {
				assert_ne!(a, b);
			}
		}
	}
}
