use twilight_model::id::{marker::RoleMarker, Id};

use super::Changes;
use crate::{
	format::{bold, role_mention, timestamp},
	snapshot::MemberSnapshot,
};

pub fn diff(old: &MemberSnapshot, new: &MemberSnapshot) -> Changes {
	let mut changes = Changes::new();

	if old.nick != new.nick {
		changes.push(format!(
			"Changed nickname from {} to {}",
			bold(old.nick.as_deref().unwrap_or("no nickname")),
			bold(new.nick.as_deref().unwrap_or("no nickname"))
		));
	}

	let added = missing(&new.roles, &old.roles);
	if !added.is_empty() {
		changes.push(format!("Added roles: {added}"));
	}

	let removed = missing(&old.roles, &new.roles);
	if !removed.is_empty() {
		changes.push(format!("Removed roles: {removed}"));
	}

	if old.timeout_until != new.timeout_until {
		changes.push(match new.timeout_until {
			Some(until) => format!("Timed out until {}", timestamp(until)),
			None => "Removed timeout".to_owned(),
		});
	}

	changes
}

/// Whether only the role list differs, which Discord files under its own audit action.
pub fn roles_only(old: &MemberSnapshot, new: &MemberSnapshot) -> bool {
	old.roles != new.roles && old.nick == new.nick && old.timeout_until == new.timeout_until
}

/// Mentions of roles in `from` that aren't in `other`.
fn missing(from: &[Id<RoleMarker>], other: &[Id<RoleMarker>]) -> String {
	from.iter()
		.filter(|&role| other.binary_search(role).is_err())
		.map(|&role| role_mention(role))
		.collect::<Vec<_>>()
		.join(", ")
}

#[cfg(test)]
mod tests {
	use twilight_model::id::Id;

	use super::*;

	fn member() -> MemberSnapshot {
		MemberSnapshot {
			guild_id: Id::new(1),
			user_id: Id::new(2),
			tag: "user".to_owned(),
			avatar_url: String::new(),
			nick: None,
			roles: vec![Id::new(10), Id::new(11)],
			timeout_until: None,
		}
	}

	#[test]
	fn roles_and_nick() {
		let old = member();
		let mut new = old.clone();
		new.nick = Some("nick".to_owned());
		new.roles = vec![Id::new(11), Id::new(12)];

		assert_eq!(
			diff(&old, &new).lines(),
			[
				"Changed nickname from **no nickname** to **nick**",
				"Added roles: <@&12>",
				"Removed roles: <@&10>",
			]
		);
		assert!(!roles_only(&old, &new));
	}

	#[test]
	fn timeout() {
		let old = member();
		let mut new = old.clone();
		new.timeout_until = Some(1_700_000_000);

		assert_eq!(
			diff(&old, &new).lines(),
			["Timed out until <t:1700000000:f>"]
		);
		assert_eq!(diff(&new, &old).lines(), ["Removed timeout"]);
	}

	#[test]
	fn role_only_change() {
		let old = member();
		let mut new = old.clone();
		new.roles.pop();
		assert!(roles_only(&old, &new));
	}
}
