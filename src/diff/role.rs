use super::Changes;
use crate::{
	format::{bold, bool_str},
	permission::{transition, State, KEYS},
	snapshot::RoleSnapshot,
};

/// Returns `None` when the role was only reordered.
pub fn diff(old: &RoleSnapshot, new: &RoleSnapshot) -> Option<Changes> {
	if old.position != new.position {
		return None;
	}

	let mut changes = Changes::new();

	if old.name != new.name {
		changes.push(format!(
			"Changed name from {} to {}",
			bold(&old.name),
			bold(&new.name)
		));
	}

	if old.color != new.color {
		changes.push(format!(
			"Changed color from {} to {}",
			bold(old.hex_color()),
			bold(new.hex_color())
		));
	}

	if old.hoist != new.hoist {
		changes.push(format!(
			"Changed hoist from {} to {}",
			bold(bool_str(old.hoist)),
			bold(bool_str(new.hoist))
		));
	}

	if old.mentionable != new.mentionable {
		changes.push(format!(
			"Changed mentionable from {} to {}",
			bold(bool_str(old.mentionable)),
			bold(bool_str(new.mentionable))
		));
	}

	if old.permissions != new.permissions {
		let lines = KEYS
			.iter()
			.filter_map(|&(key, name)| {
				transition(
					name,
					State::role(key, old.permissions),
					State::role(key, new.permissions),
				)
			})
			.collect::<Vec<_>>();

		// bits outside of `KEYS` aren't reported
		if !lines.is_empty() {
			changes.push(format!("Changed permissions:\n  - {}", lines.join("\n  - ")));
		}
	}

	Some(changes)
}
