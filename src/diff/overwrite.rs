//! Channel permission overwrites, which unlike roles have a neutral state.

use twilight_model::guild::Permissions;

use super::Changes;
use crate::{
	permission::{transition, State, KEYS},
	snapshot::{Overwrite, OverwriteTarget},
};

/// Appends added, then removed, then modified overwrites.
pub fn diff(old: &[Overwrite], new: &[Overwrite], changes: &mut Changes) {
	let find = |list: &[Overwrite], target: OverwriteTarget| {
		list.iter().find(|o| o.target == target).copied()
	};

	for added in new.iter().filter(|n| find(old, n.target).is_none()) {
		changes.push(describe(
			"Added permission overwrite for",
			&Overwrite::neutral(added),
			added,
		));
	}

	for removed in old.iter().filter(|o| find(new, o.target).is_none()) {
		changes.push(describe(
			"Removed permission overwrite for",
			removed,
			&Overwrite::neutral(removed),
		));
	}

	for before in old {
		if let Some(after) = find(new, before.target) {
			if before.allow != after.allow || before.deny != after.deny {
				changes.push(describe(
					"Changed permission overwrite for",
					before,
					&after,
				));
			}
		}
	}
}

impl Overwrite {
	/// Same target with every key inherited.
	fn neutral(&self) -> Self {
		Self {
			allow: Permissions::empty(),
			deny: Permissions::empty(),
			..*self
		}
	}
}

fn describe(action: &str, before: &Overwrite, after: &Overwrite) -> String {
	let lines = transitions(before, after);
	let mention = after.target.mention();

	if lines.is_empty() {
		format!("{action} {mention}")
	} else {
		format!("{action} {mention}:\n  - {}", lines.join("\n  - "))
	}
}

fn transitions(before: &Overwrite, after: &Overwrite) -> Vec<String> {
	KEYS.iter()
		.filter_map(|&(key, name)| {
			transition(
				name,
				State::overwrite(key, before.allow, before.deny),
				State::overwrite(key, after.allow, after.deny),
			)
		})
		.collect()
}
