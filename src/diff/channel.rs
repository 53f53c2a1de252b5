use super::{overwrite, Changes};
use crate::{
	format::{bitrate, bold, bool_str, italic, region},
	snapshot::{ChannelKind, ChannelSnapshot},
};

/// Returns `None` when the channel was only reordered within its category.
pub fn diff(old: &ChannelSnapshot, new: &ChannelSnapshot) -> Option<Changes> {
	let old_parent = old.parent.as_ref().map(|category| category.id);
	let new_parent = new.parent.as_ref().map(|category| category.id);

	if old.position != new.position && old_parent == new_parent {
		return None;
	}

	let mut changes = Changes::new();

	if old.name != new.name {
		changes.push(format!(
			"Changed the name from {} to {}",
			bold(&old.name),
			bold(&new.name)
		));
	}

	if old_parent != new_parent {
		let from = old
			.parent
			.as_ref()
			.map_or("being uncategorized", |category| category.name.as_str());
		let to = new
			.parent
			.as_ref()
			.map_or("no category", |category| category.name.as_str());
		changes.push(format!(
			"Moved to the category {} from {}",
			bold(to),
			bold(from)
		));
	}

	match (&old.kind, &new.kind) {
		(
			ChannelKind::Text {
				nsfw: old_nsfw,
				topic: old_topic,
				slowmode: old_slowmode,
				..
			},
			ChannelKind::Text {
				nsfw: new_nsfw,
				topic: new_topic,
				slowmode: new_slowmode,
				..
			},
		) => {
			if old_nsfw != new_nsfw {
				changes.push(format!(
					"Set the NSFW check to {} from {}",
					bold(bool_str(*new_nsfw)),
					bold(bool_str(*old_nsfw))
				));
			}

			if old_topic != new_topic {
				changes.push_within_budget(format!(
					"Topic changed from:\n\"{}\" to:\n\"{}\"",
					italic(old_topic.as_deref().unwrap_or("NO_TOPIC")),
					italic(new_topic.as_deref().unwrap_or("NO_TOPIC"))
				));
			}

			if old_slowmode != new_slowmode {
				changes.push_within_budget(format!(
					"Set slowmode to {} seconds from {}",
					bold(new_slowmode),
					bold(old_slowmode)
				));
			}
		}
		(
			ChannelKind::Voice {
				bitrate: old_bitrate,
				region: old_region,
				..
			},
			ChannelKind::Voice {
				bitrate: new_bitrate,
				region: new_region,
				..
			},
		) => {
			if old_bitrate != new_bitrate {
				changes.push(format!(
					"Bitrate changed from {} to {}",
					bold(bitrate(*old_bitrate)),
					bold(bitrate(*new_bitrate))
				));
			}

			if old_region != new_region {
				changes.push(format!(
					"Region changed from {} to {}",
					bold(region(old_region.as_deref())),
					bold(region(new_region.as_deref()))
				));
			}
		}
		_ => {}
	}

	overwrite::diff(&old.overwrites, &new.overwrites, &mut changes);

	Some(changes)
}

#[cfg(test)]
mod tests {
	use twilight_model::id::Id;

	use super::*;
	use crate::{
		diff::tests::text_channel,
		snapshot::{Category, VoiceLabel},
	};

	fn category(id: u64, name: &str) -> Option<Category> {
		Some(Category {
			id: Id::new(id),
			name: name.to_owned(),
		})
	}

	#[test]
	fn reorder_is_suppressed() {
		let mut old = text_channel();
		old.parent = category(2, "A");
		let mut new = old.clone();
		new.position = 2;
		new.name = "renamed".to_owned();

		assert_eq!(diff(&old, &new), None);
	}

	#[test]
	fn move_between_categories() {
		let mut old = text_channel();
		old.parent = category(2, "A");
		let mut new = old.clone();
		new.position = 7;
		new.parent = category(3, "B");

		let changes = diff(&old, &new).unwrap();
		assert_eq!(
			changes.lines(),
			["Moved to the category **B** from **A**"]
		);

		let mut uncategorized = old.clone();
		uncategorized.parent = None;
		let changes = diff(&uncategorized, &old).unwrap();
		assert_eq!(
			changes.lines(),
			["Moved to the category **A** from **being uncategorized**"]
		);
	}

	#[test]
	fn text_fields_in_order() {
		let old = text_channel();
		let mut new = old.clone();
		new.name = "chat".to_owned();
		new.kind = ChannelKind::Text {
			label: crate::snapshot::TextLabel::Text,
			nsfw: true,
			topic: Some("memes".to_owned()),
			slowmode: 30,
		};

		let changes = diff(&old, &new).unwrap();
		assert_eq!(
			changes.lines(),
			[
				"Changed the name from **general** to **chat**",
				"Set the NSFW check to **True** from **False**",
				"Topic changed from:\n\"*NO_TOPIC*\" to:\n\"*memes*\"",
				"Set slowmode to **30** seconds from **0**",
			]
		);
	}

	#[test]
	fn oversized_topic_is_dropped() {
		let old = text_channel();
		let mut new = old.clone();
		new.kind = ChannelKind::Text {
			label: crate::snapshot::TextLabel::Text,
			nsfw: false,
			topic: Some("t".repeat(4096)),
			slowmode: 5,
		};

		let changes = diff(&old, &new).unwrap();
		assert_eq!(
			changes.lines(),
			["Set slowmode to **5** seconds from **0**"]
		);
	}

	#[test]
	fn voice_fields() {
		let mut old = text_channel();
		old.kind = ChannelKind::Voice {
			label: VoiceLabel::Voice,
			bitrate: 64_000,
			region: None,
		};
		let mut new = old.clone();
		new.kind = ChannelKind::Voice {
			label: VoiceLabel::Voice,
			bitrate: 384_000,
			region: Some("rotterdam".to_owned()),
		};

		let changes = diff(&old, &new).unwrap();
		assert_eq!(
			changes.lines(),
			[
				"Bitrate changed from **64kbps** to **384kbps**",
				"Region changed from **Automatic** to **Rotterdam**",
			]
		);
	}
}
