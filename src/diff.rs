//! Field-by-field comparison of two [`Snapshot`]s of the same entity.
//!
//! Every routine checks a fixed set of fields in a fixed order and appends one line per
//! changed field, so the rendered notification is stable for equal inputs.

pub mod channel;
pub mod expression;
pub mod member;
pub mod overwrite;
pub mod role;

use crate::snapshot::Snapshot;

/// Maximum length of an embed description.
pub const DESCRIPTION_LIMIT: usize = 4096;

/// Lines at least this long are followed by a blank line when rendered.
const SPACED_LINE: usize = 45;

/// Ordered list of human readable change descriptions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Changes(Vec<String>);

impl Changes {
	pub const fn new() -> Self {
		Self(Vec::new())
	}

	pub fn push(&mut self, line: String) {
		self.0.push(line);
	}

	/// Pushes `line` only if the description stays within [`DESCRIPTION_LIMIT`],
	/// counting three characters of separator overhead per existing line.
	///
	/// Returns whether the line was pushed.
	pub fn push_within_budget(&mut self, line: String) -> bool {
		let used: usize = self.0.iter().map(|line| line.chars().count()).sum();
		let fits = line.chars().count() + used + 3 * self.0.len() <= DESCRIPTION_LIMIT;
		if fits {
			self.0.push(line);
		}
		fits
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[cfg(test)]
	pub fn lines(&self) -> &[String] {
		&self.0
	}

	/// Joins the lines into an embed description.
	pub fn render(&self) -> String {
		if self.0.is_empty() {
			return "Unsupported changes".to_owned();
		}

		self.0
			.iter()
			.map(|line| {
				if line.chars().count() >= SPACED_LINE {
					format!("{line}\n")
				} else {
					line.clone()
				}
			})
			.collect::<Vec<_>>()
			.join("\n")
	}
}

impl Snapshot {
	/// Describe what changed between `self` (before) and `new` (after).
	///
	/// Returns `None` when the change is routine noise (reordering) that should not
	/// be reported at all.
	///
	/// # Panics
	///
	/// Panics if the snapshots are of different kinds.
	pub fn diff(&self, new: &Self) -> Option<Changes> {
		match (self, new) {
			(Self::Channel(old), Self::Channel(new)) => channel::diff(old, new),
			(Self::Role(old), Self::Role(new)) => role::diff(old, new),
			(Self::Emoji(old), Self::Emoji(new)) => Some(expression::emoji(old, new)),
			(Self::Sticker(old), Self::Sticker(new)) => Some(expression::sticker(old, new)),
			(Self::Member(old), Self::Member(new)) => Some(member::diff(old, new)),
			(old, new) => panic!("cannot diff a {} against a {}", old.kind(), new.kind()),
		}
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use twilight_model::{
		channel::message::sticker::StickerFormatType,
		guild::Permissions,
		id::Id,
	};

	use super::*;
	use crate::snapshot::{
		ChannelKind, ChannelSnapshot, EmojiSnapshot, MemberSnapshot, RoleSnapshot,
		StickerSnapshot, TextLabel,
	};

	pub fn text_channel() -> ChannelSnapshot {
		ChannelSnapshot {
			id: Id::new(10),
			guild_id: Id::new(1),
			name: "general".to_owned(),
			position: 1,
			parent: None,
			kind: ChannelKind::Text {
				label: TextLabel::Text,
				nsfw: false,
				topic: None,
				slowmode: 0,
			},
			overwrites: Vec::new(),
		}
	}

	pub fn role() -> RoleSnapshot {
		RoleSnapshot {
			id: Id::new(20),
			guild_id: Id::new(1),
			name: "Mod".to_owned(),
			color: 0xff_00_00,
			hoist: false,
			mentionable: false,
			permissions: Permissions::SEND_MESSAGES | Permissions::VIEW_CHANNEL,
			position: 3,
		}
	}

	#[test]
	fn identical_snapshots_are_empty() {
		let snapshots = [
			Snapshot::Channel(text_channel()),
			Snapshot::Role(role()),
			Snapshot::Emoji(EmojiSnapshot {
				id: Id::new(30),
				guild_id: Id::new(1),
				name: "pog".to_owned(),
				animated: true,
			}),
			Snapshot::Sticker(StickerSnapshot {
				id: Id::new(40),
				guild_id: Id::new(1),
				name: "wave".to_owned(),
				description: "hi".to_owned(),
				format: StickerFormatType::Png,
			}),
			Snapshot::Member(MemberSnapshot {
				guild_id: Id::new(1),
				user_id: Id::new(50),
				tag: "user".to_owned(),
				avatar_url: String::new(),
				nick: Some("nick".to_owned()),
				roles: vec![Id::new(20)],
				timeout_until: None,
			}),
		];

		for snapshot in &snapshots {
			assert_eq!(snapshot.diff(snapshot), Some(Changes::new()), "{}", snapshot.kind());
		}
	}

	#[test]
	#[should_panic(expected = "cannot diff a channel against a role")]
	fn mismatched_kinds_panic() {
		Snapshot::Channel(text_channel()).diff(&Snapshot::Role(role()));
	}

	#[test]
	fn render_spaces_long_lines() {
		let mut changes = Changes::new();
		changes.push("short".to_owned());
		changes.push("x".repeat(45));
		changes.push("end".to_owned());
		assert_eq!(changes.render(), format!("short\n{}\n\nend", "x".repeat(45)));
	}

	#[test]
	fn render_empty() {
		assert_eq!(Changes::new().render(), "Unsupported changes");
	}

	#[test]
	fn budget_counts_separators() {
		let mut changes = Changes::new();
		changes.push("a".repeat(4000));
		assert!(!changes.push_within_budget("b".repeat(94)));
		assert!(changes.push_within_budget("b".repeat(93)));
		assert_eq!(changes.len(), 2);
	}
}
