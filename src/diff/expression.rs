//! Emojis and stickers, which are immutable apart from their names (and a sticker's
//! description).

use super::Changes;
use crate::{
	format::{bold, italic},
	snapshot::{EmojiSnapshot, StickerSnapshot},
};

fn name(old: &str, new: &str, changes: &mut Changes) {
	if old != new {
		changes.push(format!("Changed name from {} to {}", bold(old), bold(new)));
	}
}

pub fn emoji(old: &EmojiSnapshot, new: &EmojiSnapshot) -> Changes {
	let mut changes = Changes::new();
	name(&old.name, &new.name, &mut changes);
	changes
}

pub fn sticker(old: &StickerSnapshot, new: &StickerSnapshot) -> Changes {
	let mut changes = Changes::new();
	name(&old.name, &new.name, &mut changes);

	if old.description != new.description {
		changes.push(format!(
			"Changed description:\n{}\n{}",
			italic(format_args!("\"{}\"", old.description)),
			italic(format_args!("\"{}\"", new.description))
		));
	}

	changes
}
