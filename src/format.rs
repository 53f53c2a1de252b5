//! Markdown primitives and value rendering shared by the differ and the logger.

use std::fmt::Display;

use twilight_model::{
	channel::message::sticker::StickerFormatType,
	id::{
		marker::{ChannelMarker, EmojiMarker, RoleMarker, StickerMarker, UserMarker},
		Id,
	},
	user::User,
	util::ImageHash,
};

const CDN: &str = "https://cdn.discordapp.com";

pub fn bold(value: impl Display) -> String {
	format!("**{value}**")
}

pub fn italic(value: impl Display) -> String {
	format!("*{value}*")
}

pub fn inline_code(value: impl Display) -> String {
	format!("`{value}`")
}

pub fn code_block(value: impl Display) -> String {
	format!("```\n{value}\n```")
}

pub fn channel_mention(id: Id<ChannelMarker>) -> String {
	format!("<#{id}>")
}

pub fn role_mention(id: Id<RoleMarker>) -> String {
	format!("<@&{id}>")
}

pub fn user_mention(id: Id<UserMarker>) -> String {
	format!("<@{id}>")
}

/// Discord timestamp markup, rendered client side in the reader's locale.
pub fn timestamp(unix_secs: i64) -> String {
	format!("<t:{unix_secs}:f>")
}

/// Uppercases the first letter of the first word, leaving the rest untouched.
pub fn capitalize(value: &str) -> String {
	match value.char_indices().find(|(_, c)| c.is_alphanumeric()) {
		Some((index, c)) => {
			let mut out = String::with_capacity(value.len());
			out.push_str(&value[..index]);
			out.extend(c.to_uppercase());
			out.push_str(&value[index + c.len_utf8()..]);
			out
		}
		None => value.to_owned(),
	}
}

pub const fn bool_str(value: bool) -> &'static str {
	if value {
		"True"
	} else {
		"False"
	}
}

/// Bits per second to whole kilobits per second.
pub fn bitrate(bits: u32) -> String {
	format!("{}kbps", bits / 1000)
}

/// Voice region, where no region means Discord picks one.
pub fn region(region: Option<&str>) -> String {
	region.map_or_else(|| "Automatic".to_owned(), capitalize)
}

/// Human readable file size.
pub fn bytes(size: u64) -> String {
	const KB: u64 = 1024;
	const MB: u64 = KB * 1024;
	const GB: u64 = MB * 1024;

	#[allow(clippy::cast_precision_loss)]
	let size_f = size as f64;
	match size {
		0..KB => format!("{size}b"),
		KB..MB => format!("{:.3}kb", size_f / KB as f64),
		MB..GB => format!("{:.3}mb", size_f / MB as f64),
		_ => format!("{:.5}gb", size_f / GB as f64),
	}
}

/// `name#0001` for legacy accounts, plain `name` for migrated ones.
pub fn user_tag(user: &User) -> String {
	if user.discriminator == 0 {
		user.name.clone()
	} else {
		format!("{}#{:04}", user.name, user.discriminator)
	}
}

pub fn avatar_url(user: &User) -> String {
	match user.avatar {
		Some(hash) => avatar_hash_url(user.id, hash),
		None => {
			let index = if user.discriminator == 0 {
				(user.id.get() >> 22) % 6
			} else {
				u64::from(user.discriminator) % 5
			};
			format!("{CDN}/embed/avatars/{index}.png")
		}
	}
}

fn avatar_hash_url(id: Id<UserMarker>, hash: ImageHash) -> String {
	let ext = if hash.is_animated() { "gif" } else { "png" };
	format!("{CDN}/avatars/{id}/{hash}.{ext}")
}

pub fn emoji_url(id: Id<EmojiMarker>, animated: bool) -> String {
	let ext = if animated { "gif" } else { "png" };
	format!("{CDN}/emojis/{id}.{ext}")
}

pub fn sticker_url(id: Id<StickerMarker>, format: StickerFormatType) -> String {
	let ext = match format {
		StickerFormatType::Gif => "gif",
		StickerFormatType::Lottie => "json",
		_ => "png",
	};
	format!("https://media.discordapp.net/stickers/{id}.{ext}")
}

pub const fn sticker_format(format: StickerFormatType) -> &'static str {
	match format {
		StickerFormatType::Png => "PNG",
		StickerFormatType::Apng => "APNG",
		StickerFormatType::Lottie => "LOTTIE",
		StickerFormatType::Gif => "GIF",
		_ => "UNKNOWN",
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bitrate_truncates() {
		assert_eq!(bitrate(384_000), "384kbps");
		assert_eq!(bitrate(64_999), "64kbps");
	}

	#[test]
	fn capitalize_first_word() {
		assert_eq!(capitalize("rotterdam"), "Rotterdam");
		assert_eq!(capitalize("us-east"), "Us-east");
		assert_eq!(capitalize(""), "");
	}

	#[test]
	fn region_defaults_to_automatic() {
		assert_eq!(region(None), "Automatic");
		assert_eq!(region(Some("japan")), "Japan");
	}

	#[test]
	fn byte_units() {
		assert_eq!(bytes(512), "512b");
		assert_eq!(bytes(2048), "2.000kb");
		assert_eq!(bytes(3 * 1024 * 1024), "3.000mb");
		assert_eq!(bytes(1024 * 1024 * 1024), "1.00000gb");
	}

	#[test]
	fn markdown() {
		assert_eq!(bold("a"), "**a**");
		assert_eq!(italic("a"), "*a*");
		assert_eq!(inline_code(1), "`1`");
		assert_eq!(role_mention(Id::new(5)), "<@&5>");
	}
}
