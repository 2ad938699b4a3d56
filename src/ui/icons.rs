//! Shared UI icons.

use console::Emoji;

pub static CHECK: Emoji<'_, '_> = Emoji("\u{2705} ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("\u{274c} ", "[ERR]");
pub static SPARKLE: Emoji<'_, '_> = Emoji("\u{2728} ", "*");
pub static PENCIL: Emoji<'_, '_> = Emoji("\u{1f4dd} ", "");
pub static CHART: Emoji<'_, '_> = Emoji("\u{1f4ca} ", "[EVAL]");
