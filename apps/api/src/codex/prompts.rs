// All prompt constants for reading assembly.
// The resolver concatenates these with the resolved fragments; nothing here
// is derived from caller input except the intent slot.

use crate::codex::resolver::Markup;

/// Opening lines of every assembled reading prompt.
pub const OPENING: &str = "You have received four fragments of the Hermetic Codex. \
Each one carries an ancestral principle that resonates with the seeker's inner search.";

/// Intent sentence template. Replace `{intent}` before use; omit the whole
/// block when no intent was declared.
pub const INTENT_TEMPLATE: &str = "The seeker's declared intention is: {intent}\n\n\
Let the reading bend toward this intention without restating it mechanically.";

/// Closing instructional block — tone, style, and output-structure directives.
pub const CLOSING: &str = "From these fragments, channel a deep, symbolic and transformative \
guidance. Do not explain the fragments one by one. Entwine their essence into a single \
reflection that speaks to the soul of the seeker. Use evocative language, with rhythm and \
resonance, that invites introspection.\n\n\
Structure the answer as one flowing text of three to five short paragraphs. Conclude with an \
alchemical whisper that invites the reader to choose their next step, without naming it \
outright.";

/// Extra directive appended in gilded markup mode.
pub const GILDED_DIRECTIVE: &str = "You may highlight key words with <span class=\"gilded\"> \
where it is coherent. If one of the glyphs (☉ ☽ 🜁 🜃 🜄 🜂 ⚶ 🜔) resonates with the message, \
weave it in subtly.";

/// System prompt sent alongside every reading prompt.
pub const READING_SYSTEM: &str = "You are a practical alchemical mentor who interprets symbols \
of the Hermetic Codex in a clear, inspiring and meaningful tone.";

/// System prompt for gilded markup mode.
pub const READING_SYSTEM_GILDED: &str = "You are a practical alchemical mentor who interprets \
symbols of the Hermetic Codex in a clear, inspiring and meaningful tone. Format key words with \
<span class=\"gilded\"> when appropriate.";

/// Selects the system prompt for the requested markup mode.
pub fn system_prompt(markup: Markup) -> &'static str {
    match markup {
        Markup::Plain => READING_SYSTEM,
        Markup::Gilded => READING_SYSTEM_GILDED,
    }
}
