//! Fragment resolution and prompt assembly.
//!
//! A reading names exactly four codex entries. This module joins the caller's
//! selection against the static table (order-preserving) and renders the
//! resolved fragments into a single deterministic prompt document. Pure
//! computation over request-scoped inputs and the read-only table — no I/O,
//! no retries, no partial success.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codex::prompts;
use crate::codex::table::{CodexEntry, CodexTable};

/// A reading always names exactly this many fragments.
pub const SELECTION_LEN: usize = 4;

/// A caller-supplied identifier. Accepts JSON strings and numbers; both
/// compare against table ids by their string form (`3` matches `"3"`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SelectedId {
    Number(i64),
    Text(String),
}

impl SelectedId {
    pub fn normalized(&self) -> String {
        match self {
            SelectedId::Number(n) => n.to_string(),
            SelectedId::Text(s) => s.trim().to_string(),
        }
    }
}

/// Semantic tag for a selection slot. Serialized lowercase in requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionLabel {
    Origin,
    Present,
    Obstacle,
    Path,
}

impl PositionLabel {
    /// Fixed header rendered above the fragment in the prompt document.
    pub fn header(&self) -> &'static str {
        match self {
            PositionLabel::Origin => "Threshold (past / shadow)",
            PositionLabel::Present => "Voice (present / guiding message)",
            PositionLabel::Obstacle => "Challenge (resistance / block)",
            PositionLabel::Path => "Path (process / destiny)",
        }
    }
}

/// Unmatched-identifier handling. Lenient substitutes a placeholder entry;
/// strict fails the whole reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    #[default]
    Lenient,
    Strict,
}

/// Output formatting mode. Gilded adds the inline-markup and glyph
/// directives to the prompt; plain omits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Markup {
    #[default]
    Plain,
    Gilded,
}

/// One selection slot joined with its codex entry, in selection order.
/// `known` is false for lenient-mode placeholders.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedFragment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionLabel>,
    pub entry: CodexEntry,
    pub known: bool,
}

/// The resolver's combined output: the assembled prompt plus the fragments
/// it was built from.
#[derive(Debug, Clone, Serialize)]
pub struct Reading {
    pub prompt: String,
    pub fragments: Vec<ResolvedFragment>,
}

/// Terminal per-request errors. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No codex entry matches id '{0}'")]
    NotFound(String),
}

/// Resolves a selection against the table, order-preserving.
///
/// Fails with `Validation` unless the selection (and positions, when given)
/// has exactly [`SELECTION_LEN`] elements. In strict mode an unmatched id
/// fails the whole call; in lenient mode it yields a placeholder fragment.
pub fn resolve(
    table: &CodexTable,
    selection: &[SelectedId],
    positions: Option<&[PositionLabel]>,
    strictness: Strictness,
) -> Result<Vec<ResolvedFragment>, ResolveError> {
    if selection.len() != SELECTION_LEN {
        return Err(ResolveError::Validation(format!(
            "A reading requires exactly {} fragments, got {}",
            SELECTION_LEN,
            selection.len()
        )));
    }
    if let Some(positions) = positions {
        if positions.len() != SELECTION_LEN {
            return Err(ResolveError::Validation(format!(
                "Positions must cover all {} fragments, got {}",
                SELECTION_LEN,
                positions.len()
            )));
        }
    }

    let mut fragments = Vec::with_capacity(SELECTION_LEN);
    for (i, id) in selection.iter().enumerate() {
        let id = id.normalized();
        let (entry, known) = match table.get(&id) {
            Some(entry) => (entry.clone(), true),
            None => match strictness {
                Strictness::Strict => return Err(ResolveError::NotFound(id)),
                Strictness::Lenient => (placeholder_entry(&id), false),
            },
        };
        fragments.push(ResolvedFragment {
            position: positions.map(|p| p[i]),
            entry,
            known,
        });
    }

    Ok(fragments)
}

/// Lenient-mode substitute for an identifier absent from the table.
fn placeholder_entry(id: &str) -> CodexEntry {
    CodexEntry {
        id: id.to_string(),
        name: format!("Fragment {id}: unknown symbol"),
        message: "This fragment is not recorded in the codex. Treat it as the unnamed: \
                  a principle the seeker carries that no table has catalogued."
            .to_string(),
        symbolism: "The blank page; that which resists inscription.".to_string(),
    }
}

/// Renders the resolved fragments into the final prompt document.
///
/// Deterministic: identical fragments, intent and markup yield byte-identical
/// output. An absent intent and an empty-string intent render identically —
/// the intent block is omitted entirely, never left as an empty slot.
pub fn build_prompt(
    fragments: &[ResolvedFragment],
    intent: Option<&str>,
    markup: Markup,
) -> String {
    let mut blocks: Vec<String> = Vec::new();
    blocks.push(prompts::OPENING.to_string());

    for fragment in fragments {
        match fragment.position {
            Some(position) => {
                blocks.push(format!("{}\n{}", position.header(), fragment.entry.name))
            }
            None => blocks.push(fragment.entry.name.clone()),
        }
        blocks.push(fragment.entry.message.clone());
        blocks.push(fragment.entry.symbolism.clone());
    }

    if let Some(intent) = intent.map(str::trim).filter(|s| !s.is_empty()) {
        blocks.push(prompts::INTENT_TEMPLATE.replace("{intent}", intent));
    }

    blocks.push(prompts::CLOSING.to_string());
    if markup == Markup::Gilded {
        blocks.push(prompts::GILDED_DIRECTIVE.to_string());
    }

    blocks.join("\n\n")
}

/// Resolves and assembles in one step — the full component contract.
pub fn prepare_reading(
    table: &CodexTable,
    selection: &[SelectedId],
    positions: Option<&[PositionLabel]>,
    intent: Option<&str>,
    strictness: Strictness,
    markup: Markup,
) -> Result<Reading, ResolveError> {
    let fragments = resolve(table, selection, positions, strictness)?;
    let prompt = build_prompt(&fragments, intent, markup);
    Ok(Reading { prompt, fragments })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, name: &str) -> CodexEntry {
        CodexEntry {
            id: id.to_string(),
            name: name.to_string(),
            message: format!("M{id}"),
            symbolism: format!("S{id}"),
        }
    }

    fn table() -> CodexTable {
        CodexTable::from_entries(vec![
            entry("1", "Origin"),
            entry("2", "Tide"),
            entry("3", "Gate"),
            entry("4", "Ember"),
        ])
        .unwrap()
    }

    fn ids(raw: &[&str]) -> Vec<SelectedId> {
        raw.iter().map(|s| SelectedId::Text(s.to_string())).collect()
    }

    const ALL_POSITIONS: [PositionLabel; 4] = [
        PositionLabel::Origin,
        PositionLabel::Present,
        PositionLabel::Obstacle,
        PositionLabel::Path,
    ];

    #[test]
    fn test_resolution_preserves_selection_order() {
        let selection = ids(&["3", "1", "4", "2"]);
        let fragments = resolve(&table(), &selection, None, Strictness::Lenient).unwrap();
        let resolved_ids: Vec<_> = fragments.iter().map(|f| f.entry.id.as_str()).collect();
        assert_eq!(resolved_ids, vec!["3", "1", "4", "2"]);
    }

    #[test]
    fn test_numeric_and_string_ids_compare_equal() {
        let selection = vec![
            SelectedId::Number(1),
            SelectedId::Text("2".to_string()),
            SelectedId::Number(3),
            SelectedId::Text(" 4 ".to_string()),
        ];
        let fragments = resolve(&table(), &selection, None, Strictness::Strict).unwrap();
        assert!(fragments.iter().all(|f| f.known));
    }

    #[test]
    fn test_short_selection_is_validation_error() {
        let err = resolve(&table(), &ids(&["1", "2", "3"]), None, Strictness::Lenient)
            .unwrap_err();
        assert!(matches!(err, ResolveError::Validation(_)));
    }

    #[test]
    fn test_long_selection_is_validation_error() {
        let err = resolve(
            &table(),
            &ids(&["1", "2", "3", "4", "1"]),
            None,
            Strictness::Strict,
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::Validation(_)));
    }

    #[test]
    fn test_empty_selection_is_validation_error() {
        let err = resolve(&table(), &[], None, Strictness::Lenient).unwrap_err();
        assert!(matches!(err, ResolveError::Validation(_)));
    }

    #[test]
    fn test_position_length_mismatch_is_validation_error() {
        let positions = [PositionLabel::Origin, PositionLabel::Present];
        let err = resolve(
            &table(),
            &ids(&["1", "2", "3", "4"]),
            Some(&positions),
            Strictness::Lenient,
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::Validation(_)));
    }

    #[test]
    fn test_lenient_mode_substitutes_placeholder() {
        let fragments = resolve(&table(), &ids(&["1", "2", "3", "99"]), None, Strictness::Lenient)
            .unwrap();
        let last = &fragments[3];
        assert!(!last.known);
        assert_eq!(last.entry.id, "99");
        assert!(last.entry.name.contains("99"));
        assert!(last.entry.name.contains("unknown symbol"));
    }

    #[test]
    fn test_strict_mode_fails_on_unknown_id() {
        let err = resolve(&table(), &ids(&["1", "2", "3", "99"]), None, Strictness::Strict)
            .unwrap_err();
        assert_eq!(err, ResolveError::NotFound("99".to_string()));
    }

    #[test]
    fn test_positions_attach_in_order() {
        let fragments = resolve(
            &table(),
            &ids(&["1", "2", "3", "4"]),
            Some(&ALL_POSITIONS),
            Strictness::Strict,
        )
        .unwrap();
        assert_eq!(fragments[0].position, Some(PositionLabel::Origin));
        assert_eq!(fragments[3].position, Some(PositionLabel::Path));
    }

    #[test]
    fn test_prompt_contains_entries_in_order_with_intent() {
        let reading = prepare_reading(
            &table(),
            &ids(&["1", "2", "3", "4"]),
            None,
            Some("clarity"),
            Strictness::Strict,
            Markup::Plain,
        )
        .unwrap();

        let prompt = &reading.prompt;
        let m1 = prompt.find("M1").expect("M1 present");
        let m2 = prompt.find("M2").expect("M2 present");
        let m3 = prompt.find("M3").expect("M3 present");
        let m4 = prompt.find("M4").expect("M4 present");
        assert!(m1 < m2 && m2 < m3 && m3 < m4, "messages must appear in order");
        assert!(prompt.contains("S1") && prompt.contains("S4"));
        assert_eq!(prompt.matches("clarity").count(), 1);
    }

    #[test]
    fn test_prompt_includes_position_headers() {
        let fragments = resolve(
            &table(),
            &ids(&["1", "2", "3", "4"]),
            Some(&ALL_POSITIONS),
            Strictness::Strict,
        )
        .unwrap();
        let prompt = build_prompt(&fragments, None, Markup::Plain);
        assert!(prompt.contains(PositionLabel::Origin.header()));
        assert!(prompt.contains(PositionLabel::Path.header()));
    }

    #[test]
    fn test_empty_intent_renders_like_omitted_intent() {
        let fragments = resolve(&table(), &ids(&["1", "2", "3", "4"]), None, Strictness::Strict)
            .unwrap();
        let omitted = build_prompt(&fragments, None, Markup::Plain);
        let empty = build_prompt(&fragments, Some(""), Markup::Plain);
        let blank = build_prompt(&fragments, Some("   "), Markup::Plain);
        assert_eq!(omitted, empty);
        assert_eq!(omitted, blank);
        assert!(!omitted.contains("declared intention"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let selection = ids(&["4", "3", "2", "1"]);
        let a = prepare_reading(
            &table(),
            &selection,
            Some(&ALL_POSITIONS),
            Some("rest"),
            Strictness::Lenient,
            Markup::Gilded,
        )
        .unwrap();
        let b = prepare_reading(
            &table(),
            &selection,
            Some(&ALL_POSITIONS),
            Some("rest"),
            Strictness::Lenient,
            Markup::Gilded,
        )
        .unwrap();
        assert_eq!(a.prompt, b.prompt);
    }

    #[test]
    fn test_gilded_markup_adds_directive_plain_does_not() {
        let fragments = resolve(&table(), &ids(&["1", "2", "3", "4"]), None, Strictness::Strict)
            .unwrap();
        let plain = build_prompt(&fragments, None, Markup::Plain);
        let gilded = build_prompt(&fragments, None, Markup::Gilded);
        assert!(!plain.contains("gilded"));
        assert!(gilded.contains("<span class=\"gilded\">"));
    }

    #[test]
    fn test_lenient_placeholder_still_assembles_prompt() {
        let reading = prepare_reading(
            &table(),
            &ids(&["1", "2", "3", "99"]),
            None,
            None,
            Strictness::Lenient,
            Markup::Plain,
        )
        .unwrap();
        assert!(reading.prompt.contains("Fragment 99: unknown symbol"));
    }
}
