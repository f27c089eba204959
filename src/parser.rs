//! Extraction of the three labelled sections from a single text completion.
//!
//! The model is asked to answer with `[CONTENT]`, `[IMAGE_PROMPT]` and
//! `[AUDIO_SCRIPT]` sections in that order, but is not guaranteed to comply.
//! Parsing is best-effort: a missing marker selects a fallback instead of
//! failing the operation.

pub const CONTENT_MARKER: &str = "[CONTENT]";
pub const IMAGE_PROMPT_MARKER: &str = "[IMAGE_PROMPT]";
pub const AUDIO_SCRIPT_MARKER: &str = "[AUDIO_SCRIPT]";

const MARKERS: [&str; 3] = [CONTENT_MARKER, IMAGE_PROMPT_MARKER, AUDIO_SCRIPT_MARKER];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedOmniResponse {
    pub narrative: String,
    pub image_prompt: String,
    pub audio_script: String,
}

/// Splits `completion` on the three section markers.
///
/// Fallback table: a missing `[CONTENT]` yields whatever text precedes the
/// first recognized marker (the whole completion when no marker is present);
/// a missing or empty `[IMAGE_PROMPT]` or `[AUDIO_SCRIPT]` yields the
/// caller-supplied prompt, so every downstream request still has usable
/// input text.
pub fn parse_omni(completion: &str, fallback_prompt: &str) -> ParsedOmniResponse {
    let mut found: Vec<(usize, &str)> = MARKERS
        .iter()
        .filter_map(|marker| completion.find(marker).map(|pos| (pos, *marker)))
        .collect();
    found.sort_by_key(|(pos, _)| *pos);

    let section_for = |marker: &str| -> Option<&str> {
        let index = found.iter().position(|(_, m)| *m == marker)?;
        let (pos, m) = found[index];
        let start = pos + m.len();
        let end = found
            .get(index + 1)
            .map(|(next_pos, _)| *next_pos)
            .unwrap_or(completion.len());
        Some(completion[start..end].trim())
    };

    let narrative = section_for(CONTENT_MARKER)
        .map(str::to_string)
        .unwrap_or_else(|| {
            let end = found
                .first()
                .map(|(pos, _)| *pos)
                .unwrap_or(completion.len());
            completion[..end].trim().to_string()
        });

    let fallback = || fallback_prompt.trim().to_string();
    let image_prompt = section_for(IMAGE_PROMPT_MARKER)
        .filter(|section| !section.is_empty())
        .map(str::to_string)
        .unwrap_or_else(fallback);
    let audio_script = section_for(AUDIO_SCRIPT_MARKER)
        .filter(|section| !section.is_empty())
        .map(str::to_string)
        .unwrap_or_else(fallback);

    ParsedOmniResponse {
        narrative,
        image_prompt,
        audio_script,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_all_three_sections_in_order() {
        let completion = "[CONTENT] A lone lantern glows. [IMAGE_PROMPT] a glowing lantern in thick fog, moody [AUDIO_SCRIPT] The fog swallows the light.";
        let parsed = parse_omni(completion, "a lantern in the fog");

        assert_eq!(parsed.narrative, "A lone lantern glows.");
        assert_eq!(parsed.image_prompt, "a glowing lantern in thick fog, moody");
        assert_eq!(parsed.audio_script, "The fog swallows the light.");
    }

    #[test]
    fn sections_are_trimmed_across_newlines() {
        let completion = "[CONTENT]\nFirst paragraph.\n\nSecond paragraph.\n[IMAGE_PROMPT]\n  a scene  \n[AUDIO_SCRIPT]\n  spoken words  \n";
        let parsed = parse_omni(completion, "prompt");

        assert_eq!(parsed.narrative, "First paragraph.\n\nSecond paragraph.");
        assert_eq!(parsed.image_prompt, "a scene");
        assert_eq!(parsed.audio_script, "spoken words");
    }

    #[test]
    fn missing_content_marker_uses_text_before_first_marker() {
        let completion =
            "Some unlabelled preamble. [IMAGE_PROMPT] a scene [AUDIO_SCRIPT] a script";
        let parsed = parse_omni(completion, "prompt");

        assert_eq!(parsed.narrative, "Some unlabelled preamble.");
        assert_eq!(parsed.image_prompt, "a scene");
        assert_eq!(parsed.audio_script, "a script");
    }

    #[test]
    fn no_markers_at_all_uses_whole_completion_and_prompt() {
        let parsed = parse_omni("Just free-form text.", "original prompt");

        assert_eq!(parsed.narrative, "Just free-form text.");
        assert_eq!(parsed.image_prompt, "original prompt");
        assert_eq!(parsed.audio_script, "original prompt");
    }

    #[test]
    fn missing_media_markers_fall_back_to_prompt() {
        let parsed = parse_omni("[CONTENT] narrative only", "original prompt");

        assert_eq!(parsed.narrative, "narrative only");
        assert_eq!(parsed.image_prompt, "original prompt");
        assert_eq!(parsed.audio_script, "original prompt");
    }

    #[test]
    fn empty_section_counts_as_missing_for_media_fields() {
        let parsed = parse_omni(
            "[CONTENT] body [IMAGE_PROMPT] [AUDIO_SCRIPT] script",
            "fallback",
        );

        assert_eq!(parsed.narrative, "body");
        assert_eq!(parsed.image_prompt, "fallback");
        assert_eq!(parsed.audio_script, "script");
    }

    #[test]
    fn markers_out_of_contract_order_still_resolve() {
        let completion = "[AUDIO_SCRIPT] spoken [CONTENT] body [IMAGE_PROMPT] scene";
        let parsed = parse_omni(completion, "prompt");

        assert_eq!(parsed.narrative, "body");
        assert_eq!(parsed.image_prompt, "scene");
        assert_eq!(parsed.audio_script, "spoken");
    }

    #[test]
    fn empty_completion_yields_empty_narrative() {
        let parsed = parse_omni("", "prompt");

        assert_eq!(parsed.narrative, "");
        assert_eq!(parsed.image_prompt, "prompt");
        assert_eq!(parsed.audio_script, "prompt");
    }
}
