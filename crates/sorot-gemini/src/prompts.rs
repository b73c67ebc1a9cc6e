//! Prompt texts for the three analysis passes.
//!
//! The segment prompts pin the entity roles to the values the search schema
//! accepts, so the analyzer's output can be imported without remapping.

use sorot_core::{GlobalContext, VideoKind};

pub(crate) const CLASSIFY: &str = r#"Analyze the video and determine if it is a "sports" or "soap_opera" video.
Respond with a single word: "sports" or "soap_opera"."#;

pub(crate) const SPORTS_CONTEXT: &str = r#"<INSTRUCTIONS>
Analyze this entire sports video to identify the two playing teams and their player rosters.
Respond in a structured JSON format with a single field: "teams".
- "teams": A list of two JSON objects, each representing a team. Each team object should have the following fields:
    - "name": The full name of the team.
    - "short_name": The abbreviated name of the team (e.g., "PBY" for "Persebaya Surabaya").
    - "jersey_color": The primary color of the team's jersey.
    - "players": A list of JSON objects, each representing a player on the team. Each player object should have:
        - "name": The name of the player.
        - "jersey_number": The player's jersey number.
</INSTRUCTIONS>"#;

pub(crate) const SOAP_OPERA_CONTEXT: &str = r#"<INSTRUCTIONS>
You are an expert video content analyzer specializing in Indonesian soap operas.
Analyze this entire video to identify all characters.
Respond in a structured JSON format with a single field: "characters".
- "characters": A list of JSON objects, each representing a character. Each character object should have the following fields:
    - "name": The name of the character.
    - "role": The role or relationship of the character in the story.
</INSTRUCTIONS>"#;

const SPORTS_SEGMENT: &str = r##"Analyze this sports video clip with high detail. Respond in a single structured JSON format.
The JSON object should contain the following fields:
- "description": A complete, single-paragraph description in English focusing on the key actions.
- "persons": A list of JSON objects, each with a "name" and a "role". The role must be one of the following supported values: "director", "actor", "player", "team", "league", "editor", "author", "character", "contributor", "creator", "editor", "funder", "producer", "provider", "publisher", "sponsor", "translator", "music-by", "channel". For athletes, use the "player" role.
- "organizations": A list of JSON objects, each with a "name" and a "role". The role must be one of the following supported values: "director", "actor", "player", "team", "league", "editor", "author", "character", "contributor", "creator", "editor", "funder", "producer", "provider", "publisher", "sponsor", "translator", "music-by", "channel". For sports teams, use the "team" role.
- "hash_tags": A list of relevant hashtags in PascalCase that describe the action (e.g., "#LongShot", "#Screamer", "#Rebound", "#BlockedShot"). Do not include player names, team names, or generic terms like "#Soccer" or "#Football".

Focus only on the events in the video."##;

const SOAP_OPERA_SEGMENT: &str = r##"Analyze this soap opera video clip with high detail. Respond in a single structured JSON format.
The JSON object should contain the following fields:
- "description": A complete and detailed description in English that includes all dialogue, actions, and events from the scene, capturing the emotional tone of the interactions.
- "persons": A list of JSON objects for each character, with a "name" and a "role". The role should be "character".
- "organizations": Leave this field as an empty list.
- "hash_tags": A list of relevant hashtags in PascalCase that describe the scene's themes or key events (e.g., "#Betrayal", "#FamilyDrama", "#SecretRevealed"). Do not include character names.

Focus only on the events in the video."##;

/// Prompt for the whole-video context pass, or `None` for unclassified videos.
pub(crate) fn context_prompt(kind: VideoKind) -> Option<&'static str> {
    match kind {
        VideoKind::Sports => Some(SPORTS_CONTEXT),
        VideoKind::SoapOpera => Some(SOAP_OPERA_CONTEXT),
        VideoKind::Unknown => None,
    }
}

/// Prompt for the per-segment pass, with the global context inlined.
///
/// Returns `None` for unclassified videos; the context block stays empty
/// when no global context was extracted.
pub(crate) fn segment_prompt(
    kind: VideoKind,
    context: Option<&GlobalContext>,
) -> serde_json::Result<Option<String>> {
    let instructions = match kind {
        VideoKind::Sports => SPORTS_SEGMENT,
        VideoKind::SoapOpera => SOAP_OPERA_SEGMENT,
        VideoKind::Unknown => return Ok(None),
    };

    let context_block = match context {
        Some(GlobalContext::Sports { teams }) => format!(
            "Use the following global context to identify the entities in this clip:\n- Teams: {}",
            serde_json::to_string(teams)?
        ),
        Some(GlobalContext::SoapOpera { characters }) => format!(
            "Use the following global context to identify the entities in this clip:\n- Characters: {}",
            serde_json::to_string(characters)?
        ),
        None => String::new(),
    };

    Ok(Some(format!(
        "<INSTRUCTIONS>\n{}\n</INSTRUCTIONS>\n\n<CONTEXT>\n{}\n</CONTEXT>",
        instructions, context_block
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sorot_core::Team;

    #[test]
    fn test_segment_prompt_inlines_team_context() {
        let context = GlobalContext::Sports {
            teams: vec![Team {
                name: "Persebaya Surabaya".to_string(),
                short_name: "PBY".to_string(),
                jersey_color: "green".to_string(),
                players: vec![],
            }],
        };

        let prompt = segment_prompt(VideoKind::Sports, Some(&context))
            .unwrap()
            .unwrap();
        assert!(prompt.contains("- Teams: "));
        assert!(prompt.contains("Persebaya Surabaya"));
        assert!(prompt.contains("<CONTEXT>"));
    }

    #[test]
    fn test_segment_prompt_without_context_keeps_empty_block() {
        let prompt = segment_prompt(VideoKind::SoapOpera, None).unwrap().unwrap();
        assert!(prompt.contains("soap opera"));
        assert!(prompt.contains("<CONTEXT>\n\n</CONTEXT>"));
    }

    #[test]
    fn test_segment_prompt_unknown_kind_is_none() {
        assert!(segment_prompt(VideoKind::Unknown, None).unwrap().is_none());
    }
}
