use tera::{Context as TeraContext, Tera};

use crate::error::Result;
use crate::models::{Mode, RerunHint, TranslateRequest};

/// Bumped whenever the instruction wording or either schema changes.
pub const PROMPT_VERSION: u32 = 1;

const SYSTEM_PROMPT_TEMPLATE: &str = include_str!("system_prompt.tera");

pub const TRANSLATE_SCHEMA: &str = r#"{
  "translation": string,
  "alternatives": string[] | null,
  "notes": string | null,
  "detected_source_lang": string | null
}"#;

pub const DICTIONARY_SCHEMA: &str = r#"{
  "term": string,
  "entries": [
    {
      "pos": string | null,
      "senses": [
        {
          "meaning": string,
          "example_source": string | null,
          "example_target": string | null,
          "usage_notes": string | null
        }
      ]
    }
  ]
}"#;

const TRANSLATE_TASK: &str = "Task: Translate the user's text.";
const TRANSLATE_NOTES: &str = "If the source language is ambiguous, set detected_source_lang to null and explain briefly in notes.";

const DICTIONARY_TASK: &str = "Task: Return dictionary-style entries with multiple senses.";
const DICTIONARY_NOTES: &str =
    "List at most 2 parts of speech, with at most 3 senses for each part of speech.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompts {
    pub system: String,
    pub user: String,
}

impl Prompts {
    /// Single prompt for the flat completion mode.
    pub fn flattened(&self) -> String {
        format!("{}\n\n{}", self.system, self.user)
    }
}

pub fn build_prompts(request: &TranslateRequest) -> Result<Prompts> {
    Ok(Prompts {
        system: render_system_prompt(request)?,
        user: render_user_prompt(request),
    })
}

pub fn render_system_prompt(request: &TranslateRequest) -> Result<String> {
    let (task, schema, schema_notes) = match request.mode {
        Mode::Translate => (TRANSLATE_TASK, TRANSLATE_SCHEMA, TRANSLATE_NOTES),
        Mode::Dictionary => (DICTIONARY_TASK, DICTIONARY_SCHEMA, DICTIONARY_NOTES),
    };

    let mut context = TeraContext::new();
    context.insert("tone", request.tone.trim());
    context.insert(
        "tone_instructions",
        &quoted_instructions(request.tone_instructions.as_deref()),
    );
    context.insert("rerun_directive", &request.rerun.map(rerun_directive));
    context.insert("task", task);
    context.insert("schema", schema);
    context.insert("schema_notes", schema_notes);
    context.insert("explain_lang", request.explain_lang.trim());

    let rendered = Tera::one_off(SYSTEM_PROMPT_TEMPLATE, &context, false)?;
    Ok(rendered.trim_end().to_string())
}

pub fn render_user_prompt(request: &TranslateRequest) -> String {
    match request.mode {
        Mode::Translate => format!(
            "Translate the text.\nSource language: {}.\nTarget language: {}.\nText:\n{}\n",
            request.source_lang, request.target_lang, request.text
        ),
        Mode::Dictionary => format!(
            "Explain and translate as a dictionary entry.\nTarget language for meanings/examples: {}.\nTerm: {}\n",
            request.target_lang,
            request.text.trim()
        ),
    }
}

fn rerun_directive(hint: RerunHint) -> &'static str {
    match hint {
        RerunHint::MoreLiteral => "make it more literal (closer to source wording).",
        RerunHint::MoreNatural => {
            "make it more natural (native phrasing) while preserving meaning."
        }
        RerunHint::Retry => "try a different valid translation.",
    }
}

// Quoted so the model sees exactly where the caller's text starts and ends.
fn quoted_instructions(instructions: Option<&str>) -> Option<String> {
    let instructions = instructions?.trim();
    if instructions.is_empty() {
        return None;
    }
    serde_json::to_string(instructions).ok()
}
