use anyhow::Result;

use crate::models::{DictionaryResult, Outcome, TranslateResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub json: bool,
    pub pretty: bool,
    pub with_using_model: bool,
}

pub fn render(outcome: &Outcome, options: RenderOptions) -> Result<String> {
    let mut output = if options.json {
        if options.pretty {
            serde_json::to_string_pretty(outcome)?
        } else {
            serde_json::to_string(outcome)?
        }
    } else {
        match outcome {
            Outcome::Translation(result) => format_translation(result),
            Outcome::Dictionary(result) => format_dictionary(result),
        }
    };

    if options.with_using_model && !options.json {
        let model = outcome.model().unwrap_or("unavailable");
        output.push_str(&format!("\nmodel: {}", model));
        if let Some(latency) = outcome.latency_ms() {
            output.push_str(&format!("\nlatency: {}ms", latency));
        }
    }

    Ok(output)
}

fn format_translation(result: &TranslateResult) -> String {
    let mut sections = vec![result.translation.clone()];

    if let Some(alternatives) = result.alternatives.as_ref().filter(|alts| !alts.is_empty()) {
        let lines = alternatives
            .iter()
            .map(|alt| format!("- {}", alt))
            .collect::<Vec<_>>();
        sections.push(format!("Alternatives:\n{}", lines.join("\n")));
    }
    if let Some(notes) = &result.notes {
        sections.push(format!("Notes:\n{}", notes));
    }
    if let Some(detected) = &result.detected_source_lang {
        sections.push(format!("Detected source: {}", detected));
    }

    sections.join("\n\n")
}

fn format_dictionary(result: &DictionaryResult) -> String {
    let mut lines = vec![format!("Term: {}", result.term)];
    for entry in &result.entries {
        lines.push(String::new());
        lines.push(format!("[{}]", entry.pos.as_deref().unwrap_or("—")));
        for (index, sense) in entry.senses.iter().enumerate() {
            lines.push(format!("{}. {}", index + 1, sense.meaning));
            if sense.example_source.is_some() || sense.example_target.is_some() {
                let example = format!(
                    "   e.g. {} -> {}",
                    sense.example_source.as_deref().unwrap_or(""),
                    sense.example_target.as_deref().unwrap_or("")
                );
                lines.push(example.trim_end().to_string());
            }
            if let Some(notes) = &sense.usage_notes {
                lines.push(format!("   note: {}", notes));
            }
        }
    }
    lines.join("\n")
}
