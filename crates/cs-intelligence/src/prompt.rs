//! System prompt assembly.

use cs_core::manifest::Manifest;

/// Separator placed between prompt sections.
pub const SECTION_SEPARATOR: &str = "\n\n===\n\n";

const TASK_FRAMING: &str = "You edit YAML configuration files for a bot that runs plugins. \
Apply the user's instruction to the file below and return valid YAML.

Rules:
1. Keep every list marker (`-`), in particular under `plugins` and `uses`.
2. The result must be accepted by the parser source included further down.
3. Take property names and default values from the plugin manifests.
4. Leave URLs untouched unless the instruction asks for a change to them.

Current configuration for";

const OUTPUT_RULES: &str = "Answer with the edited YAML only. Do not add explanations, \
headings, code fences or language tags.

Plugin entries look like this:

plugins:
  - uses:
      - plugin: <OWNER>/<REPO>@main
        with:
          property1: value1
          property2: value2

Plugin rules:
- Keep existing plugin entries unless the instruction removes them.
- Append new plugin entries at the end of the `plugins` list.
- Derive OWNER and REPO from existing entries and from the manifests.
- Never drop content the instruction does not mention.

Formatting rules:
- Keep the original indentation and spacing.
- Keep comments written for people, including any URLs inside them.
- Remove commented-out YAML only when asked to.
- Name new properties exactly as the manifests do and use their defaults.

Your output is checked by this parser:";

const MANIFEST_INTRO: &str = "Plugin manifests. Each one lists the properties a plugin \
accepts and their defaults:";

/// Render one manifest between its start and end delimiters.
pub fn manifest_block(manifest: &Manifest) -> String {
    let json = serde_json::to_string(manifest).unwrap_or_else(|_| "{}".to_string());
    format!(
        "### {name} - Start\n```json\n{json}\n```\n### {name} - End\n",
        name = manifest.name
    )
}

/// Build the system prompt for one target file.
///
/// Sections, in order: task framing (naming `context_url`), the current
/// file verbatim, output and formatting rules, the parser source, and the
/// manifests.
pub fn build_system_prompt(
    current_content: &str,
    parser_code: &str,
    manifests: &[Manifest],
    context_url: &str,
) -> String {
    let manifests = manifests
        .iter()
        .map(manifest_block)
        .collect::<Vec<_>>()
        .join("\n\n");

    [
        format!("{TASK_FRAMING} {context_url}:"),
        current_content.to_string(),
        OUTPUT_RULES.to_string(),
        parser_code.to_string(),
        MANIFEST_INTRO.to_string(),
        manifests,
    ]
    .join(SECTION_SEPARATOR)
}

/// Corrective user message sent after a response failed validation.
pub fn correction_message(validation_error: &str) -> String {
    format!(
        "Your last answer was not a valid configuration. Fix this problem and answer again: \
         {validation_error}"
    )
}
