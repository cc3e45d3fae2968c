//! Instruction template for the diagnosis generator.

use std::fmt::Write;

use super::{ContextTier, PromptInputs};

/// Render the full prompt sent to the diagnosis generator.
///
/// Context sections appear in precedence order, highest first, and the
/// instructions tell the model to let higher tiers win on conflicts.
pub fn render(inputs: &PromptInputs) -> String {
    let components = if inputs.app.components.is_empty() {
        "unspecified".to_string()
    } else {
        inputs.app.components.join(", ")
    };

    let mut context = String::new();
    for tier in ContextTier::PRECEDENCE {
        let entries = inputs.context.entries(tier);
        if entries.is_empty() {
            continue;
        }
        let _ = writeln!(context, "### {}", tier.heading());
        for entry in entries {
            let _ = writeln!(context, "- {}", entry.trim());
        }
        context.push('\n');
    }

    format!(
        r#"You are an on-call site reliability engineer diagnosing an incident in "{app_name}".

Application stack: {app_stack}
Application components: {components}

Rules (non-negotiable):
1) Base the diagnosis on the incident and the context below. Do not invent systems that are not mentioned.
2) Context is listed by precedence: past resolutions, then verified diagnoses, then runbook procedures, then similar incidents.
3) When two context entries conflict, follow the one from the higher-precedence section.
4) List remediation steps in the order they must be performed. Start a step with "restart <service>" or "scale <cluster> to <n>" when that is the action.

## Incident
{incident}

## Context
{context}
Output:
Return a single JSON object and nothing else:
{{"rootCause": "<one paragraph>", "steps": ["<step 1>", "<step 2>"], "confidence": "HIGH" | "MEDIUM" | "LOW"}}
"#,
        app_name = inputs.app.name,
        app_stack = inputs.app.stack,
        components = components,
        incident = inputs.incident_text,
        context = context,
    )
}
