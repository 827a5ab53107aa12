//! Prompt builder for rendering templates with clinic context.

use crate::types::{BuiltPrompt, PromptDefinition};
use clinic_core::{AppError, AppResult, ClinicProfile};
use handlebars::Handlebars;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Build a prompt from a definition and input variables.
///
/// Templates see every variable at the top level plus the clinic profile
/// under `clinic` (e.g. `{{clinic.phone}}`).
///
/// # Example
/// ```no_run
/// use clinic_core::ClinicProfile;
/// use clinic_prompt::{build_prompt, builtin_prompt, SYSTEM_PROMPT_ID};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = builtin_prompt(SYSTEM_PROMPT_ID)?;
/// let built = build_prompt(&def, &ClinicProfile::default(), HashMap::new())?;
/// println!("{}", built.content);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    clinic: &ClinicProfile,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    if let Some(missing) = definition
        .variables
        .iter()
        .find(|name| !variables.contains_key(*name))
    {
        return Err(AppError::Prompt(format!(
            "Prompt {} requires variable '{}'",
            definition.id, missing
        )));
    }

    let mut context: Map<String, Value> = variables
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    context.insert("clinic".to_string(), serde_json::to_value(clinic)?);

    let rendered = render_template(&definition.template, &Value::Object(context))?;

    Ok(BuiltPrompt {
        content: rendered.trim_end().to_string(),
        role: definition.role,
        prompt_id: definition.id.clone(),
        variables,
    })
}

/// Render the synthesis prompt for one query.
///
/// The RAG text and web block are inserted verbatim.
pub fn build_synthesis_prompt(
    definition: &PromptDefinition,
    clinic: &ClinicProfile,
    query: &str,
    rag_response: &str,
    web_results: &str,
) -> AppResult<BuiltPrompt> {
    let mut variables = HashMap::new();
    variables.insert("query".to_string(), query.to_string());
    variables.insert("rag_response".to_string(), rag_response.to_string());
    variables.insert("web_results".to_string(), web_results.to_string());
    build_prompt(definition, clinic, variables)
}

/// Render a Handlebars template with a JSON context.
fn render_template(template: &str, context: &Value) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text, never HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", context)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}
