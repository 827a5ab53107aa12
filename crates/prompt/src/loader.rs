//! Prompt loader for built-in and workspace YAML prompt definitions.

use crate::types::PromptDefinition;
use clinic_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Identifier of the system prompt given to the answering agent.
pub const SYSTEM_PROMPT_ID: &str = "clinic.system";

/// Identifier of the prompt that merges clinic knowledge with web results.
pub const SYNTHESIS_PROMPT_ID: &str = "clinic.synthesis";

const BUILTIN_PROMPTS: &[(&str, &str)] = &[
    (
        SYSTEM_PROMPT_ID,
        include_str!("../prompts/clinic.system.yml"),
    ),
    (
        SYNTHESIS_PROMPT_ID,
        include_str!("../prompts/clinic.synthesis.yml"),
    ),
];

fn prompts_dir(workspace_path: &Path) -> PathBuf {
    workspace_path.join(".clinic/prompts")
}

/// Parse one of the prompts compiled into the binary.
pub fn builtin_prompt(prompt_id: &str) -> AppResult<PromptDefinition> {
    let (_, source) = BUILTIN_PROMPTS
        .iter()
        .find(|(id, _)| *id == prompt_id)
        .ok_or_else(|| AppError::Prompt(format!("Unknown built-in prompt: {}", prompt_id)))?;

    let definition: PromptDefinition = serde_yaml::from_str(source).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse built-in prompt {}: {}",
            prompt_id, e
        ))
    })?;
    validate_prompt(&definition)?;

    Ok(definition)
}

/// Load a prompt definition by ID from the workspace.
///
/// This function searches for a prompt file named `<id>.yml` in the
/// `.clinic/prompts/` directory.
///
/// # Arguments
/// * `workspace_path` - Root workspace directory containing `.clinic/`
/// * `prompt_id` - Prompt identifier (e.g., "clinic.system")
///
/// # Returns
/// A parsed `PromptDefinition` or an error if not found/invalid.
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir(workspace_path).join(format!("{}.yml", prompt_id));

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    if !prompt_file.exists() {
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// Workspace override if present, otherwise the built-in definition.
///
/// A broken override is an error rather than a silent fallback, so a typo
/// in a customized prompt is noticed.
pub fn resolve_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let override_file = prompts_dir(workspace_path).join(format!("{}.yml", prompt_id));
    if override_file.exists() {
        return load_prompt(workspace_path, prompt_id);
    }
    builtin_prompt(prompt_id)
}

/// List all available prompt IDs: built-ins plus workspace files, sorted.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<String>> {
    let mut prompt_ids: Vec<String> = BUILTIN_PROMPTS
        .iter()
        .map(|(id, _)| id.to_string())
        .collect();

    let dir = prompts_dir(workspace_path);
    if dir.exists() {
        for entry in walkdir::WalkDir::new(&dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    prompt_ids.push(stem.to_string());
                }
            }
        }
    }

    prompt_ids.sort();
    prompt_ids.dedup();
    Ok(prompt_ids)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PromptRole;
    use std::fs;
    use tempfile::TempDir;

    fn write_prompt(dir: &Path, id: &str, content: &str) {
        let prompts = prompts_dir(dir);
        fs::create_dir_all(&prompts).unwrap();
        fs::write(prompts.join(format!("{}.yml", id)), content).unwrap();
    }

    fn valid_prompt(id: &str) -> String {
        format!(
            "id: {}\ntitle: \"Custom\"\napiVersion: \"1.0\"\ntemplate: \"Custom for {{{{clinic.name}}}}\"\n",
            id
        )
    }

    #[test]
    fn test_builtin_prompts_parse() {
        let system = builtin_prompt(SYSTEM_PROMPT_ID).unwrap();
        assert_eq!(system.role, PromptRole::System);
        assert!(system.template.contains("{{clinic.phone}}"));

        let synthesis = builtin_prompt(SYNTHESIS_PROMPT_ID).unwrap();
        assert_eq!(synthesis.role, PromptRole::User);
        assert!(synthesis.template.contains("{{web_results}}"));
    }

    #[test]
    fn test_unknown_builtin() {
        assert!(builtin_prompt("nope").is_err());
    }

    #[test]
    fn test_load_valid_prompt() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "test.prompt", &valid_prompt("test.prompt"));

        let prompt = load_prompt(temp_dir.path(), "test.prompt").unwrap();
        assert_eq!(prompt.id, "test.prompt");
        assert_eq!(prompt.title, "Custom");
    }

    #[test]
    fn test_load_nonexistent_prompt() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_prompt(temp_dir.path(), "nonexistent").is_err());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "invalid", "invalid: yaml: content:");
        assert!(load_prompt(temp_dir.path(), "invalid").is_err());
    }

    #[test]
    fn test_resolve_prefers_workspace_override() {
        let temp_dir = TempDir::new().unwrap();
        let builtin = resolve_prompt(temp_dir.path(), SYSTEM_PROMPT_ID).unwrap();
        assert_eq!(builtin.title, "Clinic consultant system prompt");

        write_prompt(temp_dir.path(), SYSTEM_PROMPT_ID, &valid_prompt(SYSTEM_PROMPT_ID));
        let custom = resolve_prompt(temp_dir.path(), SYSTEM_PROMPT_ID).unwrap();
        assert_eq!(custom.title, "Custom");
    }

    #[test]
    fn test_list_prompts() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(
            list_prompts(temp_dir.path()).unwrap(),
            vec![SYNTHESIS_PROMPT_ID.to_string(), SYSTEM_PROMPT_ID.to_string()]
        );

        write_prompt(temp_dir.path(), "extra", &valid_prompt("extra"));
        write_prompt(temp_dir.path(), SYSTEM_PROMPT_ID, &valid_prompt(SYSTEM_PROMPT_ID));

        let prompts = list_prompts(temp_dir.path()).unwrap();
        assert_eq!(prompts.len(), 3);
        assert!(prompts.contains(&"extra".to_string()));
    }
}
