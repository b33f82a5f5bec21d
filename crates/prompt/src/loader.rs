//! Prompt loader for YAML prompt definitions.
//!
//! The question-answering prompts ship inside the binary. A workspace can
//! replace any of them by dropping `<id>.yml` into `.smartsearch/prompts/`.

use crate::types::{PromptDefinition, PromptOrigin};
use smartsearch_core::{AppError, AppResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Built-in prompt definitions, keyed by id.
const BUILTIN_PROMPTS: &[(&str, &str)] = &[
    ("qa.stuff", include_str!("../prompts/qa.stuff.yml")),
    ("qa.map", include_str!("../prompts/qa.map.yml")),
    ("qa.combine", include_str!("../prompts/qa.combine.yml")),
];

/// Directory holding workspace prompt overrides.
fn prompts_dir(workspace_path: &Path) -> PathBuf {
    workspace_path.join(".smartsearch/prompts")
}

/// Load a prompt definition by ID.
///
/// A workspace override wins over the built-in definition of the same id.
///
/// # Example
/// ```no_run
/// use smartsearch_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "qa.stuff")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir(workspace_path).join(format!("{}.yml", prompt_id));

    let definition = if prompt_file.exists() {
        tracing::debug!("Loading prompt override from: {:?}", prompt_file);

        let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
            AppError::Prompt(format!(
                "Failed to read prompt file {:?}: {}",
                prompt_file, e
            ))
        })?;

        parse_prompt(&contents, &format!("{:?}", prompt_file))?
    } else {
        let contents = builtin_source(prompt_id)
            .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", prompt_id)))?;

        parse_prompt(contents, prompt_id)?
    };

    if definition.id != prompt_id {
        return Err(AppError::Prompt(format!(
            "Prompt file for '{}' declares id '{}'",
            prompt_id, definition.id
        )));
    }

    tracing::debug!("Loaded prompt: {} ({})", definition.id, definition.title);
    Ok(definition)
}

/// List all available prompt IDs with the origin that `load_prompt` would use.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<(String, PromptOrigin)>> {
    let mut prompts: BTreeMap<String, PromptOrigin> = BUILTIN_PROMPTS
        .iter()
        .map(|(id, _)| (id.to_string(), PromptOrigin::Builtin))
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
                    prompts.insert(stem.to_string(), PromptOrigin::Workspace);
                }
            }
        }
    }

    Ok(prompts.into_iter().collect())
}

fn builtin_source(prompt_id: &str) -> Option<&'static str> {
    BUILTIN_PROMPTS
        .iter()
        .find(|(id, _)| *id == prompt_id)
        .map(|(_, source)| *source)
}

fn parse_prompt(contents: &str, origin: &str) -> AppResult<PromptDefinition> {
    let definition: PromptDefinition = serde_yaml::from_str(contents)
        .map_err(|e| AppError::Prompt(format!("Failed to parse prompt YAML {}: {}", origin, e)))?;

    validate_prompt(&definition)?;
    Ok(definition)
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

    // Simple x.y check
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
    use std::fs;
    use tempfile::TempDir;

    fn write_override(dir: &Path, id: &str, content: &str) {
        let prompts_dir = dir.join(".smartsearch/prompts");
        fs::create_dir_all(&prompts_dir).unwrap();
        fs::write(prompts_dir.join(format!("{}.yml", id)), content).unwrap();
    }

    #[test]
    fn test_builtins_parse() {
        let temp_dir = TempDir::new().unwrap();
        for (id, _) in BUILTIN_PROMPTS {
            let prompt = load_prompt(temp_dir.path(), id).unwrap();
            assert_eq!(prompt.id, *id);
        }
    }

    #[test]
    fn test_workspace_override_wins() {
        let temp_dir = TempDir::new().unwrap();
        write_override(
            temp_dir.path(),
            "qa.map",
            r#"
id: qa.map
title: "Custom map"
apiVersion: "1.0"
template: "Only: {{context}}"
"#,
        );

        let prompt = load_prompt(temp_dir.path(), "qa.map").unwrap();
        assert_eq!(prompt.title, "Custom map");
    }

    #[test]
    fn test_load_unknown_prompt() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_prompt(temp_dir.path(), "nonexistent").is_err());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        write_override(temp_dir.path(), "qa.stuff", "invalid: yaml: content:");

        assert!(load_prompt(temp_dir.path(), "qa.stuff").is_err());
    }

    #[test]
    fn test_override_id_mismatch() {
        let temp_dir = TempDir::new().unwrap();
        write_override(
            temp_dir.path(),
            "qa.stuff",
            r#"
id: qa.other
title: "Wrong"
apiVersion: "1.0"
template: "x"
"#,
        );

        assert!(load_prompt(temp_dir.path(), "qa.stuff").is_err());
    }

    #[test]
    fn test_list_prompts() {
        let temp_dir = TempDir::new().unwrap();
        write_override(
            temp_dir.path(),
            "qa.combine",
            "id: qa.combine\ntitle: c\napiVersion: \"1.0\"\ntemplate: x\n",
        );

        let prompts = list_prompts(temp_dir.path()).unwrap();
        assert_eq!(prompts.len(), 3);
        assert!(prompts.contains(&("qa.combine".to_string(), PromptOrigin::Workspace)));
        assert!(prompts.contains(&("qa.stuff".to_string(), PromptOrigin::Builtin)));
    }
}
