use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// System and user prompt patterns of a template
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptSpec {
    /// System instructions, used verbatim
    #[serde(default)]
    pub system: String,

    /// User prompt with `{name}` placeholders
    #[serde(default)]
    pub user: String,
}

/// Declaration of a template variable
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariableSpec {
    /// Value used when the caller does not supply one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl VariableSpec {
    /// Default value as text. JSON `null` counts as no default.
    pub fn default_text(&self) -> Option<String> {
        match self.default.as_ref()? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// A report template loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    /// Template display name
    #[serde(default)]
    pub name: String,

    /// Brief description of the template's purpose
    #[serde(default)]
    pub description: String,

    /// Missing prompts render as empty text
    #[serde(default)]
    pub prompt: PromptSpec,

    /// Declared variables and their defaults
    #[serde(default)]
    pub variables: BTreeMap<String, VariableSpec>,
}

impl Template {
    /// Validates the template structure
    pub fn validate(&self) -> Result<(), String> {
        for name in self.variables.keys() {
            if name.is_empty() {
                return Err("Template declares a variable with an empty name".to_string());
            }
        }

        Ok(())
    }

    pub fn system_prompt(&self) -> &str {
        &self.prompt.system
    }

    pub fn user_prompt_pattern(&self) -> &str {
        &self.prompt.user
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template_with_user(user: &str) -> Template {
        Template {
            name: "Test".to_string(),
            description: "A test template".to_string(),
            prompt: PromptSpec {
                system: "Be brief".to_string(),
                user: user.to_string(),
            },
            variables: BTreeMap::new(),
        }
    }

    #[test]
    fn test_validate_valid_template() {
        assert!(template_with_user("Summarize {sales_data}").validate().is_ok());
    }

    #[test]
    fn test_validate_accepts_empty_user_prompt() {
        assert!(template_with_user("   ").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_variable_name() {
        let mut template = template_with_user("{x}");
        template.variables.insert(String::new(), VariableSpec::default());
        assert!(template.validate().is_err());
    }

    #[test]
    fn test_default_text_conversions() {
        let text = VariableSpec {
            default: Some(json!("last quarter")),
            description: None,
        };
        let number = VariableSpec {
            default: Some(json!(90)),
            description: None,
        };
        let null = VariableSpec {
            default: Some(Value::Null),
            description: None,
        };

        assert_eq!(text.default_text().as_deref(), Some("last quarter"));
        assert_eq!(number.default_text().as_deref(), Some("90"));
        assert_eq!(null.default_text(), None);
        assert_eq!(VariableSpec::default().default_text(), None);
    }
}
