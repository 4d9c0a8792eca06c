use super::defaults;
use super::types::Template;
use crate::report::error::TemplateError;
use crate::report::kind::ReportKind;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Template metadata for listing
#[derive(Debug, Clone)]
pub struct TemplateInfo {
    pub kind: ReportKind,
    pub file_name: &'static str,
    pub name: String,
    pub description: String,
}

/// Where templates are read from
///
/// With a directory, `dir/<file name>` must exist. Without one, the
/// templates embedded in the binary are served.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    dir: Option<PathBuf>,
}

impl TemplateStore {
    /// Store backed by the built-in templates
    pub fn builtin() -> Self {
        Self { dir: None }
    }

    /// Store backed by a templates directory on disk
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Load the template for a report kind
    pub fn load(&self, kind: ReportKind) -> Result<Template, TemplateError> {
        match &self.dir {
            Some(_) => self.load_template(kind.template_file()),
            None => validate_and_parse_template(kind.template_file(), defaults::builtin_for(kind)),
        }
    }

    /// Load and parse a template by file name
    ///
    /// # Arguments
    /// * `file_name` - Template file name (e.g., "sales_report.json")
    ///
    /// # Returns
    /// Parsed and validated Template struct
    pub fn load_template(&self, file_name: &str) -> Result<Template, TemplateError> {
        info!("Loading template: {}", file_name);

        let json_content = match &self.dir {
            Some(dir) => {
                let template_path = dir.join(file_name);
                debug!("Reading template from {:?}", template_path);
                std::fs::read_to_string(&template_path).map_err(|e| {
                    debug!("No template '{}' at {:?}: {}", file_name, template_path, e);
                    TemplateError::NotFound {
                        name: file_name.to_string(),
                        path: template_path.display().to_string(),
                    }
                })?
            }
            None => defaults::get_builtin_template(file_name)
                .ok_or_else(|| TemplateError::NotFound {
                    name: file_name.to_string(),
                    path: "<built-in>".to_string(),
                })?
                .to_string(),
        };

        validate_and_parse_template(file_name, &json_content)
    }

    /// List every report kind whose template loads
    pub fn list(&self) -> Vec<TemplateInfo> {
        let mut templates = Vec::new();

        for kind in ReportKind::ALL {
            match self.load(kind) {
                Ok(template) => templates.push(TemplateInfo {
                    kind,
                    file_name: kind.template_file(),
                    name: template.name,
                    description: template.description,
                }),
                Err(e) => warn!("Failed to load template for {}: {}", kind, e),
            }
        }

        templates
    }
}

/// Validate and parse template JSON
pub fn validate_and_parse_template(
    file_name: &str,
    json_content: &str,
) -> Result<Template, TemplateError> {
    let template: Template =
        serde_json::from_str(json_content).map_err(|e| TemplateError::Malformed {
            name: file_name.to_string(),
            reason: e.to_string(),
        })?;

    template.validate().map_err(|reason| TemplateError::Malformed {
        name: file_name.to_string(),
        reason,
    })?;

    Ok(template)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_builtin_store_loads_every_kind() {
        let store = TemplateStore::builtin();
        for kind in ReportKind::ALL {
            let template = store.load(kind).unwrap();
            assert_eq!(template.name, kind.display_name());
            assert!(!template.system_prompt().is_empty());
        }
    }

    #[test]
    fn test_missing_file_in_dir_is_not_found() {
        let dir = tempdir().unwrap();
        let store = TemplateStore::from_dir(dir.path());

        let result = store.load(ReportKind::Hr);
        assert!(matches!(result, Err(TemplateError::NotFound { .. })));
    }

    #[test]
    fn test_invalid_json_in_dir_is_malformed() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("support_report.json"), "{ not json").unwrap();
        let store = TemplateStore::from_dir(dir.path());

        let result = store.load(ReportKind::Support);
        assert!(matches!(result, Err(TemplateError::Malformed { .. })));
    }

    #[test]
    fn test_dir_template_overrides_builtin_content() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("sales_report.json"),
            r#"{"prompt": {"system": "sys", "user": "Data: {sales_data}"},
                "variables": {"timeframe": {"default": "this year"}}}"#,
        )
        .unwrap();
        let store = TemplateStore::from_dir(dir.path());

        let template = store.load(ReportKind::Sales).unwrap();
        assert_eq!(template.system_prompt(), "sys");
        assert_eq!(
            template.variables["timeframe"].default_text().as_deref(),
            Some("this year")
        );
    }

    #[test]
    fn test_validate_invalid_json() {
        let result = validate_and_parse_template("x.json", "invalid json");
        assert!(matches!(result, Err(TemplateError::Malformed { .. })));
    }

    #[test]
    fn test_missing_prompt_section_is_empty_not_malformed() {
        let template = validate_and_parse_template("bare.json", r#"{"name": "Bare"}"#).unwrap();
        assert_eq!(template.name, "Bare");
        assert_eq!(template.system_prompt(), "");
        assert_eq!(template.user_prompt_pattern(), "");

        let template =
            validate_and_parse_template("blank.json", r#"{"prompt": {"system": "sys", "user": ""}}"#)
                .unwrap();
        assert_eq!(template.system_prompt(), "sys");
        assert_eq!(template.user_prompt_pattern(), "");
    }

    #[test]
    fn test_list_skips_broken_templates() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("hr_hiring_summary.json"),
            defaults::HR_HIRING_SUMMARY,
        )
        .unwrap();
        let store = TemplateStore::from_dir(dir.path());

        let listed = store.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].kind, ReportKind::Hr);
    }
}
