use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::info;

pub const DEFAULT_REPORT_FILE: &str = "report.md";

/// Reasoning blocks some models emit before the answer
static THINKING_TAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<think(?:ing)?>.*?</think(?:ing)?>").unwrap());

/// Fence openers a model may wrap the whole report in, most specific first
const FENCE_OPENERS: [&str; 3] = ["```markdown\n", "```md\n", "```\n"];

/// Report text without reasoning blocks or an enclosing code fence
pub fn clean_llm_markdown_output(raw: &str) -> String {
    let answer = THINKING_TAG_REGEX.replace_all(raw, "");
    let answer = answer.trim();

    FENCE_OPENERS
        .iter()
        .find_map(|&opener| answer.strip_prefix(opener)?.strip_suffix("```"))
        .unwrap_or(answer)
        .trim()
        .to_string()
}

/// Write the generated report as a markdown document
pub fn write_report(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    info!("Report written to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_strips_thinking_and_fences() {
        let raw = "<think>plan the report</think>\n```markdown\n# Q1 Report\n- Revenue up\n```";
        assert_eq!(clean_llm_markdown_output(raw), "# Q1 Report\n- Revenue up");
    }

    #[test]
    fn test_fence_needs_both_ends() {
        assert_eq!(clean_llm_markdown_output("```md\n# Title\n```"), "# Title");
        assert_eq!(clean_llm_markdown_output("```\n```"), "");
        assert_eq!(clean_llm_markdown_output("```markdown\n# Open"), "```markdown\n# Open");
    }

    #[test]
    fn test_plain_output_is_trimmed_only() {
        assert_eq!(clean_llm_markdown_output("  # Title\n\nBody  \n"), "# Title\n\nBody");
    }

    #[test]
    fn test_write_report_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join(DEFAULT_REPORT_FILE);
        write_report(&path, "# Report").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# Report");
    }
}
