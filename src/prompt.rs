//! Prompt templating helpers.
//!
//! The system instruction lives in one template file rendered with runtime
//! parameters; the per-turn planning and revision requests are built here
//! from the current directory listing.

use std::collections::BTreeMap;

const SYSTEM_PROMPT_TEMPLATE: &str = include_str!("templates/system_prompt.template");

/// Parameters used to compile the system prompt template.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SystemPromptParams<'a> {
    /// Display form of the directory being organized.
    pub target_dir: &'a str,
}

/// Render the system instruction sent with every planning request.
pub fn render_system_prompt(params: SystemPromptParams<'_>) -> String {
    let mut vars = BTreeMap::<&str, String>::new();
    vars.insert("TARGET_DIR", params.target_dir.to_string());
    normalize_blank_lines(&render_template(SYSTEM_PROMPT_TEMPLATE, &vars))
}

/// First planning request for a freshly listed directory.
pub fn planning_request(target_dir: &str, structure: &str, context: Option<&str>) -> String {
    let base = format!(
        "Based on the following file structure within the directory '{target_dir}', \
         propose a logical organization plan. Present the plan as a sequence of tool calls \
         using relative paths.\n\nCurrent structure:\n{}",
        structure.trim_end()
    );
    match context.map(str::trim).filter(|c| !c.is_empty()) {
        Some(context) => format!("User context for organization: \"{context}\"\n\n{base}"),
        None => base,
    }
}

/// Follow-up request asking for a new plan that addresses `feedback`.
pub fn revision_request(feedback: &str, structure: &str) -> String {
    format!(
        "The user wants to revise the organization plan. Their feedback is: '{}'.\n\
         Generate a *new* organization plan (as a sequence of tool calls) that addresses this \
         feedback. The previous plan was not executed; discard it entirely.\n\n\
         Current structure:\n{}",
        feedback.trim(),
        structure.trim_end()
    )
}

fn render_template(template: &str, vars: &BTreeMap<&str, String>) -> String {
    let mut rendered = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("{{{{{key}}}}}");
        rendered = rendered.replace(&placeholder, value);
    }
    rendered
}

fn normalize_blank_lines(text: &str) -> String {
    let mut out = String::new();
    let mut previous_blank = false;

    for line in text.lines() {
        let is_blank = line.trim().is_empty();
        if is_blank && previous_blank {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(line.trim_end());
        previous_blank = is_blank;
    }

    out.trim().to_string()
}
