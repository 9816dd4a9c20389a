use anyhow::Result;
use colored::Colorize;
use inquire::{Confirm, Editor, Select, Text};

use reqtrace_core::{
    Dialogs, LinkForm, ProjectForm, RequirementForm, RequirementId, RequirementPriority,
    RequirementStatus, RequirementType,
};

/// Confirmations through `inquire`, alerts on stderr
pub struct InquireDialogs {
    /// Answer yes to every confirmation (`--yes`)
    pub assume_yes: bool,
}

impl Dialogs for InquireDialogs {
    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        // An interrupted prompt counts as "no"
        Confirm::new(message)
            .with_default(false)
            .prompt()
            .unwrap_or(false)
    }

    fn alert(&self, message: &str) {
        eprintln!("{}", message.red());
    }
}

/// Index of `current` in `options`, for the initial cursor
fn cursor_of<T: PartialEq>(options: &[T], current: &T) -> usize {
    options.iter().position(|o| o == current).unwrap_or(0)
}

/// Prompts for every requirement field, starting from the form's values
pub fn prompt_requirement(mut form: RequirementForm) -> Result<RequirementForm> {
    form.title = Text::new("Title:")
        .with_initial_value(&form.title)
        .prompt()?;

    // Use the Editor type for multiline input
    form.description = Editor::new("Description:")
        .with_predefined_text(&form.description)
        .prompt()?;

    let type_options = RequirementType::all();
    let cursor = cursor_of(&type_options, &form.requirement_type);
    form.requirement_type = Select::new("Type:", type_options)
        .with_starting_cursor(cursor)
        .prompt()?;

    let status_options = RequirementStatus::all();
    let cursor = cursor_of(&status_options, &form.status);
    form.status = Select::new("Status:", status_options)
        .with_starting_cursor(cursor)
        .prompt()?;

    let priority_options = RequirementPriority::all();
    let cursor = cursor_of(&priority_options, &form.priority);
    form.priority = Select::new("Priority:", priority_options)
        .with_starting_cursor(cursor)
        .prompt()?;

    form.source = Text::new("Source:")
        .with_initial_value(&form.source)
        .prompt()?;

    form.author = Text::new("Author:")
        .with_initial_value(&form.author)
        .prompt()?;

    Ok(form)
}

/// Prompts for the link target among the form's options
pub fn prompt_link_target(form: &LinkForm) -> Result<RequirementId> {
    if form.options.is_empty() {
        anyhow::bail!("No other requirements to link to");
    }

    let labels: Vec<String> = form.options.iter().map(|o| o.label.clone()).collect();
    let selection = Select::new("Target requirement:", labels.clone()).prompt()?;

    let index = labels
        .iter()
        .position(|l| l == &selection)
        .unwrap_or_default();
    Ok(form.options[index].id)
}

pub fn prompt_project(mut form: ProjectForm) -> Result<ProjectForm> {
    form.name = Text::new("Project name:")
        .with_initial_value(&form.name)
        .prompt()?;
    form.description = Text::new("Description:")
        .with_initial_value(&form.description)
        .prompt()?;
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_of() {
        let options = RequirementStatus::all();
        assert_eq!(cursor_of(&options, &RequirementStatus::Review), 2);
        assert_eq!(
            cursor_of(&options, &RequirementStatus::Other("archived".into())),
            0
        );
    }

    #[test]
    fn test_assume_yes_skips_prompt() {
        let dialogs = InquireDialogs { assume_yes: true };
        assert!(dialogs.confirm("Delete everything?"));
    }
}
