//! Add-task form for the Kanban view.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use chrono::NaiveDate;

use crate::board::{NewTask, Priority};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldId {
    Title,
    Assignee,
    Due,
    Priority,
    Points,
    Labels,
    Urgent,
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub id: FieldId,
    pub label: &'static str,
    pub hint: &'static str,
    pub value: String,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    None,
    Cancel,
    Submit,
}

#[derive(Debug, Clone)]
pub struct TaskForm {
    fields: Vec<FormField>,
    active: usize,
    error: Option<String>,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskForm {
    pub fn new() -> Self {
        let field = |id, label, hint, required| FormField {
            id,
            label,
            hint,
            value: String::new(),
            required,
        };
        Self {
            fields: vec![
                field(FieldId::Title, "Title", "", true),
                field(FieldId::Assignee, "Assignee", "", true),
                field(FieldId::Due, "Due date", "YYYY-MM-DD", true),
                field(FieldId::Priority, "Priority", "high / medium / low", false),
                field(FieldId::Points, "Story points", "default 5", false),
                field(FieldId::Labels, "Labels", "comma separated", false),
                field(FieldId::Urgent, "Urgent", "y / n", false),
            ],
            active: 0,
            error: None,
        }
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('u') {
            if let Some(field) = self.fields.get_mut(self.active) {
                field.value.clear();
            }
            self.error = None;
            return FormAction::None;
        }

        match key.code {
            KeyCode::Esc => return FormAction::Cancel,
            KeyCode::Tab | KeyCode::Down => self.move_active(1),
            KeyCode::BackTab | KeyCode::Up => self.move_active(-1),
            KeyCode::Enter => {
                if self.active + 1 >= self.fields.len() {
                    return match self.build() {
                        Ok(_) => FormAction::Submit,
                        Err(err) => {
                            self.error = Some(err);
                            FormAction::None
                        }
                    };
                }
                self.move_active(1);
            }
            KeyCode::Backspace => {
                if let Some(field) = self.fields.get_mut(self.active) {
                    field.value.pop();
                }
            }
            KeyCode::Char(ch) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) || ch.is_control() {
                    return FormAction::None;
                }
                if let Some(field) = self.fields.get_mut(self.active) {
                    field.value.push(ch);
                }
            }
            _ => {}
        }

        self.error = None;
        FormAction::None
    }

    /// Parse the fields into a board input. Messages are shown inline.
    pub fn build(&self) -> Result<NewTask, String> {
        let title = self.value(FieldId::Title).trim();
        let assignee = self.value(FieldId::Assignee).trim();
        let due = self.value(FieldId::Due).trim();
        if title.is_empty() || assignee.is_empty() || due.is_empty() {
            return Err("title, assignee and due date are required".to_string());
        }
        let due_date = NaiveDate::parse_from_str(due, "%Y-%m-%d")
            .map_err(|_| format!("invalid due date '{due}': expected YYYY-MM-DD"))?;

        let priority = match self.value(FieldId::Priority).trim() {
            "" => None,
            raw => Some(raw.parse::<Priority>().map_err(|err| err.to_string())?),
        };
        let story_points = match self.value(FieldId::Points).trim() {
            "" => None,
            raw => Some(
                raw.parse::<u32>()
                    .map_err(|_| format!("invalid story points '{raw}'"))?,
            ),
        };
        let urgent = matches!(
            self.value(FieldId::Urgent).trim().to_ascii_lowercase().as_str(),
            "y" | "yes" | "true"
        );

        Ok(NewTask {
            title: title.to_string(),
            assignee: assignee.to_string(),
            priority,
            story_points,
            due_date: Some(due_date),
            labels: self.value(FieldId::Labels).to_string(),
            urgent,
        })
    }

    fn move_active(&mut self, delta: isize) {
        let len = self.fields.len() as isize;
        let next = (self.active as isize + delta).rem_euclid(len);
        self.active = next as usize;
    }

    fn value(&self, id: FieldId) -> &str {
        self.fields
            .iter()
            .find(|field| field.id == id)
            .map(|field| field.value.as_str())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(form: &mut TaskForm, text: &str) {
        for ch in text.chars() {
            form.handle_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE));
        }
    }

    fn next(form: &mut TaskForm) -> FormAction {
        form.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))
    }

    #[test]
    fn form_requires_title_assignee_and_due() {
        let mut form = TaskForm::new();
        let mut action = FormAction::None;
        for _ in 0..form.fields().len() {
            action = next(&mut form);
        }
        assert_eq!(action, FormAction::None);
        assert_eq!(form.error(), Some("title, assignee and due date are required"));
    }

    #[test]
    fn filled_form_submits() {
        let mut form = TaskForm::new();
        type_text(&mut form, "Label receipts");
        next(&mut form);
        type_text(&mut form, "Jihoon Choi");
        next(&mut form);
        type_text(&mut form, "2025-09-01");
        next(&mut form);
        type_text(&mut form, "h");
        next(&mut form);
        next(&mut form);
        type_text(&mut form, "Data, ,OCR");
        next(&mut form);
        type_text(&mut form, "y");
        assert_eq!(next(&mut form), FormAction::Submit);

        let input = form.build().expect("valid");
        assert_eq!(input.priority, Some(Priority::High));
        assert_eq!(input.story_points, None);
        assert!(input.urgent);
        assert_eq!(input.labels, "Data, ,OCR");
    }

    #[test]
    fn bad_points_are_reported() {
        let mut form = TaskForm::new();
        type_text(&mut form, "t");
        next(&mut form);
        type_text(&mut form, "a");
        next(&mut form);
        type_text(&mut form, "2025-09-01");
        next(&mut form);
        next(&mut form);
        type_text(&mut form, "many");
        assert_eq!(form.build().expect_err("invalid"), "invalid story points 'many'");
    }
}
