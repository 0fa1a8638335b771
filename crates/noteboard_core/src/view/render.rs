use super::board::EditState;
use crate::ledger::DocId;
use crate::model::vote::VoteTally;
use chrono::NaiveDate;
use std::fmt::{Display, Formatter};

pub const ADD_NOTE_PLACEHOLDER: &str = "Add a new note...";
pub const UNKNOWN_AUTHOR: &str = "unknown author";

/// One rendered note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteCard {
    pub note_id: DocId,
    /// `None` when the author join found nobody.
    pub author_name: Option<String>,
    pub date: NaiveDate,
    pub text: String,
    pub votes: VoteTally,
}

impl NoteCard {
    pub fn author_label(&self) -> &str {
        self.author_name.as_deref().unwrap_or(UNKNOWN_AUTHOR)
    }
}

/// Snapshot of everything the board shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub title: String,
    pub placeholder: &'static str,
    pub draft: String,
    /// "Add Note" does nothing without a loaded current user.
    pub can_add: bool,
    pub cards: Vec<NoteCard>,
    pub editing: EditState,
    /// Message of the most recent failed action, if any.
    pub error: Option<String>,
}

impl Display for BoardView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.title)?;
        let input = if self.draft.is_empty() {
            self.placeholder
        } else {
            self.draft.as_str()
        };
        let button = if self.can_add {
            "Add Note"
        } else {
            "Add Note (no current user)"
        };
        writeln!(f, "[ {input} ] [{button}]")?;
        if let Some(error) = self.error.as_deref() {
            writeln!(f, "! {error}")?;
        }
        if self.cards.is_empty() {
            writeln!(f, "(no notes)")?;
        }
        for card in &self.cards {
            writeln!(
                f,
                "- {} | {} | {} | votes: {}",
                card.note_id,
                card.author_label(),
                card.date,
                card.votes.count
            )?;
            writeln!(f, "  {}", card.text)?;
            if let EditState::Editing { note_id, draft } = &self.editing {
                if *note_id == card.note_id {
                    writeln!(f, "  editing: [ {draft} ] [Save] [Cancel]")?;
                    continue;
                }
            }
            writeln!(f, "  [Edit] [Delete] [Upvote]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{BoardView, NoteCard, ADD_NOTE_PLACEHOLDER};
    use crate::model::vote::VoteTally;
    use crate::view::EditState;
    use chrono::NaiveDate;

    fn card(id: &str, author: Option<&str>) -> NoteCard {
        NoteCard {
            note_id: id.to_string(),
            author_name: author.map(str::to_string),
            date: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            text: format!("text of {id}"),
            votes: VoteTally {
                count: 2,
                points: 110,
            },
        }
    }

    #[test]
    fn renders_placeholder_cards_and_unknown_author() {
        let view = BoardView {
            title: "Notes for List list-1".to_string(),
            placeholder: ADD_NOTE_PLACEHOLDER,
            draft: String::new(),
            can_add: false,
            cards: vec![card("n1", Some("Author 1")), card("n2", None)],
            editing: EditState::Closed,
            error: None,
        };
        let text = view.to_string();
        assert!(text.starts_with("Notes for List list-1\n"));
        assert!(text.contains(ADD_NOTE_PLACEHOLDER));
        assert!(text.contains("no current user"));
        assert!(text.contains("- n1 | Author 1 | 2026-03-04 | votes: 2"));
        assert!(text.contains("- n2 | unknown author |"));
    }

    #[test]
    fn renders_edit_dialog_in_place_of_actions() {
        let view = BoardView {
            title: "Notes for List l".to_string(),
            placeholder: ADD_NOTE_PLACEHOLDER,
            draft: "typing".to_string(),
            can_add: true,
            cards: vec![card("n1", Some("A"))],
            editing: EditState::Editing {
                note_id: "n1".to_string(),
                draft: "new text".to_string(),
            },
            error: Some("note text cannot be empty".to_string()),
        };
        let text = view.to_string();
        assert!(text.contains("[ typing ] [Add Note]"));
        assert!(text.contains("editing: [ new text ]"));
        assert!(!text.contains("[Edit]"));
        assert!(text.contains("! note text cannot be empty"));
    }
}
