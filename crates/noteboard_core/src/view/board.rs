use super::render::{BoardView, NoteCard, ADD_NOTE_PLACEHOLDER};
use crate::ledger::DocId;
use crate::model::note::Note;
use crate::model::person::Person;
use crate::model::vote::Vote;
use crate::repo::board_repo::{AuthorJoinKey, BoardRepository};
use crate::service::board_service::{AddedNote, BoardResult, BoardService, BoardServiceError};
use crate::service::seed_service::SeedPolicy;
use log::{debug, warn};

/// External inputs of the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardProps {
    pub list_id: DocId,
    pub current_user_id: DocId,
}

/// Behavior switches fixed for the board's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardOptions {
    pub join_key: AuthorJoinKey,
    pub seed_policy: SeedPolicy,
}

/// Edit dialog state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditState {
    #[default]
    Closed,
    Editing { note_id: DocId, draft: String },
}

struct FetchedNotes {
    list_id: DocId,
    revision: u64,
    cards: Vec<NoteCard>,
}

/// Note board for one list, acting on behalf of one current user.
pub struct NoteBoard<R: BoardRepository> {
    service: BoardService<R>,
    props: BoardProps,
    options: BoardOptions,
    draft: String,
    current_user: Option<Person>,
    loaded_user_id: Option<DocId>,
    edit: EditState,
    revision: u64,
    fetched: Option<FetchedNotes>,
    last_error: Option<String>,
}

impl<R: BoardRepository> NoteBoard<R> {
    pub fn new(service: BoardService<R>, props: BoardProps, options: BoardOptions) -> Self {
        Self {
            service,
            props,
            options,
            draft: String::new(),
            current_user: None,
            loaded_user_id: None,
            edit: EditState::Closed,
            revision: 0,
            fetched: None,
            last_error: None,
        }
    }

    /// Seeds the list (under `InitializeOnce`) and loads the current user.
    pub fn mount(&mut self) -> BoardResult<()> {
        let result = self.seed_once().and_then(|()| self.sync_current_user());
        self.track(result)
    }

    /// Applies new props, re-running only the effects whose inputs changed.
    pub fn set_props(&mut self, props: BoardProps) -> BoardResult<()> {
        let list_changed = props.list_id != self.props.list_id;
        self.props = props;
        let mut result = Ok(());
        if list_changed {
            self.fetched = None;
            self.edit = EditState::Closed;
            result = self.seed_once();
        }
        let result = result.and_then(|()| self.sync_current_user());
        self.track(result)
    }

    pub fn props(&self) -> &BoardProps {
        &self.props
    }

    pub fn service(&self) -> &BoardService<R> {
        &self.service
    }

    pub fn current_user(&self) -> Option<&Person> {
        self.current_user.as_ref()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    /// Data-change signal; bumps after every successful mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// "Add Note": creates a note from the draft for the current user.
    ///
    /// Returns `Ok(None)` without writing when no current user is loaded.
    /// The draft is cleared only on success.
    pub fn submit_draft(&mut self) -> BoardResult<Option<AddedNote>> {
        let Some(user) = self.current_user.clone() else {
            debug!("event=note_add module=view status=skipped reason=no_current_user");
            return Ok(None);
        };

        let result = self
            .service
            .add_note(&self.props.list_id, &user, &self.draft);
        let added = self.track(result)?;
        self.current_user = Some(added.author.clone());
        self.draft.clear();
        self.bump();
        Ok(Some(added))
    }

    /// Opens the edit dialog pre-filled with the note's current text.
    pub fn begin_edit(&mut self, note_id: &str) -> BoardResult<()> {
        let result = self.service.get_note(note_id);
        let note = self.track(result)?;
        self.edit = EditState::Editing {
            note_id: note_id.to_string(),
            draft: note.text,
        };
        Ok(())
    }

    /// Updates the dialog draft. Returns `false` when no dialog is open.
    pub fn update_edit_draft(&mut self, text: impl Into<String>) -> bool {
        match &mut self.edit {
            EditState::Editing { draft, .. } => {
                *draft = text.into();
                true
            }
            EditState::Closed => false,
        }
    }

    /// Saves the dialog draft; a blank draft keeps the old text.
    ///
    /// Returns `Ok(None)` when no dialog is open. The dialog stays open on
    /// failure.
    pub fn submit_edit(&mut self) -> BoardResult<Option<Note>> {
        let EditState::Editing { note_id, draft } = &self.edit else {
            return Ok(None);
        };

        let result = self.service.edit_note(note_id, Some(draft.as_str()));
        let note = self.track(result)?;
        self.edit = EditState::Closed;
        self.bump();
        Ok(Some(note))
    }

    /// Closes the dialog without writing.
    pub fn cancel_edit(&mut self) {
        self.edit = EditState::Closed;
    }

    pub fn delete(&mut self, note_id: &str) -> BoardResult<()> {
        let result = self.service.delete_note(note_id);
        self.track(result)?;
        if matches!(&self.edit, EditState::Editing { note_id: editing, .. } if editing == note_id)
        {
            self.edit = EditState::Closed;
        }
        self.bump();
        Ok(())
    }

    /// Upvotes a note as `props.current_user_id`.
    pub fn upvote(&mut self, note_id: &str) -> BoardResult<Vote> {
        let result = self
            .service
            .upvote(note_id, &self.props.current_user_id);
        let vote = self.track(result)?;
        self.bump();
        Ok(vote)
    }

    /// Produces the current view, re-fetching the note list when stale.
    ///
    /// Under `ReseedEveryRender` every call writes the baseline first.
    pub fn render(&mut self) -> BoardResult<BoardView> {
        if let Err(err) = self.refresh() {
            return Err(self.fail(err));
        }

        Ok(BoardView {
            title: format!("Notes for List {}", self.props.list_id),
            placeholder: ADD_NOTE_PLACEHOLDER,
            draft: self.draft.clone(),
            can_add: self.current_user.is_some(),
            cards: self
                .fetched
                .as_ref()
                .map(|fetched| fetched.cards.clone())
                .unwrap_or_default(),
            editing: self.edit.clone(),
            error: self.last_error.clone(),
        })
    }

    fn refresh(&mut self) -> BoardResult<()> {
        if self.options.seed_policy == SeedPolicy::ReseedEveryRender {
            let report = self
                .service
                .seed(&self.props.list_id, SeedPolicy::ReseedEveryRender)?;
            if report.wrote_anything() {
                self.bump();
            }
        }

        let fresh = self.fetched.as_ref().is_some_and(|fetched| {
            fetched.list_id == self.props.list_id && fetched.revision == self.revision
        });
        if fresh {
            return Ok(());
        }

        let rows = self
            .service
            .notes_for_list(&self.props.list_id, self.options.join_key)?;
        let mut cards = Vec::with_capacity(rows.items.len());
        for row in rows.items {
            let note_id = row.note.id.unwrap_or_default();
            let votes = self.service.vote_tally(&note_id)?;
            cards.push(NoteCard {
                note_id,
                author_name: row.author.map(|author| author.name),
                date: row.note.created_at.date_naive(),
                text: row.note.text,
                votes,
            });
        }
        debug!(
            "event=notes_fetch module=view status=ok list_id={} revision={} rows={}",
            self.props.list_id,
            self.revision,
            cards.len()
        );
        self.fetched = Some(FetchedNotes {
            list_id: self.props.list_id.clone(),
            revision: self.revision,
            cards,
        });
        Ok(())
    }

    fn seed_once(&mut self) -> BoardResult<()> {
        if self.options.seed_policy != SeedPolicy::InitializeOnce {
            return Ok(());
        }
        let report = self
            .service
            .seed(&self.props.list_id, SeedPolicy::InitializeOnce)?;
        if report.wrote_anything() {
            self.bump();
        }
        Ok(())
    }

    fn sync_current_user(&mut self) -> BoardResult<()> {
        if self.loaded_user_id.as_deref() == Some(self.props.current_user_id.as_str()) {
            return Ok(());
        }
        self.current_user = self
            .service
            .load_current_user(&self.props.current_user_id)?;
        self.loaded_user_id = Some(self.props.current_user_id.clone());
        debug!(
            "event=current_user_load module=view status=ok user_id={} found={}",
            self.props.current_user_id,
            self.current_user.is_some()
        );
        Ok(())
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    fn track<T>(&mut self, result: BoardResult<T>) -> BoardResult<T> {
        match result {
            Ok(value) => {
                self.last_error = None;
                Ok(value)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn fail(&mut self, err: BoardServiceError) -> BoardServiceError {
        warn!("event=board_action module=view status=error error={err}");
        self.last_error = Some(err.to_string());
        err
    }
}
