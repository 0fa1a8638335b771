use noteboard_core::db::open_db_in_memory;
use noteboard_core::service::seed_service::{
    seed_note_id, SEED_AUTHOR_ID, SEED_AUTHOR_NAME, SEED_AUTHOR_POINTS, SEED_NOTE_TEXT,
};
use noteboard_core::{
    BoardOptions, BoardProps, BoardRepository, BoardService, Ledger, NoteBoard, SeedPolicy,
    SqliteBoardRepository,
};

fn props(list_id: &str) -> BoardProps {
    BoardProps {
        list_id: list_id.to_string(),
        current_user_id: SEED_AUTHOR_ID.to_string(),
    }
}

#[test]
fn initialize_once_writes_baseline_exactly_once() {
    let mut conn = open_db_in_memory().unwrap();
    let service = BoardService::new(SqliteBoardRepository::try_new(&mut conn).unwrap());

    let first = service.seed("list-1", SeedPolicy::InitializeOnce).unwrap();
    assert!(first.note_written && first.person_written && first.list_written);
    let second = service.seed("list-1", SeedPolicy::InitializeOnce).unwrap();
    assert!(!second.wrote_anything());

    let repo = service.repo();
    let notes = repo.list_notes("list-1").unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id.as_deref(), Some(seed_note_id("list-1").as_str()));
    assert_eq!(notes[0].text, SEED_NOTE_TEXT);
    assert_eq!(notes[0].author_id, SEED_AUTHOR_ID);

    let author = repo.get_person(SEED_AUTHOR_ID).unwrap().unwrap();
    assert_eq!(author.name, SEED_AUTHOR_NAME);
    assert_eq!(author.points, SEED_AUTHOR_POINTS);
    assert_eq!(repo.get_list("list-1").unwrap().unwrap().name, "List list-1");
}

#[test]
fn initialize_once_never_resets_earned_points() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = BoardService::new(SqliteBoardRepository::try_new(&mut conn).unwrap());
    service.seed("list-1", SeedPolicy::InitializeOnce).unwrap();
    let author = service.load_current_user(SEED_AUTHOR_ID).unwrap().unwrap();
    service.add_note("list-1", &author, "earned").unwrap();

    service.seed("list-1", SeedPolicy::InitializeOnce).unwrap();
    service.seed("list-2", SeedPolicy::InitializeOnce).unwrap();

    assert_eq!(service.current_user_points(SEED_AUTHOR_ID).unwrap(), 55);
    assert_eq!(service.repo().list_notes("list-2").unwrap().len(), 1);
}

#[test]
fn reseed_every_render_duplicates_seed_note_per_render() {
    let mut conn = open_db_in_memory().unwrap();
    let options = BoardOptions {
        seed_policy: SeedPolicy::ReseedEveryRender,
        ..BoardOptions::default()
    };
    let mut board = NoteBoard::new(
        BoardService::new(SqliteBoardRepository::try_new(&mut conn).unwrap()),
        props("list-1"),
        options,
    );
    board.mount().unwrap();

    let renders = 3;
    let mut last = None;
    for _ in 0..renders {
        last = Some(board.render().unwrap());
    }
    assert_eq!(last.unwrap().cards.len(), renders);

    let repo = board.service().repo();
    let seed_notes = repo
        .list_notes("list-1")
        .unwrap()
        .into_iter()
        .filter(|note| note.text == SEED_NOTE_TEXT)
        .count();
    assert_eq!(seed_notes, renders);
    drop(board);

    assert_eq!(Ledger::open(&conn, "peopleDB").len().unwrap(), 1);
    assert_eq!(Ledger::open(&conn, "listDB").len().unwrap(), 1);
}

#[test]
fn reseed_every_render_resets_seed_author_points() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = BoardService::new(SqliteBoardRepository::try_new(&mut conn).unwrap());
    service.seed("list-1", SeedPolicy::ReseedEveryRender).unwrap();
    let author = service.load_current_user(SEED_AUTHOR_ID).unwrap().unwrap();
    service.add_note("list-1", &author, "earned").unwrap();
    assert_eq!(service.current_user_points(SEED_AUTHOR_ID).unwrap(), 55);

    service.seed("list-1", SeedPolicy::ReseedEveryRender).unwrap();
    assert_eq!(
        service.current_user_points(SEED_AUTHOR_ID).unwrap(),
        SEED_AUTHOR_POINTS
    );
}
