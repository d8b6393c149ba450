use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use orbitfile_core::{EngineConfig, EngineError, OperationKind, OperationState};
use orbitfile_ops::SecretString;
use orbitfile_tui::{Action, Dispatch, Engine};

fn engine(temp: &Path, removable: Vec<PathBuf>) -> Engine {
    let config = EngineConfig::builder()
        .removable_mount_prefixes(removable)
        .removable_mount_exclusions(Vec::<PathBuf>::new())
        .trash_dir(Some(temp.join(".Trash")))
        .confirm_permanent_delete(true)
        .build()
        .unwrap();
    Engine::new(config).unwrap()
}

fn touch(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[tokio::test]
async fn test_removable_delete_requires_confirmation() {
    let temp = TempDir::new().unwrap();
    let usb = temp.path().join("usb");
    let files = vec![usb.join("one.jpg"), usb.join("two.jpg")];
    for file in &files {
        touch(file, "img");
    }
    let mut engine = engine(temp.path(), vec![usb.clone()]);

    let outcome = engine
        .dispatch(Action::Delete { permanent: false }, &files, &usb)
        .unwrap();
    let Dispatch::NeedsConfirmation(request) = outcome else {
        panic!("expected a confirmation request, got {outcome:?}");
    };
    assert_eq!(request.action_kind, OperationKind::PermanentDelete);
    assert!(engine.registry().is_empty());
    assert!(files.iter().all(|f| f.exists()));

    let id = engine.confirm_pending().unwrap();
    engine.run_until_idle().await;

    let op = engine.registry().get(id).unwrap();
    assert_eq!(op.state, OperationState::Successful);
    assert_eq!(op.kind, OperationKind::PermanentDelete);
    assert_eq!(op.total, 2);
    assert_eq!(op.done, 2);
    assert!(files.iter().all(|f| !f.exists()));
    assert!(!temp.path().join(".Trash").exists());
}

#[tokio::test]
async fn test_cancelled_confirmation_deletes_nothing() {
    let temp = TempDir::new().unwrap();
    let usb = temp.path().join("usb");
    let file = usb.join("keep.txt");
    touch(&file, "keep");
    let mut engine = engine(temp.path(), vec![usb.clone()]);

    engine
        .dispatch(Action::Delete { permanent: false }, &[file.clone()], &usb)
        .unwrap();
    assert!(engine.pending_confirmation().is_some());
    assert!(engine.cancel_pending());

    assert!(engine.confirm_pending().is_none());
    assert!(engine.registry().is_empty());
    assert!(file.exists());
}

#[tokio::test]
async fn test_trash_delete_starts_immediately() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("home/notes.txt");
    touch(&file, "notes");
    let mut engine = engine(temp.path(), Vec::new());

    let outcome = engine
        .dispatch(Action::Delete { permanent: false }, &[file.clone()], temp.path())
        .unwrap();
    assert!(matches!(outcome, Dispatch::Started(_)));
    engine.run_until_idle().await;

    let op = engine.registry().iter().next().unwrap();
    assert_eq!(op.kind, OperationKind::TrashDelete);
    assert_eq!(op.state, OperationState::Successful);
    assert!(!file.exists());
    assert!(temp.path().join(".Trash/notes.txt").exists());
}

#[tokio::test]
async fn test_delete_without_trash_confirms_permanent_delete() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("home/draft.txt");
    touch(&file, "draft");
    let config = EngineConfig::builder()
        .removable_mount_prefixes(Vec::<PathBuf>::new())
        .removable_mount_exclusions(Vec::<PathBuf>::new())
        .trash_dir(Some(temp.path().join(".Trash")))
        .use_trash(false)
        .confirm_permanent_delete(true)
        .build()
        .unwrap();
    let mut engine = Engine::new(config).unwrap();
    assert!(!engine.config().use_trash);

    let outcome = engine
        .dispatch(Action::Delete { permanent: false }, &[file.clone()], temp.path())
        .unwrap();
    let Dispatch::NeedsConfirmation(request) = outcome else {
        panic!("expected a confirmation request, got {outcome:?}");
    };
    assert_eq!(request.action_kind, OperationKind::PermanentDelete);
    assert!(file.exists());

    let id = engine.confirm_pending().unwrap();
    engine.run_until_idle().await;

    assert_eq!(engine.registry().get(id).unwrap().state, OperationState::Successful);
    assert!(!file.exists());
    assert!(!temp.path().join(".Trash").exists());
}

#[tokio::test]
async fn test_permanent_delete_without_confirmation_starts_immediately() {
    let temp = TempDir::new().unwrap();
    let first = temp.path().join("home/one.txt");
    let second = temp.path().join("home/two.txt");
    touch(&first, "1");
    touch(&second, "2");
    let config = EngineConfig::builder()
        .removable_mount_prefixes(Vec::<PathBuf>::new())
        .removable_mount_exclusions(Vec::<PathBuf>::new())
        .trash_dir(Some(temp.path().join(".Trash")))
        .use_trash(false)
        .confirm_permanent_delete(false)
        .build()
        .unwrap();
    let mut engine = Engine::new(config).unwrap();

    // An explicit permanent delete and a trash delete with the trash disabled
    // both skip the dialog.
    for (file, permanent) in [(&first, true), (&second, false)] {
        let outcome = engine
            .dispatch(Action::Delete { permanent }, &[file.clone()], temp.path())
            .unwrap();
        assert!(matches!(outcome, Dispatch::Started(_)));
        assert!(engine.pending_confirmation().is_none());
    }
    engine.run_until_idle().await;

    assert_eq!(engine.registry().len(), 2);
    for op in engine.registry().iter() {
        assert_eq!(op.kind, OperationKind::PermanentDelete);
        assert_eq!(op.state, OperationState::Successful);
    }
    assert!(!first.exists());
    assert!(!second.exists());
    assert!(!temp.path().join(".Trash").exists());
}

#[tokio::test]
async fn test_copy_then_cut_paste() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("A");
    let b = temp.path().join("B");
    touch(&a.join("a.txt"), "a-new");
    touch(&a.join("b.txt"), "b-new");
    touch(&b.join("a.txt"), "a-old");
    let selection = vec![a.join("a.txt"), a.join("b.txt")];
    let mut engine = engine(temp.path(), Vec::new());

    assert_eq!(
        engine.dispatch(Action::Copy, &selection, &a).unwrap(),
        Dispatch::Clipboard
    );
    let Dispatch::Started(copy_id) = engine.dispatch(Action::Paste, &[], &b).unwrap() else {
        panic!("paste did not start");
    };
    engine.run_until_idle().await;

    let op = engine.registry().get(copy_id).unwrap();
    assert_eq!(op.state, OperationState::Successful);
    assert_eq!(op.done, 2);
    assert_eq!(fs::read_to_string(b.join("a.txt")).unwrap(), "a-old");
    assert_eq!(fs::read_to_string(b.join("a(1).txt")).unwrap(), "a-new");
    assert!(selection.iter().all(|p| p.exists()));
    // Copies stay on the clipboard for repeated pastes.
    assert_eq!(engine.clipboard().items(), selection.as_slice());

    let c = temp.path().join("C");
    fs::create_dir(&c).unwrap();
    engine.dispatch(Action::Cut, &selection, &a).unwrap();
    let Dispatch::Started(cut_id) = engine.dispatch(Action::Paste, &[], &c).unwrap() else {
        panic!("paste did not start");
    };
    engine.run_until_idle().await;

    let op = engine.registry().get(cut_id).unwrap();
    assert_eq!(op.kind, OperationKind::Move);
    assert_eq!(op.state, OperationState::Successful);
    assert!(selection.iter().all(|p| !p.exists()));
    assert_eq!(fs::read_to_string(c.join("b.txt")).unwrap(), "b-new");
    assert!(engine.clipboard().is_empty());
}

#[tokio::test]
async fn test_cut_paste_resolves_conflicts() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("A");
    let b = temp.path().join("B");
    touch(&a.join("a.txt"), "a-new");
    touch(&a.join("b.txt"), "b-new");
    touch(&b.join("a.txt"), "a-old");
    let selection = vec![a.join("a.txt"), a.join("b.txt")];
    let mut engine = engine(temp.path(), Vec::new());

    engine.dispatch(Action::Cut, &selection, &a).unwrap();
    let Dispatch::Started(id) = engine.dispatch(Action::Paste, &[], &b).unwrap() else {
        panic!("paste did not start");
    };
    engine.run_until_idle().await;

    let op = engine.registry().get(id).unwrap();
    assert_eq!(op.kind, OperationKind::Move);
    assert_eq!(op.state, OperationState::Successful);
    assert_eq!(op.done, 2);
    assert_eq!(fs::read_to_string(b.join("a.txt")).unwrap(), "a-old");
    assert_eq!(fs::read_to_string(b.join("a(1).txt")).unwrap(), "a-new");
    assert_eq!(fs::read_to_string(b.join("b.txt")).unwrap(), "b-new");
    assert!(selection.iter().all(|p| !p.exists()));
    assert!(engine.clipboard().is_empty());
}

#[tokio::test]
async fn test_cut_clipboard_survives_newer_copy() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("A");
    let b = temp.path().join("B");
    touch(&a.join("move.txt"), "m");
    touch(&a.join("other.txt"), "o");
    fs::create_dir(&b).unwrap();
    let mut engine = engine(temp.path(), Vec::new());

    engine.dispatch(Action::Cut, &[a.join("move.txt")], &a).unwrap();
    engine.dispatch(Action::Paste, &[], &b).unwrap();
    engine.dispatch(Action::Copy, &[a.join("other.txt")], &a).unwrap();
    engine.run_until_idle().await;

    assert!(b.join("move.txt").exists());
    assert_eq!(engine.clipboard().items(), [a.join("other.txt")]);
}

#[tokio::test]
async fn test_invalid_pastes_register_nothing() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("dir");
    fs::create_dir_all(dir.join("sub")).unwrap();
    let file = temp.path().join("file.txt");
    touch(&file, "f");
    let mut engine = engine(temp.path(), Vec::new());

    engine.dispatch(Action::Cut, &[file.clone()], temp.path()).unwrap();
    let err = engine.dispatch(Action::Paste, &[], temp.path()).unwrap_err();
    assert!(matches!(err, EngineError::InvalidPasteTarget { .. }));

    engine.dispatch(Action::Copy, &[dir.clone()], temp.path()).unwrap();
    let err = engine.dispatch(Action::Paste, &[], &dir.join("sub")).unwrap_err();
    assert!(matches!(err, EngineError::InvalidPasteTarget { .. }));

    let err = engine.dispatch(Action::Paste, &[], &file).unwrap_err();
    assert!(matches!(err, EngineError::NotADirectory { .. }));

    assert!(engine.registry().is_empty());
}

#[tokio::test]
async fn test_empty_inputs_are_ignored() {
    let temp = TempDir::new().unwrap();
    let mut engine = engine(temp.path(), Vec::new());

    assert_eq!(
        engine.dispatch(Action::Paste, &[], temp.path()).unwrap(),
        Dispatch::Ignored
    );
    assert_eq!(
        engine
            .dispatch(Action::Delete { permanent: true }, &[], temp.path())
            .unwrap(),
        Dispatch::Ignored
    );
    assert_eq!(
        engine.dispatch(Action::Compress, &[], temp.path()).unwrap(),
        Dispatch::Ignored
    );
    assert!(engine.registry().is_empty());
}

#[tokio::test]
async fn test_crypto_validation() {
    let temp = TempDir::new().unwrap();
    let plain = temp.path().join("plain.txt");
    touch(&plain, "p");
    let mut engine = engine(temp.path(), Vec::new());

    let err = engine
        .dispatch(
            Action::Decrypt {
                passphrase: SecretString::from("pw".to_string()),
            },
            &[plain.clone()],
            temp.path(),
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::WrongSuffix { .. }));

    let err = engine
        .dispatch(
            Action::Encrypt {
                passphrase: SecretString::from(String::new()),
            },
            &[plain],
            temp.path(),
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::MissingPassphrase));

    let err = engine
        .dispatch(Action::Extract, &[temp.path().join("notes.txt")], temp.path())
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
}

#[tokio::test]
async fn test_compress_and_extract_through_engine() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("project");
    touch(&project.join("src/lib.rs"), "pub fn x() {}");
    touch(&project.join("README.md"), "readme");
    let out = temp.path().join("out");
    fs::create_dir(&out).unwrap();
    let mut engine = engine(temp.path(), Vec::new());

    let Dispatch::Started(id) = engine
        .dispatch(Action::Compress, &[project.clone()], &out)
        .unwrap()
    else {
        panic!("compress did not start");
    };
    engine.run_until_idle().await;
    let op = engine.registry().get(id).unwrap();
    assert_eq!(op.state, OperationState::Successful);
    assert_eq!(op.total, 2);

    let archive = out.join("project.zip");
    assert!(archive.exists());
    engine.dispatch(Action::Extract, &[archive], &out).unwrap();
    engine.run_until_idle().await;

    assert_eq!(
        fs::read_to_string(out.join("project/project/src/lib.rs")).unwrap(),
        "pub fn x() {}"
    );
    assert_eq!(engine.registry().len(), 2);
    assert!(!engine.registry().has_running());
}
