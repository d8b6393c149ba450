use orbitfile_core::{
    EngineConfig, EngineError, Operation, OperationId, OperationKind, OperationState,
    ProgressEvent,
};
use strum::IntoEnumIterator;

#[test]
fn test_operation_id_display() {
    let id = OperationId::new(7);
    assert_eq!(id.to_string(), "#7");
    assert_eq!(id, OperationId(7));
}

#[test]
fn test_new_operation_is_queued() {
    let op = Operation::new(OperationId::new(1), "photos", OperationKind::Compress, 12);

    assert_eq!(op.state, OperationState::Queued);
    assert_eq!(op.done, 0);
    assert_eq!(op.total, 12);
    assert_eq!(op.current_item, "photos");
    assert!(op.done_time.is_none());
    assert!(op.error_message.is_none());
    assert!(op.is_running());
}

#[test]
fn test_every_kind_has_verbs() {
    for kind in OperationKind::iter() {
        assert!(kind.verb().ends_with("ing"));
        assert!(kind.past_verb().ends_with("ed"));
    }
    assert!(OperationKind::TrashDelete.is_delete());
    assert!(OperationKind::PermanentDelete.is_delete());
    assert!(!OperationKind::Move.is_delete());
}

#[test]
fn test_progress_event_carries_id() {
    let mut op = Operation::new(OperationId::new(3), "a.zip", OperationKind::Extract, 1);
    let event = ProgressEvent::new(op.clone());
    assert_eq!(event.id, OperationId::new(3));
    assert!(!event.is_terminal());

    op.state = OperationState::Failed;
    assert!(ProgressEvent::new(op).is_terminal());
}

#[test]
fn test_config_from_toml() {
    let config: EngineConfig = toml::from_str(
        r#"
        channel_capacity = 20
        progress_watermark = 3
        use_trash = false
        removable_mount_prefixes = ["/srv/usb"]
        "#,
    )
    .unwrap();

    assert_eq!(config.channel_capacity, 20);
    assert_eq!(config.progress_watermark, 3);
    assert!(!config.use_trash);
    assert_eq!(config.removable_mount_prefixes.len(), 1);
    assert!(config.confirm_permanent_delete);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_validate_rejects_bad_watermark() {
    let config = EngineConfig {
        channel_capacity: 2,
        progress_watermark: 5,
        ..EngineConfig::default()
    };
    assert!(matches!(
        config.validate(),
        Err(EngineError::InvalidConfig { .. })
    ));
}
