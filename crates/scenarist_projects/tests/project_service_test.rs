//! Tests for project ownership, sharing and authorization.

use chrono::NaiveDate;
use scenarist_core::PermissionLevel;
use scenarist_error::AccessErrorKind;
use scenarist_interface::{AccessChange, ProjectStore};
use scenarist_projects::{InMemoryProjectStore, ProjectService};
use tempfile::TempDir;

fn service(root: &TempDir) -> ProjectService<InMemoryProjectStore> {
    ProjectService::new(InMemoryProjectStore::new(), root.path())
}

fn access_kind(err: &scenarist_error::ScenaristError) -> Option<&AccessErrorKind> {
    err.as_access().map(|e| &e.kind)
}

#[tokio::test]
async fn test_create_project_lays_out_folder_and_grants_owner() {
    let root = TempDir::new().unwrap();
    let service = service(&root);
    let owner = service.register_user("alice", "hash").await.unwrap();

    let project = service
        .create_project(owner.user_id, "Arctic convoys")
        .await
        .unwrap();

    let expected = root
        .path()
        .join(owner.user_id.to_string())
        .join(format!("proj_{}_Arctic_convoys", project.project_id));
    assert_eq!(std::path::Path::new(&project.file_path), expected);
    for dir in ["DB", "FACTS", "STRUCTURE", "SCENARIO"] {
        assert!(expected.join(dir).is_dir());
    }

    let grant = service
        .store()
        .get_access(project.project_id, owner.user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(grant.permission_level, PermissionLevel::Write);
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let root = TempDir::new().unwrap();
    let service = service(&root);
    service.register_user("alice", "hash").await.unwrap();

    let err = service.register_user("alice", "other").await.unwrap_err();
    assert_eq!(
        access_kind(&err),
        Some(&AccessErrorKind::UsernameTaken("alice".to_string()))
    );
}

#[tokio::test]
async fn test_create_project_for_unknown_owner() {
    let root = TempDir::new().unwrap();
    let service = service(&root);

    let err = service.create_project(99, "Topic").await.unwrap_err();
    assert!(matches!(
        access_kind(&err),
        Some(AccessErrorKind::UserNotFound(_))
    ));
}

#[tokio::test]
async fn test_access_levels_and_authorize() {
    let root = TempDir::new().unwrap();
    let service = service(&root);
    let owner = service.register_user("alice", "h").await.unwrap();
    let reader = service.register_user("bob", "h").await.unwrap();
    let stranger = service.register_user("carol", "h").await.unwrap();
    let project = service.create_project(owner.user_id, "Topic").await.unwrap();
    let id = project.project_id;

    service
        .share(id, owner.user_id, "bob", PermissionLevel::Read)
        .await
        .unwrap();

    assert_eq!(
        service.access_level(id, owner.user_id).await.unwrap(),
        Some(PermissionLevel::Write)
    );
    assert_eq!(
        service.access_level(id, reader.user_id).await.unwrap(),
        Some(PermissionLevel::Read)
    );
    assert_eq!(service.access_level(id, stranger.user_id).await.unwrap(), None);

    // Readers may read files but not run stages.
    service
        .authorize(id, reader.user_id, PermissionLevel::Read)
        .await
        .unwrap();
    let err = service
        .authorize(id, reader.user_id, PermissionLevel::Write)
        .await
        .unwrap_err();
    assert_eq!(
        access_kind(&err),
        Some(&AccessErrorKind::Denied {
            project_id: id,
            required: "WRITE".to_string()
        })
    );

    let err = service.get_project(id, stranger.user_id).await.unwrap_err();
    assert!(matches!(
        access_kind(&err),
        Some(AccessErrorKind::Denied { .. })
    ));

    let err = service.access_level(404, owner.user_id).await.unwrap_err();
    assert_eq!(access_kind(&err), Some(&AccessErrorKind::ProjectNotFound(404)));
}

#[tokio::test]
async fn test_share_creates_then_updates() {
    let root = TempDir::new().unwrap();
    let service = service(&root);
    let owner = service.register_user("alice", "h").await.unwrap();
    let bob = service.register_user("bob", "h").await.unwrap();
    let project = service.create_project(owner.user_id, "Topic").await.unwrap();

    let change = service
        .share(project.project_id, owner.user_id, "bob", PermissionLevel::Read)
        .await
        .unwrap();
    assert!(matches!(change, AccessChange::Created(_)));

    let change = service
        .share(project.project_id, owner.user_id, "bob", PermissionLevel::Write)
        .await
        .unwrap();
    assert!(matches!(change, AccessChange::Updated(_)));
    assert_eq!(change.record().user_id, bob.user_id);

    // Only the owner can share, even with WRITE access.
    let err = service
        .share(project.project_id, bob.user_id, "alice", PermissionLevel::Read)
        .await
        .unwrap_err();
    assert!(matches!(access_kind(&err), Some(AccessErrorKind::OwnerOnly(_))));

    let err = service
        .share(project.project_id, owner.user_id, "nobody", PermissionLevel::Read)
        .await
        .unwrap_err();
    assert_eq!(
        access_kind(&err),
        Some(&AccessErrorKind::UserNotFound("nobody".to_string()))
    );
}

#[tokio::test]
async fn test_list_accessible_deduplicates() {
    let root = TempDir::new().unwrap();
    let service = service(&root);
    let alice = service.register_user("alice", "h").await.unwrap();
    let bob = service.register_user("bob", "h").await.unwrap();

    let first = service.create_project(alice.user_id, "One").await.unwrap();
    let second = service.create_project(bob.user_id, "Two").await.unwrap();
    let third = service.create_project(alice.user_id, "Three").await.unwrap();
    service
        .share(second.project_id, bob.user_id, "alice", PermissionLevel::Read)
        .await
        .unwrap();

    // Alice owns 1 and 3 (with owner access rows) and was granted 2.
    let ids: Vec<i32> = service
        .list_accessible(alice.user_id)
        .await
        .unwrap()
        .iter()
        .map(|p| p.project_id)
        .collect();
    assert_eq!(ids, vec![first.project_id, second.project_id, third.project_id]);

    let ids: Vec<i32> = service
        .list_accessible(bob.user_id)
        .await
        .unwrap()
        .iter()
        .map(|p| p.project_id)
        .collect();
    assert_eq!(ids, vec![second.project_id]);
}

#[tokio::test]
async fn test_delete_project_owner_only() {
    let root = TempDir::new().unwrap();
    let service = service(&root);
    let owner = service.register_user("alice", "h").await.unwrap();
    let bob = service.register_user("bob", "h").await.unwrap();
    let project = service.create_project(owner.user_id, "Topic").await.unwrap();
    service
        .share(project.project_id, owner.user_id, "bob", PermissionLevel::Write)
        .await
        .unwrap();

    let err = service
        .delete_project(project.project_id, bob.user_id)
        .await
        .unwrap_err();
    assert!(matches!(access_kind(&err), Some(AccessErrorKind::OwnerOnly(_))));

    service
        .delete_project(project.project_id, owner.user_id)
        .await
        .unwrap();

    assert!(!std::path::Path::new(&project.file_path).exists());
    assert!(
        service
            .store()
            .get_project(project.project_id)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        service
            .store()
            .get_access(project.project_id, bob.user_id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_token_usage_per_day() {
    let root = TempDir::new().unwrap();
    let service = service(&root);
    let user = service.register_user("alice", "h").await.unwrap();
    let day1 = NaiveDate::from_ymd_opt(2025, 1, 14).unwrap();
    let day2 = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

    service.record_token_usage(user.user_id, 100, day1).await.unwrap();
    service.record_token_usage(user.user_id, 50, day1).await.unwrap();
    let usage = service.record_token_usage(user.user_id, 7, day2).await.unwrap();

    assert_eq!(usage.get("2025-01-14"), Some(&150));
    assert_eq!(usage.get("2025-01-15"), Some(&7));

    let stored = service
        .store()
        .get_user(user.user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.token_usage, usage);
}
