//! Role change integration tests: permission gate plus the two-phase write.

mod helpers;

use helpers::{both_records, memory_service, Community, FailingStore, RacingStore};
use reinos_roles::{DecisionReason, PermissionDecision, Role, RoleString};
use reinos_server::moderation::{ModerationError, ModerationService, RoleConsistency};
use reinos_server::store::{MemoryRoleStore, RoleRecord, StoreError};

#[tokio::test]
async fn test_guard_bans_traveller_and_both_records_follow() {
    let (service, users) = memory_service();

    let change = service
        .change_role(users.guard, users.traveller, Role::Banido, None)
        .await
        .unwrap();

    assert_eq!(change.actor_id, users.guard);
    assert_eq!(change.previous, Some(RoleString::from("Viajante")));
    assert_eq!(change.new, RoleString::from("Banido"));

    let (profile, metadata) = both_records(service.store(), users.traveller).await;
    assert_eq!(profile, Some(RoleString::from("Banido")));
    assert_eq!(metadata, Some(RoleString::from("Banido")));
}

#[tokio::test]
async fn test_guard_cannot_promote_to_admin() {
    let (service, users) = memory_service();

    let err = service
        .change_role(users.guard, users.traveller, Role::Admin, None)
        .await
        .unwrap_err();

    assert_eq!(err.code(), "ROLE_NOT_ASSIGNABLE");
    assert_eq!(
        err.decision(),
        Some(PermissionDecision::deny(DecisionReason::RoleNotAssignable))
    );

    // Nothing was written.
    let (profile, metadata) = both_records(service.store(), users.traveller).await;
    assert_eq!(profile, Some(RoleString::from("Viajante")));
    assert_eq!(metadata, Some(RoleString::from("Viajante")));
}

#[tokio::test]
async fn test_nobody_changes_autor() {
    let (service, users) = memory_service();

    for caller in [users.autor, users.admin, users.officer] {
        let err = service
            .change_role(caller, users.autor, Role::Viajante, None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "TARGET_IMMUNE");
    }
}

#[tokio::test]
async fn test_only_autor_changes_admin() {
    let (service, users) = memory_service();

    let err = service
        .change_role(users.officer, users.admin, Role::Cidadao, None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "TARGET_REQUIRES_AUTOR");

    let change = service
        .change_role(users.autor, users.admin, Role::OficialReal, None)
        .await
        .unwrap();
    assert_eq!(change.new, RoleString::from("Luminir"));
}

#[tokio::test]
async fn test_autor_role_is_never_assignable() {
    let (service, users) = memory_service();

    let err = service
        .change_role(users.autor, users.officer, Role::Autor, None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ROLE_NOT_ASSIGNABLE");
}

#[tokio::test]
async fn test_citizen_has_no_mutation_rights() {
    let (service, users) = memory_service();

    let err = service
        .change_role(users.citizen, users.traveller, Role::Cidadao, None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ROLE_NOT_ASSIGNABLE");

    let err = service
        .change_role(users.citizen, users.officer, Role::Banido, None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INSUFFICIENT_RANK");
}

#[tokio::test]
async fn test_kingdom_templating() {
    let (service, users) = memory_service();

    let change = service
        .change_role(users.officer, users.traveller, Role::Cidadao, Some("Norvik"))
        .await
        .unwrap();
    assert_eq!(change.new, RoleString::from("Cidadão de Norvik"));

    // Without an explicit kingdom the current one is kept.
    let change = service
        .change_role(users.officer, users.citizen, Role::Veterano, None)
        .await
        .unwrap();
    assert_eq!(change.new, RoleString::from("Veterano de Gápenver"));
}

#[tokio::test]
async fn test_metadata_failure_is_partial_update() {
    let memory = MemoryRoleStore::new();
    let users = Community::seed(&memory);
    let service = ModerationService::new(FailingStore::new(
        memory.clone(),
        RoleRecord::AuthMetadata,
    ));

    let err = service
        .change_role(users.guard, users.traveller, Role::Banido, None)
        .await
        .unwrap_err();

    assert_eq!(err.code(), "PARTIAL_UPDATE");
    match &err {
        ModerationError::PartialUpdate {
            user_id,
            written,
            failed,
            source,
        } => {
            assert_eq!(*user_id, users.traveller);
            assert_eq!(*written, RoleRecord::Profile);
            assert_eq!(*failed, RoleRecord::AuthMetadata);
            assert!(matches!(source, StoreError::Unavailable(_)));
        }
        other => panic!("expected PartialUpdate, got {other:?}"),
    }

    // Profile is authoritative and already changed; metadata is stale.
    let (profile, metadata) = both_records(&memory, users.traveller).await;
    assert_eq!(profile, Some(RoleString::from("Banido")));
    assert_eq!(metadata, Some(RoleString::from("Viajante")));

    // The divergence is visible and security relevant.
    let state = service.check_consistency(users.traveller).await.unwrap();
    assert!(state.is_rank_mismatch());
}

#[tokio::test]
async fn test_profile_failure_writes_nothing() {
    let memory = MemoryRoleStore::new();
    let users = Community::seed(&memory);
    let service = ModerationService::new(FailingStore::new(memory.clone(), RoleRecord::Profile));

    let err = service
        .change_role(users.guard, users.traveller, Role::Banido, None)
        .await
        .unwrap_err();

    assert_eq!(err.code(), "STORE_ERROR");
    let (profile, metadata) = both_records(&memory, users.traveller).await;
    assert_eq!(profile, Some(RoleString::from("Viajante")));
    assert_eq!(metadata, Some(RoleString::from("Viajante")));
}

#[tokio::test]
async fn test_resync_repairs_partial_update() {
    let memory = MemoryRoleStore::new();
    let users = Community::seed(&memory);

    let failing = ModerationService::new(FailingStore::new(
        memory.clone(),
        RoleRecord::AuthMetadata,
    ));
    let _ = failing
        .change_role(users.guard, users.traveller, Role::Banido, None)
        .await
        .unwrap_err();

    let service = ModerationService::new(memory);
    let resynced = service.resync_metadata(users.traveller).await.unwrap();
    assert_eq!(resynced, RoleString::from("Banido"));

    let state = service.check_consistency(users.traveller).await.unwrap();
    assert_eq!(
        state,
        RoleConsistency::InSync {
            role: Some(RoleString::from("Banido"))
        }
    );
}

#[tokio::test]
async fn test_role_is_read_from_profile_not_metadata() {
    let (service, users) = memory_service();

    // Stale metadata claims admin; the profile says traveller.
    service
        .store()
        .seed_record(users.traveller, RoleRecord::AuthMetadata, "Administrador");

    assert_eq!(
        service.resolve_role(users.traveller).await.unwrap(),
        Role::Viajante
    );
    let err = service
        .change_role(users.traveller, users.banned, Role::Viajante, None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ROLE_NOT_ASSIGNABLE");
}

#[tokio::test]
async fn test_concurrent_promotion_is_not_overwritten() {
    let memory = MemoryRoleStore::new();
    let users = Community::seed(&memory);

    // The traveller becomes admin between the check and the write.
    let service = ModerationService::new(RacingStore::new(
        memory.clone(),
        users.traveller,
        "Administrador",
    ));

    let err = service
        .change_role(users.guard, users.traveller, Role::Banido, None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "ROLE_CONFLICT");
    assert!(matches!(err, ModerationError::Store(StoreError::Conflict)));

    let (profile, metadata) = both_records(&memory, users.traveller).await;
    assert_eq!(profile, Some(RoleString::from("Administrador")));
    assert_eq!(metadata, Some(RoleString::from("Administrador")));

    // A fresh attempt sees the new role and is denied outright.
    let err = service
        .change_role(users.guard, users.traveller, Role::Banido, None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "TARGET_REQUIRES_AUTOR");
}
