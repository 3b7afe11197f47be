//! Ticket lifecycle tests against an in-memory database.

mod test_utils;

use chrono::{Datelike, Duration, Utc};
use sea_orm::{
    ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, Set,
};
use tempfile::TempDir;

use servyre_it::attachments::{AttachmentUpload, LocalAttachmentStore};
use servyre_it::error::ServiceError;
use servyre_it::models::{
    ChangeType, NotificationType, Role, notification, ticket, ticket_comment, ticket_history,
};
use servyre_it::services::comments::AddCommentInput;
use servyre_it::services::tickets::UpdateTicketInput;
use servyre_it::services::{
    AdminService, CommentService, NotificationService, ReportService, TicketService,
};

use test_utils::{create_user, setup_test_db, taxonomy, ticket_input};

const DOMAIN: &str = "servyre";

#[tokio::test]
async fn folios_increase_by_one_from_1000() {
    let db = setup_test_db().await.unwrap();
    let tax = taxonomy(&db).await.unwrap();
    let user = create_user(&db, Role::User, "Ana").await.unwrap();
    let service = TicketService::new(&db, DOMAIN);

    let first = service.create(&user, ticket_input(&tax, "Impresora")).await.unwrap();
    let second = service.create(&user, ticket_input(&tax, "Monitor")).await.unwrap();
    let third = service.create(&user, ticket_input(&tax, "Teclado")).await.unwrap();

    assert_eq!(first.folio, "SRV - 1000");
    assert_eq!(first.ticket_number, "TKT-SRV-1000");
    assert_eq!(second.folio, "SRV - 1001");
    assert_eq!(third.folio, "SRV - 1002");
}

#[tokio::test]
async fn new_ticket_starts_open_and_notifies_admins() {
    let db = setup_test_db().await.unwrap();
    let tax = taxonomy(&db).await.unwrap();
    let user = create_user(&db, Role::User, "Ana").await.unwrap();
    let admin = create_user(&db, Role::Admin, "Marta").await.unwrap();
    let service = TicketService::new(&db, DOMAIN);

    let created = service.create(&user, ticket_input(&tax, "Impresora")).await.unwrap();
    let ticket = service.get_by_id(&user, created.ticket_id).await.unwrap();
    assert_eq!(ticket.status_id, tax.open.id);
    assert!(ticket.resolved_at.is_none());

    let history = service.get_history(&user, ticket.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].change_type, ChangeType::Created);

    let unread = NotificationService::new(&db).get_unread(&admin).await.unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].kind, NotificationType::TicketCreated);
    assert_eq!(unread[0].ticket_id, Some(ticket.id));
}

#[tokio::test]
async fn non_corporate_email_is_rejected_before_any_write() {
    let db = setup_test_db().await.unwrap();
    let tax = taxonomy(&db).await.unwrap();
    let user = create_user(&db, Role::User, "Ana").await.unwrap();

    let mut input = ticket_input(&tax, "Impresora");
    input.user_email = "a@gmail.com".to_string();

    let err = TicketService::new(&db, DOMAIN)
        .create(&user, input)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::BadRequest(_)));
    assert_eq!(ticket::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(ticket_history::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn resolved_at_is_stamped_once_and_kept() {
    let db = setup_test_db().await.unwrap();
    let tax = taxonomy(&db).await.unwrap();
    let user = create_user(&db, Role::User, "Ana").await.unwrap();
    let tech = create_user(&db, Role::Technician, "Luis").await.unwrap();
    let service = TicketService::new(&db, DOMAIN);

    let created = service.create(&user, ticket_input(&tax, "Impresora")).await.unwrap();

    let resolved = service
        .update(
            &tech,
            created.ticket_id,
            UpdateTicketInput {
                status_id: Some(tax.resolved.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let stamp = resolved.resolved_at.expect("resolved_at set");

    let closed = service
        .update(
            &tech,
            created.ticket_id,
            UpdateTicketInput {
                status_id: Some(tax.closed.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(closed.status_id, tax.closed.id);
    assert_eq!(closed.resolved_at, Some(stamp));

    let unread = NotificationService::new(&db).get_unread(&user).await.unwrap();
    assert!(unread.iter().any(|n| n.kind == NotificationType::TicketResolved));
}

#[tokio::test]
async fn update_writes_one_history_entry_per_changed_field() {
    let db = setup_test_db().await.unwrap();
    let tax = taxonomy(&db).await.unwrap();
    let user = create_user(&db, Role::User, "Ana").await.unwrap();
    let tech = create_user(&db, Role::Technician, "Luis").await.unwrap();
    let service = TicketService::new(&db, DOMAIN);

    let created = service.create(&user, ticket_input(&tax, "Impresora")).await.unwrap();
    service
        .update(
            &tech,
            created.ticket_id,
            UpdateTicketInput {
                status_id: Some(tax.in_progress.id),
                priority_id: Some(tax.priority.id),
                assigned_to_user_id: Some(tech.id),
                technical_report: Some("Se reemplazó el fusor".to_string()),
                resolution_notes: None,
            },
        )
        .await
        .unwrap();

    let history = service.get_history(&tech, created.ticket_id).await.unwrap();
    let kinds: Vec<ChangeType> = history.iter().map(|h| h.change_type).collect();
    // Priority is unchanged, so only status, assignment and report are recorded
    assert_eq!(
        kinds,
        vec![
            ChangeType::Created,
            ChangeType::StatusChanged,
            ChangeType::Assigned,
            ChangeType::Other
        ]
    );

    let assigned = NotificationService::new(&db).get_unread(&tech).await.unwrap();
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].kind, NotificationType::TicketAssigned);
}

#[tokio::test]
async fn update_without_changes_still_notifies_creator() {
    let db = setup_test_db().await.unwrap();
    let tax = taxonomy(&db).await.unwrap();
    let user = create_user(&db, Role::User, "Ana").await.unwrap();
    let tech = create_user(&db, Role::Technician, "Luis").await.unwrap();
    let service = TicketService::new(&db, DOMAIN);

    let created = service.create(&user, ticket_input(&tax, "Impresora")).await.unwrap();
    let before = service.get_by_id(&user, created.ticket_id).await.unwrap();

    let updated = service
        .update(
            &tech,
            created.ticket_id,
            UpdateTicketInput {
                status_id: Some(tax.open.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status_id, tax.open.id);
    assert!(updated.updated_at >= before.updated_at);

    let history = service.get_history(&user, created.ticket_id).await.unwrap();
    assert_eq!(history.len(), 1);

    let unread = NotificationService::new(&db).get_unread(&user).await.unwrap();
    assert_eq!(unread.len(), 1);
    assert_eq!(unread[0].kind, NotificationType::TicketStatusChanged);
    assert_eq!(unread[0].ticket_id, Some(created.ticket_id));
}

#[tokio::test]
async fn marking_one_notification_read_is_scoped_to_its_owner() {
    let db = setup_test_db().await.unwrap();
    let tax = taxonomy(&db).await.unwrap();
    let user = create_user(&db, Role::User, "Ana").await.unwrap();
    let admin = create_user(&db, Role::Admin, "Marta").await.unwrap();
    let service = TicketService::new(&db, DOMAIN);
    let notifications = NotificationService::new(&db);

    service.create(&user, ticket_input(&tax, "Impresora")).await.unwrap();
    service.create(&user, ticket_input(&tax, "Monitor")).await.unwrap();

    let unread = notifications.get_unread(&admin).await.unwrap();
    assert_eq!(unread.len(), 2);
    let target = unread[0].id;

    assert!(matches!(
        notifications.mark_as_read(&user, target).await.unwrap_err(),
        ServiceError::NotFound(_)
    ));
    assert_eq!(notifications.get_unread(&admin).await.unwrap().len(), 2);

    notifications.mark_as_read(&admin, target).await.unwrap();
    let remaining = notifications.get_unread(&admin).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert!(remaining.iter().all(|n| n.id != target));

    assert!(matches!(
        notifications.mark_as_read(&admin, 9999).await.unwrap_err(),
        ServiceError::NotFound(_)
    ));
}

#[tokio::test]
async fn ticket_lists_carry_creator_name_and_comment_count() {
    let db = setup_test_db().await.unwrap();
    let tax = taxonomy(&db).await.unwrap();
    let user = create_user(&db, Role::User, "Ana Torres").await.unwrap();
    let tech = create_user(&db, Role::Technician, "Luis").await.unwrap();
    let uploads = TempDir::new().unwrap();
    let store = LocalAttachmentStore::new(uploads.path(), 1024);
    let service = TicketService::new(&db, DOMAIN);

    let commented = service.create(&user, ticket_input(&tax, "Impresora")).await.unwrap();
    let quiet = service.create(&user, ticket_input(&tax, "Monitor")).await.unwrap();

    let comments = CommentService::new(&db, &store);
    for (author, text) in [(&user, "Sigue fallando"), (&tech, "Voy para allá")] {
        comments
            .add_comment(
                author,
                commented.ticket_id,
                AddCommentInput {
                    content: Some(text.to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    let all = service.list_all(&tech).await.unwrap();
    assert_eq!(all.len(), 2);
    let find = |id: i32| all.iter().find(|item| item.ticket.id == id).unwrap();
    assert_eq!(find(commented.ticket_id).comment_count, 2);
    assert_eq!(find(quiet.ticket_id).comment_count, 0);
    assert!(all
        .iter()
        .all(|item| item.creator_name.as_deref() == Some("Ana Torres")));

    let mine = service.list_mine(&user).await.unwrap();
    assert_eq!(mine.len(), 2);
    assert!(service.list_mine(&tech).await.unwrap().is_empty());
}

#[tokio::test]
async fn users_cannot_triage_or_see_other_tickets() {
    let db = setup_test_db().await.unwrap();
    let tax = taxonomy(&db).await.unwrap();
    let owner = create_user(&db, Role::User, "Ana").await.unwrap();
    let other = create_user(&db, Role::User, "Pedro").await.unwrap();
    let service = TicketService::new(&db, DOMAIN);

    let created = service.create(&owner, ticket_input(&tax, "Impresora")).await.unwrap();

    let err = service
        .update(&owner, created.ticket_id, UpdateTicketInput::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let err = service.get_by_id(&other, created.ticket_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
    assert!(service.get_history(&other, created.ticket_id).await.unwrap().is_empty());
    assert!(service.list_mine(&other).await.unwrap().is_empty());
    assert!(matches!(
        service.list_all(&other).await.unwrap_err(),
        ServiceError::Forbidden(_)
    ));
}

#[tokio::test]
async fn internal_comments_are_staff_only() {
    let db = setup_test_db().await.unwrap();
    let tax = taxonomy(&db).await.unwrap();
    let owner = create_user(&db, Role::User, "Ana").await.unwrap();
    let other = create_user(&db, Role::User, "Pedro").await.unwrap();
    let tech = create_user(&db, Role::Technician, "Luis").await.unwrap();
    let uploads = TempDir::new().unwrap();
    let store = LocalAttachmentStore::new(uploads.path(), 1024 * 1024);

    let created = TicketService::new(&db, DOMAIN)
        .create(&owner, ticket_input(&tax, "Impresora"))
        .await
        .unwrap();
    let comments = CommentService::new(&db, &store);

    let err = comments
        .add_comment(
            &owner,
            created.ticket_id,
            AddCommentInput {
                content: Some("Nota privada".to_string()),
                is_internal: true,
                attachment: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    comments
        .add_comment(
            &tech,
            created.ticket_id,
            AddCommentInput {
                content: Some("Revisar garantía".to_string()),
                is_internal: true,
                attachment: None,
            },
        )
        .await
        .unwrap();
    comments
        .add_comment(
            &tech,
            created.ticket_id,
            AddCommentInput {
                content: Some("Vamos en camino".to_string()),
                is_internal: false,
                attachment: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(comments.get_comments(&tech, created.ticket_id).await.unwrap().len(), 2);
    let visible = comments.get_comments(&owner, created.ticket_id).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].content, "Vamos en camino");
    assert_eq!(visible[0].author_role, Some(Role::Technician));
    assert!(comments.get_comments(&other, created.ticket_id).await.unwrap().is_empty());

    // Only the public comment reaches the owner
    let unread = NotificationService::new(&db).get_unread(&owner).await.unwrap();
    assert_eq!(
        unread
            .iter()
            .filter(|n| n.kind == NotificationType::CommentAdded)
            .count(),
        1
    );
}

#[tokio::test]
async fn attachment_comment_records_comment_history() {
    use base64::Engine;

    let db = setup_test_db().await.unwrap();
    let tax = taxonomy(&db).await.unwrap();
    let owner = create_user(&db, Role::User, "Ana").await.unwrap();
    let uploads = TempDir::new().unwrap();
    let store = LocalAttachmentStore::new(uploads.path(), 1024 * 1024);

    let created = TicketService::new(&db, DOMAIN)
        .create(&owner, ticket_input(&tax, "Impresora"))
        .await
        .unwrap();

    CommentService::new(&db, &store)
        .add_comment(
            &owner,
            created.ticket_id,
            AddCommentInput {
                content: None,
                is_internal: false,
                attachment: Some(AttachmentUpload {
                    name: "error log.txt".to_string(),
                    base64: base64::engine::general_purpose::STANDARD.encode(b"paper jam"),
                }),
            },
        )
        .await
        .unwrap();

    let thread = CommentService::new(&db, &store)
        .get_comments(&owner, created.ticket_id)
        .await
        .unwrap();
    let url = thread[0].attachment_url.clone().unwrap();
    assert!(url.starts_with("/uploads/"));
    assert_eq!(thread[0].attachment_name.as_deref(), Some("error log.txt"));
    assert_eq!(std::fs::read_dir(uploads.path()).unwrap().count(), 1);

    let history = TicketService::new(&db, DOMAIN)
        .get_history(&owner, created.ticket_id)
        .await
        .unwrap();
    let kinds: Vec<ChangeType> = history.iter().map(|h| h.change_type).collect();
    assert_eq!(kinds, vec![ChangeType::Created, ChangeType::CommentAdded]);
    let entry = history.last().unwrap();
    assert_eq!(entry.description.as_deref(), Some("Comentario con archivo adjunto"));
    assert_eq!(entry.new_value.as_deref(), Some("error log.txt"));

    // Text can be cleared from a comment that still carries its file
    let admin = create_user(&db, Role::Admin, "Marta").await.unwrap();
    let edited = CommentService::new(&db, &store)
        .update_comment(&admin, thread[0].id, "   ".to_string())
        .await
        .unwrap();
    assert_eq!(edited.content, "");
    assert!(edited.attachment_url.is_some());
}

#[tokio::test]
async fn delete_admin_removes_every_dependent_row() {
    let db = setup_test_db().await.unwrap();
    let tax = taxonomy(&db).await.unwrap();
    let owner = create_user(&db, Role::User, "Ana").await.unwrap();
    let admin = create_user(&db, Role::Admin, "Marta").await.unwrap();
    let uploads = TempDir::new().unwrap();
    let store = LocalAttachmentStore::new(uploads.path(), 1024);
    let service = TicketService::new(&db, DOMAIN);

    let created = service.create(&owner, ticket_input(&tax, "Impresora")).await.unwrap();
    CommentService::new(&db, &store)
        .add_comment(
            &admin,
            created.ticket_id,
            AddCommentInput {
                content: Some("Revisado".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(matches!(
        service.delete_admin(&owner, created.ticket_id).await.unwrap_err(),
        ServiceError::Forbidden(_)
    ));
    service.delete_admin(&admin, created.ticket_id).await.unwrap();

    let id = created.ticket_id;
    assert_eq!(ticket::Entity::find_by_id(id).count(&db).await.unwrap(), 0);
    assert_eq!(
        ticket_comment::Entity::find()
            .filter(ticket_comment::Column::TicketId.eq(id))
            .count(&db)
            .await
            .unwrap(),
        0
    );
    assert_eq!(
        ticket_history::Entity::find()
            .filter(ticket_history::Column::TicketId.eq(id))
            .count(&db)
            .await
            .unwrap(),
        0
    );
    assert_eq!(
        notification::Entity::find()
            .filter(notification::Column::TicketId.eq(id))
            .count(&db)
            .await
            .unwrap(),
        0
    );

    assert!(matches!(
        service.delete_admin(&admin, id).await.unwrap_err(),
        ServiceError::NotFound(_)
    ));
}

#[tokio::test]
async fn monthly_report_and_dashboard_figures() {
    let db = setup_test_db().await.unwrap();
    let tax = taxonomy(&db).await.unwrap();
    let owner = create_user(&db, Role::User, "Ana").await.unwrap();
    let tech = create_user(&db, Role::Technician, "Luis").await.unwrap();
    let admin = create_user(&db, Role::Admin, "Marta").await.unwrap();
    let service = TicketService::new(&db, DOMAIN);

    let mut ids = Vec::new();
    for title in ["Impresora", "Monitor", "Teclado"] {
        ids.push(service.create(&owner, ticket_input(&tax, title)).await.unwrap().ticket_id);
    }

    // Pin timestamps: resolved after 2h and 4h, third left open
    let created_at = Utc::now() - Duration::hours(5);
    for (id, hours) in [(ids[0], Some(2)), (ids[1], Some(4)), (ids[2], None)] {
        let row = ticket::Entity::find_by_id(id).one(&db).await.unwrap().unwrap();
        let mut active = row.into_active_model();
        active.created_at = Set(created_at);
        active.assigned_to_user_id = Set(Some(tech.id));
        if let Some(hours) = hours {
            active.status_id = Set(tax.resolved.id);
            active.resolved_at = Set(Some(created_at + Duration::hours(hours)));
        }
        ticket::Entity::update(active).exec(&db).await.unwrap();
    }

    let reports = ReportService::new(&db);
    let data = reports
        .report_data(&admin, created_at.month(), created_at.year())
        .await
        .unwrap();
    assert_eq!(data.total_tickets, 3);
    assert_eq!(data.resolved_tickets, 2);
    assert_eq!(data.open_tickets, 1);
    assert_eq!(data.average_resolution_time, "3.00");
    assert_eq!(data.resolution_rate, "66.67");
    assert_eq!(data.top_technicians.len(), 1);
    assert_eq!(data.top_technicians[0].tickets_resolved, 2);

    assert!(matches!(
        reports
            .report_data(&tech, created_at.month(), created_at.year())
            .await
            .unwrap_err(),
        ServiceError::Forbidden(_)
    ));
    assert!(matches!(
        reports.report_data(&admin, 13, 2025).await.unwrap_err(),
        ServiceError::BadRequest(_)
    ));

    let pdf = reports
        .generate(&admin, created_at.month(), created_at.year())
        .await
        .unwrap();
    assert!(pdf.bytes.starts_with(b"%PDF-1.4"));
    assert_eq!(
        pdf.file_name,
        format!("reporte-tickets-{}-{}.pdf", created_at.month(), created_at.year())
    );

    let stats = AdminService::new(&db).dashboard_stats(&admin).await.unwrap();
    assert_eq!(stats.total_tickets, 3);
    assert_eq!(stats.open_tickets, 1);
    assert_eq!(stats.resolved_tickets, 2);
    assert_eq!(stats.resolution_rate, "66.67");
}

#[tokio::test]
async fn admin_overwrite_and_comment_moderation() {
    use servyre_it::services::tickets::AdminUpdateTicketInput;

    let db = setup_test_db().await.unwrap();
    let tax = taxonomy(&db).await.unwrap();
    let owner = create_user(&db, Role::User, "Ana").await.unwrap();
    let tech = create_user(&db, Role::Technician, "Luis").await.unwrap();
    let admin = create_user(&db, Role::Admin, "Marta").await.unwrap();
    let uploads = TempDir::new().unwrap();
    let store = LocalAttachmentStore::new(uploads.path(), 1024);
    let service = TicketService::new(&db, DOMAIN);

    let created = service.create(&owner, ticket_input(&tax, "Impresora")).await.unwrap();
    let notifications_before = notification::Entity::find().count(&db).await.unwrap();

    let overwrite = AdminUpdateTicketInput {
        title: "  Impresora del piso 2  ".to_string(),
        description: "Atasco de papel recurrente".to_string(),
        status_id: tax.in_progress.id,
        priority_id: tax.priority.id,
        category_id: tax.category.id,
    };
    assert!(matches!(
        service
            .admin_update(&tech, created.ticket_id, overwrite.clone())
            .await
            .unwrap_err(),
        ServiceError::Forbidden(_)
    ));

    let updated = service
        .admin_update(&admin, created.ticket_id, overwrite.clone())
        .await
        .unwrap();
    assert_eq!(updated.title, "Impresora del piso 2");
    assert_eq!(updated.status_id, tax.in_progress.id);

    let history = service.get_history(&admin, created.ticket_id).await.unwrap();
    let last = history.last().unwrap();
    assert_eq!(last.change_type, ChangeType::Update);
    assert_eq!(last.field_name, "admin_update");
    assert_eq!(
        notification::Entity::find().count(&db).await.unwrap(),
        notifications_before
    );

    assert!(matches!(
        service
            .admin_update(
                &admin,
                created.ticket_id,
                AdminUpdateTicketInput {
                    status_id: 9999,
                    ..overwrite
                },
            )
            .await
            .unwrap_err(),
        ServiceError::BadRequest(_)
    ));

    let comments = CommentService::new(&db, &store);
    let comment = comments
        .add_comment(
            &owner,
            created.ticket_id,
            AddCommentInput {
                content: Some("Sigue fallando".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(matches!(
        comments
            .update_comment(&owner, comment.comment_id, "editado".to_string())
            .await
            .unwrap_err(),
        ServiceError::Forbidden(_)
    ));
    let edited = comments
        .update_comment(&admin, comment.comment_id, " Sigue fallando tras reinicio ".to_string())
        .await
        .unwrap();
    assert_eq!(edited.content, "Sigue fallando tras reinicio");
    assert_eq!(edited.author_role, Some(Role::User));

    assert!(matches!(
        comments
            .update_comment(&admin, comment.comment_id, "   ".to_string())
            .await
            .unwrap_err(),
        ServiceError::BadRequest(_)
    ));
    let thread = comments.get_comments(&admin, created.ticket_id).await.unwrap();
    assert_eq!(thread[0].content, "Sigue fallando tras reinicio");

    comments.delete_comment(&admin, comment.comment_id).await.unwrap();
    assert!(comments.get_comments(&admin, created.ticket_id).await.unwrap().is_empty());
    assert!(matches!(
        comments.delete_comment(&admin, comment.comment_id).await.unwrap_err(),
        ServiceError::NotFound(_)
    ));
}

#[tokio::test]
async fn admins_cannot_lock_themselves_out() {
    use servyre_it::services::admin::UpdateUserInput;

    let db = setup_test_db().await.unwrap();
    let admin = create_user(&db, Role::Admin, "Marta").await.unwrap();
    let tech = create_user(&db, Role::Technician, "Luis").await.unwrap();
    let service = AdminService::new(&db);

    for input in [
        UpdateUserInput {
            is_active: Some(false),
            ..Default::default()
        },
        UpdateUserInput {
            role: Some(Role::Technician),
            ..Default::default()
        },
    ] {
        assert!(matches!(
            service.update_user(&admin, admin.id, input).await.unwrap_err(),
            ServiceError::BadRequest(_)
        ));
    }
    assert!(matches!(
        service.delete_user(&admin, admin.id).await.unwrap_err(),
        ServiceError::BadRequest(_)
    ));

    let renamed = service
        .update_user(
            &admin,
            admin.id,
            UpdateUserInput {
                name: Some("Marta Ruiz".to_string()),
                role: Some(Role::Admin),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name.as_deref(), Some("Marta Ruiz"));
    assert!(renamed.is_active);
    assert_eq!(renamed.role, Role::Admin);

    let demoted = service
        .update_user(
            &admin,
            tech.id,
            UpdateUserInput {
                is_active: Some(false),
                role: Some(Role::User),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!demoted.is_active);
    assert_eq!(demoted.role, Role::User);
}
