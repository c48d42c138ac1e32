// Backend-agnostic integration tests for the store traits.
//
// Each public async function is generic over the store so that the same
// assertions can be run against any backend that implements both traits.

use chrono::{Duration, Utc};

use catalog_core::attachment::{
    AttachmentFields, AttachmentFilter, AttachmentKind, UpsertAttachment, WorkflowStatus,
};
use catalog_core::locale::LocalizedMap;
use catalog_core::product::{CreateProduct, Product, PRODUCT_OWNER_TYPE};
use catalog_db::{AttachmentStore, DbError, ProductStore};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn make_product<D: ProductStore>(db: &D, code: &str) -> Product {
    db.create_product(&CreateProduct {
        tenant_id: 1,
        group_id: 30,
        external_reference_code: Some(code.to_string()),
        name: code.to_string(),
    })
    .await
    .unwrap()
}

fn make_fields(kind: AttachmentKind) -> AttachmentFields {
    let now = Utc::now();
    AttachmentFields {
        kind,
        file_id: None,
        display_date: now,
        expiration_date: Some(now + Duration::days(30)),
        title: LocalizedMap::new(),
        options: String::new(),
        priority: 0.0,
    }
}

fn make_upsert(product: &Product, code: Option<&str>, kind: AttachmentKind) -> UpsertAttachment {
    UpsertAttachment {
        tenant_id: product.tenant_id,
        group_id: product.group_id,
        owner_type: PRODUCT_OWNER_TYPE.to_string(),
        owner_id: product.id,
        external_reference_code: code.map(String::from),
        fields: make_fields(kind),
    }
}

fn approved(product: &Product, kind: AttachmentKind) -> AttachmentFilter {
    AttachmentFilter {
        owner_type: PRODUCT_OWNER_TYPE.to_string(),
        owner_id: product.id,
        kind,
        status: WorkflowStatus::Approved,
    }
}

// ---------------------------------------------------------------------------
// Product tests
// ---------------------------------------------------------------------------

/// Create a product and find it again by id and by reference code.
pub async fn test_product_lookup<D: ProductStore>(db: &D) {
    let p = make_product(db, "CHAIR-1").await;
    assert_eq!(db.get_product(p.id).await.unwrap().id, p.id);

    let by_code = db
        .fetch_product_by_reference_code(1, "CHAIR-1")
        .await
        .unwrap();
    assert_eq!(by_code.map(|p| p.id), Some(p.id));

    assert!(db
        .fetch_product_by_reference_code(1, "missing")
        .await
        .unwrap()
        .is_none());
    assert!(matches!(
        db.get_product(p.id + 100).await.unwrap_err(),
        DbError::NotFound(_)
    ));
}

// ---------------------------------------------------------------------------
// Attachment tests
// ---------------------------------------------------------------------------

/// Upsert, fetch both ways, update, delete.
pub async fn test_attachment_lifecycle<D: AttachmentStore + ProductStore>(db: &D) {
    let p = make_product(db, "CHAIR-2").await;

    let created = db
        .upsert_attachment(&make_upsert(&p, Some("CHAIR-2-FRONT"), AttachmentKind::Image))
        .await
        .unwrap();
    assert_eq!(created.owner_id, p.id);
    assert_eq!(created.group_id, p.group_id);

    let by_pk = db.get_attachment(created.id).await.unwrap();
    assert_eq!(by_pk.id, created.id);

    let by_code = db
        .fetch_attachment_by_reference_code(1, "CHAIR-2-FRONT")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_code.id, created.id);

    let mut fields = make_fields(AttachmentKind::Image);
    fields.priority = 7.0;
    fields.options = r#"{"zoom":2}"#.into();
    let updated = db.update_attachment(created.id, &fields).await.unwrap();
    assert_eq!(updated.priority, 7.0);
    assert_eq!(updated.options, r#"{"zoom":2}"#);

    db.delete_attachment(created.id).await.unwrap();
    assert!(matches!(
        db.get_attachment(created.id).await.unwrap_err(),
        DbError::NotFound(_)
    ));
    assert!(db
        .fetch_attachment_by_reference_code(1, "CHAIR-2-FRONT")
        .await
        .unwrap()
        .is_none());
}

/// The count ignores the page window and both share one filter.
pub async fn test_paging_and_count<D: AttachmentStore + ProductStore>(db: &D) {
    let p = make_product(db, "CHAIR-3").await;
    for _ in 0..5 {
        db.upsert_attachment(&make_upsert(&p, None, AttachmentKind::Other))
            .await
            .unwrap();
    }
    db.upsert_attachment(&make_upsert(&p, None, AttachmentKind::Image))
        .await
        .unwrap();

    let filter = approved(&p, AttachmentKind::Other);
    let first = db.list_attachments(&filter, 0, 2).await.unwrap();
    let last = db.list_attachments(&filter, 4, 6).await.unwrap();
    let beyond = db.list_attachments(&filter, 10, 12).await.unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(last.len(), 1);
    assert!(beyond.is_empty());
    assert_eq!(db.count_attachments(&filter).await.unwrap(), 5);

    // Hiding one record changes both the listing and the count.
    db.set_attachment_status(first[0].id, WorkflowStatus::Inactive)
        .await
        .unwrap();
    assert_eq!(db.count_attachments(&filter).await.unwrap(), 4);
    assert_eq!(db.list_attachments(&filter, 0, 10).await.unwrap().len(), 4);
}
