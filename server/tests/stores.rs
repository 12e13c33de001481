use chrono::DateTime;
use serde_json::Value;
use tempfile::TempDir;

use atlas_server::model::{Edge, EntityRecord, EntityType, RelationType, Visibility};
use atlas_server::store::{
    EdgeStore, EntityStore, JsonEdgeStore, JsonEdgeStoreConfig, JsonEntityStore,
    JsonEntityStoreConfig,
};

fn temp_working_dir() -> TempDir {
    TempDir::new().expect("create temp dir")
}

fn record(
    id: &str,
    slug: &str,
    name: Option<&str>,
    title: Option<&str>,
    published: bool,
    seq: i64,
) -> EntityRecord {
    let at = DateTime::from_timestamp(1_700_000_000 + seq, 0).expect("timestamp");
    EntityRecord {
        id: id.to_string(),
        slug: slug.to_string(),
        published,
        name: name.map(str::to_string),
        title: title.map(str::to_string),
        description: None,
        tags: Vec::new(),
        created_at: at,
        updated_at: at,
    }
}

fn edge(
    id: &str,
    from: (EntityType, &str),
    to: (EntityType, &str),
    relation_type: RelationType,
    published: bool,
    seq: i64,
) -> Edge {
    let at = DateTime::from_timestamp(1_700_000_000 + seq, 0).expect("timestamp");
    Edge {
        id: id.to_string(),
        from_type: from.0,
        from_id: from.1.to_string(),
        to_type: to.0,
        to_id: to.1.to_string(),
        relation_type,
        strength: None,
        published,
        metadata: Value::Null,
        created_at: at,
        updated_at: at,
    }
}

#[tokio::test]
async fn entity_store_roundtrip_reload_and_delete() -> anyhow::Result<()> {
    let dir = temp_working_dir();
    let config = JsonEntityStoreConfig {
        working_dir: dir.path().into(),
    };

    let store = JsonEntityStore::new(config.clone());
    store.initialize().await?;

    store
        .upsert(
            EntityType::Brands,
            record("b-1", "loreal", Some("L'Oréal"), None, true, 0),
        )
        .await?;
    store
        .upsert(
            EntityType::Brands,
            record("b-2", "shiseido", Some("Shiseido"), None, false, 1),
        )
        .await?;
    store.sync_if_dirty().await?;

    let found = store
        .fetch_by_slug(EntityType::Brands, "loreal", Visibility::PublishedOnly)
        .await?;
    assert_eq!(found.map(|row| row.id), Some("b-1".to_string()));

    // drafts stay invisible to the public view but not to curators
    assert!(
        store
            .fetch_by_slug(EntityType::Brands, "shiseido", Visibility::PublishedOnly)
            .await?
            .is_none()
    );
    assert!(
        store
            .fetch_by_slug(EntityType::Brands, "shiseido", Visibility::IncludeDrafts)
            .await?
            .is_some()
    );

    let reopened = JsonEntityStore::new(config.clone());
    reopened.initialize().await?;
    let all = reopened
        .list(EntityType::Brands, Visibility::IncludeDrafts)
        .await?;
    assert_eq!(all.len(), 2);

    reopened.delete(EntityType::Brands, "b-1").await?;
    reopened.sync_if_dirty().await?;

    let reloaded = JsonEntityStore::new(config);
    reloaded.initialize().await?;
    assert!(
        reloaded
            .fetch_by_slug(EntityType::Brands, "loreal", Visibility::IncludeDrafts)
            .await?
            .is_none()
    );

    Ok(())
}

#[tokio::test]
async fn entity_list_orders_newest_first() -> anyhow::Result<()> {
    let dir = temp_working_dir();
    let store = JsonEntityStore::new(JsonEntityStoreConfig {
        working_dir: dir.path().into(),
    });
    store.initialize().await?;

    store
        .upsert(
            EntityType::Projects,
            record("p-1", "older", None, Some("Older"), true, 0),
        )
        .await?;
    store
        .upsert(
            EntityType::Projects,
            record("p-2", "newer", None, Some("Newer"), true, 10),
        )
        .await?;

    let listed = store
        .list(EntityType::Projects, Visibility::PublishedOnly)
        .await?;
    let ids: Vec<&str> = listed.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(ids, vec!["p-2", "p-1"]);

    Ok(())
}

#[tokio::test]
async fn fetch_by_ids_preserves_requested_order_and_filters() -> anyhow::Result<()> {
    let dir = temp_working_dir();
    let store = JsonEntityStore::new(JsonEntityStoreConfig {
        working_dir: dir.path().into(),
    });
    store.initialize().await?;

    store
        .upsert(
            EntityType::UseCases,
            record("u-1", "virtual-try-on", None, Some("Virtual Try-On"), true, 0),
        )
        .await?;
    store
        .upsert(
            EntityType::UseCases,
            record("u-2", "shade-match", None, Some("Shade Match"), false, 1),
        )
        .await?;
    store
        .upsert(
            EntityType::UseCases,
            record("u-3", "skin-analysis", None, Some("Skin Analysis"), true, 2),
        )
        .await?;

    let ids = vec![
        "u-3".to_string(),
        "u-2".to_string(),
        "u-1".to_string(),
        "missing".to_string(),
    ];
    let rows = store
        .fetch_by_ids(EntityType::UseCases, &ids, Visibility::PublishedOnly)
        .await?;
    let returned: Vec<&str> = rows.iter().map(|row| row.id.as_str()).collect();
    // requested order, minus the draft and the id that never existed
    assert_eq!(returned, vec!["u-3", "u-1"]);

    Ok(())
}

#[tokio::test]
async fn edge_store_roundtrip_touching_and_ordering() -> anyhow::Result<()> {
    let dir = temp_working_dir();
    let config = JsonEdgeStoreConfig {
        working_dir: dir.path().into(),
    };

    let store = JsonEdgeStore::new(config.clone());
    store.initialize().await?;

    store
        .upsert(edge(
            "e-2",
            (EntityType::Projects, "p-1"),
            (EntityType::Brands, "b-1"),
            RelationType::Demonstrates,
            true,
            5,
        ))
        .await?;
    store
        .upsert(edge(
            "e-1",
            (EntityType::Brands, "b-1"),
            (EntityType::UseCases, "u-1"),
            RelationType::Implements,
            true,
            0,
        ))
        .await?;
    store
        .upsert(edge(
            "e-3",
            (EntityType::Brands, "b-1"),
            (EntityType::JobRoles, "j-1"),
            RelationType::Influences,
            false,
            10,
        ))
        .await?;
    store.sync_if_dirty().await?;

    // both directions in one query, unpublished edges filtered, stable order
    let touching = store
        .edges_touching(EntityType::Brands, "b-1", Visibility::PublishedOnly)
        .await?;
    let ids: Vec<&str> = touching.iter().map(|edge| edge.id.as_str()).collect();
    assert_eq!(ids, vec!["e-1", "e-2"]);

    let all = store.list(Visibility::IncludeDrafts).await?;
    assert_eq!(all.len(), 3);

    let reopened = JsonEdgeStore::new(config);
    reopened.initialize().await?;
    reopened.delete("e-1").await?;
    reopened.sync_if_dirty().await?;
    assert_eq!(reopened.list(Visibility::IncludeDrafts).await?.len(), 2);

    Ok(())
}

#[tokio::test]
async fn search_ranks_display_title_above_description() -> anyhow::Result<()> {
    let dir = temp_working_dir();
    let store = JsonEntityStore::new(JsonEntityStoreConfig {
        working_dir: dir.path().into(),
    });
    store.initialize().await?;

    let mut in_description = record("u-1", "shade-match", None, Some("Shade Match"), true, 0);
    in_description.description = Some("Recommends foundation shades via try-on analysis".to_string());
    store.upsert(EntityType::UseCases, in_description).await?;
    store
        .upsert(
            EntityType::UseCases,
            record("u-2", "virtual-try-on", None, Some("Virtual Try-On"), true, 1),
        )
        .await?;
    store
        .upsert(
            EntityType::UseCases,
            record("u-3", "draft-try-on", None, Some("Draft Try-On"), false, 2),
        )
        .await?;

    let hits = store
        .search(EntityType::UseCases, "try-on", Visibility::PublishedOnly)
        .await?;
    let ranked: Vec<(&str, f32)> = hits.iter().map(|hit| (hit.id.as_str(), hit.rank)).collect();
    assert_eq!(ranked, vec![("u-2", 1.0), ("u-1", 0.5)]);

    // blank terms match nothing instead of everything
    assert!(
        store
            .search(EntityType::UseCases, "   ", Visibility::PublishedOnly)
            .await?
            .is_empty()
    );

    Ok(())
}
