use std::sync::Arc;

use chrono::DateTime;
use serde_json::Value;
use tempfile::TempDir;

use atlas_server::error::AtlasError;
use atlas_server::graph::{
    ANCHOR_NODE_HEIGHT, ANCHOR_NODE_WIDTH, GraphService, RELATED_NODE_HEIGHT, RELATED_NODE_WIDTH,
};
use atlas_server::model::{Edge, EntityRecord, EntityRef, EntityType, RelationType, Visibility};
use atlas_server::store::{
    EdgeStore, EntityStore, JsonEdgeStore, JsonEdgeStoreConfig, JsonEntityStore,
    JsonEntityStoreConfig,
};

fn temp_working_dir() -> TempDir {
    TempDir::new().expect("create temp dir")
}

async fn open_stores(dir: &TempDir) -> anyhow::Result<(Arc<JsonEntityStore>, Arc<JsonEdgeStore>)> {
    let entities = Arc::new(JsonEntityStore::new(JsonEntityStoreConfig {
        working_dir: dir.path().into(),
    }));
    let edges = Arc::new(JsonEdgeStore::new(JsonEdgeStoreConfig {
        working_dir: dir.path().into(),
    }));
    entities.initialize().await?;
    edges.initialize().await?;
    Ok((entities, edges))
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
        published: true,
        metadata: Value::Null,
        created_at: at,
        updated_at: at,
    }
}

async fn seed_loreal(
    entities: &JsonEntityStore,
    edges: &JsonEdgeStore,
) -> anyhow::Result<()> {
    entities
        .upsert(
            EntityType::Brands,
            record("b-1", "loreal", Some("L'Oréal"), None, true, 0),
        )
        .await?;
    entities
        .upsert(
            EntityType::UseCases,
            record("u-1", "virtual-try-on", None, Some("Virtual Try-On"), true, 1),
        )
        .await?;
    edges
        .upsert(edge(
            "e-1",
            (EntityType::Brands, "b-1"),
            (EntityType::UseCases, "u-1"),
            RelationType::Implements,
            0,
        ))
        .await?;
    Ok(())
}

#[tokio::test]
async fn graph_is_built_and_laid_out_around_the_anchor() -> anyhow::Result<()> {
    let dir = temp_working_dir();
    let (entities, edges) = open_stores(&dir).await?;
    seed_loreal(&entities, &edges).await?;

    let service = GraphService::new(entities.clone(), edges.clone());
    let reference = EntityRef::parse("brands:loreal")?;
    let graph = service
        .graph_for(&reference, Visibility::PublishedOnly)
        .await?;

    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges.len(), 1);

    let anchor = &graph.nodes[0];
    assert_eq!(anchor.id, "b-1");
    assert_eq!(anchor.label, "L'Oréal");
    assert_eq!(anchor.width, ANCHOR_NODE_WIDTH);
    assert_eq!(anchor.height, ANCHOR_NODE_HEIGHT);
    assert_eq!(anchor.color, EntityType::Brands.color());
    assert_eq!(anchor.href, "/brands/loreal");

    let related = &graph.nodes[1];
    assert_eq!(related.id, "u-1");
    assert_eq!(related.width, RELATED_NODE_WIDTH);
    assert_eq!(related.height, RELATED_NODE_HEIGHT);
    assert_eq!(related.color, EntityType::UseCases.color());
    assert_eq!(related.href, "/use-cases/virtual-try-on");

    // anchor row first, related row below it by the rank separation
    assert_eq!(anchor.position.y, 0.0);
    assert_eq!(related.position.y, 180.0);

    let link = &graph.edges[0];
    assert_eq!(link.source, "b-1");
    assert_eq!(link.target, "u-1");
    assert_eq!(link.label, "implements");

    Ok(())
}

#[tokio::test]
async fn layout_is_deterministic_across_requests() -> anyhow::Result<()> {
    let dir = temp_working_dir();
    let (entities, edges) = open_stores(&dir).await?;
    seed_loreal(&entities, &edges).await?;
    entities
        .upsert(
            EntityType::JobRoles,
            record("j-1", "shade-scientist", None, Some("Shade Scientist"), true, 2),
        )
        .await?;
    edges
        .upsert(edge(
            "e-2",
            (EntityType::JobRoles, "j-1"),
            (EntityType::Brands, "b-1"),
            RelationType::Requires,
            1,
        ))
        .await?;

    let service = GraphService::new(entities.clone(), edges.clone());
    let reference = EntityRef::parse("brands:loreal")?;

    let first = service
        .graph_for(&reference, Visibility::PublishedOnly)
        .await?;
    let second = service
        .graph_for(&reference, Visibility::PublishedOnly)
        .await?;

    assert_eq!(first, second);

    Ok(())
}

#[tokio::test]
async fn anchor_without_relations_renders_alone() -> anyhow::Result<()> {
    let dir = temp_working_dir();
    let (entities, edges) = open_stores(&dir).await?;

    entities
        .upsert(
            EntityType::Brands,
            record("b-1", "loreal", Some("L'Oréal"), None, true, 0),
        )
        .await?;

    let service = GraphService::new(entities.clone(), edges.clone());
    let reference = EntityRef::parse("brands:loreal")?;
    let graph = service
        .graph_for(&reference, Visibility::PublishedOnly)
        .await?;

    assert_eq!(graph.nodes.len(), 1);
    assert!(graph.edges.is_empty());
    // centered on the origin column
    assert_eq!(graph.nodes[0].position.x, -ANCHOR_NODE_WIDTH / 2.0);
    assert_eq!(graph.nodes[0].position.y, 0.0);

    Ok(())
}

#[tokio::test]
async fn missing_or_unpublished_anchor_is_not_found() -> anyhow::Result<()> {
    let dir = temp_working_dir();
    let (entities, edges) = open_stores(&dir).await?;

    entities
        .upsert(
            EntityType::Brands,
            record("b-1", "draft-brand", Some("Draft Brand"), None, false, 0),
        )
        .await?;

    let service = GraphService::new(entities.clone(), edges.clone());

    let missing = EntityRef::parse("brands:nonexistent")?;
    let result = service.graph_for(&missing, Visibility::PublishedOnly).await;
    assert!(matches!(result, Err(AtlasError::NotFound { .. })));

    let draft = EntityRef::parse("brands:draft-brand")?;
    let result = service.graph_for(&draft, Visibility::PublishedOnly).await;
    assert!(matches!(result, Err(AtlasError::NotFound { .. })));

    // the privileged view may still lay out the draft
    let graph = service.graph_for(&draft, Visibility::IncludeDrafts).await?;
    assert_eq!(graph.nodes.len(), 1);

    Ok(())
}

#[tokio::test]
async fn malformed_reference_fails_before_any_store_query() -> anyhow::Result<()> {
    let dir = temp_working_dir();
    let (entities, edges) = open_stores(&dir).await?;

    assert!(matches!(
        EntityRef::parse("loreal"),
        Err(AtlasError::InvalidInput { .. })
    ));
    assert!(matches!(
        EntityRef::parse("perfumes:chanel"),
        Err(AtlasError::InvalidInput { .. })
    ));

    // parsing happens before the service is ever consulted
    assert_eq!(entities.query_count(), 0);
    assert_eq!(edges.query_count(), 0);

    Ok(())
}

#[tokio::test]
async fn parallel_relations_share_a_node_but_keep_their_edges() -> anyhow::Result<()> {
    let dir = temp_working_dir();
    let (entities, edges) = open_stores(&dir).await?;
    seed_loreal(&entities, &edges).await?;
    edges
        .upsert(edge(
            "e-2",
            (EntityType::Brands, "b-1"),
            (EntityType::UseCases, "u-1"),
            RelationType::RelatedTo,
            1,
        ))
        .await?;

    let service = GraphService::new(entities.clone(), edges.clone());
    let reference = EntityRef::parse("brands:loreal")?;
    let graph = service
        .graph_for(&reference, Visibility::PublishedOnly)
        .await?;

    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges.len(), 2);

    let labels: Vec<&str> = graph.edges.iter().map(|edge| edge.label.as_str()).collect();
    assert_eq!(labels, vec!["implements", "related to"]);
    // distinct ids even though the endpoints coincide
    assert_ne!(graph.edges[0].id, graph.edges[1].id);

    Ok(())
}
