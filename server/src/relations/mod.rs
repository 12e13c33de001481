use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::model::{EntityType, RelationType};

pub mod resolver;

pub use resolver::RelationshipResolver;

/// One related entity, projected down to what link lists and graph nodes
/// need, with the relation metadata from its originating edge attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ResolvedRelation {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub relation_type: RelationType,
    #[serde(default)]
    pub relation_strength: Option<u8>,
}

/// Resolver output: one insertion-ordered bucket per entity type. All seven
/// buckets are always present, empty or not, so consumers never have to
/// distinguish "no key" from "no relations".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RelationsByType {
    pub brands: Vec<ResolvedRelation>,
    pub use_cases: Vec<ResolvedRelation>,
    pub ai_specialisms: Vec<ResolvedRelation>,
    pub job_roles: Vec<ResolvedRelation>,
    pub projects: Vec<ResolvedRelation>,
    pub timeline_events: Vec<ResolvedRelation>,
    pub learning_paths: Vec<ResolvedRelation>,
}

impl RelationsByType {
    pub fn bucket(&self, entity_type: EntityType) -> &[ResolvedRelation] {
        match entity_type {
            EntityType::Brands => &self.brands,
            EntityType::UseCases => &self.use_cases,
            EntityType::AiSpecialisms => &self.ai_specialisms,
            EntityType::JobRoles => &self.job_roles,
            EntityType::Projects => &self.projects,
            EntityType::TimelineEvents => &self.timeline_events,
            EntityType::LearningPaths => &self.learning_paths,
        }
    }

    pub(crate) fn bucket_mut(&mut self, entity_type: EntityType) -> &mut Vec<ResolvedRelation> {
        match entity_type {
            EntityType::Brands => &mut self.brands,
            EntityType::UseCases => &mut self.use_cases,
            EntityType::AiSpecialisms => &mut self.ai_specialisms,
            EntityType::JobRoles => &mut self.job_roles,
            EntityType::Projects => &mut self.projects,
            EntityType::TimelineEvents => &mut self.timeline_events,
            EntityType::LearningPaths => &mut self.learning_paths,
        }
    }

    /// Buckets in the fixed entity-type order.
    pub fn buckets(&self) -> impl Iterator<Item = (EntityType, &[ResolvedRelation])> {
        EntityType::ALL
            .into_iter()
            .map(move |entity_type| (entity_type, self.bucket(entity_type)))
    }

    pub fn total(&self) -> usize {
        self.buckets().map(|(_, bucket)| bucket.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
