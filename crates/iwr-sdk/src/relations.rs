use std::sync::Arc;

use tracing::debug;

use iwr_refs::{
    AssemblyDescription, DeployableDescription, RecordReport, ReferenceRecorder,
    ReferenceResolver, Resolution,
};
use iwr_store::{HttpStore, RawDocument, StoreClient, StoreConfig};
use iwr_types::{Direction, EntityId, EntityType};

use crate::error::SdkResult;

/// High-level relations API over one store client.
#[derive(Clone, Debug)]
pub struct Relations {
    resolver: ReferenceResolver,
    recorder: ReferenceRecorder,
}

impl Relations {
    pub fn new(store: Arc<dyn StoreClient>) -> Self {
        Self::from_resolver(ReferenceResolver::new(store))
    }

    /// Connect to a running warehouse over HTTP.
    pub fn connect(config: &StoreConfig, scan_concurrency: usize) -> SdkResult<Self> {
        let store = HttpStore::new(config)?;
        debug!(base_url = store.base_url(), scan_concurrency, "connected to warehouse");
        Ok(Self::new(Arc::new(store)).with_scan_concurrency(scan_concurrency))
    }

    pub fn with_scan_concurrency(self, limit: usize) -> Self {
        Self::from_resolver(self.resolver.with_scan_concurrency(limit))
    }

    fn from_resolver(resolver: ReferenceResolver) -> Self {
        Self {
            recorder: ReferenceRecorder::new(resolver.clone()),
            resolver,
        }
    }

    pub fn resolver(&self) -> &ReferenceResolver {
        &self.resolver
    }

    pub fn store(&self) -> &Arc<dyn StoreClient> {
        self.resolver.store()
    }

    // ---- Queries ----

    pub async fn resolve_parents(&self, entity: EntityType, id: &EntityId) -> SdkResult<Resolution> {
        Ok(self.resolver.parents_of(entity, id).await?)
    }

    pub async fn resolve_children(&self, entity: EntityType, id: &EntityId) -> SdkResult<Resolution> {
        Ok(self.resolver.children_of(entity, id).await?)
    }

    pub async fn resolve(
        &self,
        entity: EntityType,
        id: &EntityId,
        direction: Direction,
    ) -> SdkResult<Resolution> {
        Ok(self.resolver.resolve(entity, id, direction).await?)
    }

    /// Resolve parents from a collection name (or singular type name) and a raw id.
    pub async fn resolve_parents_in(&self, collection: &str, id: &str) -> SdkResult<Resolution> {
        let (entity, id) = parse_target(collection, id)?;
        self.resolve_parents(entity, &id).await
    }

    /// Resolve children from a collection name (or singular type name) and a raw id.
    pub async fn resolve_children_in(&self, collection: &str, id: &str) -> SdkResult<Resolution> {
        let (entity, id) = parse_target(collection, id)?;
        self.resolve_children(entity, &id).await
    }

    /// Any other warehouse resource, relayed verbatim.
    pub async fn fetch_raw(&self, path: &str) -> SdkResult<RawDocument> {
        Ok(self.store().get_raw(path).await?)
    }

    // ---- Recording ----

    pub async fn record_assembly(&self, assembly: &AssemblyDescription) -> SdkResult<RecordReport> {
        Ok(self.recorder.record_assembly(assembly).await?)
    }

    pub async fn record_deployable(&self, deployable: &DeployableDescription) -> SdkResult<RecordReport> {
        Ok(self.recorder.record_deployable(deployable).await?)
    }

    pub async fn record_assembly_xml(&self, xml: &str) -> SdkResult<RecordReport> {
        let assembly = AssemblyDescription::from_xml(xml)?;
        self.record_assembly(&assembly).await
    }

    pub async fn record_deployable_xml(&self, xml: &str) -> SdkResult<RecordReport> {
        let deployable = DeployableDescription::from_xml(xml)?;
        self.record_deployable(&deployable).await
    }
}

/// Parse a `(collection, id)` pair given as strings.
pub fn parse_target(collection: &str, id: &str) -> SdkResult<(EntityType, EntityId)> {
    let entity: EntityType = collection.parse()?;
    let id = EntityId::new(id)?;
    Ok((entity, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SdkError;
    use iwr_refs::RefError;
    use iwr_store::InMemoryStore;
    use iwr_types::AttributeSet;

    fn id(s: &str) -> EntityId {
        EntityId::new(s).unwrap()
    }

    fn relations() -> (Arc<InMemoryStore>, Relations) {
        let store = Arc::new(InMemoryStore::new());
        for t in ["T1", "T2"] {
            store.insert_object(EntityType::Template, id(t), AttributeSet::new());
        }
        store.insert_object(EntityType::Image, id("I1"), [("template", "T1")].into_iter().collect());
        let relations = Relations::new(store.clone());
        (store, relations)
    }

    const A1: &str = r#"<assembly name="web" uuid="A1"><template uuid="T1"/></assembly>"#;
    const A2: &str = r#"<assembly name="db" uuid="A2"><template uuid="T2"/></assembly>"#;
    const D1: &str = r#"<deployable name="site" uuid="D1">
        <assemblies><assembly uuid="A1"/><assembly uuid="A2"/></assemblies>
    </deployable>"#;

    #[tokio::test]
    async fn record_then_resolve_from_xml() {
        let (_, rel) = relations();
        rel.record_assembly_xml(A1).await.unwrap();
        rel.record_assembly_xml(A2).await.unwrap();

        assert!(rel.resolve_parents_in("assemblies", "A1").await.unwrap().is_empty());

        let report = rel.record_deployable_xml(D1).await.unwrap();
        assert_eq!(report.targets.len(), 2);

        let parents = rel.resolve_parents_in("assembly", "A1").await.unwrap();
        assert_eq!(parents.ids(), vec![id("D1")]);
        let mut children = rel.resolve_children_in("deployables", "D1").await.unwrap().ids();
        children.sort();
        assert_eq!(children, vec![id("A1"), id("A2")]);
    }

    #[tokio::test]
    async fn link_queries_through_the_facade() {
        let (_, rel) = relations();
        let parents = rel.resolve_parents(EntityType::Image, &id("I1")).await.unwrap();
        assert_eq!(parents.ids(), vec![id("T1")]);
        let children = rel
            .resolve(EntityType::Template, &id("T1"), Direction::Children)
            .await
            .unwrap();
        assert_eq!(children.ids(), vec![id("I1")]);
    }

    #[tokio::test]
    async fn boundary_errors() {
        let (_, rel) = relations();
        let err = rel.resolve_parents_in("widgets", "X").await.unwrap_err();
        assert!(matches!(err, SdkError::UnknownCollection(name) if name == "widgets"));

        let err = rel.resolve_parents_in("templates", "a b").await.unwrap_err();
        assert!(matches!(err, SdkError::InvalidId(_)));

        let err = rel.record_assembly_xml("<assembly/>").await.unwrap_err();
        assert!(matches!(err, SdkError::Ref(RefError::MalformedPayload(_))));

        let err = rel.resolve_parents_in("deployables", "D1").await.unwrap_err();
        assert!(matches!(err, SdkError::Ref(RefError::Unsupported { .. })));
    }

    #[tokio::test]
    async fn raw_fetch_through_the_facade() {
        let (_, rel) = relations();
        let doc = rel.fetch_raw("images/I1/template").await.unwrap();
        assert_eq!(doc.body, "T1");

        let err = rel.fetch_raw("images/I9/_attrs").await.unwrap_err();
        assert!(matches!(err, SdkError::Store(e) if e.is_not_found()));
    }

    #[test]
    fn connect_builds_an_http_client() {
        let rel = Relations::connect(&StoreConfig::new("http://localhost:9090/"), 3).unwrap();
        assert_eq!(rel.resolver().scan_concurrency(), 3);
    }
}
