//! Graph traversal over the attribute store.
//!
//! The store cannot answer "which objects carry attribute X", so every
//! downward query and most upward ones are a full scan of one collection:
//! list its ids, load each member, filter by convention. [`ReferenceResolver`]
//! dispatches through the static [`hierarchy`](iwr_types::hierarchy) table and
//! runs each scan with a bounded fan-out.
//!
//! # Scan failure policy
//!
//! - Failing to *list* the scanned collection aborts the query.
//! - Failing to read one *member* skips it, logs a warning, and increments
//!   [`Resolution::skipped`].
//! - A direct lookup of the queried object itself aborts on failure.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use iwr_store::{StoreClient, StoreResult};
use iwr_types::{hierarchy, Direction, EntityId, EntityType, Traversal, TypeTag};

use crate::error::{RefError, Result};
use crate::handle::ObjectHandle;
use crate::types::{Relation, Resolution, ScanOutcome};

/// Default number of concurrent member fetches per scan.
pub const DEFAULT_SCAN_CONCURRENCY: usize = 8;

/// Resolves `parents_of` / `children_of` for every entity type.
///
/// Holds no state besides the store handle; clones share the store.
#[derive(Clone)]
pub struct ReferenceResolver {
    store: Arc<dyn StoreClient>,
    scan_concurrency: usize,
}

impl ReferenceResolver {
    pub fn new(store: Arc<dyn StoreClient>) -> Self {
        Self {
            store,
            scan_concurrency: DEFAULT_SCAN_CONCURRENCY,
        }
    }

    /// Bound the number of member fetches in flight during a scan.
    /// Values below 1 are treated as 1.
    pub fn with_scan_concurrency(mut self, limit: usize) -> Self {
        self.scan_concurrency = limit.max(1);
        self
    }

    pub fn scan_concurrency(&self) -> usize {
        self.scan_concurrency
    }

    pub fn store(&self) -> &Arc<dyn StoreClient> {
        &self.store
    }

    pub async fn parents_of(&self, entity: EntityType, id: &EntityId) -> Result<Resolution> {
        self.resolve(entity, id, Direction::Parents).await
    }

    pub async fn children_of(&self, entity: EntityType, id: &EntityId) -> Result<Resolution> {
        self.resolve(entity, id, Direction::Children).await
    }

    /// Resolve one direction for one object through the hierarchy table.
    pub async fn resolve(
        &self,
        entity: EntityType,
        id: &EntityId,
        direction: Direction,
    ) -> Result<Resolution> {
        let level = hierarchy::level(entity);
        let unsupported = RefError::Unsupported { entity, direction };
        let neighbour = level.neighbour(direction).ok_or(unsupported)?;

        let resolution = match level.traversal(direction) {
            Traversal::Link { attribute } => self.follow_link(entity, id, attribute, neighbour).await?,
            Traversal::ReverseLink { scan, attribute } => {
                self.reverse_link(scan, attribute, id).await?
            }
            Traversal::BackReferences => self.own_references(entity, id, neighbour).await?,
            Traversal::SharedTemplates { tag } => self.shared_templates(id, tag).await?,
            Traversal::ReferencingTemplates => {
                let matches = self.templates_referencing(id).await?;
                let mut relations = Collector::new(id);
                for template in matches.items {
                    relations.push(EntityType::Template, template.id().clone());
                }
                relations.finish(matches.skipped)
            }
            Traversal::Unsupported => {
                return Err(RefError::Unsupported { entity, direction });
            }
        };

        debug!(
            %entity,
            %id,
            %direction,
            found = resolution.len(),
            skipped = resolution.skipped,
            "resolved relations"
        );
        Ok(resolution)
    }

    /// Every template holding a back-reference written by `id`, whatever its tag.
    pub async fn templates_referencing(&self, id: &EntityId) -> Result<ScanOutcome<ObjectHandle>> {
        let store = self.store.as_ref();
        let scan = self
            .scan(EntityType::Template, move |member: EntityId| async move {
                ObjectHandle::load(store, EntityType::Template, &member).await
            })
            .await?;

        Ok(ScanOutcome {
            items: scan
                .items
                .into_iter()
                .map(|(_, template)| template)
                .filter(|template| template.references_id(id))
                .collect(),
            skipped: scan.skipped,
        })
    }

    /// Read a link attribute from the object's own record.
    async fn follow_link(
        &self,
        entity: EntityType,
        id: &EntityId,
        attribute: &str,
        target: EntityType,
    ) -> Result<Resolution> {
        let handle = ObjectHandle::load(self.store.as_ref(), entity, id).await?;
        let mut relations = Collector::new(id);
        if let Some(linked) = handle
            .attribute(attribute)
            .and_then(|raw| parse_link(entity, id, attribute, raw))
        {
            relations.push(target, linked);
        }
        Ok(relations.finish(0))
    }

    /// Scan `scan` and keep members whose `attribute` names `id`.
    async fn reverse_link(
        &self,
        scan: EntityType,
        attribute: &'static str,
        id: &EntityId,
    ) -> Result<Resolution> {
        let store = self.store.as_ref();
        let links = self
            .scan(scan, move |member: EntityId| async move {
                ObjectHandle::load(store, scan, &member)
                    .await
                    .map(|handle| handle.attribute(attribute).map(str::to_string))
            })
            .await?;

        let mut relations = Collector::new(id);
        for (member, link) in links.items {
            let Some(linked) = link.as_deref().and_then(|raw| parse_link(scan, &member, attribute, raw)) else {
                continue;
            };
            if &linked == id {
                relations.push(scan, member);
            }
        }
        Ok(relations.finish(links.skipped))
    }

    /// Every back-reference on the object itself, typed by its tag.
    ///
    /// Untagged references still name a referrer; they are reported as
    /// `fallback`, the hierarchy's parent type.
    async fn own_references(
        &self,
        entity: EntityType,
        id: &EntityId,
        fallback: EntityType,
    ) -> Result<Resolution> {
        let handle = ObjectHandle::load(self.store.as_ref(), entity, id).await?;
        let mut relations = Collector::new(id);
        for reference in handle.references() {
            let related = match reference.tag {
                Some(tag) => tag.entity_type(),
                None => {
                    debug!(%entity, %id, referrer = %reference.ref_id, "untagged back-reference");
                    fallback
                }
            };
            relations.push(related, reference.ref_id);
        }
        Ok(relations.finish(0))
    }

    /// Scan templates linked to `id` and collect their references tagged `tag`.
    async fn shared_templates(&self, id: &EntityId, tag: TypeTag) -> Result<Resolution> {
        let matches = self.templates_referencing(id).await?;
        let mut relations = Collector::new(id);
        for template in &matches.items {
            for reference in template.references() {
                match reference.tag {
                    Some(t) if t == tag => relations.push(tag.entity_type(), reference.ref_id),
                    Some(_) => {}
                    None => debug!(
                        template = %template.id(),
                        referrer = %reference.ref_id,
                        "ignoring untagged back-reference"
                    ),
                }
            }
        }
        Ok(relations.finish(matches.skipped))
    }

    /// List `collection` and fetch every member with `fetch`, at most
    /// `scan_concurrency` at a time. Results keep listing order.
    async fn scan<T, F, Fut>(&self, collection: EntityType, fetch: F) -> Result<ScanOutcome<(EntityId, T)>>
    where
        F: Fn(EntityId) -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        let members = self.store.list_ids(collection).await?;
        let total = members.len();

        let fetched: Vec<(EntityId, StoreResult<T>)> = stream::iter(members)
            .map(|member| {
                let pending = fetch(member.clone());
                async move { (member, pending.await) }
            })
            .buffered(self.scan_concurrency)
            .collect()
            .await;

        let mut outcome = ScanOutcome {
            items: Vec::with_capacity(total),
            skipped: 0,
        };
        for (member, result) in fetched {
            match result {
                Ok(item) => outcome.items.push((member, item)),
                Err(e) => {
                    warn!(%collection, %member, error = %e, "skipping unreadable scan member");
                    outcome.skipped += 1;
                }
            }
        }

        debug!(%collection, total, skipped = outcome.skipped, "scanned collection");
        Ok(outcome)
    }
}

impl std::fmt::Debug for ReferenceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceResolver")
            .field("scan_concurrency", &self.scan_concurrency)
            .finish()
    }
}

/// Interpret a link attribute's content as an id.
fn parse_link(entity: EntityType, id: &EntityId, attribute: &str, raw: &str) -> Option<EntityId> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match EntityId::new(raw) {
        Ok(linked) => Some(linked),
        Err(e) => {
            warn!(%entity, %id, attribute, error = %e, "ignoring unusable link");
            None
        }
    }
}

/// Accumulates relations in first-seen order, dropping repeats and the
/// queried id itself.
struct Collector<'a> {
    queried: &'a EntityId,
    seen: HashSet<EntityId>,
    relations: Vec<Relation>,
}

impl<'a> Collector<'a> {
    fn new(queried: &'a EntityId) -> Self {
        Self {
            queried,
            seen: HashSet::new(),
            relations: Vec::new(),
        }
    }

    fn push(&mut self, entity: EntityType, id: EntityId) {
        if &id != self.queried && self.seen.insert(id.clone()) {
            self.relations.push(Relation::new(entity, id));
        }
    }

    fn finish(self, skipped: usize) -> Resolution {
        Resolution {
            relations: self.relations,
            skipped,
        }
    }
}
