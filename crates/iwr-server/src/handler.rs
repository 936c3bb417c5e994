//! Request handlers.
//!
//! Relations are rendered as hypermedia: every related object is a link to
//! its `/iwhd/{collection}/{id}` resource, with `rel` naming the related type
//! and `type` saying whether it is a parent or a child. Paths with no
//! handler of their own are relayed from the warehouse as-is.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, Uri};
use axum::response::{IntoResponse, Json, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use iwr_refs::{AssemblyDescription, DeployableDescription, RecordReport, RefError, Resolution};
use iwr_sdk::{parse_target, Relations, SdkError};
use iwr_types::{hierarchy, AttributeSet, Direction, EntityId, EntityType, LEVELS};

use crate::error::{ServerError, ServerResult};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct EntityLink {
    pub collection: &'static str,
    pub id: EntityId,
    pub href: String,
}

impl EntityLink {
    fn new(entity: EntityType, id: EntityId) -> Self {
        Self {
            collection: entity.collection(),
            href: object_href(entity, &id),
            id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Link {
    pub href: String,
    pub rel: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub id: EntityId,
}

#[derive(Debug, Serialize)]
pub struct RelationsResponse {
    pub entity: EntityLink,
    pub relation: &'static str,
    pub links: Vec<Link>,
    pub skipped: usize,
}

impl RelationsResponse {
    fn new(entity: EntityType, id: EntityId, direction: Direction, resolution: Resolution) -> Self {
        let links = resolution
            .relations
            .into_iter()
            .map(|r| Link {
                href: object_href(r.entity, &r.id),
                rel: r.entity.singular(),
                kind: direction.relation_kind(),
                id: r.id,
            })
            .collect();
        Self {
            entity: EntityLink::new(entity, id),
            relation: direction.as_str(),
            links,
            skipped: resolution.skipped,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ObjectResponse {
    pub entity: EntityLink,
    pub attributes: AttributeSet,
    pub parents: Option<String>,
    pub children: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CollectionEntry {
    pub collection: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub parent: Option<&'static str>,
    pub child: Option<&'static str>,
    pub parents: Option<String>,
    pub children: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub collections: Vec<CollectionEntry>,
}

fn object_href(entity: EntityType, id: &EntityId) -> String {
    format!("/iwhd/{}/{}", entity.collection(), id)
}

/// Link to one direction of an object, if the hierarchy supports it.
fn relation_href(entity: EntityType, id: &str, direction: Direction) -> Option<String> {
    hierarchy::level(entity)
        .supports(direction)
        .then(|| format!("/iwhd/{}/{}/{}", entity.collection(), id, direction.as_str()))
}

/// Health check handler.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Collections and the relation link templates each supports.
pub async fn index_handler() -> Json<IndexResponse> {
    let collections = LEVELS
        .iter()
        .map(|level| CollectionEntry {
            collection: level.entity.collection(),
            kind: level.entity.singular(),
            parent: level.parent.map(EntityType::collection),
            child: level.child.map(EntityType::collection),
            parents: relation_href(level.entity, "{id}", Direction::Parents),
            children: relation_href(level.entity, "{id}", Direction::Children),
        })
        .collect();
    Json(IndexResponse { collections })
}

/// One object's attributes plus links to its relations.
pub async fn object_handler(
    State(relations): State<Relations>,
    Path((collection, id)): Path<(String, String)>,
) -> ServerResult<Json<ObjectResponse>> {
    let (entity, id) = parse_target(&collection, &id)?;
    let attributes = relations
        .store()
        .get_attributes(entity, &id)
        .await
        .map_err(SdkError::from)?;
    Ok(Json(ObjectResponse {
        parents: relation_href(entity, id.as_str(), Direction::Parents),
        children: relation_href(entity, id.as_str(), Direction::Children),
        entity: EntityLink::new(entity, id),
        attributes,
    }))
}

pub async fn parents_handler(
    State(relations): State<Relations>,
    Path((collection, id)): Path<(String, String)>,
) -> ServerResult<Json<RelationsResponse>> {
    resolve(&relations, &collection, &id, Direction::Parents).await
}

pub async fn children_handler(
    State(relations): State<Relations>,
    Path((collection, id)): Path<(String, String)>,
) -> ServerResult<Json<RelationsResponse>> {
    resolve(&relations, &collection, &id, Direction::Children).await
}

async fn resolve(
    relations: &Relations,
    collection: &str,
    id: &str,
    direction: Direction,
) -> ServerResult<Json<RelationsResponse>> {
    let (entity, id) = parse_target(collection, id)?;
    let resolution = relations.resolve(entity, &id, direction).await?;
    Ok(Json(RelationsResponse::new(entity, id, direction, resolution)))
}

/// Record an assembly from an XML body, or JSON with `Content-Type: application/json`.
pub async fn record_assembly_handler(
    State(relations): State<Relations>,
    headers: HeaderMap,
    body: String,
) -> ServerResult<Json<RecordReport>> {
    let assembly = if is_json(&headers) {
        from_json::<AssemblyDescription>(&body)?
    } else {
        AssemblyDescription::from_xml(&body).map_err(SdkError::from)?
    };
    Ok(Json(relations.record_assembly(&assembly).await?))
}

/// Record a deployable from an XML body, or JSON with `Content-Type: application/json`.
pub async fn record_deployable_handler(
    State(relations): State<Relations>,
    headers: HeaderMap,
    body: String,
) -> ServerResult<Json<RecordReport>> {
    let deployable = if is_json(&headers) {
        from_json::<DeployableDescription>(&body)?
    } else {
        DeployableDescription::from_xml(&body).map_err(SdkError::from)?
    };
    Ok(Json(relations.record_deployable(&deployable).await?))
}

/// Relay any other `/iwhd/...` resource from the warehouse unchanged.
pub async fn passthrough_handler(
    State(relations): State<Relations>,
    method: Method,
    uri: Uri,
) -> ServerResult<Response> {
    let Some(rest) = uri.path().strip_prefix("/iwhd/") else {
        return Err(ServerError::NotFound(format!("no route for {}", uri.path())));
    };
    if method != Method::GET {
        return Err(ServerError::MethodNotAllowed(format!("{method} {}", uri.path())));
    }

    let doc = relations.fetch_raw(rest).await?;
    let mut response = doc.body.into_response();
    if let Some(content_type) = doc.content_type.and_then(|v| HeaderValue::from_str(&v).ok()) {
        response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    }
    Ok(response)
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}

fn from_json<T: DeserializeOwned>(body: &str) -> ServerResult<T> {
    serde_json::from_str(body)
        .map_err(|e| ServerError::from(SdkError::from(RefError::MalformedPayload(e.to_string()))))
}
