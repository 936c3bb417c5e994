//! Assembly and deployable descriptions accepted by the recorder.
//!
//! Upstream callers submit XML documents; only the id fields matter here,
//! everything else (services, puppet classes, hardware profiles) is ignored.
//!
//! ```xml
//! <assembly name="Assembly1" uuid="A1">
//!   <template type="Template-Type-1" uuid="T1"/>
//! </assembly>
//!
//! <deployable name="Deployable1" uuid="D1">
//!   <assemblies>
//!     <assembly name="MyAssembly1" uuid="A1"/>
//!     <assembly name="MyAssembly2" uuid="A2"/>
//!   </assemblies>
//! </deployable>
//! ```
//!
//! Both types also derive serde for the equivalent JSON shape.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde::{Deserialize, Serialize};

use iwr_types::EntityId;

use crate::error::{RefError, Result};

/// An assembly and the template it is built on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyDescription {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub template_id: EntityId,
}

impl AssemblyDescription {
    pub fn new(id: EntityId, template_id: EntityId) -> Self {
        Self {
            id,
            name: None,
            template_id,
        }
    }

    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut root: Option<(EntityId, Option<String>)> = None;
        let mut template_id: Option<EntityId> = None;

        walk(xml, |path, e| {
            match (path, local_name(e).as_str()) {
                ([], "assembly") => root = Some((required_uuid(e, "assembly")?, optional(e, "name")?)),
                ([], other) => return Err(malformed(format!("expected <assembly>, found <{other}>"))),
                ([p], "template") if p == "assembly" && template_id.is_none() => {
                    template_id = Some(required_uuid(e, "template")?);
                }
                _ => {}
            }
            Ok(())
        })?;

        let (id, name) = root.ok_or_else(|| malformed("missing <assembly> element"))?;
        let template_id = template_id.ok_or_else(|| malformed("assembly declares no <template>"))?;
        Ok(Self {
            id,
            name,
            template_id,
        })
    }
}

/// A deployable and the assemblies it is composed of.
///
/// Repeated assembly ids are kept once, whichever way the description is built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DeployableFields")]
pub struct DeployableDescription {
    pub id: EntityId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub assembly_ids: Vec<EntityId>,
}

#[derive(Deserialize)]
struct DeployableFields {
    id: EntityId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    assembly_ids: Vec<EntityId>,
}

impl From<DeployableFields> for DeployableDescription {
    fn from(fields: DeployableFields) -> Self {
        Self {
            name: fields.name,
            ..Self::new(fields.id, fields.assembly_ids)
        }
    }
}

impl DeployableDescription {
    pub fn new(id: EntityId, assembly_ids: Vec<EntityId>) -> Self {
        let mut description = Self {
            id,
            name: None,
            assembly_ids: Vec::new(),
        };
        for assembly in assembly_ids {
            description.push_assembly(assembly);
        }
        description
    }

    /// Declare an assembly; repeated ids are kept once.
    pub fn push_assembly(&mut self, id: EntityId) {
        if !self.assembly_ids.contains(&id) {
            self.assembly_ids.push(id);
        }
    }

    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut root: Option<(EntityId, Option<String>)> = None;
        let mut assemblies: Vec<EntityId> = Vec::new();

        walk(xml, |path, e| {
            match (path, local_name(e).as_str()) {
                ([], "deployable") => root = Some((required_uuid(e, "deployable")?, optional(e, "name")?)),
                ([], other) => return Err(malformed(format!("expected <deployable>, found <{other}>"))),
                ([p0, p1], "assembly") if p0 == "deployable" && p1 == "assemblies" => {
                    assemblies.push(required_uuid(e, "assembly")?);
                }
                _ => {}
            }
            Ok(())
        })?;

        let (id, name) = root.ok_or_else(|| malformed("missing <deployable> element"))?;
        let mut description = Self::new(id, assemblies);
        description.name = name;
        Ok(description)
    }
}

/// Visit every element start with the local names of its ancestors.
fn walk<F>(xml: &str, mut visit: F) -> Result<()>
where
    F: FnMut(&[String], &BytesStart<'_>) -> Result<()>,
{
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut path: Vec<String> = Vec::new();
    loop {
        match reader.read_event().map_err(|e| malformed(e.to_string()))? {
            Event::Start(e) => {
                visit(path.as_slice(), &e)?;
                path.push(local_name(&e));
            }
            Event::Empty(e) => visit(path.as_slice(), &e)?,
            Event::End(_) => {
                path.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(())
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn optional(e: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    let attr = e.try_get_attribute(name).map_err(|err| malformed(err.to_string()))?;
    attr.map(|a| {
        a.unescape_value()
            .map(|v| v.into_owned())
            .map_err(|err| malformed(err.to_string()))
    })
    .transpose()
}

fn required_uuid(e: &BytesStart<'_>, element: &str) -> Result<EntityId> {
    let raw = optional(e, "uuid")?
        .ok_or_else(|| malformed(format!("<{element}> has no uuid attribute")))?;
    EntityId::new(raw).map_err(|err| malformed(format!("<{element}>: {err}")))
}

fn malformed(reason: impl Into<String>) -> RefError {
    RefError::MalformedPayload(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> EntityId {
        EntityId::new(s).unwrap()
    }

    const ASSEMBLY: &str = r#"
<assembly name="Assembly1" uuid="11111111-1111-11111-111111-111111111">
 <template type="Template-Type-1" uuid="7ad87a12-674a-11e0-965e-001a4a22203d"/>
 <services>
   <puppet>
     <service name="service-name">
       <class>puppet-class-name</class>
       <parameter name="param2-name">
         <reference assembly="Assembly2" parameter="param-from-asy2"/>
       </parameter>
     </service>
   </puppet>
 </services>
</assembly>"#;

    const DEPLOYABLE: &str = r#"
<deployable name="Deployable1" uuid="3333333-33333-33333333-3333333333-333">
 <assemblies>
   <assembly name="MyAssembly1" type="Assembly1" hwp="large" uuid="22222222-2222-22222-222222-222222222"/>
   <assembly name="MyAssembly2" type="Assembly2" hwp="large" uuid="11111111-1111-11111-111111-111111111"/>
 </assemblies>
</deployable>"#;

    #[test]
    fn parse_assembly() {
        let a = AssemblyDescription::from_xml(ASSEMBLY).unwrap();
        assert_eq!(a.id, "11111111-1111-11111-111111-111111111");
        assert_eq!(a.name.as_deref(), Some("Assembly1"));
        assert_eq!(a.template_id, "7ad87a12-674a-11e0-965e-001a4a22203d");
    }

    #[test]
    fn parse_deployable() {
        let d = DeployableDescription::from_xml(DEPLOYABLE).unwrap();
        assert_eq!(d.id, "3333333-33333-33333333-3333333333-333");
        assert_eq!(
            d.assembly_ids,
            vec![
                id("22222222-2222-22222-222222-222222222"),
                id("11111111-1111-11111-111111-111111111"),
            ]
        );
    }

    #[test]
    fn nested_template_elements_are_ignored() {
        // Only the direct <template> child of the root counts.
        let xml = r#"<assembly uuid="A1"><services><template uuid="X"/></services><template uuid="T1"/></assembly>"#;
        assert_eq!(AssemblyDescription::from_xml(xml).unwrap().template_id, "T1");
    }

    #[test]
    fn assembly_without_template_is_malformed() {
        let err = AssemblyDescription::from_xml(r#"<assembly uuid="A1"/>"#).unwrap_err();
        assert!(matches!(err, RefError::MalformedPayload(msg) if msg.contains("template")));
    }

    #[test]
    fn missing_uuid_is_malformed() {
        let err = AssemblyDescription::from_xml(r#"<assembly><template uuid="T1"/></assembly>"#).unwrap_err();
        assert!(matches!(err, RefError::MalformedPayload(_)));
        let err = DeployableDescription::from_xml(
            r#"<deployable uuid="D1"><assemblies><assembly name="x"/></assemblies></deployable>"#,
        )
        .unwrap_err();
        assert!(matches!(err, RefError::MalformedPayload(_)));
    }

    #[test]
    fn wrong_root_is_malformed() {
        assert!(DeployableDescription::from_xml(ASSEMBLY).is_err());
        assert!(AssemblyDescription::from_xml(DEPLOYABLE).is_err());
        assert!(AssemblyDescription::from_xml("").is_err());
        assert!(AssemblyDescription::from_xml("not xml <<<").is_err());
    }

    #[test]
    fn invalid_uuid_is_malformed() {
        let err = AssemblyDescription::from_xml(r#"<assembly uuid="a/b"><template uuid="T1"/></assembly>"#)
            .unwrap_err();
        assert!(matches!(err, RefError::MalformedPayload(_)));
    }

    #[test]
    fn deployable_without_assemblies_is_valid() {
        let d = DeployableDescription::from_xml(r#"<deployable uuid="D1"/>"#).unwrap();
        assert!(d.assembly_ids.is_empty());
    }

    #[test]
    fn duplicate_assemblies_collapse() {
        let xml = r#"<deployable uuid="D1"><assemblies>
            <assembly uuid="A1"/><assembly uuid="A2"/><assembly uuid="A1"/>
        </assemblies></deployable>"#;
        let d = DeployableDescription::from_xml(xml).unwrap();
        assert_eq!(d.assembly_ids, vec![id("A1"), id("A2")]);
    }

    #[test]
    fn json_shape() {
        let a: AssemblyDescription =
            serde_json::from_str(r#"{"id": "A1", "template_id": "T1"}"#).unwrap();
        assert_eq!(a, AssemblyDescription::new(id("A1"), id("T1")));
        assert!(serde_json::from_str::<AssemblyDescription>(r#"{"id": "A1"}"#).is_err());
    }

    #[test]
    fn duplicate_assemblies_collapse_in_json() {
        let d: DeployableDescription =
            serde_json::from_str(r#"{"id": "D1", "name": "site", "assembly_ids": ["A1", "A2", "A1"]}"#).unwrap();
        assert_eq!(d.assembly_ids, vec![id("A1"), id("A2")]);
        assert_eq!(d.name.as_deref(), Some("site"));

        let bare: DeployableDescription = serde_json::from_str(r#"{"id": "D2"}"#).unwrap();
        assert!(bare.assembly_ids.is_empty());
        assert_eq!(bare.name, None);
    }
}
