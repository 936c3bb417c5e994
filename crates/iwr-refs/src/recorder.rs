//! Writes back-references onto templates.
//!
//! Recording is the only mutation this layer performs. Each write sets a
//! single `referenced_by_<id>` attribute, so repeating a call rewrites the
//! same value and is safe to retry. Writes are not transactional: a failure
//! part way through a deployable leaves the earlier writes in place.

use tracing::{debug, info};

use iwr_types::{BackReference, EntityId, EntityType, TypeTag};

use crate::error::Result;
use crate::handle::ObjectHandle;
use crate::payload::{AssemblyDescription, DeployableDescription};
use crate::resolver::ReferenceResolver;
use crate::types::{RecordReport, Relation};

/// Records assemblies and deployables as back-references on templates.
#[derive(Clone, Debug)]
pub struct ReferenceRecorder {
    resolver: ReferenceResolver,
}

impl ReferenceRecorder {
    pub fn new(resolver: ReferenceResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &ReferenceResolver {
        &self.resolver
    }

    /// Mark the assembly's template with `referenced_by_<assembly>=assembly`.
    ///
    /// The template is read first; a missing template fails with `NotFound`
    /// and nothing is written.
    pub async fn record_assembly(&self, assembly: &AssemblyDescription) -> Result<RecordReport> {
        let template = ObjectHandle::load(
            self.resolver.store().as_ref(),
            EntityType::Template,
            &assembly.template_id,
        )
        .await?;

        self.write(&template, &assembly.id, TypeTag::Assembly).await?;

        let mut report = RecordReport::new(Relation::new(EntityType::Assembly, assembly.id.clone()));
        report
            .targets
            .push(Relation::new(EntityType::Template, template.id().clone()));
        Ok(report)
    }

    /// Mark every template referenced by one of the deployable's assemblies
    /// with `referenced_by_<deployable>=deployable`.
    ///
    /// An assembly that no template references yet contributes nothing; it
    /// must be recorded before the deployable that uses it.
    pub async fn record_deployable(&self, deployable: &DeployableDescription) -> Result<RecordReport> {
        let mut report =
            RecordReport::new(Relation::new(EntityType::Deployable, deployable.id.clone()));

        for assembly in &deployable.assembly_ids {
            let matches = self.resolver.templates_referencing(assembly).await?;
            report.skipped += matches.skipped;

            if matches.items.is_empty() {
                debug!(
                    deployable = %deployable.id,
                    %assembly,
                    "no template references assembly; nothing recorded"
                );
                continue;
            }

            for template in &matches.items {
                if report.targets.iter().any(|t| &t.id == template.id()) {
                    continue;
                }
                self.write(template, &deployable.id, TypeTag::Deployable).await?;
                report
                    .targets
                    .push(Relation::new(EntityType::Template, template.id().clone()));
            }
        }

        Ok(report)
    }

    async fn write(&self, target: &ObjectHandle, referrer: &EntityId, tag: TypeTag) -> Result<()> {
        let name = BackReference::attribute_name_for(referrer);
        self.resolver
            .store()
            .put_attribute(target.entity(), target.id(), &name, tag.as_str())
            .await?;
        info!(
            target = %target.id(),
            collection = %target.entity(),
            %referrer,
            tag = tag.as_str(),
            "recorded back-reference"
        );
        Ok(())
    }
}
