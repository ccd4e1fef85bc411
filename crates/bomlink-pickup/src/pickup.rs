//! Walks an image manifest and assembles [`Component`]s.

use tracing::{debug, info, warn};

use bomlink_spdx::{NameIndex, Resolver, SpdxError};

use crate::component::Component;
use crate::config::DeployConfig;
use crate::cpe::{replace_vendor, NoVendorLookup, VendorLookup};
use crate::error::PickupResult;
use crate::manifest::{Manifest, ManifestEntry};
use crate::package::PackageLocator;

/// Component collection for one image build.
///
/// Owns the SPDX [`Resolver`] for the run, so documents shared between
/// packages (recipes, build dependencies) are loaded once.
pub struct Pickup {
    config: DeployConfig,
    locator: PackageLocator,
    resolver: Option<Resolver>,
    vendors: Box<dyn VendorLookup>,
}

impl Pickup {
    /// Prepare a run. A deploy tree without SPDX output is accepted; its
    /// components simply carry no license metadata.
    pub fn open(config: DeployConfig) -> PickupResult<Self> {
        config.validate()?;
        let locator = PackageLocator::new(&config.deploy_dir, config.package_type)?;

        let resolver = match NameIndex::from_deploy_dir(&config.deploy_dir, &[config.machine.as_str()]) {
            Ok(index) => Some(Resolver::new(index)),
            Err(SpdxError::PartitionNotFound { path }) => {
                warn!(path = %path.display(), "no SPDX output; continuing without license metadata");
                None
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            config,
            locator,
            resolver,
            vendors: Box::new(NoVendorLookup),
        })
    }

    /// Use `vendors` to fill wildcard CPE vendors.
    pub fn with_vendor_lookup(mut self, vendors: Box<dyn VendorLookup>) -> Self {
        self.vendors = vendors;
        self
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    pub fn locator(&self) -> &PackageLocator {
        &self.locator
    }

    /// The run's resolver, when SPDX output exists.
    pub fn resolver(&self) -> Option<&Resolver> {
        self.resolver.as_ref()
    }

    /// Collect every package listed in the image manifest, in manifest order.
    pub fn components(&mut self) -> PickupResult<Vec<Component>> {
        let manifest = Manifest::read(&self.config.manifest_path())?;
        info!(
            image = %self.config.image,
            machine = %self.config.machine,
            packages = manifest.len(),
            "collecting image components"
        );

        let mut components = Vec::with_capacity(manifest.len());
        for entry in manifest.entries() {
            components.push(self.component(entry)?);
        }
        Ok(components)
    }

    fn component(&mut self, entry: &ManifestEntry) -> PickupResult<Component> {
        let path = self
            .locator
            .find_package(&entry.name, &entry.version, &entry.arch)?;
        let mut component = Component {
            name: entry.name.clone(),
            version: entry.version.clone(),
            arch: entry.arch.clone(),
            path,
            ..Default::default()
        };
        if !component.is_source_package() {
            component.src_path = self.locator.find_source(&entry.name, &entry.arch);
        }
        if !component.is_license_package() {
            component.license_path = self.locator.find_license(&entry.name, &entry.arch);
        }

        self.attach_spdx(&mut component)?;
        debug!(name = %component.name, spdx = component.has_spdx_metadata(), "component");
        Ok(component)
    }

    /// Fill license and recipe fields from the package's SPDX document.
    fn attach_spdx(&mut self, component: &mut Component) -> PickupResult<()> {
        let Some(resolver) = self.resolver.as_mut() else {
            return Ok(());
        };

        let doc = match resolver.resolve_package(&component.name) {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                debug!(name = %component.name, "no SPDX document for package");
                return Ok(());
            }
            Err(SpdxError::MalformedDocument { path, reason }) => {
                warn!(
                    name = %component.name,
                    path = %path.display(),
                    reason = %reason,
                    "skipping SPDX metadata"
                );
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        component.license = doc.primary_package().license_declared.clone();

        let Some(recipe_doc) = resolver.generated_from(doc.namespace()) else {
            return Ok(());
        };
        let recipe = recipe_doc.primary_package();
        component.recipe = Some(recipe.name.clone());
        component.description = recipe.description.clone();
        component.homepage = recipe.homepage.clone();
        component.download_url = recipe.download_url().map(String::from);
        component.recipe_license = recipe.license_declared.clone();

        if let Some(cpe) = recipe.security_ref() {
            let locator = &cpe.reference_locator;
            component.cpe_id = Some(
                match replace_vendor(
                    locator,
                    self.vendors.as_ref(),
                    component.homepage.as_deref(),
                    component.download_url.as_deref(),
                ) {
                    Ok(filled) => filled,
                    Err(e) => {
                        debug!(cpe = %locator, error = %e, "keeping CPE as published");
                        locator.clone()
                    }
                },
            );
        }
        Ok(())
    }
}
