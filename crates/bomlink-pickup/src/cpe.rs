//! CPE 2.3 identifiers and vendor substitution.
//!
//! Yocto recipes usually publish CPEs with a wildcard vendor
//! (`cpe:2.3:a:*:zlib:1.2.13:...`). A [`VendorLookup`] can fill it in; the
//! [`CpeCatalog`] implementation does so from an NVD CPE dictionary export by
//! matching reference URLs against the recipe's homepage and download URL.

use std::fmt;

use serde::Deserialize;
use tracing::debug;

use crate::error::{PickupError, PickupResult};

/// Prefix of an application CPE 2.3 formatted string.
pub const CPE_APP_PREFIX: &str = "cpe:2.3:a:";

/// A parsed application CPE.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cpe {
    pub vendor: String,
    pub product: String,
    /// Remaining components (version, update, ...), unparsed.
    pub rest: Vec<String>,
}

impl Cpe {
    pub fn parse(s: &str) -> PickupResult<Self> {
        let body = s
            .strip_prefix(CPE_APP_PREFIX)
            .ok_or_else(|| PickupError::InvalidCpe(s.to_string()))?;
        let mut parts = body.split(':');
        let vendor = parts.next().unwrap_or_default();
        let product = parts.next().unwrap_or_default();
        if vendor.is_empty() || product.is_empty() {
            return Err(PickupError::InvalidCpe(s.to_string()));
        }
        Ok(Self {
            vendor: vendor.to_string(),
            product: product.to_string(),
            rest: parts.map(String::from).collect(),
        })
    }

    pub fn has_wildcard_vendor(&self) -> bool {
        self.vendor == "*"
    }
}

impl fmt::Display for Cpe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CPE_APP_PREFIX}{}:{}", self.vendor, self.product)?;
        for part in &self.rest {
            write!(f, ":{part}")?;
        }
        Ok(())
    }
}

/// Guesses the CPE vendor of a product.
pub trait VendorLookup: Send + Sync {
    fn guess_vendor(
        &self,
        product: &str,
        homepage: Option<&str>,
        download_url: Option<&str>,
    ) -> Option<String>;
}

/// Never guesses; CPEs pass through unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoVendorLookup;

impl VendorLookup for NoVendorLookup {
    fn guess_vendor(&self, _: &str, _: Option<&str>, _: Option<&str>) -> Option<String> {
        None
    }
}

/// Substitute a guessed vendor into `cpe` when its vendor is `*`.
pub fn replace_vendor(
    cpe: &str,
    lookup: &dyn VendorLookup,
    homepage: Option<&str>,
    download_url: Option<&str>,
) -> PickupResult<String> {
    let mut parsed = Cpe::parse(cpe)?;
    if parsed.has_wildcard_vendor() {
        if let Some(vendor) = lookup.guess_vendor(&parsed.product, homepage, download_url) {
            debug!(product = %parsed.product, vendor = %vendor, "filled CPE vendor");
            parsed.vendor = vendor;
        }
    }
    Ok(parsed.to_string())
}

/// Returns `true` if both URLs name the same host (case-insensitive, port
/// and credentials ignored).
pub fn same_host(a: &str, b: &str) -> bool {
    match (host_of(a), host_of(b)) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => false,
    }
}

fn host_of(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit('@').next().unwrap_or_default();
    let host = host_port.split(':').next().unwrap_or_default();
    (!host.is_empty()).then_some(host)
}

// ---------------------------------------------------------------
// NVD dictionary
// ---------------------------------------------------------------

/// Offline CPE dictionary in the NVD CPE API 1.0 response shape.
#[derive(Clone, Debug, Default)]
pub struct CpeCatalog {
    entries: Vec<CatalogEntry>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub cpe23_uri: String,
    #[serde(default)]
    pub refs: Vec<CatalogRef>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CatalogRef {
    #[serde(rename = "ref")]
    pub url: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Deserialize)]
struct NvdResponse {
    result: NvdResult,
}

#[derive(Deserialize)]
struct NvdResult {
    #[serde(default)]
    cpes: Vec<CatalogEntry>,
}

impl CpeCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Parse `{"result": {"cpes": [...]}}`.
    pub fn from_nvd_json(bytes: &[u8]) -> PickupResult<Self> {
        let resp: NvdResponse = serde_json::from_slice(bytes)?;
        Ok(Self::new(resp.result.cpes))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl VendorLookup for CpeCatalog {
    /// The vendor of the first entry for `product` with a `Product` reference
    /// on the homepage host or a `Version` reference on the download host.
    fn guess_vendor(
        &self,
        product: &str,
        homepage: Option<&str>,
        download_url: Option<&str>,
    ) -> Option<String> {
        let on_host = |candidate: Option<&str>, url: &str| candidate.is_some_and(|c| same_host(c, url));

        self.entries.iter().find_map(|entry| {
            let cpe = Cpe::parse(&entry.cpe23_uri).ok()?;
            if cpe.product != product {
                return None;
            }
            entry
                .refs
                .iter()
                .any(|r| match r.kind.as_str() {
                    "Product" => on_host(homepage, &r.url),
                    "Version" => on_host(download_url, &r.url),
                    _ => false,
                })
                .then_some(cpe.vendor)
        })
    }
}
