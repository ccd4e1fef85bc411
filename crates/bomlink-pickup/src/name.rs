/// Yocto package name prefixes and the component names they map to in the
/// compliance database.
const NAME_CONVERSIONS: &[(&str, &str)] = &[("kernel", "linux")];

/// The compliance-database component name for a Yocto package.
///
/// The first table entry whose key prefixes `name` wins, and every
/// occurrence of the key is replaced.
pub fn component_name(name: &str) -> String {
    NAME_CONVERSIONS
        .iter()
        .find(|(from, _)| name.starts_with(from))
        .map(|(from, to)| name.replace(from, to))
        .unwrap_or_else(|| name.to_string())
}
