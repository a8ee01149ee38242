use std::collections::BTreeMap;

use crate::models::GenomeAssembly;

/// Organism used for assemblies that do not name one
pub const UNKNOWN_ORGANISM: &str = "Other";

/// Group assemblies by organism, ordered by id within each group
pub fn group_by_organism<I>(assemblies: I) -> BTreeMap<String, Vec<GenomeAssembly>>
where
    I: IntoIterator<Item = (Option<String>, GenomeAssembly)>,
{
    let mut grouped: BTreeMap<String, Vec<GenomeAssembly>> = BTreeMap::new();

    for (organism, assembly) in assemblies {
        let organism = organism
            .filter(|o| !o.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_ORGANISM.to_string());
        grouped.entry(organism).or_default().push(assembly);
    }

    for group in grouped.values_mut() {
        group.sort_by(|a, b| a.id.cmp(&b.id));
    }

    grouped
}
