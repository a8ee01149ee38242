use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::Chromosome;

/// Keep primary assembly chromosomes and order them karyotypically
///
/// Unplaced, unlocalized and alternate contigs are dropped. Numbered
/// chromosomes come first in numeric order, the rest sort lexically.
pub fn primary_chromosomes(sizes: HashMap<String, u64>) -> Vec<Chromosome> {
    let mut chromosomes: Vec<Chromosome> = sizes
        .into_iter()
        .filter(|(name, _)| is_primary(name))
        .map(|(name, size)| Chromosome { name, size })
        .collect();

    chromosomes.sort_by(|a, b| compare_names(&a.name, &b.name));
    chromosomes
}

#[inline]
fn is_primary(name: &str) -> bool {
    !(name.contains('_') || name.contains("Un") || name.contains("random"))
}

fn compare_names(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches("chr");
    let b = b.trim_start_matches("chr");

    match (a.parse::<u32>(), b.parse::<u32>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_chromosomes_order() {
        let sizes = HashMap::from([
            ("chrX".to_string(), 156040895),
            ("chr10".to_string(), 133797422),
            ("chr2".to_string(), 242193529),
            ("chrM".to_string(), 16569),
            ("chr1".to_string(), 248956422),
            ("chrY".to_string(), 57227415),
        ]);

        let names: Vec<String> = primary_chromosomes(sizes).into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["chr1", "chr2", "chr10", "chrM", "chrX", "chrY"]);
    }

    #[test]
    fn test_primary_chromosomes_drops_contigs() {
        let sizes = HashMap::from([
            ("chr1".to_string(), 248956422),
            ("chr1_KI270706v1_random".to_string(), 175055),
            ("chrUn_GL000195v1".to_string(), 182896),
            ("chr17_KI270857v1_alt".to_string(), 2877074),
        ]);

        let chromosomes = primary_chromosomes(sizes);
        assert_eq!(chromosomes.len(), 1);
        assert_eq!(chromosomes[0], Chromosome { name: "chr1".to_string(), size: 248956422 });
    }
}
