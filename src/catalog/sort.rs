use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::model::{CategoryDataset, Group};

/// Primary-strength collation key: NFD-decompose, strip combining marks,
/// lowercase. Case and diacritics are both ignored, so "Émile" and "emile"
/// produce the same key. This matches base-sensitivity collation, which is
/// stronger than plain case folding.
pub fn collation_key(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Returns the dataset's groups sorted ascending by name, each with its
/// items sorted ascending by display title, under [`collation_key`].
///
/// Builds new sequences rather than reordering the fetched data in place.
/// The sort is stable, so entries with equal keys keep their input order.
pub fn sorted_groups(dataset: &CategoryDataset) -> Vec<Group> {
    let mut groups: Vec<Group> = dataset
        .groups
        .iter()
        .map(|group| {
            let mut items = group.items.clone();
            items.sort_by_cached_key(|item| collation_key(item.display_title()));
            Group {
                name: group.name.clone(),
                items,
            }
        })
        .collect();
    groups.sort_by_cached_key(|group| collation_key(&group.name));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::model::Item;

    fn group(name: &str, titles: &[&str]) -> Group {
        Group {
            name: name.to_string(),
            items: titles
                .iter()
                .map(|t| Item {
                    url: format!("https://example.com/{}", t),
                    title: Some(t.to_string()),
                    description: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_groups_sort_case_insensitively() {
        let dataset = CategoryDataset {
            groups: vec![group("Banana", &[]), group("apple", &[]), group("Cherry", &[])],
        };

        let sorted = sorted_groups(&dataset);
        let names: Vec<&str> = sorted.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["apple", "Banana", "Cherry"]);
    }

    #[test]
    fn test_items_sort_case_insensitively() {
        let dataset = CategoryDataset {
            groups: vec![group("Tools", &["Zeta", "alpha", "Mango"])],
        };

        let sorted = sorted_groups(&dataset);
        let titles: Vec<&str> = sorted[0]
            .items
            .iter()
            .map(|i| i.title.as_deref().unwrap())
            .collect();
        assert_eq!(titles, ["alpha", "Mango", "Zeta"]);
    }

    #[test]
    fn test_items_without_title_sort_by_url() {
        let dataset = CategoryDataset {
            groups: vec![Group {
                name: "Tools".to_string(),
                items: vec![
                    Item {
                        url: "https://zzz.example.com".to_string(),
                        title: None,
                        description: None,
                    },
                    Item {
                        url: "https://aaa.example.com".to_string(),
                        title: None,
                        description: None,
                    },
                ],
            }],
        };

        let sorted = sorted_groups(&dataset);
        assert_eq!(sorted[0].items[0].url, "https://aaa.example.com");
        assert_eq!(sorted[0].items[1].url, "https://zzz.example.com");
    }

    #[test]
    fn test_diacritics_ignored_at_primary_strength() {
        assert_eq!(collation_key("Émile"), collation_key("emile"));
        assert_eq!(collation_key("Über"), collation_key("uber"));
        // Accented names interleave with their unaccented neighbors
        let dataset = CategoryDataset {
            groups: vec![group("émile", &[]), group("Adele", &[]), group("Ezra", &[])],
        };
        let sorted = sorted_groups(&dataset);
        let names: Vec<&str> = sorted.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["Adele", "émile", "Ezra"]);
    }

    #[test]
    fn test_equal_keys_keep_input_order() {
        let dataset = CategoryDataset {
            groups: vec![group("APPLE", &[]), group("apple", &[]), group("Apple", &[])],
        };

        let sorted = sorted_groups(&dataset);
        let names: Vec<&str> = sorted.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, ["APPLE", "apple", "Apple"]);
    }

    #[test]
    fn test_source_dataset_not_mutated() {
        let dataset = CategoryDataset {
            groups: vec![group("b", &[]), group("a", &[])],
        };

        let _ = sorted_groups(&dataset);
        assert_eq!(dataset.groups[0].name, "b");
        assert_eq!(dataset.groups[1].name, "a");
    }
}
