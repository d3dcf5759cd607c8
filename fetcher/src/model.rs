use serde::{Deserialize, Serialize};
use std::fmt;

/// A single fetched record, identified only by its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
}

impl Item {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// One decoded page of the remote collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub results: Vec<Item>,
}

impl Page {
    /// Cursor of the following page. Both `null` and `""` mean this is the last page.
    pub fn next_cursor(&self) -> Option<&str> {
        self.next.as_deref().filter(|next| !next.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_api_page_and_ignores_extra_fields() {
        let body = r#"{
            "count": 82,
            "next": "https://swapi.dev/api/people/?page=2&format=json",
            "previous": null,
            "results": [
                {"name": "Luke Skywalker", "height": "172"},
                {"name": "C-3PO", "height": "167"}
            ]
        }"#;

        let page: Page = serde_json::from_str(body).unwrap();
        assert_eq!(
            page.results,
            vec![Item::new("Luke Skywalker"), Item::new("C-3PO")]
        );
        assert_eq!(
            page.next_cursor(),
            Some("https://swapi.dev/api/people/?page=2&format=json")
        );
    }

    #[test]
    fn null_and_empty_cursor_mean_last_page() {
        let null_next: Page = serde_json::from_str(r#"{"next": null, "results": []}"#).unwrap();
        assert_eq!(null_next.next_cursor(), None);

        let empty_next: Page = serde_json::from_str(r#"{"next": "", "results": []}"#).unwrap();
        assert_eq!(empty_next.next_cursor(), None);

        let missing: Page = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.next_cursor(), None);
        assert!(missing.results.is_empty());
    }
}
