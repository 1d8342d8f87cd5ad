//! Data model for the versioned schema document describing games and their
//! community configuration. Only the shape is modeled here; consumers decide
//! what to do with the parsed document.

use rocket::serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SchemaSection {
    pub name: String,
    #[serde(rename = "excludeCategories", default)]
    pub exclude_categories: Vec<String>,
    #[serde(rename = "requireCategories", default)]
    pub require_categories: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SchemaCategory {
    pub label: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SchemaCommunity {
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(default)]
    pub categories: HashMap<String, SchemaCategory>,
    #[serde(default)]
    pub sections: HashMap<String, SchemaSection>,
    #[serde(rename = "discordUrl", default)]
    pub discord_url: Option<String>,
    #[serde(rename = "wikiUrl", default)]
    pub wiki_url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SchemaGameMeta {
    #[serde(rename = "displayName")]
    pub display_name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SchemaGame {
    pub meta: SchemaGameMeta,
    #[serde(default)]
    pub community: Option<SchemaCommunity>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SchemaDocument {
    #[serde(rename = "schemaVersion")]
    pub schema_version: String,
    pub games: HashMap<String, SchemaGame>,
    #[serde(default)]
    pub communities: HashMap<String, SchemaCommunity>,
}

impl SchemaDocument {
    pub fn parse(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_schema_document() {
        let data = r#"{
            "schemaVersion": "0.0.1",
            "games": {
                "riskofrain2": {
                    "meta": {"displayName": "Risk of Rain 2"},
                    "community": {
                        "displayName": "Risk of Rain 2",
                        "categories": {"mods": {"label": "Mods"}},
                        "sections": {
                            "mods": {
                                "name": "Mods",
                                "excludeCategories": ["modpacks"],
                                "requireCategories": ["mods"]
                            }
                        },
                        "discordUrl": "https://discord.gg/example",
                        "wikiUrl": null
                    }
                }
            },
            "communities": {
                "riskofrain2": {
                    "displayName": "Risk of Rain 2",
                    "categories": {},
                    "sections": {},
                    "discordUrl": null,
                    "wikiUrl": null
                }
            }
        }"#;

        let doc = SchemaDocument::parse(data).expect("valid schema document");
        assert_eq!(doc.schema_version, "0.0.1");
        let game = doc.games.get("riskofrain2").expect("game present");
        assert_eq!(game.meta.display_name, "Risk of Rain 2");
        let community = game.community.as_ref().expect("community config");
        assert_eq!(community.categories["mods"].label, "Mods");
        assert_eq!(
            community.sections["mods"].exclude_categories,
            vec!["modpacks"]
        );
        assert!(doc.communities.contains_key("riskofrain2"));
    }

    #[test]
    fn test_parse_rejects_missing_version() {
        let data = r#"{"games": {}, "communities": {}}"#;
        assert!(SchemaDocument::parse(data).is_err());
    }
}
