//! Structured story document
//!
//! The shape a drafting call returns: a titled story broken into pages of
//! panels, each panel carrying the prompt and ratio its image is generated
//! from. Field names match the drafted JSON document.

use serde::{Deserialize, Serialize};

use crate::config::AspectRatio;

/// A character appearing in the story
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Character name
    pub name: String,

    /// Appearance, age, personality; used to keep renditions consistent
    pub description: String,
}

/// A single panel within a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    /// Order of the panel within its page
    pub panel_number: u32,

    /// Full prompt the panel's image is generated from
    pub image_prompt: String,

    /// Requested aspect ratio for the panel image
    pub image_ratio: AspectRatio,

    /// Dialogue spoken in the panel; empty when there is none
    #[serde(default)]
    pub dialogue: String,
}

/// A page of the comic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Page number; the first page is the cover
    pub page_number: u32,

    /// Panels on this page, in reading order
    pub panels: Vec<Panel>,
}

/// A complete drafted story
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    /// Drafting rationale carried alongside the story itself
    #[serde(default)]
    pub thinking: String,

    /// Story title
    pub title: String,

    /// Narrative summary
    pub content: String,

    /// Visual style shared by every panel
    pub style: String,

    /// Cast of the story
    #[serde(default)]
    pub characters: Vec<Character>,

    /// Pages in order, cover first
    pub pages: Vec<Page>,
}

impl Story {
    /// Cover page, when present
    pub fn cover(&self) -> Option<&Page> {
        self.pages.first()
    }

    /// Total panel count across all pages
    pub fn total_panels(&self) -> usize {
        self.pages.iter().map(|page| page.panels.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_story_json() -> &'static str {
        r#"{
            "thinking": "A short fable about patience.",
            "title": "The Snail Courier",
            "content": "A snail delivers one letter across a garden.",
            "style": "watercolor children's book",
            "characters": [
                { "name": "Moss", "description": "A small snail with a chipped shell." }
            ],
            "pages": [
                {
                    "page_number": 1,
                    "panels": [
                        {
                            "panel_number": 1,
                            "image_prompt": "A garden gate at dawn, a snail at the threshold",
                            "image_ratio": "3:4",
                            "dialogue": ""
                        }
                    ]
                },
                {
                    "page_number": 2,
                    "panels": [
                        {
                            "panel_number": 1,
                            "image_prompt": "The snail crossing a rain puddle",
                            "image_ratio": "16:9",
                            "dialogue": "Almost there."
                        },
                        {
                            "panel_number": 2,
                            "image_prompt": "The letter handed to a sparrow",
                            "image_ratio": "1:1",
                            "dialogue": "For you."
                        }
                    ]
                }
            ]
        }"#
    }

    #[test]
    fn test_story_parses_drafted_document() {
        let story: Story = serde_json::from_str(sample_story_json()).unwrap();

        assert_eq!(story.title, "The Snail Courier");
        assert_eq!(story.characters.len(), 1);
        assert_eq!(story.pages.len(), 2);
        assert_eq!(story.total_panels(), 3);
        assert_eq!(story.pages[1].panels[0].image_ratio, AspectRatio::WideLandscape);
        assert_eq!(story.cover().unwrap().page_number, 1);
    }

    #[test]
    fn test_story_round_trip() {
        let story: Story = serde_json::from_str(sample_story_json()).unwrap();
        let json = serde_json::to_string(&story).unwrap();
        let restored: Story = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, story);
    }

    #[test]
    fn test_missing_dialogue_defaults_empty() {
        let panel: Panel = serde_json::from_str(
            r#"{ "panel_number": 1, "image_prompt": "a door", "image_ratio": "1:1" }"#,
        )
        .unwrap();
        assert_eq!(panel.dialogue, "");
    }
}
