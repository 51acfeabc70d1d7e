use serde::{Deserialize, Serialize};

/// Location reported by the simulated GPS fix.
pub const GPS_FIX: &str = "San Francisco, CA";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Food,
    Entertainment,
    Culture,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub rating: f32,
    pub price_range: &'static str,
    pub category: Category,
    pub tags: &'static [&'static str],
}

pub static SUGGESTIONS: [Suggestion; 6] = [
    Suggestion {
        id: "1",
        name: "The Local Kitchen",
        description: "Farm-to-table restaurant featuring seasonal ingredients and local craft beers.",
        rating: 4.7,
        price_range: "$$",
        category: Category::Food,
        tags: &["American", "Farm-to-Table", "Craft Beer"],
    },
    Suggestion {
        id: "2",
        name: "Spice Route",
        description: "Authentic Indian cuisine with traditional tandoor dishes and vegetarian options.",
        rating: 4.5,
        price_range: "$",
        category: Category::Food,
        tags: &["Indian", "Vegetarian", "Lunch"],
    },
    Suggestion {
        id: "3",
        name: "The Blue Note",
        description: "Intimate jazz club featuring live performances Thursday-Sunday.",
        rating: 4.8,
        price_range: "$$",
        category: Category::Entertainment,
        tags: &["Jazz", "Live Music", "Cocktails"],
    },
    Suggestion {
        id: "4",
        name: "City Center Cinema",
        description: "Independent cinema showing classic films and new releases.",
        rating: 4.3,
        price_range: "$",
        category: Category::Entertainment,
        tags: &["Movies", "Indie", "Snacks"],
    },
    Suggestion {
        id: "5",
        name: "Heritage Museum",
        description: "Local history museum featuring artifacts from the region's founding.",
        rating: 4.6,
        price_range: "$",
        category: Category::Culture,
        tags: &["History", "Museum", "Family-Friendly"],
    },
    Suggestion {
        id: "6",
        name: "Art Walk Gallery",
        description: "Contemporary art gallery showcasing local and regional artists.",
        rating: 4.4,
        price_range: "Free",
        category: Category::Culture,
        tags: &["Art", "Gallery", "Free"],
    },
];

pub fn suggestions_for(category: Category) -> Vec<&'static Suggestion> {
    SUGGESTIONS.iter().filter(|s| s.category == category).collect()
}

/// Trimmed location text, or `None` when nothing usable was typed.
pub fn normalize_location(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
