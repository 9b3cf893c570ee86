use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Placeholder shown when a sweet is created without an image.
pub const DEFAULT_IMAGE_URL: &str = "https://via.placeholder.com/300x200?text=Sweet";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(type_name = "sweet_category", rename_all = "kebab-case")]
pub enum Category {
    Chocolate,
    Candy,
    Gummy,
    Lollipop,
    HardCandy,
    Toffee,
    Other,
}

impl std::str::FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chocolate" => Ok(Category::Chocolate),
            "candy" => Ok(Category::Candy),
            "gummy" => Ok(Category::Gummy),
            "lollipop" => Ok(Category::Lollipop),
            "hard-candy" => Ok(Category::HardCandy),
            "toffee" => Ok(Category::Toffee),
            "other" => Ok(Category::Other),
            _ => Err(()),
        }
    }
}

/// Sweet record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Sweet {
    pub id: Uuid,
    pub name: String,
    pub category: Category,
    pub price: f64,
    pub quantity: i32,
    pub description: Option<String>,
    pub image_url: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_wire_names_are_kebab_case() {
        assert_eq!(
            serde_json::to_string(&Category::HardCandy).unwrap(),
            r#""hard-candy""#
        );
        assert_eq!(
            serde_json::from_str::<Category>(r#""lollipop""#).unwrap(),
            Category::Lollipop
        );
    }

    #[test]
    fn category_parses_every_allowed_value() {
        for raw in [
            "chocolate",
            "candy",
            "gummy",
            "lollipop",
            "hard-candy",
            "toffee",
            "other",
        ] {
            assert!(raw.parse::<Category>().is_ok(), "{raw} should parse");
        }
        assert!("fudge".parse::<Category>().is_err());
        assert!("Chocolate".parse::<Category>().is_err());
    }

    #[test]
    fn sweet_serializes_camel_case() {
        let sweet = Sweet {
            id: Uuid::new_v4(),
            name: "Dark Chocolate Bar".into(),
            category: Category::Chocolate,
            price: 25.99,
            quantity: 100,
            description: None,
            image_url: DEFAULT_IMAGE_URL.into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&sweet).unwrap();
        assert!(json.contains("\"imageUrl\""));
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"updatedAt\""));
        assert!(json.contains("\"category\":\"chocolate\""));
    }
}
