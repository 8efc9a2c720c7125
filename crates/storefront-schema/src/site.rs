//! Storefront site data: the schema the model must satisfy and the typed
//! records downstream code reads.

use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

use crate::record::Record;
use crate::schema::{FieldType, Schema};
use crate::validate::ValidationError;

/// Minimum number of products a site record must carry.
pub const MIN_PRODUCTS: usize = 4;

/// Minimum number of gallery items a site record must carry.
pub const MIN_GALLERY_ITEMS: usize = 6;

static SITE_SCHEMA: LazyLock<Arc<Schema>> = LazyLock::new(|| Arc::new(build_site_schema()));

/// The process-wide site schema.
pub fn site_schema() -> Arc<Schema> {
    Arc::clone(&SITE_SCHEMA)
}

fn strings(name: &str, fields: &[(&str, &str)]) -> Schema {
    fields
        .iter()
        .fold(Schema::builder(name), |builder, (field, doc)| {
            builder.required(*field, FieldType::String).doc(*doc)
        })
        .build()
}

fn build_site_schema() -> Schema {
    let artisan = strings(
        "ArtisanInfo",
        &[
            ("name", "Business or artisan name"),
            ("story", "Brief story about the artisan"),
            ("contact", "Email or contact information"),
            ("address", "Business address"),
            ("phone", "Phone number"),
        ],
    );

    let product = strings(
        "Product",
        &[
            ("id", "Unique product identifier"),
            ("name", "Product name"),
            ("description", "Product description"),
            ("price", "Product price"),
            ("category", "Product category"),
            ("imageUrl", "/images/products/<product-name>.jpg"),
        ],
    );

    let gallery_item = strings(
        "GalleryItem",
        &[
            ("id", "Unique gallery item identifier"),
            ("name", "Gallery item name"),
            ("description", "Gallery item description"),
            ("imageUrl", "/images/gallery/<item-name>.jpg"),
        ],
    );

    let menu_item = strings(
        "MenuItem",
        &[
            ("name", "Menu item name"),
            ("href", "Link target"),
            ("description", "Menu item description"),
        ],
    );

    let social_links = Schema::builder("SocialLinks")
        .optional("facebook", FieldType::String)
        .optional("instagram", FieldType::String)
        .optional("twitter", FieldType::String)
        .optional("website", FieldType::String)
        .build();

    let navigation = Schema::builder("Navigation")
        .required("menuItems", FieldType::sequence(FieldType::record(menu_item)))
        .required("socialLinks", FieldType::record(social_links))
        .build();

    let color_palette = strings(
        "ColorPalette",
        &[
            ("primary", "Primary color"),
            ("secondary", "Secondary color"),
            ("accent", "Accent color"),
            ("background", "Background color"),
            ("text", "Text color"),
            ("muted", "Muted color"),
        ],
    );

    let sizes = strings(
        "TypographySizes",
        &[
            ("h1", "H1 heading size"),
            ("h2", "H2 heading size"),
            ("h3", "H3 heading size"),
            ("body", "Body text size"),
        ],
    );

    let typography = Schema::builder("Typography")
        .required("headingFont", FieldType::String)
        .doc("Google Font family for headings")
        .required("bodyFont", FieldType::String)
        .doc("Google Font family for body text")
        .required("sizes", FieldType::record(sizes))
        .build();

    let logo = strings("Logo", &[("text", "Logo text"), ("tagline", "Logo tagline")]);

    let design_system = Schema::builder("DesignSystem")
        .required("colorPalette", FieldType::record(color_palette))
        .required("typography", FieldType::record(typography))
        .required("brandPersona", FieldType::String)
        .doc("Brand personality description")
        .required("logo", FieldType::record(logo))
        .build();

    let site_settings = Schema::builder("SiteSettings")
        .required("title", FieldType::String)
        .required("description", FieldType::String)
        .required("keywords", FieldType::sequence(FieldType::String))
        .doc("SEO keywords")
        .required("favicon", FieldType::String)
        .required("ogImage", FieldType::String)
        .build();

    Schema::builder("SiteData")
        .required("artisanInfo", FieldType::record(artisan))
        .required(
            "products",
            FieldType::bounded_sequence(FieldType::record(product), MIN_PRODUCTS, None),
        )
        .required(
            "galleryItems",
            FieldType::bounded_sequence(FieldType::record(gallery_item), MIN_GALLERY_ITEMS, None),
        )
        .required("navigation", FieldType::record(navigation))
        .required("designSystem", FieldType::record(design_system))
        .required("siteSettings", FieldType::record(site_settings))
        .build()
}

/// Artisan business information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtisanInfo {
    pub name: String,
    pub story: String,
    pub contact: String,
    pub address: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    pub href: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    pub menu_items: Vec<MenuItem>,
    pub social_links: SocialLinks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorPalette {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub text: String,
    pub muted: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypographySizes {
    pub h1: String,
    pub h2: String,
    pub h3: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    pub heading_font: String,
    pub body_font: String,
    pub sizes: TypographySizes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Logo {
    pub text: String,
    pub tagline: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSystem {
    pub color_palette: ColorPalette,
    pub typography: Typography,
    pub brand_persona: String,
    pub logo: Logo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub favicon: String,
    pub og_image: String,
}

/// Complete site data record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteData {
    pub artisan_info: ArtisanInfo,
    pub products: Vec<Product>,
    pub gallery_items: Vec<GalleryItem>,
    pub navigation: Navigation,
    pub design_system: DesignSystem,
    pub site_settings: SiteSettings,
}

impl SiteData {
    /// Documented default record for when extraction cannot produce one.
    ///
    /// Every value is generic filler derived from the business name; callers
    /// opt into this explicitly.
    pub fn placeholder(business_name: &str) -> Self {
        let name = if business_name.trim().is_empty() {
            "Artisan Studio"
        } else {
            business_name.trim()
        };
        let slug = slugify(name);

        let products = (1..=MIN_PRODUCTS)
            .map(|i| Product {
                id: format!("product-{}", i),
                name: format!("Handmade Piece {}", i),
                description: format!("A one-of-a-kind piece crafted by {}.", name),
                price: format!("${}.00", 20 * i),
                category: "Handmade".to_string(),
                image_url: format!("/images/products/handmade-piece-{}.jpg", i),
            })
            .collect();

        let gallery_items = (1..=MIN_GALLERY_ITEMS)
            .map(|i| GalleryItem {
                id: format!("gallery-{}", i),
                name: format!("Studio Moment {}", i),
                description: "A look inside the workshop.".to_string(),
                image_url: format!("/images/gallery/studio-moment-{}.jpg", i),
            })
            .collect();

        let menu_items = [
            ("Home", "/", "Start here"),
            ("Products", "/products", "Browse the collection"),
            ("Gallery", "/gallery", "See the work"),
            ("About", "/about", "Our story"),
            ("Contact", "/contact", "Get in touch"),
        ]
        .into_iter()
        .map(|(name, href, description)| MenuItem {
            name: name.to_string(),
            href: href.to_string(),
            description: description.to_string(),
        })
        .collect();

        Self {
            artisan_info: ArtisanInfo {
                name: name.to_string(),
                story: format!("{} makes every piece by hand.", name),
                contact: format!("contact@{}.com", slug),
                address: "123 Main Street, Springfield".to_string(),
                phone: "+1-555-555-0100".to_string(),
            },
            products,
            gallery_items,
            navigation: Navigation {
                menu_items,
                social_links: SocialLinks {
                    instagram: Some(format!("https://instagram.com/{}", slug)),
                    ..Default::default()
                },
            },
            design_system: DesignSystem {
                color_palette: ColorPalette {
                    primary: "#8B5E3C".to_string(),
                    secondary: "#D9C5B2".to_string(),
                    accent: "#C0392B".to_string(),
                    background: "#FAF7F2".to_string(),
                    text: "#2E2A26".to_string(),
                    muted: "#8A817C".to_string(),
                },
                typography: Typography {
                    heading_font: "Playfair Display".to_string(),
                    body_font: "Montserrat".to_string(),
                    sizes: TypographySizes {
                        h1: "3rem".to_string(),
                        h2: "2.25rem".to_string(),
                        h3: "1.5rem".to_string(),
                        body: "1rem".to_string(),
                    },
                },
                brand_persona: "Warm, handcrafted and personal".to_string(),
                logo: Logo {
                    text: name.to_string(),
                    tagline: "Made by hand".to_string(),
                },
            },
            site_settings: SiteSettings {
                title: name.to_string(),
                description: format!("Handmade goods from {}", name),
                keywords: vec!["handmade".to_string(), "artisan".to_string()],
                favicon: "/favicon.ico".to_string(),
                og_image: "/images/og-image.jpg".to_string(),
            },
        }
    }

    /// Validate this data against [`site_schema`] and wrap it as a [`Record`].
    pub fn to_record(&self) -> Result<Record, ValidationError> {
        // Plain string-keyed structs always serialize.
        let value = serde_json::to_value(self).unwrap_or_default();
        Record::validate(value, &site_schema())
    }
}

fn slugify(name: &str) -> String {
    let slug: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        "studio".to_string()
    } else {
        slug
    }
}
