//! Prompt template registry.
//!
//! Templates are plain text with `{{ name }}` placeholders and no logic. Each
//! declares the inputs it requires; rendering checks them before substitution
//! so a forgotten binding fails loudly instead of producing a half-filled
//! prompt.

use std::collections::BTreeMap;

use minijinja::{Environment, UndefinedBehavior};
use storefront_schema::Language;

/// Input bindings for a template render.
pub type Bindings = BTreeMap<String, String>;

pub const DATA_EXTRACTION: &str = "data_extraction";
pub const COMPONENT_GENERATION: &str = "component_generation";
pub const PAGE_GENERATION: &str = "page_generation";
pub const LAYOUT_GENERATION: &str = "layout_generation";
pub const CSS_GENERATION: &str = "css_generation";

/// A named prompt template.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    /// Registry key
    pub name: &'static str,

    /// Inputs that must be bound, in the order they are checked
    pub required: &'static [&'static str],

    /// System instruction sent alongside the rendered prompt
    pub system_prompt: &'static str,

    /// Language of the output the prompt asks for
    pub language: Language,

    /// Template text
    pub source: &'static str,
}

/// Errors that can occur when rendering a template.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TemplateError {
    #[error("Unknown prompt template: {0}")]
    UnknownTemplate(String),

    #[error("Template '{template}' requires binding '{binding}'")]
    MissingBinding { template: String, binding: String },

    #[error("Invalid template '{template}': {message}")]
    Invalid { template: String, message: String },

    #[error("Failed to render template '{template}': {message}")]
    Render { template: String, message: String },
}

/// Registry of prompt templates backed by minijinja.
pub struct PromptRegistry {
    env: Environment<'static>,
    templates: Vec<PromptTemplate>,
}

impl PromptRegistry {
    /// Create a registry holding the built-in storefront templates.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for template in builtin_templates() {
            registry
                .register(template)
                .expect("built-in prompt templates are valid");
        }
        registry
    }

    /// Create a registry with no templates.
    pub fn empty() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_keep_trailing_newline(true);
        Self {
            env,
            templates: Vec::new(),
        }
    }

    /// Add or replace a template.
    pub fn register(&mut self, template: PromptTemplate) -> Result<(), TemplateError> {
        self.env
            .add_template(template.name, template.source)
            .map_err(|e| TemplateError::Invalid {
                template: template.name.to_string(),
                message: e.to_string(),
            })?;

        self.templates.retain(|t| t.name != template.name);
        self.templates.push(template);
        Ok(())
    }

    /// Look up a template by name.
    pub fn get(&self, name: &str) -> Option<&PromptTemplate> {
        self.templates.iter().find(|t| t.name == name)
    }

    /// Registered template names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.templates.iter().map(|t| t.name).collect()
    }

    /// Render `name` with `bindings`.
    pub fn render(&self, name: &str, bindings: &Bindings) -> Result<String, TemplateError> {
        let template = self
            .get(name)
            .ok_or_else(|| TemplateError::UnknownTemplate(name.to_string()))?;

        if let Some(missing) = template
            .required
            .iter()
            .find(|input| !bindings.contains_key(**input))
        {
            return Err(TemplateError::MissingBinding {
                template: name.to_string(),
                binding: missing.to_string(),
            });
        }

        let render_error = |e: minijinja::Error| TemplateError::Render {
            template: name.to_string(),
            message: e.to_string(),
        };

        self.env
            .get_template(name)
            .map_err(render_error)?
            .render(bindings)
            .map_err(render_error)
    }
}

impl Default for PromptRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a [`Bindings`] map from key/value pairs.
pub fn bindings<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Bindings
where
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

fn builtin_templates() -> Vec<PromptTemplate> {
    vec![
        PromptTemplate {
            name: DATA_EXTRACTION,
            required: &["description"],
            system_prompt: DATA_EXTRACTION_SYSTEM,
            language: Language::Json,
            source: DATA_EXTRACTION_TEMPLATE,
        },
        PromptTemplate {
            name: COMPONENT_GENERATION,
            required: &["component_name", "site_data"],
            system_prompt: TSX_SYSTEM,
            language: Language::Tsx,
            source: COMPONENT_TEMPLATE,
        },
        PromptTemplate {
            name: PAGE_GENERATION,
            required: &["page_name", "site_data"],
            system_prompt: PAGE_SYSTEM,
            language: Language::Tsx,
            source: PAGE_TEMPLATE,
        },
        PromptTemplate {
            name: LAYOUT_GENERATION,
            required: &["site_data"],
            system_prompt: PAGE_SYSTEM,
            language: Language::Tsx,
            source: LAYOUT_TEMPLATE,
        },
        PromptTemplate {
            name: CSS_GENERATION,
            required: &["design_system"],
            system_prompt: CSS_SYSTEM,
            language: Language::Css,
            source: CSS_TEMPLATE,
        },
    ]
}

const DATA_EXTRACTION_SYSTEM: &str = "You are an expert data extraction assistant. \
Return strictly valid JSON without markdown formatting or explanatory text.";

const TSX_SYSTEM: &str = "You are an expert React and TypeScript developer. \
Generate only valid TSX code without markdown formatting, explanations or code fences.";

const PAGE_SYSTEM: &str = "You are an expert Next.js developer. \
Generate only valid TSX code without markdown formatting, explanations or code fences.";

const CSS_SYSTEM: &str = "You are a CSS expert. \
Generate only valid CSS without markdown formatting, explanations or code fences.";

const DATA_EXTRACTION_TEMPLATE: &str = r#"You are a data analyst.
A local artisan has described their business:
"{{ description }}"

Extract structured data for their storefront website and return it as a single JSON object.

Guidance:
- If contact details are not given, create professional ones from the business name
  (contact@<businessname>.com, a realistic address, a phone number like +1-XXX-XXX-XXXX).
- navigation.menuItems must include Home (/), Products (/products), Gallery (/gallery),
  About (/about) and Contact (/contact).
- Choose a color palette that suits the products and style described.
- Pick Google Fonts that match the brand personality.
- Provide at least 4 products and at least 6 gallery items.
- Product images use /images/products/<product-name>.jpg, gallery images use
  /images/gallery/<item-name>.jpg.
- Include plausible social media links based on the business name.
- Include SEO keywords related to the business.
"#;

const COMPONENT_TEMPLATE: &str = r#"You are an expert React + TypeScript + Tailwind developer.

Create a {{ component_name }} component that:
- Uses data from the site data below
- Takes typed props (artisanInfo, products, galleryItems, designSystem, navigation as needed)
- Uses designSystem.colorPalette for every color and designSystem.typography for fonts
- Is fully responsive

Constraints:
- Follow Next.js App Router conventions; add "use client" at the top if you use hooks
- Import Link from "next/link" and Image from "next/image"
- Define explicit prop interfaces
- Only import from "next/*", "@/components" or "@/data"; site data lives in "@/data/products.json"
- No external UI libraries
- Output a single .tsx file with no markdown, no comments and no code fences

Site data:
{{ site_data }}

Component: {{ component_name }}
"#;

const PAGE_TEMPLATE: &str = r#"You are an expert Next.js developer.

Create the {{ page_name }} page that:
- Loads site data from "@/data/products.json"
- Uses artisanInfo, products, galleryItems, designSystem and navigation from that data
- Styles with designSystem.colorPalette and designSystem.typography
- Uses navigation.menuItems for internal links
- Is responsive, accessible and exports SEO metadata

Constraints:
- A single App Router page as one .tsx file
- Only import the existing components ProductCard, Navbar, Footer and ContactForm from "@/components"
- No libraries beyond Next.js, React and Tailwind
- Output only TSX with no markdown, no comments and no code fences

Site data:
{{ site_data }}

Page: {{ page_name }}
"#;

const LAYOUT_TEMPLATE: &str = r#"You are an expert Next.js developer.

Create app/layout.tsx that:
- Imports data from "@/data/products.json" and destructures artisanInfo, designSystem, navigation and siteSettings
- Sets metadata title and description from siteSettings
- Loads Google Fonts with next/font/google (Playfair_Display and Montserrat unless the design system says otherwise)
- Exposes the fonts through the static CSS variables "--font-heading" and "--font-body"
- Renders Navbar and Footer from "@/components", passing artisanInfo, designSystem and navigation

Constraints:
- Follow App Router layout conventions and export RootLayout with proper typing
- Output only TSX with no markdown, no comments and no code fences

Site data:
{{ site_data }}
"#;

const CSS_TEMPLATE: &str = r#"You are a TailwindCSS expert.

Create app/globals.css that:
- Starts with: @tailwind base; @tailwind components; @tailwind utilities;
- Defines :root variables for the color palette (--color-primary, --color-secondary, ...)
- Defines --font-heading and --font-body from the typography
- Enables smooth scrolling on html
- Adds a few utility classes built on those variables
- Uses the exact values from the design system

Output only CSS with no markdown, no comments and no code fences.

Design system:
{{ design_system }}
"#;
