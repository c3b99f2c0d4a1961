//! The site configuration document and its partial-update form

use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// Number of links the navbar must hold at the point of write
pub const NAVBAR_LEN: usize = 3;

/// The single header/navbar/footer document. All three sections must be
/// present to decode; fields inside `header` and `footer` fall back to
/// their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfiguration {
    pub header: Header,
    pub navbar: Vec<NavLink>,
    pub footer: Footer,
}

/// Site header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub image_url: String,
}

/// A navbar entry. Fields default to empty so malformed stored documents
/// still decode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NavLink {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub url: String,
}

/// Footer contact details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footer {
    #[serde(default = "default_email")]
    pub email: String,
    #[serde(default = "default_phone")]
    pub phone: String,
    #[serde(default = "default_address")]
    pub address: String,
}

fn default_title() -> String {
    "My Site".to_string()
}

fn default_email() -> String {
    "hello@example.com".to_string()
}

fn default_phone() -> String {
    "000-000-0000".to_string()
}

fn default_address() -> String {
    "123 Example St".to_string()
}

impl Default for Header {
    fn default() -> Self {
        Self {
            title: default_title(),
            image_url: String::new(),
        }
    }
}

impl Default for Footer {
    fn default() -> Self {
        Self {
            email: default_email(),
            phone: default_phone(),
            address: default_address(),
        }
    }
}

impl Default for SiteConfiguration {
    /// The synthesized document returned whenever nothing is stored
    fn default() -> Self {
        Self {
            header: Header::default(),
            navbar: vec![
                NavLink::new("Home", "/"),
                NavLink::new("About", "/about"),
                NavLink::new("Contact", "/contact"),
            ],
            footer: Footer::default(),
        }
    }
}

impl NavLink {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }

    /// Whether the url is absolute http(s) or site-relative
    pub fn has_safe_url(&self) -> bool {
        is_linkable(&self.url)
    }
}

/// Link targets the site renders: `http://`, `https://` or a `/` path
pub fn is_linkable(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://") || url.starts_with('/')
}

impl SiteConfiguration {
    /// Check the write-time invariants. Header title may be empty here;
    /// stricter form checks belong to the dashboard.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_navbar(&self.navbar)
    }

    /// Apply a partial update in place
    pub fn apply(&mut self, update: SiteUpdate) {
        if let Some(header) = update.header {
            if let Some(title) = header.title {
                self.header.title = title;
            }
            if let Some(image_url) = header.image_url {
                self.header.image_url = image_url;
            }
        }

        if let Some(navbar) = update.navbar {
            self.navbar = navbar;
        }

        if let Some(footer) = update.footer {
            if let Some(email) = footer.email {
                self.footer.email = email;
            }
            if let Some(phone) = footer.phone {
                self.footer.phone = phone;
            }
            if let Some(address) = footer.address {
                self.footer.address = address;
            }
        }
    }
}

/// Validate a navbar: exactly three links, each with a label and a url
pub fn validate_navbar(navbar: &[NavLink]) -> Result<(), ValidationError> {
    if navbar.len() != NAVBAR_LEN {
        return Err(ValidationError::NavbarLength(navbar.len()));
    }

    for (index, link) in navbar.iter().enumerate() {
        if link.label.is_empty() || link.url.is_empty() {
            return Err(ValidationError::IncompleteLink { index });
        }
    }

    Ok(())
}

/// Partial update of the document. `None` means "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteUpdate {
    pub header: Option<HeaderUpdate>,
    pub navbar: Option<Vec<NavLink>>,
    pub footer: Option<FooterUpdate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderUpdate {
    pub title: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FooterUpdate {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl SiteUpdate {
    /// Update only the header image
    pub fn image_url(url: impl Into<String>) -> Self {
        Self {
            header: Some(HeaderUpdate {
                image_url: Some(url.into()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.header.is_none() && self.navbar.is_none() && self.footer.is_none()
    }
}

impl From<SiteConfiguration> for SiteUpdate {
    /// An update that provides every field
    fn from(config: SiteConfiguration) -> Self {
        Self {
            header: Some(HeaderUpdate {
                title: Some(config.header.title),
                image_url: Some(config.header.image_url),
            }),
            navbar: Some(config.navbar),
            footer: Some(FooterUpdate {
                email: Some(config.footer.email),
                phone: Some(config.footer.phone),
                address: Some(config.footer.address),
            }),
        }
    }
}
