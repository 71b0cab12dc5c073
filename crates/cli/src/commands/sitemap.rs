//! Sitemap generation.
//!
//! Static pages first (daily, priority 1.0 for the root and 0.8 otherwise),
//! then one weekly entry per product at `/products/<slug>` stamped with the
//! product's `updated_at`.

use std::error::Error;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde::Deserialize;
use tracing::info;

use techspec_storefront::backend::{Backend, RestBackend, Query, fetch_all};

use super::{CommandError, Key, backend_config};

/// Used when `SITE_URL` is not set.
pub const DEFAULT_SITE_URL: &str = "https://techspecdev.vercel.app";

const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Paths of the static pages, relative to the site root.
pub const STATIC_PAGES: &[&str] = &["", "/about", "/contact"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFreq {
    Daily,
    Weekly,
}

impl ChangeFreq {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }
}

impl fmt::Display for ChangeFreq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `<url>` element.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: DateTime<Utc>,
    pub changefreq: ChangeFreq,
    pub priority: f32,
}

/// The columns the sitemap needs from `products`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductStamp {
    pub slug: String,
    pub updated_at: DateTime<Utc>,
}

/// Build the entries for `base_url`, with static pages stamped `now`.
#[must_use]
pub fn entries(base_url: &str, now: DateTime<Utc>, products: &[ProductStamp]) -> Vec<SitemapEntry> {
    let base = base_url.trim_end_matches('/');

    let pages = STATIC_PAGES.iter().map(|page| SitemapEntry {
        loc: format!("{base}{page}"),
        lastmod: now,
        changefreq: ChangeFreq::Daily,
        priority: if page.is_empty() { 1.0 } else { 0.8 },
    });
    let products = products.iter().map(|product| SitemapEntry {
        loc: format!("{base}/products/{}", product.slug),
        lastmod: product.updated_at,
        changefreq: ChangeFreq::Weekly,
        priority: 0.8,
    });

    pages.chain(products).collect()
}

/// Render entries as a sitemap document.
///
/// # Errors
///
/// Returns `CommandError::Xml` if the document cannot be written.
pub fn render(entries: &[SitemapEntry]) -> Result<String, CommandError> {
    write_urlset(entries).map_err(CommandError::Xml)
}

fn write_urlset(entries: &[SitemapEntry]) -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("urlset").with_attributes([("xmlns", SITEMAP_NAMESPACE)]),
    ))?;

    for entry in entries {
        let lastmod = entry.lastmod.to_rfc3339_opts(SecondsFormat::Millis, true);
        let priority = format!("{:.1}", entry.priority);

        writer.write_event(Event::Start(BytesStart::new("url")))?;
        writer
            .create_element("loc")
            .write_text_content(BytesText::new(&entry.loc))?;
        writer
            .create_element("lastmod")
            .write_text_content(BytesText::new(&lastmod))?;
        writer
            .create_element("changefreq")
            .write_text_content(BytesText::new(entry.changefreq.as_str()))?;
        writer
            .create_element("priority")
            .write_text_content(BytesText::new(&priority))?;
        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;
    let mut xml = String::from_utf8(writer.into_inner())?;
    xml.push('\n');
    Ok(xml)
}

/// Read every product's slug and modification time.
///
/// # Errors
///
/// Returns the backend error if the listing fails.
pub async fn product_stamps(backend: &dyn Backend) -> Result<Vec<ProductStamp>, CommandError> {
    let query = Query::table("products").select("slug, updated_at");
    Ok(fetch_all(backend, &query).await?)
}

/// Generate the sitemap and write it to `out`.
///
/// # Errors
///
/// Returns an error if configuration is missing, the product listing fails
/// or the file cannot be written.
pub async fn generate(out: &Path, site_url: Option<&str>) -> Result<(), CommandError> {
    let backend = RestBackend::new(backend_config(Key::Anon)?);
    let products = product_stamps(&backend).await?;

    let entries = entries(site_url.unwrap_or(DEFAULT_SITE_URL), Utc::now(), &products);
    let xml = render(&entries)?;

    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(out, xml).await?;

    info!(path = %out.display(), urls = entries.len(), products = products.len(), "Sitemap generated");
    Ok(())
}
