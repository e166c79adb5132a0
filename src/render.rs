//! Display blocks for service listings
//!
//! A closed set of render variants over the cache manager's read API: a
//! single service card, a per-category table, and the full collection
//! (optionally grouped by category). All variants consume read-only data;
//! empty data renders an explicit notice rather than an error.

use crate::api::ServiceSource;
use crate::cache::CacheManager;
use crate::data::{Category, Service};

/// Shown when a requested service id does not exist
pub const NOTICE_SERVICE_NOT_FOUND: &str = "Service not found.";

/// Shown when a category has no services
pub const NOTICE_EMPTY_CATEGORY: &str = "No services found in this category.";

/// Shown when no service data is available at all
pub const NOTICE_NO_SERVICES: &str = "No services available.";

/// Shown when no category data is available at all
pub const NOTICE_NO_CATEGORIES: &str = "No categories available.";

/// Column toggles for table rendering
#[derive(Debug, Clone)]
pub struct TableOptions {
    /// Include the description column
    pub show_description: bool,
    /// Include the duration column
    pub show_duration: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            show_description: false,
            show_duration: true,
        }
    }
}

/// The display block variants the application can produce
#[derive(Debug, Clone)]
pub enum ServiceBlock {
    /// One service rendered as a card
    Single { service_id: String },
    /// All services in one category as a table
    Category { category_id: String },
    /// The full listing, optionally grouped by category
    Collection { group_by_category: bool },
}

impl ServiceBlock {
    /// Renders this block from cached data
    ///
    /// Only the cache manager's read operations are used; upstream failures
    /// have already been absorbed below this layer, so the worst case here
    /// is an empty-data notice.
    pub async fn render<S: ServiceSource>(
        &self,
        cache: &CacheManager<S>,
        options: &TableOptions,
    ) -> String {
        match self {
            ServiceBlock::Single { service_id } => match cache.get_service(service_id).await {
                Some(service) => render_service_card(&service),
                None => NOTICE_SERVICE_NOT_FOUND.to_string(),
            },
            ServiceBlock::Category { category_id } => {
                let services = cache.get_services_by_category(category_id).await;
                if services.is_empty() {
                    return NOTICE_EMPTY_CATEGORY.to_string();
                }

                let categories = cache.get_categories(false).await;
                let title = categories
                    .iter()
                    .find(|category| category.id == *category_id)
                    .map(|category| category.name.clone())
                    .unwrap_or_default();

                render_services_table(&services, &title, options)
            }
            ServiceBlock::Collection { group_by_category } => {
                let services = cache.get_services(false).await;
                if services.is_empty() {
                    return NOTICE_NO_SERVICES.to_string();
                }

                if *group_by_category {
                    let categories = cache.get_categories(false).await;
                    render_grouped_collection(&services, &categories, options)
                } else {
                    render_services_table(&services, "", options)
                }
            }
        }
    }
}

/// Renders a single service as a card
pub fn render_service_card(service: &Service) -> String {
    let mut out = String::new();
    out.push_str(&service.name);
    out.push('\n');

    if let Some(ref description) = service.description {
        if !description.is_empty() {
            out.push_str(description);
            out.push('\n');
        }
    }

    out.push_str(&format_price(service));
    if let Some(duration) = service.duration {
        out.push_str(&format!("  ({} min)", duration));
    }
    out.push('\n');

    out
}

/// Renders services as an aligned text table with an optional title
pub fn render_services_table(services: &[Service], title: &str, options: &TableOptions) -> String {
    let mut header = vec!["Service".to_string()];
    if options.show_description {
        header.push("Description".to_string());
    }
    if options.show_duration {
        header.push("Duration".to_string());
    }
    header.push("Price".to_string());

    let mut rows = vec![header];
    for service in services {
        let mut row = vec![service.name.clone()];
        if options.show_description {
            row.push(service.description.clone().unwrap_or_default());
        }
        if options.show_duration {
            let duration = match service.duration {
                Some(minutes) => format!("{} min", minutes),
                None => "—".to_string(),
            };
            row.push(duration);
        }
        row.push(format_price(service));
        rows.push(row);
    }

    let columns = rows[0].len();
    let mut widths = vec![0usize; columns];
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    if !title.is_empty() {
        out.push_str(title);
        out.push('\n');
    }

    for row in &rows {
        let mut line = String::new();
        for (i, cell) in row.iter().enumerate() {
            line.push_str(cell);
            if i + 1 < columns {
                let padding = widths[i] - cell.chars().count() + 2;
                line.extend(std::iter::repeat(' ').take(padding));
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// Renders the full listing grouped by category
///
/// Categories appear in their listing order, each as a titled table;
/// services whose category is missing from the category listing collect
/// under a trailing "Other" table. Empty categories are skipped.
pub fn render_grouped_collection(
    services: &[Service],
    categories: &[Category],
    options: &TableOptions,
) -> String {
    let mut out = String::new();

    let mut uncategorized: Vec<Service> = Vec::new();
    let mut grouped: Vec<(&Category, Vec<Service>)> =
        categories.iter().map(|category| (category, Vec::new())).collect();

    for service in services {
        let slot = service.category_id.as_deref().and_then(|id| {
            grouped
                .iter_mut()
                .find(|(category, _)| category.id == id)
        });
        match slot {
            Some((_, bucket)) => bucket.push(service.clone()),
            None => uncategorized.push(service.clone()),
        }
    }

    for (category, bucket) in &grouped {
        if bucket.is_empty() {
            continue;
        }
        out.push_str(&render_services_table(bucket, &category.name, options));
        out.push('\n');
    }

    if !uncategorized.is_empty() {
        out.push_str(&render_services_table(&uncategorized, "Other", options));
        out.push('\n');
    }

    out
}

/// Renders categories as an aligned text table
pub fn render_categories_table(categories: &[Category]) -> String {
    if categories.is_empty() {
        return NOTICE_NO_CATEGORIES.to_string();
    }

    let mut rows = vec![[
        "ID".to_string(),
        "Name".to_string(),
        "Slug".to_string(),
    ]];
    for category in categories {
        rows.push([
            category.id.clone(),
            category.name.clone(),
            category.slug.clone(),
        ]);
    }

    let mut widths = [0usize; 3];
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in &rows {
        let mut line = String::new();
        for (i, cell) in row.iter().enumerate() {
            line.push_str(cell);
            if i + 1 < row.len() {
                let padding = widths[i] - cell.chars().count() + 2;
                line.extend(std::iter::repeat(' ').take(padding));
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// Formats a service price, including ranges
///
/// Amounts are rounded to whole units and grouped with spaces; RUB renders
/// as the ruble sign, other currencies as their code. A `price_max` above
/// the base price renders as a range.
pub fn format_price(service: &Service) -> String {
    let symbol = if service.currency == "RUB" {
        "₽".to_string()
    } else {
        service.currency.clone()
    };

    match service.price_max {
        Some(max) if max > service.price => format!(
            "{} – {} {}",
            format_amount(service.price),
            format_amount(max),
            symbol
        ),
        _ => format!("{} {}", format_amount(service.price), symbol),
    }
}

/// Formats an amount as a whole number with space-separated thousands
fn format_amount(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.abs().to_string();

    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    if rounded < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
