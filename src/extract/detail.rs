use crate::error::ExtractError;
use crate::fetch::FetchedPage;
use crate::record::Jutsu;
use scraper::{ElementRef, Html, Selector};

/// Title element in the page header
const PAGE_TITLE: &str = "span.mw-page-title-main";

/// Article body container
const CONTENT_CONTAINER: &str = "div.mw-parser-output";

/// Infobox side panel inside the content container
const SIDE_PANEL: &str = "aside";

/// One labelled row of the side panel
const PANEL_ROW: &str = "div.pi-data";

/// Side-panel row whose value is the record category
const CATEGORY_LABEL: &str = "Classification";

/// Section heading that ends the description
const TRIVIA_MARKER: &str = "Trivia";

/// Parses one detail page into a record.
///
/// The side panel is read for the category first and then dropped from
/// the tree, so its text never leaks into the description. Pages
/// without a side panel simply get an empty category.
pub fn parse(page: &FetchedPage) -> Result<Jutsu, ExtractError> {
    let mut doc = Html::parse_document(&page.body);

    let name = extract_title(&doc)?;

    let content_selector = Selector::parse(CONTENT_CONTAINER).unwrap();
    let panel_selector = Selector::parse(SIDE_PANEL).unwrap();

    let (category, panel_id) = {
        let content = doc
            .select(&content_selector)
            .next()
            .ok_or(ExtractError::MissingContent)?;

        match content.select(&panel_selector).next() {
            Some(panel) => (extract_category(panel), Some(panel.id())),
            None => (String::new(), None),
        }
    };

    // Drop the side panel before taking the body text
    if let Some(id) = panel_id {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }

    let content = doc
        .select(&content_selector)
        .next()
        .ok_or(ExtractError::MissingContent)?;
    let description = extract_description(content);

    Ok(Jutsu {
        name,
        category,
        description,
    })
}

/// Extracts the trimmed page title; a blank title counts as missing
fn extract_title(doc: &Html) -> Result<String, ExtractError> {
    let title_selector = Selector::parse(PAGE_TITLE).unwrap();

    let title = doc
        .select(&title_selector)
        .next()
        .ok_or(ExtractError::MissingTitle)?
        .text()
        .collect::<String>();

    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::MissingTitle);
    }

    Ok(trimmed.to_string())
}

/// Scans the side panel rows for the classification value
fn extract_category(panel: ElementRef<'_>) -> String {
    let row_selector = Selector::parse(PANEL_ROW).unwrap();
    let label_selector = Selector::parse("h3").unwrap();
    let value_selector = Selector::parse("div").unwrap();

    for row in panel.select(&row_selector) {
        // Rows without a label are decoration
        let label = match row.select(&label_selector).next() {
            Some(label) => label,
            None => continue,
        };

        if label.text().collect::<String>().trim() != CATEGORY_LABEL {
            continue;
        }

        if let Some(value) = row.select(&value_selector).next() {
            return value.text().collect::<String>().trim().to_string();
        }
    }

    String::new()
}

/// Concatenated body text, trimmed and cut off before the trivia section
fn extract_description(content: ElementRef<'_>) -> String {
    let text = content.text().collect::<String>();
    let trimmed = text.trim();

    match trimmed.find(TRIVIA_MARKER) {
        Some(cut) => trimmed[..cut].trim().to_string(),
        None => trimmed.to_string(),
    }
}
