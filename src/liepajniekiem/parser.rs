use super::api::ExtractError;
use super::model::{Event, EventsByCategory};
use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, trace};

const CONTAINER_SELECTOR: &str = "#events";
const ROW_SELECTOR: &str = "#events tr";
const HEADER_TAG: &str = "th";
const CELLS_PER_ROW: usize = 4;

/// Category cell meaning "same category as the row above"
const PLACEHOLDER: &str = "&nbsp;";
const NO_BREAK_SPACE: char = '\u{a0}';

/// Direct child of a table row, as far as event extraction cares
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellNode {
    Text(String),
    Element { tag: String, text: String },
    Unsupported(String),
}

impl CellNode {
    fn from_node(node: &Node, element_ref: Option<ElementRef>) -> Self {
        match node {
            Node::Text(text) => CellNode::Text(trim_ascii_whitespace(text).to_string()),
            Node::Element(element) => CellNode::Element {
                tag: element.name().to_string(),
                text: trim_ascii_whitespace(
                    &element_ref
                        .map(|element| element.text().collect::<String>())
                        .unwrap_or_default(),
                )
                .to_string(),
            },
            Node::Comment(_) => CellNode::Unsupported("comment".to_string()),
            _ => CellNode::Unsupported("non-content node".to_string()),
        }
    }

    fn is_header(&self) -> bool {
        matches!(self, CellNode::Element { tag, .. } if tag == HEADER_TAG)
    }
}

pub fn cell_text(cell: &CellNode) -> Result<&str, ExtractError> {
    match cell {
        CellNode::Text(text) => Ok(text),
        CellNode::Element { text, .. } => Ok(text),
        CellNode::Unsupported(kind) => Err(ExtractError::UnexpectedNodeType(kind.to_string())),
    }
}

/// The parser decodes `&nbsp;`, so a cell of only non-breaking spaces is a placeholder as well.
/// An empty cell is not, it names the category "".
pub fn is_placeholder(category: &str) -> bool {
    category == PLACEHOLDER
        || (!category.is_empty() && category.chars().all(|c| c == NO_BREAK_SPACE))
}

fn trim_ascii_whitespace(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_ascii_whitespace())
}

/// Child nodes of a row, without the whitespace between tags
pub fn row_children(row: ElementRef) -> Vec<CellNode> {
    row.children()
        .filter(|child| match child.value() {
            Node::Text(text) => !trim_ascii_whitespace(text).is_empty(),
            _ => true,
        })
        .map(|child| CellNode::from_node(child.value(), ElementRef::wrap(child)))
        .collect()
}

/// Events collected so far and the category that rows without one belong to
#[derive(Debug, Default)]
struct RowCursor {
    current: Option<String>,
    events: EventsByCategory,
}

impl RowCursor {
    fn consume(mut self, index: usize, cells: &[CellNode]) -> Result<Self, ExtractError> {
        if cells.len() != CELLS_PER_ROW || cells[0].is_header() {
            debug!("Skipping row {} with {} cells", index, cells.len());
            return Ok(self);
        }

        let category = cell_text(&cells[0])?;

        if !is_placeholder(category) {
            self.events.start_category(category);
            self.current = Some(category.to_string());
        }

        let event = Event::new(
            cell_text(&cells[1])?.to_string(),
            cell_text(&cells[2])?.to_string(),
            cell_text(&cells[3])?.to_string(),
        );
        let current = self.current.as_deref().ok_or(ExtractError::MalformedRow)?;

        trace!("Row {} belongs to '{}': {}", index, current, event);

        self.events.push(current, event)?;

        Ok(self)
    }
}

/**
Reads the rows of every events container, in document order, grouping them by category.
Fails when there is no container at all, while a container without rows gives no events.
*/
pub fn extract_events(html: &str) -> Result<EventsByCategory, ExtractError> {
    let document = Html::parse_document(html);
    let container_selector = parse_selector(CONTAINER_SELECTOR)?;
    let row_selector = parse_selector(ROW_SELECTOR)?;

    if document.select(&container_selector).next().is_none() {
        return Err(ExtractError::EmptyResult);
    }

    let cursor = document
        .select(&row_selector)
        .map(row_children)
        .enumerate()
        .try_fold(RowCursor::default(), |cursor, (index, cells)| {
            cursor.consume(index, &cells)
        })?;

    Ok(cursor.events)
}

fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|err| ExtractError::QueryFailure(format!("{:?}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(rows: &str) -> String {
        format!(
            r#"<html><body><div id="events"><table>{}</table></div></body></html>"#,
            rows
        )
    }

    fn row(category: &str, location: &str, description: &str, time: &str) -> String {
        format!(
            "<tr>\n  <td>{}</td>\n  <td>{}</td>\n  <td>{}</td>\n  <td>{}</td>\n</tr>",
            category, location, description, time
        )
    }

    fn event(location: &str, description: &str, time: &str) -> Event {
        Event::new(location.to_string(), description.to_string(), time.to_string())
    }

    #[test_log::test]
    fn should_carry_category_over_placeholder_rows() {
        let html = page(&[
            row("Kino", "Balle", "Filma", "10:00"),
            row("&nbsp;", "Balle", "Multfilma", "12:00"),
            row("&nbsp;", "Balle", "Drāma", "20:00"),
            row("Teātris", "Liepājas teātris", "Izrāde", "19:00"),
        ]
        .concat());

        let events = extract_events(&html).unwrap();

        assert_eq!(events.categories().collect::<Vec<_>>(), vec!["Kino", "Teātris"]);
        assert_eq!(
            events.get("Kino").unwrap(),
            &[
                event("Balle", "Filma", "10:00"),
                event("Balle", "Multfilma", "12:00"),
                event("Balle", "Drāma", "20:00"),
            ]
        );
        assert_eq!(
            events.get("Teātris").unwrap(),
            &[event("Liepājas teātris", "Izrāde", "19:00")]
        );
    }

    #[test_log::test]
    fn when_a_category_reappears_should_append_to_its_first_position() {
        let html = page(&[
            row("Kino", "Balle", "Filma", "10:00"),
            row("Teātris", "Liepājas teātris", "Izrāde", "19:00"),
            row("Kino", "Balle", "Vakara seanss", "21:00"),
        ]
        .concat());

        let events = extract_events(&html).unwrap();

        assert_eq!(events.categories().collect::<Vec<_>>(), vec!["Kino", "Teātris"]);
        assert_eq!(events.get("Kino").unwrap().len(), 2);
    }

    #[test_log::test]
    fn should_skip_rows_without_four_cells_and_keep_the_category() {
        let html = page(&[
            row("Kino", "Balle", "Filma", "10:00"),
            "<tr><td>Koncerti</td><td>Zāle</td><td>20:00</td></tr>".to_string(),
            "<tr><td colspan=\"4\">Reklāma</td></tr>".to_string(),
            row("&nbsp;", "Balle", "Drāma", "20:00"),
        ]
        .concat());

        let events = extract_events(&html).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events.get("Kino").unwrap().len(), 2);
        assert!(events.get("Koncerti").is_none());
    }

    #[test_log::test]
    fn should_skip_header_rows() {
        let html = page(&[
            "<tr><th>Kategorija</th><th>Vieta</th><th>Apraksts</th><th>Laiks</th></tr>"
                .to_string(),
            row("Kino", "Balle", "Filma", "10:00"),
        ]
        .concat());

        let events = extract_events(&html).unwrap();

        assert_eq!(events.categories().collect::<Vec<_>>(), vec!["Kino"]);
        assert_eq!(events.event_count(), 1);
    }

    #[test_log::test]
    fn when_the_first_row_has_a_placeholder_should_fail() {
        let html = page(&row("&nbsp;", "Balle", "Filma", "10:00"));

        let result = extract_events(&html);

        assert!(matches!(result, Err(ExtractError::MalformedRow)), "{:?}", result);
    }

    #[test_log::test]
    fn when_the_category_cell_is_empty_should_start_an_unnamed_category() {
        let html = page(&[
            row("Kino", "Balle", "Filma", "10:00"),
            row("", "Muzejs", "Gleznas", "11:00"),
            row(" ", "Muzejs", "Foto", "12:00"),
        ]
        .concat());

        let events = extract_events(&html).unwrap();

        assert_eq!(events.categories().collect::<Vec<_>>(), vec!["Kino", ""]);
        assert_eq!(events.get("Kino").unwrap().len(), 1);
        assert_eq!(
            events.get("").unwrap(),
            &[
                event("Muzejs", "Gleznas", "11:00"),
                event("Muzejs", "Foto", "12:00"),
            ]
        );
    }

    #[test_log::test]
    fn when_the_first_category_cell_is_empty_should_not_fail() {
        let html = page(&row("", "Muzejs", "Gleznas", "11:00"));

        let events = extract_events(&html).unwrap();

        assert_eq!(events.categories().collect::<Vec<_>>(), vec![""]);
    }

    #[test_log::test]
    fn should_collect_rows_from_every_events_container() {
        let html = format!(
            "{}{}",
            page(&row("Kino", "Balle", "Filma", "10:00")),
            page(&[
                row("&nbsp;", "Balle", "Drāma", "20:00"),
                row("Teātris", "Liepājas teātris", "Izrāde", "19:00"),
            ]
            .concat())
        );

        let events = extract_events(&html).unwrap();

        assert_eq!(events.categories().collect::<Vec<_>>(), vec!["Kino", "Teātris"]);
        assert_eq!(events.get("Kino").unwrap().len(), 2);
    }

    #[test_log::test]
    fn when_there_is_no_events_container_should_fail_with_empty_result() {
        let html = r#"<html><body><table><tr><td>Kino</td><td>a</td><td>b</td><td>c</td></tr></table></body></html>"#;

        let result = extract_events(html);

        assert!(matches!(result, Err(ExtractError::EmptyResult)), "{:?}", result);
    }

    #[test_log::test]
    fn when_the_container_has_no_rows_should_return_no_events() {
        let html = r#"<html><body><div id="events"><p>Šodien nav pasākumu</p></div></body></html>"#;

        let events = extract_events(html).unwrap();

        assert!(events.is_empty());
    }

    #[test_log::test]
    fn should_ignore_rows_outside_the_container() {
        let html = format!(
            "<table>{}</table>{}",
            row("Reklāma", "a", "b", "c"),
            page(&row("Kino", "Balle", "Filma", "10:00"))
        );

        let events = extract_events(&html).unwrap();

        assert_eq!(events.categories().collect::<Vec<_>>(), vec!["Kino"]);
    }

    #[test_log::test]
    fn should_use_the_decoded_text_of_nested_markup() {
        let html = page(&row(
            "<b>Kino</b>",
            "<a href=\"/balle\">Balle</a>",
            "Filma &amp; <i>popkorns</i>",
            "10:00",
        ));

        let events = extract_events(&html).unwrap();

        assert_eq!(
            events.get("Kino").unwrap(),
            &[event("Balle", "Filma & popkorns", "10:00")]
        );
    }

    #[test_log::test]
    fn when_a_cell_is_a_comment_should_fail_with_unexpected_node_type() {
        let html = page(
            "<tr><!-- kategorija --><td>Balle</td><td>Filma</td><td>10:00</td></tr>",
        );

        let result = extract_events(&html);

        assert!(
            matches!(result, Err(ExtractError::UnexpectedNodeType(_))),
            "{:?}",
            result
        );
    }

    #[test_log::test]
    fn should_take_text_from_text_and_element_cells() {
        let text = CellNode::Text("Kino".to_string());
        let element = CellNode::Element {
            tag: "td".to_string(),
            text: "Balle".to_string(),
        };
        let comment = CellNode::Unsupported("comment".to_string());

        assert_eq!(cell_text(&text).unwrap(), "Kino");
        assert_eq!(cell_text(&element).unwrap(), "Balle");
        assert!(matches!(
            cell_text(&comment),
            Err(ExtractError::UnexpectedNodeType(_))
        ));
    }

    #[test_log::test]
    fn should_recognize_placeholders() {
        assert!(is_placeholder("&nbsp;"));
        assert!(is_placeholder("\u{a0}"));
        assert!(is_placeholder("\u{a0}\u{a0}"));
        assert!(!is_placeholder(""));
        assert!(!is_placeholder(" \u{a0}"));
        assert!(!is_placeholder("Kino"));
    }
}
