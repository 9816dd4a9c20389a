//! Cross-reference matrix
//!
//! A square table keyed by requirement id: cell `(source, target)` holds the
//! type of the link from `source` to `target`. Always derived from link data,
//! never edited in place.

use std::collections::BTreeMap;

use crate::actions::Action;
use crate::models::{LinkType, MatrixResponse, Requirement, RequirementId};
use crate::render::{escape_html, link_type_class};

/// Shown instead of a table when there are no requirements
pub const EMPTY_MATRIX_MESSAGE: &str = "No requirements to display in the matrix.";

/// One cell of the matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// Row and column are the same requirement
    Diagonal,
    /// A link from the row requirement to the column requirement
    Link(LinkType),
    /// No link
    Empty,
}

impl Cell {
    /// Only cells holding a link react to clicks
    pub fn is_clickable(&self) -> bool {
        matches!(self, Cell::Link(_))
    }

    /// Text displayed in the cell
    pub fn label(&self) -> &str {
        match self {
            Cell::Link(link_type) => link_type.keyword(),
            Cell::Diagonal | Cell::Empty => "",
        }
    }

    pub fn css_class(&self) -> String {
        match self {
            Cell::Diagonal => "matrix-cell diagonal".to_string(),
            Cell::Link(link_type) => {
                format!("matrix-cell clickable {}", link_type_class(link_type))
                    .trim_end()
                    .to_string()
            }
            Cell::Empty => "matrix-cell".to_string(),
        }
    }
}

/// Row/column header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixHeader {
    pub id: RequirementId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TraceMatrix {
    headers: Vec<MatrixHeader>,
    rows: Vec<Vec<Cell>>,
}

impl TraceMatrix {
    /// Build from requirements and their nested outgoing links
    pub fn from_requirements(requirements: &[Requirement]) -> Self {
        let mut titles = BTreeMap::new();
        for req in requirements {
            titles.entry(req.id).or_insert_with(|| req.title.clone());
        }

        let mut links: BTreeMap<RequirementId, BTreeMap<RequirementId, LinkType>> =
            BTreeMap::new();
        for req in requirements {
            for link in &req.outgoing_links {
                links
                    .entry(req.id)
                    .or_default()
                    .insert(link.target_requirement_id, link.link_type.clone());
            }
        }

        Self::assemble(titles, &links)
    }

    /// Build from the backend's `/matrix` payload.
    ///
    /// Keys that are not integer ids are ignored.
    pub fn from_response(response: &MatrixResponse) -> Self {
        let mut titles = BTreeMap::new();
        for req in &response.requirements {
            titles.entry(req.id).or_insert_with(|| req.title.clone());
        }

        let mut links: BTreeMap<RequirementId, BTreeMap<RequirementId, LinkType>> =
            BTreeMap::new();
        for (source, targets) in &response.matrix {
            let Ok(source) = source.parse::<RequirementId>() else {
                continue;
            };
            for (target, link_type) in targets {
                if let Ok(target) = target.parse::<RequirementId>() {
                    links
                        .entry(source)
                        .or_default()
                        .insert(target, link_type.clone());
                }
            }
        }

        Self::assemble(titles, &links)
    }

    fn assemble(
        titles: BTreeMap<RequirementId, String>,
        links: &BTreeMap<RequirementId, BTreeMap<RequirementId, LinkType>>,
    ) -> Self {
        // BTreeMap iteration gives ids in ascending order
        let headers: Vec<MatrixHeader> = titles
            .into_iter()
            .map(|(id, title)| MatrixHeader { id, title })
            .collect();

        let rows = headers
            .iter()
            .map(|source| {
                headers
                    .iter()
                    .map(|target| {
                        if source.id == target.id {
                            Cell::Diagonal
                        } else {
                            links
                                .get(&source.id)
                                .and_then(|targets| targets.get(&target.id))
                                .map(|link_type| Cell::Link(link_type.clone()))
                                .unwrap_or(Cell::Empty)
                        }
                    })
                    .collect()
            })
            .collect();

        Self { headers, rows }
    }

    /// Number of rows (and columns)
    pub fn dimension(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn headers(&self) -> &[MatrixHeader] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Requirement ids in row order
    pub fn ids(&self) -> Vec<RequirementId> {
        self.headers.iter().map(|h| h.id).collect()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Cell for the link `source -> target`, by requirement id
    pub fn cell_by_id(&self, source: RequirementId, target: RequirementId) -> Option<&Cell> {
        let row = self.position(source)?;
        let col = self.position(target)?;
        self.cell(row, col)
    }

    fn position(&self, id: RequirementId) -> Option<usize> {
        self.headers.iter().position(|h| h.id == id)
    }

    /// Action for a click on a cell: detail of the target requirement
    pub fn cell_action(&self, row: usize, col: usize) -> Option<Action> {
        match self.cell(row, col)? {
            Cell::Link(_) => Some(Action::OpenDetail(self.headers[col].id)),
            Cell::Diagonal | Cell::Empty => None,
        }
    }

    /// Action for a click on a row or column header
    pub fn header_action(&self, index: usize) -> Option<Action> {
        self.headers
            .get(index)
            .map(|h| Action::OpenDescription(h.id))
    }

    /// Render as an HTML table; empty input renders the placeholder
    pub fn to_html(&self) -> String {
        if self.is_empty() {
            return format!("<p class=\"placeholder\">{}</p>", EMPTY_MATRIX_MESSAGE);
        }

        let header_cell = |index: usize| {
            let header = &self.headers[index];
            format!(
                "<th class=\"matrix-header-clickable\" title=\"{} - click to view the description\" {}>#{}</th>",
                escape_html(&header.title),
                Action::OpenDescription(header.id).to_attrs(),
                header.id
            )
        };

        let mut html = String::from("<table class=\"matrix-table\"><thead><tr><th></th>");
        for index in 0..self.headers.len() {
            html.push_str(&header_cell(index));
        }
        html.push_str("</tr></thead><tbody>");

        for (row_index, row) in self.rows.iter().enumerate() {
            html.push_str("<tr>");
            html.push_str(&header_cell(row_index));
            for (col_index, cell) in row.iter().enumerate() {
                match cell {
                    Cell::Link(link_type) => {
                        let target = self.headers[col_index].id;
                        html.push_str(&format!(
                            "<td class=\"{}\" {} title=\"Click to view requirement #{}\">{}</td>",
                            cell.css_class(),
                            Action::OpenDetail(target).to_attrs(),
                            target,
                            escape_html(link_type.keyword())
                        ));
                    }
                    Cell::Diagonal | Cell::Empty => {
                        html.push_str(&format!("<td class=\"{}\"></td>", cell.css_class()));
                    }
                }
            }
            html.push_str("</tr>");
        }

        html.push_str("</tbody></table>");
        html
    }

    /// Render as an aligned plain-text table (`-` on the diagonal)
    pub fn to_text(&self) -> String {
        if self.is_empty() {
            return format!("{}\n", EMPTY_MATRIX_MESSAGE);
        }

        let labels: Vec<String> = self.headers.iter().map(|h| format!("#{}", h.id)).collect();
        let mut width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        for row in &self.rows {
            for cell in row {
                width = width.max(cell.label().chars().count());
            }
        }
        width = width.max(1);

        let pad = |text: &str| format!("{:<width$}", text, width = width);

        let mut out = pad("");
        for label in &labels {
            out.push_str(" | ");
            out.push_str(&pad(label));
        }
        out.push('\n');

        for (row_index, row) in self.rows.iter().enumerate() {
            out.push_str(&pad(&labels[row_index]));
            for cell in row {
                out.push_str(" | ");
                let text = match cell {
                    Cell::Diagonal => "-",
                    other => other.label(),
                };
                out.push_str(&pad(text));
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::scan_actions;
    use pretty_assertions::assert_eq;

    fn example() -> Vec<Requirement> {
        vec![
            Requirement::new(1, "A").with_link(2, LinkType::parse("depends")),
            Requirement::new(2, "B"),
        ]
    }

    #[test]
    fn test_worked_example() {
        let matrix = TraceMatrix::from_requirements(&example());

        assert_eq!(matrix.dimension(), 2);
        assert_eq!(
            matrix.cell_by_id(1, 2),
            Some(&Cell::Link(LinkType::Other("depends".into())))
        );
        assert_eq!(matrix.cell_by_id(1, 2).unwrap().label(), "depends");
        assert_eq!(matrix.cell_by_id(2, 1), Some(&Cell::Empty));
        assert_eq!(matrix.cell_by_id(1, 1), Some(&Cell::Diagonal));
        assert_eq!(matrix.cell_by_id(2, 2), Some(&Cell::Diagonal));
    }

    #[test]
    fn test_ids_sorted_and_deduplicated() {
        let reqs = vec![
            Requirement::new(10, "J"),
            Requirement::new(3, "C"),
            Requirement::new(7, "G"),
            Requirement::new(3, "C again"),
        ];
        let matrix = TraceMatrix::from_requirements(&reqs);

        assert_eq!(matrix.ids(), vec![3, 7, 10]);
        assert_eq!(matrix.headers()[0].title, "C");
        assert!(matrix.rows().iter().all(|r| r.len() == 3));
    }

    #[test]
    fn test_cells_match_links_exactly() {
        let reqs = vec![
            Requirement::new(1, "A")
                .with_link(2, LinkType::Implements)
                .with_link(3, LinkType::Contradicts),
            Requirement::new(2, "B").with_link(3, LinkType::DependsOn),
            Requirement::new(3, "C"),
        ];
        let matrix = TraceMatrix::from_requirements(&reqs);

        for (i, source) in reqs.iter().enumerate() {
            for (j, target) in reqs.iter().enumerate() {
                let cell = matrix.cell(i, j).unwrap();
                if i == j {
                    assert_eq!(cell, &Cell::Diagonal);
                    assert!(!cell.is_clickable());
                    continue;
                }
                let link = source
                    .outgoing_links
                    .iter()
                    .find(|l| l.target_requirement_id == target.id);
                match link {
                    Some(link) => {
                        assert_eq!(cell.label(), link.link_type.keyword());
                        assert!(cell.is_clickable());
                    }
                    None => assert_eq!(cell, &Cell::Empty),
                }
            }
        }
    }

    #[test]
    fn test_links_to_unknown_requirements_ignored() {
        let reqs = vec![Requirement::new(1, "A").with_link(99, LinkType::Implements)];
        let matrix = TraceMatrix::from_requirements(&reqs);

        assert_eq!(matrix.dimension(), 1);
        assert_eq!(matrix.cell(0, 0), Some(&Cell::Diagonal));
    }

    #[test]
    fn test_self_link_stays_diagonal() {
        let reqs = vec![Requirement::new(1, "A").with_link(1, LinkType::Implements)];
        let matrix = TraceMatrix::from_requirements(&reqs);
        assert_eq!(matrix.cell(0, 0), Some(&Cell::Diagonal));
        assert_eq!(matrix.cell_action(0, 0), None);
    }

    #[test]
    fn test_actions() {
        let matrix = TraceMatrix::from_requirements(&example());

        assert_eq!(matrix.cell_action(0, 1), Some(Action::OpenDetail(2)));
        assert_eq!(matrix.cell_action(1, 0), None);
        assert_eq!(matrix.cell_action(0, 0), None);
        assert_eq!(matrix.header_action(1), Some(Action::OpenDescription(2)));
        assert_eq!(matrix.header_action(5), None);
    }

    #[test]
    fn test_from_response_matches_requirements() {
        let response: MatrixResponse = serde_json::from_value(serde_json::json!({
            "requirements": [
                {"id": 2, "title": "B"},
                {"id": 1, "title": "A"}
            ],
            "matrix": {"1": {"2": "depends"}, "bogus": {"1": "Реализует"}}
        }))
        .unwrap();

        assert_eq!(
            TraceMatrix::from_response(&response),
            TraceMatrix::from_requirements(&example())
        );
    }

    #[test]
    fn test_html() {
        let mut reqs = example();
        reqs[1].title = "<B>".into();
        let html = TraceMatrix::from_requirements(&reqs).to_html();

        assert!(html.starts_with("<table class=\"matrix-table\">"));
        assert_eq!(html.matches("matrix-cell diagonal").count(), 2);
        assert!(html.contains("&lt;B&gt;"));
        assert!(!html.contains("<B>"));
        assert_eq!(
            scan_actions(&html),
            vec![
                Action::OpenDescription(1),
                Action::OpenDescription(2),
                Action::OpenDescription(1),
                Action::OpenDetail(2),
                Action::OpenDescription(2),
            ]
        );
    }

    #[test]
    fn test_empty_renders_placeholder() {
        let matrix = TraceMatrix::from_requirements(&[]);
        assert!(matrix.is_empty());
        assert!(matrix.to_html().contains(EMPTY_MATRIX_MESSAGE));
        assert!(!matrix.to_html().contains("<table"));
        assert_eq!(matrix.to_text(), format!("{}\n", EMPTY_MATRIX_MESSAGE));
    }

    #[test]
    fn test_text() {
        let text = TraceMatrix::from_requirements(&example()).to_text();
        let expected = concat!(
            "        | #1      | #2     \n",
            "#1      | -       | depends\n",
            "#2      |         | -      \n",
        );
        assert_eq!(text, expected);
    }
}
