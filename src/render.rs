//! Plain-text rendering of a [`DisplayPayload`].
//!
//! This is the presentation layer the daemon ships with: it turns a payload
//! into a few lines of text for the terminal or the log.  Graphical
//! front-ends consume the same [`DisplayEvent`](crate::traits::DisplayEvent)s
//! and draw them however they like.
//!
//! ```text
//! Wheel · #3 Pos3
//!  #1 Pos1  [#3 Pos3]  #5 Pos5   #7 Pos7
//! ```

use crate::grid::PositionItem;
use crate::profile::Layout;
use crate::traits::DisplayPayload;

fn cell(item: &PositionItem) -> String {
    if item.selected {
        format!("[#{} {}]", item.number, item.text)
    } else {
        format!(" #{} {} ", item.number, item.text)
    }
}

/// Render `payload` as text, one line per row.
pub fn render(payload: &DisplayPayload) -> String {
    let p = &payload.presentation;
    let header = format!("{} · #{} {}", payload.profile_name, p.position, p.text);

    match p.layout {
        Layout::Single => header,
        Layout::Vertical => {
            let mut out = header;
            for item in &p.items {
                out.push('\n');
                out.push_str(cell(item).trim_end());
            }
            out
        }
        Layout::Grid => {
            let cells: Vec<String> = p.items.iter().map(cell).collect();
            let width = cells.iter().map(|c| c.chars().count()).max().unwrap_or(0);
            let columns = p.columns.max(1);
            let mut out = header;
            for row in cells.chunks(columns) {
                out.push('\n');
                let line: Vec<String> = row
                    .iter()
                    .map(|c| format!("{:<width$}", c, width = width))
                    .collect();
                out.push_str(line.join(" ").trim_end());
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Presentation;

    fn item(number: usize, text: &str, selected: bool) -> PositionItem {
        PositionItem {
            number,
            text: text.into(),
            selected,
        }
    }

    fn payload(
        layout: Layout,
        items: Vec<PositionItem>,
        rows: usize,
        columns: usize,
    ) -> DisplayPayload {
        DisplayPayload {
            profile_id: "wheel".into(),
            profile_name: "Wheel".into(),
            presentation: Presentation {
                layout,
                position: 3,
                text: "Pos3".into(),
                items,
                rows,
                columns,
            },
        }
    }

    #[test]
    fn single_is_one_line() {
        let text = render(&payload(Layout::Single, Vec::new(), 1, 1));
        assert_eq!(text, "Wheel · #3 Pos3");
    }

    #[test]
    fn vertical_lists_items() {
        let items = vec![item(1, "Pos1", false), item(3, "Pos3", true)];
        let text = render(&payload(Layout::Vertical, items, 2, 1));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["Wheel · #3 Pos3", " #1 Pos1", "[#3 Pos3]"]);
    }

    #[test]
    fn grid_wraps_at_effective_columns() {
        let items = vec![
            item(1, "A", false),
            item(3, "C", true),
            item(5, "E", false),
            item(7, "G", false),
        ];
        let text = render(&payload(Layout::Grid, items, 2, 2));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], " #1 A  [#3 C]");
        assert_eq!(lines[2], " #5 E   #7 G");
    }

    #[test]
    fn empty_grid_is_header_only() {
        let text = render(&payload(Layout::Grid, Vec::new(), 1, 1));
        assert_eq!(text.lines().count(), 1);
    }
}
