//! TUI rendering.
//!
//! ┌──────────────────────────────────────────────┐
//! │  trackview   6 trackers   debug off   #412   │
//! ├─────────────────────┬────────────────────────┤
//! │  IMU                │  IMU 0 (udp://...)     │
//! │  ▸ IMU 0     ok     │  CHEST      BACK       │
//! │    IMU 1     ok     │  Ping: 4    Signal: .. │
//! │  HMD                │  TPS: 99.8             │
//! │    HMD       ok     │  Status: ok Battery: ..│
//! │  Computed           │  Rotation: .. Raw: ..  │
//! │    Computed  ok     │                        │
//! ├─────────────────────┴────────────────────────┤
//! │  ↑↓ select  d: debug  p/m: edit  s: snapshot │
//! └──────────────────────────────────────────────┘

use super::app::App;
use ratatui::{prelude::*, widgets::*};
use trackview_core::{Field, PanelRow, PanelState};

pub fn draw(f: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Min(10),   // main
            Constraint::Length(1), // message
            Constraint::Length(1), // keys
        ])
        .split(f.area());

    draw_title(f, rows[0], app);
    draw_main(f, rows[1], app);
    draw_message(f, rows[2], app);
    draw_keys(f, rows[3]);
}

fn draw_title(f: &mut Frame, area: Rect, app: &App) {
    let model = app.model();
    let debug = if model.debug() { "on" } else { "off" };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Line::from(vec![
            Span::styled(" trackview ", Style::default().bold().fg(Color::Cyan)),
            Span::raw(format!("  {} trackers", model.registry().len())),
            Span::raw("  debug "),
            Span::styled(debug, Style::default().bold().fg(Color::Yellow)),
            Span::styled(
                format!(
                    "  #{}  every {}ms ",
                    app.refresh_count(),
                    app.update_delay().as_millis()
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ]));

    f.render_widget(block, area);
}

fn draw_main(f: &mut Frame, area: Rect, app: &App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    draw_tracker_list(f, cols[0], app);
    draw_detail(f, cols[1], app);
}

fn draw_tracker_list(f: &mut Frame, area: Rect, app: &App) {
    let registry = app.model().registry();
    let selected = app.selected_id();

    let items: Vec<Row> = registry
        .rows()
        .into_iter()
        .filter_map(|row| match row {
            PanelRow::Header { title, .. } => Some(
                Row::new(vec![String::new(), title.to_string(), String::new()])
                    .style(Style::default().bold().fg(Color::Cyan)),
            ),
            PanelRow::Tracker(id) => {
                let entry = registry.get(id)?;
                let is_cursor = selected == Some(id);
                let pointer = if is_cursor { "▸" } else { " " };
                let status = entry.panel.value(Field::Status).unwrap_or("").trim_end();

                let style = if is_cursor {
                    Style::default().bg(Color::DarkGray).fg(Color::White)
                } else {
                    match status {
                        "ok" => Style::default().fg(Color::Green),
                        "" => Style::default().fg(Color::White),
                        _ => Style::default().fg(Color::Yellow),
                    }
                };

                Some(
                    Row::new(vec![
                        pointer.to_string(),
                        format!("  {}", entry.name()),
                        status.to_string(),
                    ])
                    .style(style),
                )
            }
        })
        .collect();

    let table = Table::new(
        items,
        [
            Constraint::Length(2),  // pointer
            Constraint::Min(16),    // name
            Constraint::Length(12), // status
        ],
    )
    .block(Block::default().borders(Borders::ALL).title(" Trackers "));

    f.render_widget(table, area);
}

fn draw_detail(f: &mut Frame, area: Rect, app: &App) {
    let Some(entry) = app.selected() else {
        let p = Paragraph::new("Waiting for trackers…")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(" Tracker "));
        f.render_widget(p, area);
        return;
    };

    let rows: Vec<Row> = grid(&entry.panel)
        .into_iter()
        .map(|cells| {
            Row::new(
                cells
                    .into_iter()
                    .enumerate()
                    .map(|(i, text)| {
                        // Even columns hold labels.
                        let style = if i % 2 == 0 {
                            Style::default().fg(Color::DarkGray)
                        } else {
                            Style::default().fg(Color::White)
                        };
                        Cell::from(text).style(style)
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    let kind = entry.caps.kind;
    let adjusted = if entry.caps.reference_adjusted {
        " · adjusted"
    } else {
        ""
    };
    let table = Table::new(
        rows,
        [
            Constraint::Length(11),
            Constraint::Min(16),
            Constraint::Length(9),
            Constraint::Min(16),
        ],
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {kind}{adjusted} ")),
    );

    f.render_widget(table, area);
}

/// Lay a panel out on its label/value grid.
///
/// Fields without a label (name and selectors) put their value in the label
/// column.
pub fn grid(panel: &PanelState) -> Vec<[String; 4]> {
    let mut cells = vec![<[String; 4]>::default(); panel.manifest().row_count() as usize];
    for (slot, value) in panel.iter() {
        let Some(row) = cells.get_mut(slot.row as usize) else {
            continue;
        };
        let col = slot.col as usize;
        let label = slot.field.label();
        if label.is_empty() {
            if let Some(cell) = row.get_mut(col) {
                *cell = value.to_string();
            }
        } else if col + 1 < row.len() {
            row[col] = label.to_string();
            row[col + 1] = value.to_string();
        }
    }
    cells
}

fn draw_message(f: &mut Frame, area: Rect, app: &App) {
    let p = Paragraph::new(app.message().unwrap_or(""))
        .style(Style::default().fg(Color::Yellow));
    f.render_widget(p, area);
}

fn draw_keys(f: &mut Frame, area: Rect) {
    let bar = Paragraph::new(
        " ↑↓ select   d: debug   p: designation   m: mounting   s: snapshot   q: quit",
    )
    .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackview_core::{Capabilities, TrackerKind, build_manifest};

    fn hmd_caps() -> Capabilities {
        Capabilities {
            kind: TrackerKind::Hmd,
            has_position: true,
            has_rotation: true,
            has_battery: false,
            has_tps: false,
            has_signal: false,
            is_imu: false,
            reference_adjusted: false,
            user_editable: false,
        }
    }

    #[test]
    fn grid_places_labels_and_values() {
        let mut panel = PanelState::new(build_manifest(&hmd_caps(), false));
        panel.set(Field::Name, "HMD".into());
        panel.set(Field::Rotation, "   0    0    0 ".into());
        panel.set(Field::Raw, "   0    0    0 ".into());

        let cells = grid(&panel);
        assert_eq!(cells.len() as u16, panel.manifest().row_count());
        assert_eq!(cells[0][0], "HMD");
        let rotation_row = panel.manifest().slot(Field::Rotation).unwrap().row as usize;
        assert_eq!(cells[rotation_row][0], "Rotation:");
        assert_eq!(cells[rotation_row][2], "Raw:");
    }
}
