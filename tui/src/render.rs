//! Rendering
//!
//! Pure functions from [`App`] state to a ratatui [`Frame`]. Nothing here
//! mutates view state except the transcript scroll clamp.

use ratatui::layout::{Constraint, Flex, Layout, Margin, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap};
use ratatui::Frame;
use unicode_width::UnicodeWidthChar;

use policybot_core::surfaces::BackendStatus;
use policybot_core::views::chat::TYPING_INDICATOR;
use policybot_core::views::documents::{DELETE_CONFIRMATION, REFRESHING_INDICATOR};
use policybot_core::views::upload::UPLOADING_INDICATOR;
use policybot_core::{ChatAndDocsApp, DocumentList, DocumentManager, Tab, UploadPanel};

use crate::app::{App, Surface};
use crate::theme::Palette;
use crate::widgets::Transcript;

/// Sidebar width when visible
const SIDEBAR_WIDTH: u16 = 32;

/// Spinner frames for the status bar
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Draw the whole screen
pub fn draw(frame: &mut Frame, app: &mut App) {
    let palette = Palette::for_theme(app.theme());
    let area = frame.area();
    frame.render_widget(Block::default().style(palette.base()), area);

    let [header, body, status] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(area);

    let spinner = SPINNER[app.tick_count() % SPINNER.len()];
    let is_chat = matches!(app.surface(), Surface::Chat(_));
    if is_chat {
        draw_chat_surface(frame, app, palette, header, body);
    }

    match app.surface() {
        Surface::Chat(chat) => {
            let busy = chat.chat().is_loading()
                || chat.upload().is_uploading()
                || chat.documents().is_refreshing();
            draw_status(
                frame,
                palette,
                status,
                chat.backend_status(),
                busy.then_some(spinner),
                CHAT_HINTS,
            );
            if let Some(doc) = chat.documents().pending_confirmation() {
                draw_confirm(frame, palette, area, &doc.name);
            }
        }
        Surface::Manager(manager) => {
            draw_manager(frame, manager, palette, header, body);
            let busy = manager.upload().is_uploading() || manager.documents().is_refreshing();
            draw_status(
                frame,
                palette,
                status,
                manager.backend_status(),
                busy.then_some(spinner),
                MANAGER_HINTS,
            );
            if let Some(doc) = manager.documents().pending_confirmation() {
                draw_confirm(frame, palette, area, &doc.name);
            }
            if let Some(alert) = manager.alert() {
                draw_alert(frame, palette, area, &alert.text);
            }
        }
    }
}

const CHAT_HINTS: &str =
    "Tab switch | Ctrl+B sidebar | Ctrl+T theme | Del delete | F5 refresh | Esc quit";
const MANAGER_HINTS: &str = "Enter select/upload | Del delete | F5 refresh | Esc quit";

// ============================================================================
// Chat surface
// ============================================================================

fn draw_chat_surface(
    frame: &mut Frame,
    app: &mut App,
    palette: Palette,
    header: Rect,
    body: Rect,
) {
    let Surface::Chat(chat) = app.surface() else {
        return;
    };

    let titles = [Tab::Chat, Tab::Upload].map(Tab::title);
    let selected = match chat.tab() {
        Tab::Chat => 0,
        Tab::Upload => 1,
    };
    let [brand, tabs_area] =
        Layout::horizontal([Constraint::Length(12), Constraint::Min(0)]).areas(header);
    frame.render_widget(Paragraph::new(" PolicyBot").style(palette.title()), brand);
    frame.render_widget(
        Tabs::new(titles)
            .select(selected)
            .style(palette.dimmed())
            .highlight_style(palette.title()),
        tabs_area,
    );

    let main = if chat.sidebar_visible() {
        let [sidebar, main] =
            Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(10)])
                .areas(body);
        draw_document_list(frame, chat.documents(), palette, sidebar, "Documents");
        main
    } else {
        body
    };

    match chat.tab() {
        Tab::Chat => draw_chat_tab(frame, app, palette, main),
        Tab::Upload => {
            if let Surface::Chat(chat) = app.surface() {
                draw_upload_tab(frame, chat, palette, main);
            }
        }
    }
}

fn draw_chat_tab(frame: &mut Frame, app: &mut App, palette: Palette, area: Rect) {
    let [count, transcript_area, input_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(3),
    ])
    .areas(area);

    let Some((chat, transcript_state)) = app.chat_and_transcript() else {
        return;
    };
    frame.render_widget(
        Paragraph::new(format!(" {}", chat.document_count_line())).style(palette.dimmed()),
        count,
    );

    let loading = chat.chat().is_loading();
    let transcript = Transcript::new(chat.chat().messages(), palette)
        .busy(loading.then_some(TYPING_INDICATOR));
    frame.render_stateful_widget(
        transcript,
        transcript_area.inner(Margin::new(1, 0)),
        transcript_state,
    );

    let title = if loading { " Waiting for answer " } else { " Ask a question " };
    draw_input(frame, palette, input_area, title, chat.chat().input(), palette.user);
}

fn draw_upload_tab(frame: &mut Frame, chat: &ChatAndDocsApp, palette: Palette, area: Rect) {
    let [input_area, details] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(area);

    draw_input(
        frame,
        palette,
        input_area,
        " File path (Enter to select) ",
        chat.upload().path_input(),
        palette.text,
    );
    frame.render_widget(
        Paragraph::new(upload_lines(chat.upload(), palette, "Enter or Ctrl+U to upload"))
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::NONE)),
        details.inner(Margin::new(1, 1)),
    );
}

fn upload_lines(upload: &UploadPanel, palette: Palette, hint: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    match upload.selection() {
        Some(selection) => {
            lines.push(Line::from(vec![
                Span::styled("Selected: ", palette.dimmed()),
                Span::styled(selection.name.clone(), palette.base()),
            ]));
            if upload.is_uploading() {
                lines.push(Line::styled(UPLOADING_INDICATOR, palette.base().fg(palette.busy)));
            } else {
                lines.push(Line::styled(hint.to_string(), palette.dimmed()));
            }
        }
        None => lines.push(Line::styled("No file selected", palette.dimmed())),
    }

    if !upload.recently_uploaded().is_empty() {
        lines.push(Line::default());
        lines.push(Line::styled("Uploaded this session:", palette.title()));
        for name in upload.recently_uploaded() {
            lines.push(Line::styled(format!("  {name}"), palette.base()));
        }
    }
    lines
}

// ============================================================================
// Document manager
// ============================================================================

fn draw_manager(
    frame: &mut Frame,
    manager: &DocumentManager,
    palette: Palette,
    header: Rect,
    body: Rect,
) {
    frame.render_widget(
        Paragraph::new(" PolicyBot Document Manager").style(palette.title()),
        header,
    );

    let [input_area, upload_area, list_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(3),
    ])
    .areas(body);

    draw_input(
        frame,
        palette,
        input_area,
        " File path (Enter to select) ",
        manager.upload().path_input(),
        palette.text,
    );
    frame.render_widget(
        Paragraph::new(upload_lines(manager.upload(), palette, "Press Enter to upload")),
        upload_area.inner(Margin::new(1, 0)),
    );
    draw_document_list(frame, manager.documents(), palette, list_area, "Uploaded Documents");
}

// ============================================================================
// Shared pieces
// ============================================================================

fn draw_document_list(
    frame: &mut Frame,
    documents: &DocumentList,
    palette: Palette,
    area: Rect,
    title: &str,
) {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.dimmed())
        .title(Span::styled(format!(" {title} "), palette.title()));
    if documents.is_refreshing() {
        block = block.title_bottom(Span::styled(
            format!(" {REFRESHING_INDICATOR} "),
            palette.base().fg(palette.busy),
        ));
    }

    if documents.is_empty() {
        frame.render_widget(
            Paragraph::new("No documents uploaded").style(palette.dimmed()).block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = documents
        .documents()
        .iter()
        .map(|doc| {
            let mut spans = vec![Span::styled(doc.name.clone(), palette.base())];
            if let Some(at) = doc.uploaded_at {
                spans.push(Span::styled(
                    format!("  {}", at.format("%Y-%m-%d %H:%M")),
                    palette.dimmed(),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let mut state = ListState::default().with_selected(Some(documents.cursor()));
    frame.render_stateful_widget(
        List::new(items)
            .block(block)
            .highlight_style(palette.selected())
            .highlight_symbol("> "),
        area,
        &mut state,
    );
}

fn draw_input(
    frame: &mut Frame,
    palette: Palette,
    area: Rect,
    title: &str,
    text: &str,
    color: ratatui::style::Color,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.dimmed())
        .title(Span::styled(title.to_string(), palette.dimmed()));
    let width = usize::from(area.width.saturating_sub(3));
    let visible = tail_fitting(text, width);
    frame.render_widget(
        Paragraph::new(format!("{visible}_"))
            .style(palette.base().fg(color))
            .block(block),
        area,
    );
}

/// The longest suffix of `text` that fits in `width` columns
fn tail_fitting(text: &str, width: usize) -> &str {
    let mut used = 0;
    let mut start = text.len();
    for (idx, c) in text.char_indices().rev() {
        used += c.width().unwrap_or(0);
        if used > width {
            break;
        }
        start = idx;
    }
    &text[start..]
}

fn draw_status(
    frame: &mut Frame,
    palette: Palette,
    area: Rect,
    backend: &BackendStatus,
    spinner: Option<&str>,
    hints: &str,
) {
    let status_style = match backend {
        BackendStatus::Unknown => palette.dimmed(),
        BackendStatus::Reachable(_) if backend.is_healthy() => palette.base().fg(palette.success),
        BackendStatus::Reachable(_) | BackendStatus::Offline => palette.base().fg(palette.error),
    };
    let line = Line::from(vec![
        Span::styled(format!(" {} ", spinner.unwrap_or(" ")), palette.base().fg(palette.busy)),
        Span::styled(format!("backend: {}", backend.label()), status_style),
        Span::styled(format!(" | {hints}"), palette.dimmed()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

fn draw_modal(frame: &mut Frame, palette: Palette, area: Rect, title: &str, lines: Vec<Line<'_>>) {
    let width = area.width.saturating_sub(4).min(60);
    let popup = centered(area, width, 6);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .style(palette.base())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.accent))
                    .title(Span::styled(format!(" {title} "), palette.title())),
            ),
        popup,
    );
}

fn draw_confirm(frame: &mut Frame, palette: Palette, area: Rect, name: &str) {
    draw_modal(
        frame,
        palette,
        area,
        "Confirm",
        vec![
            Line::from(DELETE_CONFIRMATION),
            Line::styled(name.to_string(), palette.dimmed()),
            Line::styled("[y] Yes   [n] No", palette.title()),
        ],
    );
}

fn draw_alert(frame: &mut Frame, palette: Palette, area: Rect, text: &str) {
    draw_modal(
        frame,
        palette,
        area,
        "PolicyBot",
        vec![
            Line::from(text.to_string()),
            Line::default(),
            Line::styled("[Enter] OK", palette.title()),
        ],
    );
}
