//! Settings UI renderer
//!
//! Renders the settings modal: filter toggles, search line, the virtualized
//! module list with its scrollbar, and a status line.

use super::drawers::{DrawerRegistry, GroupCanvas};
use super::grouping::ModuleGroup;
use super::state::SettingsPanel;
use crate::view::theme::Theme;
use crate::view::ui::{render_scrollbar, DrawFault, ItemPainter, PassReport, Viewport};
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

/// Empty rows after the last module outside debug mode
pub const TRAILING_SPACE: u16 = 2;

const TOOLBAR_HEIGHT: u16 = 2;
const STATUS_HEIGHT: u16 = 1;

/// Per-frame options for drawing one module group
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupDrawOptions {
    pub show_debug: bool,
    /// Draw every group expanded (search mode)
    pub force_expanded: bool,
    pub hide_single_sections: bool,
    pub selected: bool,
}

/// Draw a whole module group into lines.
///
/// Fails only when the drawn sections do not balance; entry-level draw
/// errors are already replaced by an error line.
pub fn group_lines(
    group: &ModuleGroup,
    drawers: &DrawerRegistry,
    theme: &Theme,
    options: GroupDrawOptions,
) -> Result<Vec<Line<'static>>, DrawFault> {
    let mut canvas = GroupCanvas::new();
    let expanded = options.force_expanded || !group.collapsed();

    let mut header_style = Style::default()
        .fg(theme.module_header)
        .add_modifier(Modifier::BOLD);
    if options.selected {
        header_style = header_style.bg(theme.selection_bg);
    }
    let marker = if expanded { "▼ " } else { "▶ " };
    let mut header = vec![Span::styled(
        format!("{}{}", marker, group.header_text(options.show_debug)),
        header_style,
    )];
    if let Some(website) = &group.website {
        header.push(Span::styled(
            format!("  {}", website),
            Style::default().fg(theme.muted),
        ));
    }
    canvas.push_line(Line::from(header));

    if expanded {
        canvas.begin_section();
        let single = group.categories.len() == 1;
        for category in &group.categories {
            let show_header =
                !category.name.is_empty() && !(options.hide_single_sections && single);
            if show_header {
                canvas.push_line(Line::from(Span::styled(
                    category.name.clone(),
                    Style::default()
                        .fg(theme.category_header)
                        .add_modifier(Modifier::UNDERLINED),
                )));
                canvas.begin_section();
            }

            let label_width = category
                .settings
                .iter()
                .filter(|s| !s.hide_name)
                .map(|s| s.display_name().width())
                .max()
                .unwrap_or(0);
            for entry in &category.settings {
                drawers.draw_entry(entry, theme, label_width, &mut canvas);
            }

            if show_header {
                canvas.end_section();
            }
        }
        canvas.end_section();
    }

    canvas.finish(&group.info.id)
}

/// Word-wrap `text` to `width` columns. Words longer than a line keep a
/// line of their own.
pub fn wrap_words(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.width() + 1 + word.width() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Lines of the visible window, indexed by viewport row
struct ViewportRows {
    viewport: Viewport,
    rows: Vec<Option<Line<'static>>>,
}

impl ViewportRows {
    fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            rows: vec![None; viewport.height as usize],
        }
    }

    /// Place `lines` starting at content row `offset`, keeping the visible ones
    fn place(&mut self, offset: u16, lines: Vec<Line<'static>>) {
        for (i, line) in lines.into_iter().enumerate() {
            let row = offset as usize + i;
            let top = self.viewport.top as usize;
            if row < top {
                continue;
            }
            match self.rows.get_mut(row - top) {
                Some(slot) => *slot = Some(line),
                None => break,
            }
        }
    }
}

struct GroupPainter<'a> {
    drawers: &'a DrawerRegistry,
    theme: &'a Theme,
    options: GroupDrawOptions,
    selected: usize,
    rows: ViewportRows,
}

impl ItemPainter<ModuleGroup> for GroupPainter<'_> {
    fn draw(&mut self, index: usize, group: &ModuleGroup, offset: u16) -> Result<u16, DrawFault> {
        let options = GroupDrawOptions {
            selected: index == self.selected,
            ..self.options
        };
        let lines = group_lines(group, self.drawers, self.theme, options)?;
        let height = u16::try_from(lines.len()).unwrap_or(u16::MAX);
        self.rows.place(offset, lines);
        Ok(height)
    }
}

/// Render the settings modal
pub fn render_settings(
    frame: &mut Frame,
    area: Rect,
    panel: &mut SettingsPanel,
    theme: &Theme,
) -> PassReport {
    // Calculate modal size (80% of screen, max 100 wide, 40 tall)
    let modal_width = (area.width * 80 / 100).min(100);
    let modal_height = (area.height * 80 / 100).min(40);
    let modal_x = area.x + (area.width.saturating_sub(modal_width)) / 2;
    let modal_y = area.y + (area.height.saturating_sub(modal_height)) / 2;
    let modal_area = Rect::new(modal_x, modal_y, modal_width, modal_height);

    frame.render_widget(Clear, modal_area);
    let block = Block::default()
        .title(" Mod Settings ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.panel_border))
        .style(Style::default().bg(theme.panel_bg));
    frame.render_widget(block, modal_area);

    let inner = Rect::new(
        modal_area.x + 1,
        modal_area.y + 1,
        modal_area.width.saturating_sub(2),
        modal_area.height.saturating_sub(2),
    );

    let toolbar_area = Rect::new(inner.x, inner.y, inner.width, TOOLBAR_HEIGHT.min(inner.height));
    render_toolbar(frame, toolbar_area, panel, theme);

    let list_height = inner
        .height
        .saturating_sub(TOOLBAR_HEIGHT + STATUS_HEIGHT);
    let list_area = Rect::new(
        inner.x,
        inner.y + toolbar_area.height,
        inner.width,
        list_height,
    );
    let report = render_list(frame, list_area, panel, theme);

    if inner.height > TOOLBAR_HEIGHT {
        let status_area = Rect::new(inner.x, list_area.y + list_area.height, inner.width, 1);
        render_status(frame, status_area, panel, theme);
    }

    report
}

fn render_toolbar(frame: &mut Frame, area: Rect, panel: &SettingsPanel, theme: &Theme) {
    if area.height == 0 {
        return;
    }
    let filter = panel.filter();
    let toggles = [
        ("Settings", filter.show_settings),
        ("Keybinds", filter.show_keybinds),
        ("Advanced", filter.show_advanced),
        ("Debug", panel.show_debug()),
        ("Only changed", filter.only_changed),
    ];
    let mut spans = Vec::new();
    for (i, (label, on)) in toggles.iter().enumerate() {
        let (checkbox, color) = if *on {
            ("[x]", theme.toggle_on)
        } else {
            ("[ ]", theme.muted)
        };
        spans.push(Span::styled(
            format!("{}{} {}  ", i + 1, checkbox, label),
            Style::default().fg(color),
        ));
    }
    let sort = match filter.sort {
        super::filter::CategorySort::Alphabetical => "Sort: A-Z",
        super::filter::CategorySort::Registration => "Sort: registration",
    };
    spans.push(Span::styled(sort, Style::default().fg(theme.text)));
    frame.render_widget(
        Paragraph::new(Line::from(spans)),
        Rect::new(area.x, area.y, area.width, 1),
    );

    if area.height > 1 {
        let search = Line::from(vec![
            Span::styled("Search: ", Style::default().fg(theme.muted)),
            Span::styled(
                format!("{}_", panel.search()),
                Style::default().fg(theme.text),
            ),
        ]);
        frame.render_widget(
            Paragraph::new(search),
            Rect::new(area.x, area.y + 1, area.width, 1),
        );
    }
}

fn render_list(
    frame: &mut Frame,
    area: Rect,
    panel: &mut SettingsPanel,
    theme: &Theme,
) -> PassReport {
    // Leave one column for the scrollbar
    let text_width = area.width.saturating_sub(1);
    panel.scroll.set_viewport(area.height);

    let tip = panel.tip();
    let tip_lines = tip
        .map(|text| wrap_words(text, text_width as usize))
        .unwrap_or_default();
    if tip.is_some() && !panel.list.header_measured() {
        // Banner plus one blank row
        panel.list.measure_header(tip_lines.len() as u16 + 1);
    }
    let header = panel.header_height();

    // Debug mode always shows the footer, even with an empty module list
    let footer_lines = if panel.show_debug() {
        wrap_words(
            &format!(
                "Modules with no options available: {}",
                panel.discovered().modules_without_settings_label()
            ),
            text_width as usize,
        )
    } else {
        Vec::new()
    };
    let trailer = if footer_lines.is_empty() {
        TRAILING_SPACE
    } else {
        footer_lines.len() as u16
    };

    let viewport = panel.scroll.viewport();
    let options = GroupDrawOptions {
        show_debug: panel.show_debug(),
        force_expanded: panel.filter().is_searching(),
        hide_single_sections: panel.config().hide_single_sections,
        selected: false,
    };
    let mut painter = GroupPainter {
        drawers: &panel.drawers,
        theme,
        options,
        selected: panel.selected(),
        rows: ViewportRows::new(viewport),
    };
    let report = panel
        .list
        .pass(&mut panel.groups, header, trailer, viewport, &mut painter);
    let mut rows = painter.rows;

    if header > 0 {
        rows.place(
            0,
            tip_lines
                .into_iter()
                .map(|l| Line::from(Span::styled(l, Style::default().fg(theme.muted))))
                .collect(),
        );
    }
    rows.place(
        report.items_end,
        footer_lines
            .into_iter()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(theme.muted))))
            .collect(),
    );

    panel.scroll.set_content_height(report.content_height);

    for (i, line) in rows.rows.into_iter().enumerate() {
        if let Some(line) = line {
            let row_area = Rect::new(area.x, area.y + i as u16, text_width, 1);
            frame.render_widget(Paragraph::new(line), row_area);
        }
    }

    if panel.scroll.needs_scrollbar() && area.width > 0 {
        let scrollbar_area = Rect::new(area.x + text_width, area.y, 1, area.height);
        render_scrollbar(
            frame,
            scrollbar_area,
            &panel.scroll.to_scrollbar_state(),
            theme,
        );
    }

    report
}

fn render_status(frame: &mut Frame, area: Rect, panel: &SettingsPanel, theme: &Theme) {
    let line = match panel.status() {
        Some(status) => {
            let color = if status.is_error { theme.error } else { theme.text };
            Line::from(Span::styled(status.text.clone(), Style::default().fg(color)))
        }
        None => Line::from(Span::styled(
            format!(
                "{} close  Ctrl-E expand/collapse all  Ctrl-X export  Ctrl-I import  Ctrl-R reset",
                panel.hotkey()
            ),
            Style::default().fg(theme.muted),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}
