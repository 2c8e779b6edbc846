use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use moodchat_core::{CLEAR_PROMPT, MessageNode, Scroll, Theme};
use crate::app::{App, InputMode};

/// Colors for one theme
struct Palette {
    bg: Color,
    text: Color,
    dim: Color,
    border: Color,
    user: Color,
    bot: Color,
    error: Color,
    badge: Color,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            bg: Color::Rgb(19, 19, 20),
            text: Color::Rgb(227, 227, 227),
            dim: Color::Rgb(130, 130, 135),
            border: Color::Rgb(70, 70, 75),
            user: Color::Cyan,
            bot: Color::Rgb(140, 170, 255),
            error: Color::Rgb(229, 88, 101),
            badge: Color::White,
        },
        Theme::Light => Palette {
            bg: Color::Rgb(250, 250, 250),
            text: Color::Rgb(34, 34, 34),
            dim: Color::Rgb(120, 120, 120),
            border: Color::Rgb(200, 200, 205),
            user: Color::Rgb(0, 110, 140),
            bot: Color::Rgb(60, 90, 200),
            error: Color::Rgb(190, 30, 45),
            badge: Color::Black,
        },
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let p = palette(app.controller.theme());

    frame.render_widget(Block::default().style(Style::default().bg(p.bg).fg(p.text)), area);

    let hero_height = if app.controller.header_hidden() {
        0
    } else {
        app.suggestions.len() as u16 + 4
    };

    let [header_area, hero_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(hero_height),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, &p, frame, header_area);
    if hero_height > 0 {
        render_hero(app, &p, frame, hero_area);
    }
    render_chat(app, &p, frame, chat_area);
    render_input(app, &p, frame, input_area);
    render_footer(app, &p, frame, footer_area);

    if app.show_confirm {
        render_confirm(&p, frame, area);
    }
}

fn render_header(app: &App, p: &Palette, frame: &mut Frame, area: Rect) {
    let mut spans = vec![
        Span::styled(" moodchat ", Style::default().fg(p.bot).bold()),
        Span::styled(
            format!("[t] {} ", app.controller.toggle_label()),
            Style::default().fg(p.dim),
        ),
    ];

    if app.controller.is_generating() {
        spans.push(Span::styled(" ● typing ", Style::default().fg(p.bot)));
    }
    if let Some(status) = &app.status {
        spans.push(Span::styled(format!(" {} ", status), Style::default().fg(p.dim).italic()));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_hero(app: &App, p: &Palette, frame: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(" Hello there,", Style::default().fg(p.bot).bold())),
        Line::from(Span::styled(" How can I help you today?", Style::default().fg(p.dim))),
        Line::default(),
    ];

    let key_style = Style::default().bg(p.border).fg(p.text);
    for (i, suggestion) in app.suggestions.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::raw(" "),
            Span::styled(format!(" {} ", i + 1), key_style),
            Span::raw(" "),
            Span::styled(suggestion.clone(), Style::default().fg(p.text)),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

/// Rows a line takes once wrapped to `width` columns
fn wrapped_height(line_width: usize, width: u16) -> usize {
    if width == 0 {
        return 1;
    }
    line_width.div_ceil(width as usize).max(1)
}

fn loading_bars(count: usize, frame_idx: u8, p: &Palette) -> Line<'static> {
    let mut spans = vec![Span::raw("  ")];
    for i in 0..count {
        let style = if i == frame_idx as usize % count.max(1) {
            Style::default().fg(p.bot)
        } else {
            Style::default().fg(p.border)
        };
        spans.push(Span::styled("▬▬▬▬ ", style));
    }
    Line::from(spans)
}

fn node_lines(
    index: usize,
    node: &MessageNode,
    app: &App,
    p: &Palette,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let outgoing = node.has_class("outgoing");
    let selected = app.selected == Some(index);

    let (label, color) = if outgoing { ("You", p.user) } else { ("Bot", p.bot) };
    let mut header = vec![
        Span::raw(if selected { "▶ " } else { "  " }),
        Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
    ];
    if let Some(icon) = node.copy_icon {
        if !icon.hidden {
            header.push(Span::styled("  [c] copy", Style::default().fg(p.dim)));
        }
    }
    lines.push(Line::from(header));

    if node.loading_bars > 0 {
        lines.push(loading_bars(node.loading_bars, app.animation_frame, p));
    }

    let text_style = if node.has_class("error") {
        Style::default().fg(p.error)
    } else {
        Style::default().fg(p.text)
    };
    for text_line in node.text.lines() {
        lines.push(Line::from(Span::styled(format!("  {}", text_line), text_style)));
    }

    if let Some(badge) = &node.badge {
        lines.push(Line::from(Span::styled(
            format!("  {}", "─".repeat(24)),
            Style::default().fg(p.border),
        )));
        lines.push(Line::from(Span::styled(
            format!("  {}", badge),
            Style::default().fg(p.badge).add_modifier(Modifier::BOLD),
        )));
    }

    lines.push(Line::default());
    lines
}

fn render_chat(app: &mut App, p: &Palette, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(p.border))
        .title(" Conversation ");

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    let inner_width = area.width.saturating_sub(2);
    app.chat_height = area.height.saturating_sub(2);

    let nodes = app.controller.nodes();
    let lines: Vec<Line> = if nodes.is_empty() {
        vec![Line::from(Span::styled(
            "  Say something to start the conversation...",
            Style::default().fg(p.dim),
        ))]
    } else {
        nodes
            .iter()
            .enumerate()
            .flat_map(|(i, node)| node_lines(i, node, app, p))
            .collect()
    };

    let total: usize = lines
        .iter()
        .map(|line| wrapped_height(line.width(), inner_width))
        .sum();
    app.total_chat_lines = total.min(u16::MAX as usize) as u16;

    let bottom = app.total_chat_lines.saturating_sub(app.chat_height);
    let offset = match app.controller.scroll() {
        Scroll::Bottom => bottom,
        Scroll::Offset(offset) => offset.min(bottom),
    };

    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((offset, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, p: &Palette, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { p.user } else { p.border };
    let title = if app.controller.is_generating() {
        " Waiting for a reply... "
    } else {
        " Enter a prompt here "
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Keep the cursor visible by scrolling the input horizontally
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .controller
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(p.text))
        .block(input_block);

    frame.render_widget(input, area);

    if editing && !app.show_confirm {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, p: &Palette, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " INSERT ",
    };

    let key_style = Style::default().bg(p.border).fg(p.text);
    let label_style = Style::default().fg(p.dim);

    let mut hints = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    match app.input_mode {
        InputMode::Editing => hints.extend(vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" commands ", label_style),
            Span::styled(" PgUp/PgDn ", key_style),
            Span::styled(" scroll ", label_style),
        ]),
        InputMode::Normal => {
            if !app.controller.header_hidden() {
                hints.extend(vec![
                    Span::styled(format!(" 1-{} ", app.suggestions.len()), key_style),
                    Span::styled(" suggestion ", label_style),
                ]);
            }
            hints.extend(vec![
                Span::styled(" i ", key_style),
                Span::styled(" type ", label_style),
                Span::styled(" j/k ", key_style),
                Span::styled(" select ", label_style),
                Span::styled(" c ", key_style),
                Span::styled(" copy ", label_style),
                Span::styled(" t ", key_style),
                Span::styled(" theme ", label_style),
                Span::styled(" D ", key_style),
                Span::styled(" delete all ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ]);
        }
    }

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

fn render_confirm(p: &Palette, frame: &mut Frame, area: Rect) {
    let popup_width = 40u16.min(area.width.saturating_sub(4));
    let popup_height = 5u16.min(area.height);

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(p.error))
        .style(Style::default().bg(p.bg))
        .title(" Confirm ");

    let key_style = Style::default().bg(p.border).fg(p.text);
    let text = vec![
        Line::from(Span::styled(CLEAR_PROMPT, Style::default().fg(p.text).bold())),
        Line::default(),
        Line::from(vec![
            Span::styled(" y ", key_style),
            Span::styled(" delete  ", Style::default().fg(p.dim)),
            Span::styled(" n ", key_style),
            Span::styled(" keep ", Style::default().fg(p.dim)),
        ]),
    ];

    frame.render_widget(Paragraph::new(text).block(block), popup_area);
}
