use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use ralt_core::catalog::{self, CATEGORIES, OUTPUT_TYPES, THEME};
use ralt_core::{agent, AgentStatus, Message, MessageKind, Session};
use crate::app::{App, BackendHealth, InputMode};

/// Map a `#RRGGBB` catalog colour to a terminal colour
fn hex(color: &str) -> Color {
    catalog::parse_hex_color(color)
        .map(|(r, g, b)| Color::Rgb(r, g, b))
        .unwrap_or(Color::Gray)
}

/// Render a line of text, turning `**bold**` runs into bold spans. An
/// unmatched `**` is kept as literal text.
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut parts: Vec<String> = text.split("**").map(str::to_string).collect();
    if parts.len() % 2 == 0 {
        // odd number of markers: the last one has no partner
        let tail = parts.pop().unwrap_or_default();
        if let Some(last) = parts.last_mut() {
            last.push_str("**");
            last.push_str(&tail);
        }
    }

    let spans: Vec<Span<'static>> = parts
        .into_iter()
        .enumerate()
        .filter(|(_, part)| !part.is_empty())
        .map(|(i, part)| {
            if i % 2 == 1 {
                Span::styled(part, Style::default().add_modifier(Modifier::BOLD))
            } else {
                Span::raw(part)
            }
        })
        .collect();

    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let [sidebar_area, main_area] = Layout::horizontal([
        Constraint::Length(34),
        Constraint::Min(0),
    ])
    .areas(body_area);

    render_header(app, frame, header_area);
    render_sidebar(app, frame, sidebar_area);
    render_chat(app, frame, main_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let status = app.session.status();
    let status_style = match status {
        AgentStatus::Ready => Style::default().fg(Color::Green).bold(),
        AgentStatus::Processing => Style::default().fg(Color::Yellow).bold(),
    };

    let (health_text, health_color) = match &app.backend_health {
        BackendHealth::Checking => ("backend: checking".to_string(), Color::DarkGray),
        BackendHealth::Online(Some(version)) => (format!("backend: online v{}", version), Color::Green),
        BackendHealth::Online(None) => ("backend: online".to_string(), Color::Green),
        BackendHealth::Offline => ("backend: offline".to_string(), Color::Red),
    };

    let title = Line::from(vec![
        Span::styled(" RALT Agent ", Style::default().fg(hex(THEME.primary)).bold()),
        Span::styled("Professional multimodal agent ", Style::default().fg(Color::Gray)),
        Span::styled(format!("[{}]", status.label()), status_style),
        Span::raw(" "),
        Span::styled(health_text, Style::default().fg(health_color)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(hex(THEME.surface)));
    frame.render_widget(header, area);
}

fn render_sidebar(app: &mut App, frame: &mut Frame, area: Rect) {
    // Two output types per row, plus borders
    let output_rows = OUTPUT_TYPES.len().div_ceil(2) as u16 + 2;
    let [agents_area, outputs_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(output_rows),
    ])
    .areas(area);

    app.agents_area = Some(agents_area);

    let focused = app.input_mode == InputMode::Normal;
    let border_color = if focused { hex(THEME.primary) } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Select Agent ");

    let selected = app.session.selected_agent();
    let items: Vec<ListItem> = agent::descriptors()
        .iter()
        .enumerate()
        .map(|(i, descriptor)| {
            let accent = hex(descriptor.accent);
            let name_style = if descriptor.kind == selected {
                Style::default().fg(accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let tags: Vec<Span> = descriptor
                .capabilities
                .iter()
                .take(2)
                .map(|cap| Span::styled(format!("[{}] ", cap), Style::default().fg(Color::DarkGray)))
                .collect();

            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!("{} ", i + 1), Style::default().fg(Color::DarkGray)),
                    Span::styled("● ", Style::default().fg(accent)),
                    Span::styled(descriptor.name, name_style),
                ]),
                Line::from(Span::styled(
                    format!("    {}", descriptor.description),
                    Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
                )),
                Line::from([vec![Span::raw("    ")], tags].concat()),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(hex(THEME.surface)))
        .highlight_symbol("▌");

    frame.render_stateful_widget(list, agents_area, &mut app.agent_state);

    let output_lines: Vec<Line> = OUTPUT_TYPES
        .chunks(2)
        .map(|pair| {
            let spans: Vec<Span> = pair
                .iter()
                .map(|output| {
                    Span::styled(
                        format!("{} {:<14}", output.icon, output.name),
                        Style::default().fg(hex(output.accent)),
                    )
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    let outputs = Paragraph::new(output_lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Output Types "),
    );
    frame.render_widget(outputs, outputs_area);
}

fn message_lines(msg: &Message) -> Vec<Line<'static>> {
    let time = msg.timestamp.format("%H:%M:%S").to_string();
    let time_span = Span::styled(format!(" {}", time), Style::default().fg(Color::DarkGray));

    let mut lines = Vec::new();
    match msg.kind {
        MessageKind::User => {
            lines.push(Line::from(vec![
                Span::styled("You:", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                time_span,
            ]));
            for line in msg.content.lines() {
                lines.push(Line::from(line.to_string()));
            }
        }
        MessageKind::Agent => {
            let descriptor = msg.agent.unwrap_or_default().descriptor();
            let mut header = vec![
                Span::styled(
                    format!("{}:", descriptor.name),
                    Style::default().fg(hex(descriptor.accent)).add_modifier(Modifier::BOLD),
                ),
                time_span,
            ];
            if let Some(model) = &msg.model_used {
                header.push(Span::styled(format!(" · {}", model), Style::default().fg(Color::DarkGray)));
            }
            lines.push(Line::from(header));
            for line in msg.content.lines() {
                lines.push(parse_markdown_line(line));
            }
        }
        MessageKind::Error => {
            lines.push(Line::from(vec![
                Span::styled("Error:", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
                time_span,
            ]));
            for line in msg.content.lines() {
                lines.push(Line::from(Span::styled(line.to_string(), Style::default().fg(Color::LightRed))));
            }
        }
    }
    lines.push(Line::default());
    lines
}

fn text_width(text: &str) -> usize {
    Span::raw(text).width()
}

/// Word-wrap a styled line into rows no wider than `width`. Leading
/// indentation is kept on the first row; words wider than a row are split.
fn wrap_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return vec![line];
    }
    let line_style = line.style;

    // Words are runs of non-whitespace that may span several styled spans
    let mut words: Vec<Vec<Span<'static>>> = Vec::new();
    let mut word: Vec<Span<'static>> = Vec::new();
    let mut indent = 0;
    let mut leading = true;
    for span in &line.spans {
        let mut piece = String::new();
        for c in span.content.chars() {
            if c.is_whitespace() {
                if leading {
                    indent += 1;
                }
                if !piece.is_empty() {
                    word.push(Span::styled(std::mem::take(&mut piece), span.style));
                }
                if !word.is_empty() {
                    words.push(std::mem::take(&mut word));
                }
            } else {
                leading = false;
                piece.push(c);
            }
        }
        if !piece.is_empty() {
            word.push(Span::styled(piece, span.style));
        }
    }
    if !word.is_empty() {
        words.push(word);
    }

    let mut rows: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut used = 0;
    if indent > 0 && indent < width {
        current.push(Span::raw(" ".repeat(indent)));
        used = indent;
    }
    let mut need_space = false;

    for word in words {
        let word_width: usize = word.iter().map(Span::width).sum();
        if need_space {
            if used + 1 + word_width <= width {
                current.push(Span::raw(" "));
                used += 1;
            } else {
                rows.push(Line::from(std::mem::take(&mut current)).style(line_style));
                used = 0;
            }
        } else if used > 0 && used + word_width > width {
            rows.push(Line::from(std::mem::take(&mut current)).style(line_style));
            used = 0;
        }

        if word_width <= width {
            current.extend(word);
            used += word_width;
        } else {
            for piece in word {
                for c in piece.content.chars() {
                    let mut buf = [0; 4];
                    let w = text_width(c.encode_utf8(&mut buf));
                    if used > 0 && used + w > width {
                        rows.push(Line::from(std::mem::take(&mut current)).style(line_style));
                        used = 0;
                    }
                    current.push(Span::styled(c.to_string(), piece.style));
                    used += w;
                }
            }
        }
        need_space = true;
    }

    if !current.is_empty() || rows.is_empty() {
        rows.push(Line::from(current).style(line_style));
    }
    rows
}

/// Every row of the chat log as drawn at `width` columns, including the
/// progress lines while a request is outstanding.
pub fn chat_lines(session: &Session, animation_frame: u8, width: usize) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = session.messages().iter().flat_map(message_lines).collect();

    if session.is_processing() {
        let descriptor = session.selected_agent().descriptor();
        lines.push(Line::from(Span::styled(
            format!("{}:", descriptor.name),
            Style::default().fg(hex(descriptor.accent)).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Processing{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
        .into_iter()
        .flat_map(|line| wrap_line(line, width))
        .collect()
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area, categories_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    // Store areas for mouse hit-testing and scroll calculations
    app.chat_area = Some(chat_area);
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let descriptor = app.session.selected_agent().descriptor();
    let count = app.session.messages().len();

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(hex(descriptor.accent)))
        .title(Line::from(vec![
            Span::styled(format!(" {} ", descriptor.name), Style::default().bold()),
            Span::styled(format!("- {} ", descriptor.description), Style::default().fg(Color::Gray)),
        ]))
        .title(
            Line::from(Span::styled(
                format!(" {} messages ", count),
                Style::default().fg(Color::Blue),
            ))
            .right_aligned(),
        );

    let chat = if app.session.messages().is_empty() && !app.session.is_processing() {
        let welcome = Text::from(vec![
            Line::default(),
            Line::from(Span::styled(
                "Hi! I'm your RALT agent",
                Style::default().fg(hex(THEME.primary)).bold(),
            ))
            .centered(),
            Line::from(Span::styled(
                "Pick an agent and start chatting. I can help with multimodal tasks.",
                Style::default().fg(Color::DarkGray),
            ))
            .centered(),
        ]);
        Paragraph::new(welcome).wrap(Wrap { trim: false })
    } else {
        // Already wrapped to the panel width, so scroll offsets are exact rows
        let lines = chat_lines(&app.session, app.animation_frame, app.chat_width as usize);
        Paragraph::new(Text::from(lines))
    };

    let chat = chat.block(chat_block).scroll((app.chat_scroll, 0));

    frame.render_widget(chat, chat_area);

    render_input(app, frame, input_area);

    let mut category_spans = vec![Span::styled(" ", Style::default())];
    for category in CATEGORIES.iter() {
        category_spans.push(Span::styled(
            format!(" {} {} ", category.name, category.count),
            Style::default().fg(Color::Gray).bg(hex(THEME.surface)),
        ));
        category_spans.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(category_spans)), categories_area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let processing = app.session.is_processing();

    let border_color = if processing {
        Color::DarkGray
    } else if editing {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let title = if processing {
        " Waiting for reply... "
    } else {
        " Message (Enter to send) "
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scrolling keeps the cursor inside the box
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.session.cursor();
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let paragraph = if app.session.draft().is_empty() {
        Paragraph::new(Span::styled(
            "Type your message here...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let visible_text: String = app
            .session
            .draft()
            .chars()
            .skip(scroll_offset)
            .take(inner_width)
            .collect();
        Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan))
    };

    frame.render_widget(paragraph.block(input_block), area);

    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " INSERT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let keys: &[(&str, &str)] = match app.input_mode {
        InputMode::Editing => &[
            (" Enter ", " send "),
            (" Esc ", " agents "),
            (" Ctrl-C ", " quit "),
        ],
        InputMode::Normal => &[
            (" j/k ", " agent "),
            (" 1-6 ", " pick "),
            (" Ctrl-D/U ", " scroll "),
            (" r ", " recheck "),
            (" i ", " type "),
            (" q ", " quit "),
        ],
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    for (key, label) in keys {
        spans.push(Span::styled(*key, key_style));
        spans.push(Span::styled(*label, label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
