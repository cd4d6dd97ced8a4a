mod palette;

use std::io::{Stdout, stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState as WidgetListState, Paragraph, Wrap},
};

use crate::app::{App, FormField, Screen};
use crate::controller::task_list::ListState;
use crate::domain::task::Task;
use crate::repo::TaskRepository;
use crate::repo::prefs::PreferenceStore;
use crate::timeutil;
use palette::Palette;

pub fn run<R: TaskRepository, P: PreferenceStore>(
    mut app: App<R, P>,
    tick_rate: Duration,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut last_tick = Instant::now();
    let res = loop {
        app.sync_view();
        if let Err(err) = terminal.draw(|f| draw(f, &app)) {
            break Err(err.into());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        match poll_key(timeout) {
            Ok(Some(code)) if handle_key(&mut app, code) => break Ok(()),
            Ok(_) => {}
            Err(err) => break Err(err),
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    };

    cleanup_terminal(&mut terminal)?;
    res
}

fn poll_key(timeout: Duration) -> Result<Option<KeyCode>> {
    if event::poll(timeout)?
        && let Event::Key(key) = event::read()?
        && key.kind == KeyEventKind::Press
    {
        return Ok(Some(key.code));
    }
    Ok(None)
}

/// Returns true when the user asked to quit.
fn handle_key<R: TaskRepository, P: PreferenceStore>(app: &mut App<R, P>, code: KeyCode) -> bool {
    match app.screen {
        Screen::List => match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('j') | KeyCode::Down => app.select_next(),
            KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
            KeyCode::Enter => app.open_detail(),
            KeyCode::Char(' ') => app.toggle_selected(),
            KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
            KeyCode::Char('u') => app.undo(),
            KeyCode::Char('s') => app.cycle_sort(),
            KeyCode::Char('f') => app.cycle_filter(),
            KeyCode::Char('a') | KeyCode::Char('n') => app.start_create(),
            KeyCode::Char('t') => app.open_settings(),
            KeyCode::Char('r') => app.reload(),
            _ => {}
        },
        Screen::Detail => match code {
            KeyCode::Esc | KeyCode::Char('q') => app.back_to_list(),
            KeyCode::Char('c') => app.complete_current(),
            KeyCode::Char('d') | KeyCode::Delete => app.delete_current(),
            _ => {}
        },
        Screen::Create => match code {
            KeyCode::Esc => app.cancel_create(),
            KeyCode::Enter => app.submit_form(),
            KeyCode::Tab => app.form.field = app.form.field.next(),
            KeyCode::Backspace => app.form.pop(),
            KeyCode::Left | KeyCode::Right if app.form.field == FormField::Priority => {
                app.form.priority = app.form.priority.next();
            }
            KeyCode::Char(' ') if app.form.field == FormField::Priority => {
                app.form.priority = app.form.priority.next();
            }
            KeyCode::Char(c) => app.form.push(c),
            _ => {}
        },
        Screen::Settings => match code {
            KeyCode::Esc | KeyCode::Char('q') => {
                app.screen = Screen::List;
                app.set_status("Settings saved");
            }
            KeyCode::Char('m') => app.cycle_theme_mode(),
            KeyCode::Char('p') => app.cycle_theme_set(),
            _ => {}
        },
    }

    false
}

fn draw<R: TaskRepository, P: PreferenceStore>(f: &mut ratatui::Frame, app: &App<R, P>) {
    let palette = Palette::resolve(app.settings.theme_mode(), app.settings.theme_set());
    let size = f.area();
    f.render_widget(
        Block::default().style(Style::default().bg(palette.background).fg(palette.text)),
        size,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(size);

    f.render_widget(render_header(app, &palette), chunks[0]);
    match app.screen {
        Screen::List => draw_list(f, app, &palette, chunks[1]),
        Screen::Detail => f.render_widget(render_detail(app, &palette), chunks[1]),
        Screen::Create => f.render_widget(render_form(app, &palette), chunks[1]),
        Screen::Settings => f.render_widget(render_settings(app, &palette), chunks[1]),
    }
    f.render_widget(render_footer(app), chunks[2]);
}

fn render_header<R: TaskRepository, P: PreferenceStore>(
    app: &App<R, P>,
    palette: &Palette,
) -> Paragraph<'static> {
    let summary = app.summary(timeutil::now_millis());
    let options = format!(
        "Sort: {} ; Filter: {}",
        app.tasks.sort().label(),
        app.tasks.filter().label()
    );
    let line = Line::from(vec![
        Span::styled("itask", Style::default().fg(palette.accent)),
        Span::raw("  |  "),
        Span::styled(summary, Style::default().fg(palette.secondary)),
        Span::raw("  |  "),
        Span::styled(options, Style::default().fg(palette.highlight)),
    ]);
    Paragraph::new(line)
        .block(Block::default().title("Overview").borders(Borders::ALL))
        .wrap(Wrap { trim: true })
}

fn draw_list<R: TaskRepository, P: PreferenceStore>(
    f: &mut ratatui::Frame,
    app: &App<R, P>,
    palette: &Palette,
    area: Rect,
) {
    let title = "Tasks (j/k move ; Enter open ; Space toggle ; d delete ; u undo ; s sort ; f filter ; a add ; t settings)";
    let block = Block::default().title(title).borders(Borders::ALL);

    let tasks = match &*app.list.borrow() {
        ListState::Success(tasks) => tasks.clone(),
        ListState::Error(msg) => {
            let text = Span::styled(msg.clone(), Style::default().fg(palette.danger));
            f.render_widget(Paragraph::new(text).block(block), area);
            return;
        }
        ListState::Initial | ListState::Loading => {
            f.render_widget(Paragraph::new("Loading...").block(block), area);
            return;
        }
        ListState::Empty => {
            let text = Span::styled(
                "No tasks here. Press 'a' to add one.",
                Style::default().fg(palette.muted),
            );
            f.render_widget(Paragraph::new(text).block(block), area);
            return;
        }
    };

    let mut list_state = WidgetListState::default();
    list_state.select(Some(app.selected));
    let list = render_list(&tasks, app.selected, palette).block(block);
    f.render_stateful_widget(list, area, &mut list_state);
}

fn render_list<'a>(tasks: &'a [Task], selected: usize, palette: &Palette) -> List<'a> {
    let now = timeutil::now_millis();
    let items: Vec<ListItem> = tasks
        .iter()
        .enumerate()
        .map(|(idx, task)| {
            let symbol = if task.is_completed { "✔" } else { "•" };
            let overdue = task.is_overdue(now);
            let mut line = vec![
                Span::styled(
                    format!(" {symbol} [{}] ", task.priority.label()),
                    Style::default().fg(palette.priority(task.priority)),
                ),
                Span::raw(task.title.as_str()),
                Span::styled(
                    format!("  Due {}", timeutil::format_due_date(task.due_date)),
                    Style::default().fg(if overdue {
                        palette.danger
                    } else {
                        palette.muted
                    }),
                ),
            ];
            if overdue {
                line.push(Span::styled("  overdue", Style::default().fg(palette.danger)));
            }

            let style = if idx == selected {
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else if task.is_completed {
                Style::default()
                    .fg(palette.muted)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };

            ListItem::new(Line::from(line)).style(style)
        })
        .collect();

    List::new(items).highlight_symbol("➤ ")
}

fn render_detail<R: TaskRepository, P: PreferenceStore>(
    app: &App<R, P>,
    palette: &Palette,
) -> Paragraph<'static> {
    let block = Block::default()
        .title("Task (c complete ; d delete ; Esc back)")
        .borders(Borders::ALL);
    let Some(task) = app.tasks.selected_task() else {
        return Paragraph::new("No task selected").block(block);
    };
    let status = if task.is_completed {
        "Completed"
    } else if task.is_overdue(timeutil::now_millis()) {
        "Overdue"
    } else {
        "Pending"
    };
    let label = Style::default().fg(palette.muted);
    let lines = vec![
        Line::from(Span::styled(
            task.title.clone(),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::from(vec![
            Span::styled("Description: ", label),
            Span::raw(
                task.description
                    .clone()
                    .unwrap_or_else(|| "(none)".to_string()),
            ),
        ]),
        Line::from(vec![
            Span::styled("Priority:    ", label),
            Span::styled(
                task.priority.label(),
                Style::default().fg(palette.priority(task.priority)),
            ),
        ]),
        Line::from(vec![
            Span::styled("Due:         ", label),
            Span::raw(timeutil::format_due_date(task.due_date)),
        ]),
        Line::from(vec![
            Span::styled("Status:      ", label),
            Span::raw(status),
        ]),
    ];
    Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
}

fn render_form<'a, R: TaskRepository, P: PreferenceStore>(
    app: &'a App<R, P>,
    palette: &Palette,
) -> Paragraph<'a> {
    let form = &app.form;
    let field = |name: &'static str, value: &'a str, which: FormField| {
        let focused = form.field == which;
        let style = if focused {
            Style::default().fg(palette.secondary)
        } else {
            Style::default()
        };
        let mut spans = vec![
            Span::styled(format!("{name:<13}"), Style::default().fg(palette.muted)),
            Span::styled(value, style),
        ];
        if focused {
            spans.push(Span::raw("█"));
        }
        Line::from(spans)
    };
    let lines = vec![
        field("Title:", &form.title, FormField::Title),
        field("Description:", &form.description, FormField::Description),
        field("Priority:", form.priority.label(), FormField::Priority),
        field("Due date:", &form.due_date, FormField::DueDate),
        Line::raw(""),
        Line::styled(
            "Due date format: YYYY-MM-DD ; Space or arrows change priority",
            Style::default().fg(palette.muted),
        ),
    ];
    Paragraph::new(lines).block(
        Block::default()
            .title("New task (Tab next ; Enter save ; Esc cancel)")
            .borders(Borders::ALL),
    )
}

fn render_settings<R: TaskRepository, P: PreferenceStore>(
    app: &App<R, P>,
    palette: &Palette,
) -> Paragraph<'static> {
    let mode = app.settings.theme_mode();
    let set = app.settings.theme_set();
    let lines = vec![
        Line::from(vec![
            Span::styled("Theme mode: ", Style::default().fg(palette.muted)),
            Span::styled(mode.label(), Style::default().fg(palette.accent)),
        ]),
        Line::from(vec![
            Span::styled("Palette:    ", Style::default().fg(palette.muted)),
            Span::styled(set.name, Style::default().fg(palette.accent)),
        ]),
        Line::raw(""),
        Line::styled(
            "Palettes apply in Light and Dark mode; System keeps terminal colours.",
            Style::default().fg(palette.muted),
        ),
    ];
    Paragraph::new(lines).block(
        Block::default()
            .title("Settings (m mode ; p palette ; Esc back)")
            .borders(Borders::ALL),
    )
}

fn render_footer<R: TaskRepository, P: PreferenceStore>(app: &App<R, P>) -> Paragraph<'_> {
    let msg = app
        .status
        .as_deref()
        .unwrap_or("q quit ; a add ; s sort ; f filter ; r reload");
    Paragraph::new(msg).block(Block::default().title("Status").borders(Borders::ALL))
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
