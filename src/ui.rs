use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use expense_tracker::{
    category_breakdown, budget_status, BudgetStatus, CategoryShare, Expense, ExpenseFilter,
    PolicyEngine, RecordStore, YearMonth,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, List, ListItem, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Expenses,
    Categories,
    Advice,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Expenses => Page::Categories,
            Page::Categories => Page::Advice,
            Page::Advice => Page::Expenses,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Expenses => Page::Advice,
            Page::Categories => Page::Expenses,
            Page::Advice => Page::Categories,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Expenses => "Expenses",
            Page::Categories => "Categories",
            Page::Advice => "Advice",
        }
    }
}

/// Read-only snapshot of one month
pub struct App {
    pub month: YearMonth,
    pub currency: String,
    pub status: BudgetStatus,
    pub expenses: Vec<Expense>,
    pub breakdown: Vec<CategoryShare>,
    pub suggestions: Vec<String>,
    pub state: TableState,
    pub current_page: Page,
}

impl App {
    pub fn load<S: RecordStore + ?Sized>(engine: &PolicyEngine<'_, S>, month: YearMonth, currency: &str) -> Result<Self> {
        let store = engine.store();
        let status = budget_status(store, month)?;
        let expenses = store.query_expenses(&ExpenseFilter::month(month))?;
        let breakdown = category_breakdown(store, month)?;
        let suggestions = engine.suggestions(month.year(), month.month())?;

        Ok(Self::new(month, currency, status, expenses, breakdown, suggestions))
    }

    pub fn new(
        month: YearMonth,
        currency: &str,
        status: BudgetStatus,
        expenses: Vec<Expense>,
        breakdown: Vec<CategoryShare>,
        suggestions: Vec<String>,
    ) -> Self {
        let mut state = TableState::default();
        if !expenses.is_empty() {
            state.select(Some(0));
        }

        Self {
            month,
            currency: currency.to_string(),
            status,
            expenses,
            breakdown,
            suggestions,
            state,
            current_page: Page::Expenses,
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn next(&mut self) {
        let len = self.expenses.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.expenses.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) => len - 1,
            Some(i) => i - 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn last(&mut self) {
        if !self.expenses.is_empty() {
            self.state.select(Some(self.expenses.len() - 1));
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!("dashboard failed: {err}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Home => app.state.select(Some(0)),
                KeyCode::End => app.last(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Length(3), // Budget gauge
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_gauge(f, chunks[1], app);

    match app.current_page {
        Page::Expenses => render_table(f, chunks[2], app),
        Page::Categories => render_categories(f, chunks[2], app),
        Page::Advice => render_advice(f, chunks[2], app),
    }

    render_status_bar(f, chunks[3], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Expenses, Page::Categories, Page::Advice];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(format!("Month: {}", app.month), Style::default().fg(Color::White)));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("{} expenses", app.expenses.len()),
        Style::default().fg(Color::Cyan),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_gauge(f: &mut Frame, area: Rect, app: &App) {
    let status = &app.status;
    let label = if status.has_budget() {
        format!(
            "Budget: {c}{} | Spent: {c}{} | Savings: {c}{}",
            status.budget.whole_units(),
            status.spent.whole_units(),
            status.savings.whole_units(),
            c = app.currency
        )
    } else {
        format!("No budget set | Spent: {}{}", app.currency, status.spent.whole_units())
    };

    let color = match status.percent_used {
        p if p >= 100.0 => Color::Red,
        p if p >= 80.0 => Color::Yellow,
        _ => Color::Green,
    };

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Budget "))
        .gauge_style(Style::default().fg(color).bg(Color::Black))
        .percent(status.percent_used.round() as u16)
        .label(label);

    f.render_widget(gauge, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["ID", "Date", "Category", "Amount", "Description"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.expenses.iter().map(|expense| {
        let cells = vec![
            Cell::from(expense.id.to_string()),
            Cell::from(expense.date_string()),
            Cell::from(truncate(expense.category.name(), 20)),
            Cell::from(expense.amount.to_string()).style(Style::default().fg(Color::Red)),
            Cell::from(truncate(expense.description.as_deref().unwrap_or(""), 40)),
        ];
        Row::new(cells).height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(12),
            Constraint::Length(22),
            Constraint::Length(12),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Expenses "),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_categories(f: &mut Frame, area: Rect, app: &App) {
    let header_cells = ["Category", "Spent", "Share"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.breakdown.iter().map(|share| {
        Row::new(vec![
            Cell::from(share.category.name().to_string()),
            Cell::from(format!("{}{}", app.currency, share.total)),
            Cell::from(format!("{:>5.1}% {}", share.percent, bar(share.percent, 30))),
        ])
    });

    let table = Table::new(
        rows,
        [Constraint::Length(22), Constraint::Length(14), Constraint::Min(10)],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(" Spending by Category "));

    f.render_widget(table, area);
}

fn render_advice(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .suggestions
        .iter()
        .map(|s| ListItem::new(Line::from(vec![Span::styled("• ", Style::default().fg(Color::Cyan)), Span::raw(s.clone())])))
        .collect();

    if items.is_empty() {
        let empty = Paragraph::new("No suggestions")
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Suggestions "));
        f.render_widget(empty, area);
        return;
    }

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Suggestions "));
    f.render_widget(list, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);

    let status_spans = vec![
        Span::styled(
            format!(" Row: {}/{} ", selected, app.expenses.len()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(" | "),
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Page | "),
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" Nav | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(vec![Line::from(status_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::White)));

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// Horizontal bar of `width` cells filled to `percent`
fn bar(percent: f64, width: usize) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    "█".repeat(filled)
}
