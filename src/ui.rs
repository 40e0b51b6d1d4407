use anyhow::Result;
use company_registry::{paginate, Company, PageInfo, SearchFilter};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

pub struct App {
    pub companies: Vec<Company>,
    pub search: String,
    pub current_page: i64,
    pub per_page: usize,
    pub state: TableState,
    pub show_detail: bool,
    filter: SearchFilter,
}

impl App {
    pub fn new(companies: Vec<Company>, per_page: usize) -> Self {
        let mut app = Self {
            companies,
            search: String::new(),
            current_page: 1,
            per_page: per_page.max(1),
            state: TableState::default(),
            show_detail: false,
            filter: SearchFilter::default(),
        };
        app.reset_selection();
        app
    }

    /// Companies matching the search box
    pub fn matches(&self) -> Vec<Company> {
        self.filter.filter(&self.companies, &self.search)
    }

    /// Companies on the current page
    pub fn visible(&self) -> Vec<Company> {
        paginate(&self.matches(), self.current_page, self.per_page)
    }

    pub fn page_info(&self) -> PageInfo {
        PageInfo::new(
            self.filter.count(&self.companies, &self.search),
            self.current_page,
            self.per_page,
        )
    }

    pub fn selected_company(&self) -> Option<Company> {
        let i = self.state.selected()?;
        self.visible().into_iter().nth(i)
    }

    pub fn push_char(&mut self, c: char) {
        self.search.push(c);
        self.search_changed();
    }

    pub fn pop_char(&mut self) {
        if self.search.pop().is_some() {
            self.search_changed();
        }
    }

    pub fn clear_search(&mut self) {
        if !self.search.is_empty() {
            self.search.clear();
            self.search_changed();
        }
    }

    fn search_changed(&mut self) {
        self.current_page = 1;
        self.reset_selection();
    }

    fn reset_selection(&mut self) {
        if self.visible().is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(0));
        }
    }

    pub fn next_page(&mut self) {
        let info = self.page_info();
        if info.has_next {
            self.current_page += 1;
            self.reset_selection();
        }
    }

    pub fn previous_page(&mut self) {
        if self.current_page > 1 {
            self.current_page -= 1;
            self.reset_selection();
        }
    }

    /// Apply one key press. Returns true when the browser should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let modified = key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Esc if self.search.is_empty() && !self.show_detail => return true,
            KeyCode::Esc if self.show_detail => self.toggle_detail(),
            KeyCode::Esc => self.clear_search(),
            KeyCode::Enter => self.toggle_detail(),
            KeyCode::Backspace => self.pop_char(),
            KeyCode::Down => self.next(),
            KeyCode::Up => self.previous(),
            KeyCode::Right | KeyCode::PageDown => self.next_page(),
            KeyCode::Left | KeyCode::PageUp => self.previous_page(),
            KeyCode::Char(c) if !modified => self.push_char(c),
            _ => {}
        }
        false
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn next(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
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

    res.map_err(Into::into)
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search box
            Constraint::Min(0),    // Company table
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_search(f, chunks[0], app);

    if app.show_detail {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);

        render_table(f, content_chunks[0], app);
        render_detail_panel(f, content_chunks[1], app);
    } else {
        render_table(f, chunks[1], app);
    }

    render_status_bar(f, chunks[2], app);
}

fn render_search(f: &mut Frame, area: Rect, app: &App) {
    let line = Line::from(vec![
        Span::styled(" Buscar: ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::raw(app.search.as_str()),
        Span::styled("▏", Style::default().fg(Color::DarkGray)),
    ]);

    let search = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Nome, razão social ou CNPJ "),
    );

    f.render_widget(search, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Nome", "Razão social", "CNPJ", "Cidade/UF"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let visible = app.visible();
    let rows = visible.iter().map(|company| {
        let location = if company.address.city.is_empty() {
            String::new()
        } else {
            format!("{}/{}", company.address.city, company.address.state)
        };

        Row::new(vec![
            Cell::from(truncate(&company.name, 28)),
            Cell::from(truncate(&company.legal_name, 36)),
            Cell::from(company.cnpj.formatted()).style(Style::default().fg(Color::Cyan)),
            Cell::from(truncate(&location, 24)),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(30),
            Constraint::Length(38),
            Constraint::Length(20),
            Constraint::Length(26),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Empresas "),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let info = app.page_info();

    let status_spans = vec![
        Span::styled(
            format!(" Página {}/{} ", info.current_page, info.total_pages),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(" | "),
        Span::styled(
            format!("{} empresa(s)", info.total_items),
            Style::default().fg(Color::Green),
        ),
        Span::raw(" | "),
        Span::styled("←/→", Style::default().fg(Color::Yellow)),
        Span::raw(" Página | "),
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" Nav | "),
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::raw(" Detalhes | "),
        Span::styled("Esc", Style::default().fg(Color::Red)),
        Span::raw(" Limpar/Sair"),
    ];

    let status_bar = Paragraph::new(Line::from(status_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Detalhes ");

    let company = match app.selected_company() {
        Some(c) => c,
        None => {
            f.render_widget(Paragraph::new("Nenhuma empresa selecionada").block(block), area);
            return;
        }
    };

    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let field = |name: &'static str, value: String| {
        Line::from(vec![Span::styled(format!("  {}: ", name), label), Span::raw(value)])
    };

    let content = vec![
        Line::from(""),
        field("Nome", company.name.clone()),
        field("Razão social", company.legal_name.clone()),
        field("CNPJ", company.cnpj.formatted()),
        Line::from(""),
        field("Endereço", company.address.one_line()),
        field("CEP", company.address.cep_formatted()),
        Line::from(""),
        field("E-mail", company.email.clone().unwrap_or_default()),
        field("Telefone", company.phone.clone().unwrap_or_default()),
        Line::from(""),
        Line::from(Span::styled(
            "  Enter para fechar",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ];

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use company_registry::{check_digits, CompanyDraft};

    fn companies(n: usize) -> Vec<Company> {
        (0..n)
            .map(|i| {
                let base = format!("{:08}0001", i + 1);
                let cnpj = format!("{}{}", base, check_digits(&base).unwrap());
                CompanyDraft::new(format!("Empresa {:02}", i), "Razão LTDA", cnpj)
                    .into_company()
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_initial_state() {
        let app = App::new(companies(25), 10);

        assert_eq!(app.visible().len(), 10);
        assert_eq!(app.state.selected(), Some(0));
        assert_eq!(app.page_info().total_pages, 3);
    }

    #[test]
    fn test_empty_directory() {
        let mut app = App::new(Vec::new(), 10);

        assert_eq!(app.state.selected(), None);
        app.next();
        app.next_page();
        assert_eq!(app.current_page, 1);
        assert!(app.selected_company().is_none());
    }

    #[test]
    fn test_paging_is_clamped() {
        let mut app = App::new(companies(25), 10);

        app.next_page();
        app.next_page();
        app.next_page();
        assert_eq!(app.current_page, 3);
        assert_eq!(app.visible().len(), 5);

        app.previous_page();
        app.previous_page();
        app.previous_page();
        assert_eq!(app.current_page, 1);
    }

    #[test]
    fn test_typing_filters_and_resets_page() {
        let mut app = App::new(companies(25), 10);
        app.next_page();

        for c in "empresa".chars() {
            app.push_char(c);
        }
        assert_eq!(app.current_page, 1);
        assert_eq!(app.page_info().total_items, 25);

        app.next_page();
        assert_eq!(app.current_page, 2);

        for c in " 2".chars() {
            app.push_char(c);
        }
        assert_eq!(app.current_page, 1);
        // "Empresa 20".."Empresa 24"; two digits never reach the CNPJ
        assert_eq!(app.page_info().total_items, 5);

        app.pop_char();
        app.clear_search();
        assert_eq!(app.page_info().total_items, 25);
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_modified_chars_are_not_typed() {
        let mut app = App::new(companies(3), 10);

        assert!(!app.handle_key(key(KeyCode::Char('a'), KeyModifiers::CONTROL)));
        assert!(!app.handle_key(key(KeyCode::Char('x'), KeyModifiers::ALT)));
        assert_eq!(app.search, "");

        assert!(!app.handle_key(key(KeyCode::Char('E'), KeyModifiers::SHIFT)));
        assert!(!app.handle_key(key(KeyCode::Char('m'), KeyModifiers::NONE)));
        assert_eq!(app.search, "Em");
    }

    #[test]
    fn test_quit_keys() {
        let mut app = App::new(companies(3), 10);
        app.handle_key(key(KeyCode::Char('q'), KeyModifiers::NONE));

        // Esc first clears the search, then quits
        assert!(!app.handle_key(key(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(app.handle_key(key(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(app.handle_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn test_selection_wraps() {
        let mut app = App::new(companies(3), 10);

        app.previous();
        assert_eq!(app.state.selected(), Some(2));
        app.next();
        assert_eq!(app.state.selected(), Some(0));

        app.next();
        assert_eq!(app.selected_company().unwrap().name, "Empresa 01");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Café", 10), "Café");
        assert_eq!(truncate("Razão Social Muito Longa", 10), "Razão S...");
    }
}
