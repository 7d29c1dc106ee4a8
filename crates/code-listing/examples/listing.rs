use code_listing::ansi::AnsiLines;
use code_listing::crossterm_input::input_event_from_crossterm;
use code_listing::help::HelpBar;
use code_listing::input::InputEvent;
use code_listing::keymap;
use code_listing::keymap::Binding;
use code_listing::listing::Listing;
use code_listing::options;
use code_listing::popup::PopupAction;
use code_listing::popup::PopupHost;
use code_listing::popup::Popups;
use code_listing::theme::Theme;
use code_listing::view::ListingAction;
use code_listing::view::ListingView;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Constraint;
use ratatui::layout::Direction;
use ratatui::layout::Layout;
use ratatui::layout::Rect;
use ratatui::style::Stylize;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use std::io;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

const SAMPLE_CODE: &str = "fn main() {\n    let answer = 42;\n    \u{1b}[33mprintln!\u{1b}[0m(\"answer = {}\", answer);\n}";

/// Usage: `cargo run --example listing --features crossterm,ansi -- [FILE] [OVERRIDES_JSON]`
///
/// Set `CODE_LISTING_LOG=path` to write tracing output to a file.
fn main() -> io::Result<()> {
    init_tracing()?;

    let mut args = std::env::args().skip(1);
    let content = match args.next() {
        Some(path) => std::fs::read_to_string(path)?,
        None => SAMPLE_CODE.to_string(),
    };
    let overrides = match args.next().map(|s| options::parse_overrides(&s)) {
        Some(Ok(value)) => value,
        Some(Err(issue)) => {
            eprintln!("ignoring options: {issue}");
            serde_json::Value::Null
        }
        None => serde_json::Value::Null,
    };
    let (listing, issues) = Listing::with_overrides(&content, &overrides);
    for issue in &issues {
        eprintln!("ignoring option: {issue}");
    }

    let mut view = ListingView::new(listing);
    view.set_formatter(Arc::new(AnsiLines));

    let quit = Binding::new("q", "quit", vec![keymap::key_char('q')]);
    let help = HelpBar::for_listing(view.options(), vec![quit.clone()]);

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    crossterm::execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal, &help, &quit, &mut view);

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    res
}

fn init_tracing() -> io::Result<()> {
    let Ok(path) = std::env::var("CODE_LISTING_LOG") else {
        return Ok(());
    };
    let file = std::fs::File::create(path)?;
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn run<B: ratatui::backend::Backend<Error = io::Error>>(
    terminal: &mut Terminal<B>,
    help: &HelpBar,
    quit: &Binding,
    view: &mut ListingView,
) -> io::Result<()> {
    let theme = Theme::default();
    let mut popups = Popups::new();
    let mut listing_area = Rect::default();

    loop {
        terminal.draw(|f| {
            let [top, status] = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .areas(f.area());
            let block = Block::default()
                .title("Listing".cyan())
                .borders(Borders::ALL);
            listing_area = block.inner(top);
            f.render_widget(block, top);

            let buf = f.buffer_mut();
            view.render_ref(listing_area, buf, &theme);
            help.render_ref(status, buf);
            popups.render_ref(top, buf, &theme);
        })?;

        if !crossterm::event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Some(event) = input_event_from_crossterm(crossterm::event::read()?) else {
            continue;
        };

        if let Some(action) = popups.handle_event(event.clone()) {
            if action != PopupAction::None || matches!(event, InputEvent::Key(_)) {
                continue;
            }
        }

        if let InputEvent::Key(key) = &event {
            if quit.matches(key) {
                return Ok(());
            }
        }

        if let ListingAction::OpenRawRequested(request) =
            view.handle_event_in_area(listing_area, event)
        {
            popups.open(&request);
        }
    }
}
