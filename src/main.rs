use std::{
    env, fs, io,
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::Paragraph,
};

use stanza_edit::{
    document::{BlockDocument, BlockKind, Command},
    editor::{BoundaryKey, handle_boundary_key},
    editor::selection::selection_for_block,
    render::{RenderResult, render_document},
    richtext::{RichText, StyleMask},
    session::{EditorSessionState, SessionId},
};

const STATUS_TIMEOUT: Duration = Duration::from_secs(4);

fn main() -> Result<()> {
    run()
}

fn run() -> Result<()> {
    let path = env::args().nth(1).map(PathBuf::from);

    let (document, initial_status) = match &path {
        Some(path) => load_document(path)?,
        None => (BlockDocument::new(), Some("Scratch document".to_string())),
    };
    let mut app = App::new(document, path, initial_status);

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().ok();

    let result = run_app(&mut terminal, &mut app).context("application error");

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    while !app.quit {
        terminal
            .draw(|frame| app.draw(frame))
            .context("failed to draw frame")?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout).context("event poll failed")? {
            match event::read().context("failed to read event")? {
                Event::Key(key) => app.handle_key(key),
                _ => {}
            }
        }
        if last_tick.elapsed() >= tick_rate {
            app.expire_status();
            last_tick = Instant::now();
        }
    }
    Ok(())
}

struct App {
    document: BlockDocument,
    session: EditorSessionState,
    path: Option<PathBuf>,
    status: Option<(String, Instant)>,
    scroll: u16,
    quit: bool,
}

impl App {
    fn new(document: BlockDocument, path: Option<PathBuf>, status: Option<String>) -> Self {
        Self {
            document,
            session: EditorSessionState::new(SessionId(0)),
            path,
            status: status.map(|message| (message, Instant::now())),
            scroll: 0,
            quit: false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);

        match key.code {
            KeyCode::Char('q') if ctrl => self.quit = true,
            KeyCode::Char('s') if ctrl => self.save(),
            KeyCode::Esc => self.session.clear_transient(),
            KeyCode::Char('b') if ctrl => self.toggle_style(StyleMask::BOLD),
            KeyCode::Char('e') if ctrl => self.toggle_style(StyleMask::CODE),
            KeyCode::Char('u') if ctrl => self.toggle_style(StyleMask::UNDERLINE),
            KeyCode::Char('k') if ctrl => self.toggle_style(StyleMask::STRIKETHROUGH),
            KeyCode::Char('y') if ctrl => self.toggle_style(StyleMask::HIGHLIGHT),
            KeyCode::Char('t') if ctrl => self.toggle_style(StyleMask::ITALIC),
            KeyCode::Char('d') if ctrl => self.toggle_checked(),
            KeyCode::Enter => self.boundary(BoundaryKey::Enter),
            KeyCode::Tab => self.boundary(BoundaryKey::Tab),
            KeyCode::BackTab => self.boundary(BoundaryKey::ShiftTab),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Left => self.move_horizontal(-1, shift),
            KeyCode::Right => self.move_horizontal(1, shift),
            KeyCode::Up => self.move_vertical(-1, shift),
            KeyCode::Down => self.move_vertical(1, shift),
            KeyCode::Char(ch) if !ctrl => self.insert_char(ch),
            _ => {}
        }
    }

    /// Routes a boundary key through the state machine and applies the
    /// emitted commands in order before anything re-reads the document.
    fn boundary(&mut self, key: BoundaryKey) {
        let Some(block) = self.document.get(self.session.focused_block) else {
            return;
        };
        let buffer = block.text.clone();
        let outcome = handle_boundary_key(
            &self.document,
            key,
            self.session.focused_block,
            self.session.caret,
            &buffer,
        );
        for command in outcome.commands.iter().cloned() {
            self.document.apply(command);
        }
        self.session.move_focus(outcome.focus, outcome.caret);
        self.session.clear_transient();
    }

    fn backspace(&mut self) {
        if self.session.caret == 0 {
            self.boundary(BoundaryKey::Backspace);
            return;
        }
        let Some(block) = self.document.get(self.session.focused_block) else {
            return;
        };
        let id = block.id;
        let mut text = block.text.clone();
        text.delete_range(self.session.caret - 1, 1);
        self.document.apply(Command::SetBlockText { id, text });
        self.session.caret -= 1;
        self.session.clear_transient();
    }

    fn insert_char(&mut self, ch: char) {
        let Some(block) = self.document.get(self.session.focused_block) else {
            return;
        };
        if !block.kind.is_text_editable() {
            return;
        }
        let id = block.id;
        let mut text = block.text.clone();
        let mut encoded = [0u8; 4];
        text.insert_range(self.session.caret, ch.encode_utf8(&mut encoded));
        self.document.apply(Command::SetBlockText { id, text });
        self.session.caret += 1;
        self.session.clear_transient();
    }

    fn move_horizontal(&mut self, delta: i32, extend: bool) {
        let focused = self.session.focused_block;
        let caret = self.session.caret;
        let (block, offset) = if delta < 0 {
            if caret > 0 {
                (focused, caret - 1)
            } else {
                match self.editable_neighbor(focused, -1) {
                    Some(previous) => {
                        let len = self.document.get(previous).map(|b| b.text.len()).unwrap_or(0);
                        (previous, len)
                    }
                    None => (focused, caret),
                }
            }
        } else {
            let len = self
                .document
                .get(focused)
                .map(|block| block.text.len())
                .unwrap_or(0);
            if caret < len {
                (focused, caret + 1)
            } else {
                match self.editable_neighbor(focused, 1) {
                    Some(next) => (next, 0),
                    None => (focused, caret),
                }
            }
        };
        if extend {
            self.session.extend_selection(block, offset);
        } else {
            self.session.clear_transient();
        }
        self.session.move_focus(block, offset);
    }

    fn move_vertical(&mut self, delta: i32, extend: bool) {
        let Some(target) = self.editable_neighbor(self.session.focused_block, delta) else {
            return;
        };
        let len = self.document.get(target).map(|b| b.text.len()).unwrap_or(0);
        let caret = self.session.caret.min(len);
        if extend {
            self.session.extend_selection(target, caret);
        } else {
            self.session.clear_transient();
        }
        self.session.move_focus(target, caret);
    }

    /// Nearest text-editable block in the given direction, if any.
    fn editable_neighbor(&self, from: usize, delta: i32) -> Option<usize> {
        let mut index = from as i64;
        loop {
            index += delta as i64;
            if index < 0 || index as usize >= self.document.len() {
                return None;
            }
            let block = self.document.get(index as usize)?;
            if block.kind.is_text_editable() {
                return Some(index as usize);
            }
        }
    }

    fn toggle_style(&mut self, style: StyleMask) {
        let Some(range) = self.session.selection().copied() else {
            self.set_status("Select text first");
            return;
        };
        let mut commands = Vec::new();
        for index in range.start_block..=range.end_block {
            let Some((start, end)) = selection_for_block(&self.document, &range, index) else {
                continue;
            };
            if start == end {
                continue;
            }
            let Some(block) = self.document.get(index) else {
                continue;
            };
            commands.push(Command::ToggleSpan {
                id: block.id,
                start,
                len: end - start,
                style,
            });
        }
        for command in commands {
            self.document.apply(command);
        }
    }

    fn toggle_checked(&mut self) {
        let Some(block) = self.document.get(self.session.focused_block) else {
            return;
        };
        if block.kind != BlockKind::CheckboxList {
            return;
        }
        let id = block.id;
        let checked = !block.checked;
        self.document.apply(Command::SetBlockChecked { id, checked });
    }

    fn save(&mut self) {
        let Some(path) = self.path.clone() else {
            self.set_status("No file to save to");
            return;
        };
        match save_document(&path, &self.document) {
            Ok(()) => self.set_status(&format!("Saved {}", path.display())),
            Err(err) => self.set_status(&format!("Save failed: {err}")),
        }
    }

    fn set_status(&mut self, message: &str) {
        self.status = Some((message.to_string(), Instant::now()));
    }

    fn expire_status(&mut self) {
        if let Some((_, since)) = &self.status {
            if since.elapsed() > STATUS_TIMEOUT {
                self.status = None;
            }
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(frame.area());
        let content = chunks[0];

        let result: RenderResult =
            render_document(&self.document, content.width as usize, &self.session);

        if let Some(cursor) = &result.cursor {
            let line = cursor.line as u16;
            if line < self.scroll {
                self.scroll = line;
            } else if line >= self.scroll + content.height {
                self.scroll = line + 1 - content.height;
            }
            frame.set_cursor_position(Position::new(
                content.x + cursor.column,
                content.y + line.saturating_sub(self.scroll),
            ));
        }

        let widget = Paragraph::new(Text::from(result.lines)).scroll((self.scroll, 0));
        frame.render_widget(widget, content);

        frame.render_widget(self.status_line(), chunks[1]);
    }

    fn status_line(&self) -> Paragraph<'_> {
        let kind = self
            .document
            .get(self.session.focused_block)
            .map(|block| format!("{:?}", block.kind))
            .unwrap_or_else(|| "-".to_string());
        let left = match &self.status {
            Some((message, _)) => message.clone(),
            None => self
                .path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "[scratch]".to_string()),
        };
        let right = format!(
            " {} · block {}/{} · {}",
            kind,
            self.session.focused_block + 1,
            self.document.len(),
            self.session.caret,
        );
        let line = Line::from(vec![
            Span::styled(left, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(right),
        ]);
        Paragraph::new(line).style(Style::default().add_modifier(Modifier::REVERSED))
    }
}

fn load_document(path: &PathBuf) -> Result<(BlockDocument, Option<String>)> {
    if !path.exists() {
        return Ok((BlockDocument::new(), Some("New document".to_string())));
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok((parse_document(&content), None))
}

/// One block per line, recognized by its leading sigil. Code blocks span
/// fenced line runs.
fn parse_document(content: &str) -> BlockDocument {
    let mut document = BlockDocument::new();
    let seed = document.get(0).map(|block| block.id);
    let mut code: Option<Vec<&str>> = None;
    let mut appended = 0usize;

    for line in content.lines() {
        if line.trim_end() == "```" {
            match code.take() {
                Some(lines) => {
                    document.append_block(BlockKind::CodeBlock, RichText::plain(lines.join("\n")));
                    appended += 1;
                }
                None => code = Some(Vec::new()),
            }
            continue;
        }
        if let Some(lines) = &mut code {
            lines.push(line);
            continue;
        }
        let (kind, indent, checked, rest) = classify_line(line);
        let id = document.append_block(kind, RichText::plain(rest));
        if indent > 0 {
            document.apply(Command::SetBlockIndent { id, indent });
        }
        if checked {
            document.apply(Command::SetBlockChecked { id, checked: true });
        }
        appended += 1;
    }
    if let Some(lines) = code.take() {
        // Unterminated fence; keep the content rather than dropping it.
        document.append_block(BlockKind::CodeBlock, RichText::plain(lines.join("\n")));
        appended += 1;
    }

    // Drop the seed paragraph once real content exists.
    if appended > 0 {
        if let Some(id) = seed {
            document.apply(Command::RemoveBlock { id });
        }
    }
    document
}

fn classify_line(line: &str) -> (BlockKind, u8, bool, String) {
    let trimmed = line.trim_start();
    let indent = ((line.len() - trimmed.len()) / 2).min(3) as u8;

    for (level, sigil) in [
        (BlockKind::Heading6, "###### "),
        (BlockKind::Heading5, "##### "),
        (BlockKind::Heading4, "#### "),
        (BlockKind::Heading3, "### "),
        (BlockKind::Heading2, "## "),
        (BlockKind::Heading1, "# "),
    ] {
        if let Some(rest) = trimmed.strip_prefix(sigil) {
            return (level, 0, false, rest.to_string());
        }
    }
    if trimmed.trim_end() == "---" {
        return (BlockKind::Divider, 0, false, String::new());
    }
    if let Some(rest) = trimmed.strip_prefix("- [x] ").or_else(|| trimmed.strip_prefix("- [X] ")) {
        return (BlockKind::CheckboxList, indent, true, rest.to_string());
    }
    if let Some(rest) = trimmed.strip_prefix("- [ ] ") {
        return (BlockKind::CheckboxList, indent, false, rest.to_string());
    }
    if let Some(rest) = trimmed.strip_prefix("- ").or_else(|| trimmed.strip_prefix("* ")) {
        return (BlockKind::BulletList, indent, false, rest.to_string());
    }
    if let Some(dot) = trimmed.find(". ") {
        if dot > 0 && trimmed[..dot].bytes().all(|byte| byte.is_ascii_digit()) {
            return (BlockKind::NumberedList, indent, false, trimmed[dot + 2..].to_string());
        }
    }
    if let Some(rest) = trimmed.strip_prefix("> ") {
        return (BlockKind::Quote, 0, false, rest.to_string());
    }
    (BlockKind::Paragraph, 0, false, line.to_string())
}

fn save_document(path: &PathBuf, document: &BlockDocument) -> Result<()> {
    let mut out = String::new();
    for block in document.blocks() {
        let indent = "  ".repeat(block.indent as usize);
        let text = block.text.text();
        match block.kind {
            BlockKind::Heading1 => out.push_str(&format!("# {text}\n")),
            BlockKind::Heading2 => out.push_str(&format!("## {text}\n")),
            BlockKind::Heading3 => out.push_str(&format!("### {text}\n")),
            BlockKind::Heading4 => out.push_str(&format!("#### {text}\n")),
            BlockKind::Heading5 => out.push_str(&format!("##### {text}\n")),
            BlockKind::Heading6 => out.push_str(&format!("###### {text}\n")),
            BlockKind::BulletList => out.push_str(&format!("{indent}- {text}\n")),
            BlockKind::NumberedList => out.push_str(&format!("{indent}1. {text}\n")),
            BlockKind::CheckboxList => {
                let marker = if block.checked { "[x]" } else { "[ ]" };
                out.push_str(&format!("{indent}- {marker} {text}\n"));
            }
            BlockKind::Quote => out.push_str(&format!("> {text}\n")),
            BlockKind::CodeBlock => out.push_str(&format!("```\n{text}\n```\n")),
            BlockKind::Divider => out.push_str("---\n"),
            BlockKind::Table => out.push_str("[table]\n"),
            BlockKind::Paragraph => out.push_str(&format!("{text}\n")),
        }
    }
    fs::write(path, out).with_context(|| format!("failed to write {}", path.display()))
}
