//! eventgen CLI UI primitives.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Terminal palette
pub mod colors {
    use console::Color;

    pub const CYAN: Color = Color::Color256(51);
    pub const MAGENTA: Color = Color::Color256(201);
    pub const VIOLET: Color = Color::Color256(135);
    pub const NEON_GREEN: Color = Color::Color256(82);
    pub const DIM: Color = Color::Color256(240);
}

pub mod symbols {
    pub const DIAMOND: &str = "\u{25C6}"; // ◆
    pub const DIAMOND_OUTLINE: &str = "\u{25C7}"; // ◇
    pub const TARGET_FILLED: &str = "\u{25C9}"; // ◉
    pub const TRIANGLE: &str = "\u{25B8}"; // ▸
    pub const PROGRESS_FILLED: &str = "\u{25B0}"; // ▰
    pub const PROGRESS_EMPTY: &str = "\u{25B1}"; // ▱
    pub const DOT: &str = "\u{00B7}"; // ·
    pub const ARROW: &str = "\u{2500}\u{25B8}"; // ─▸
}

/// Create a clickable file link (OSC 8 hyperlink)
pub fn file_link(path: &Path) -> String {
    let abs_path = std::fs::canonicalize(path)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| path.display().to_string());
    format!("\x1b]8;;file://{}\x07{}\x1b]8;;\x07", abs_path, path.display())
}

/// HSL to RGB conversion for gradients
fn hsl_to_rgb(h: f32, s: f32, l: f32) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    )
}

/// Create a gradient across text (cyan -> magenta)
pub fn gradient_text(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    let len = chars.len() as f32;
    chars
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if c.is_whitespace() {
                c.to_string()
            } else {
                let t = i as f32 / len;
                let hue = 180.0 + (t * 120.0);
                let (r, g, b) = hsl_to_rgb(hue, 1.0, 0.6);
                format!("\x1b[38;2;{};{};{}m{}\x1b[0m", r, g, b, c)
            }
        })
        .collect()
}

/// Print compact version header
pub fn print_compact_header(version: &str) {
    println!(
        "  {} {} {}",
        style(symbols::DIAMOND).fg(colors::CYAN),
        style("eventgen").fg(colors::CYAN).bold(),
        style(version).dim()
    );
    println!();
}

/// Print an info message
pub fn info(msg: &str) {
    println!("  {} {}", style(symbols::DIAMOND_OUTLINE).fg(colors::CYAN), msg);
}

/// Print a dim/secondary message
pub fn dim(msg: &str) {
    println!("  {}", style(msg).fg(colors::DIM));
}

/// Create a spinner
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_chars("\u{25CE}\u{25C9}\u{25CE}\u{25C9}") // ◎◉◎◉
        .template("  {spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(150));
    pb
}

/// Print a box header
pub fn box_header(title: &str) {
    let width = 55;
    let title_padded = format!(" {} ", title);
    let dashes = width - title_padded.chars().count().min(width - 4) - 4;

    println!(
        "  {}{}{}{}",
        style("\u{256D}\u{2500}").fg(colors::CYAN), // ╭─
        style(title_padded).fg(colors::CYAN).bold(),
        style("\u{2500}".repeat(dashes)).fg(colors::CYAN),
        style("\u{256E}").fg(colors::CYAN) // ╮
    );
}

/// Print a box line
pub fn box_line(content: &str) {
    let width: usize = 53;
    let padding = width.saturating_sub(content.chars().count());
    println!(
        "  {} {}{}{}",
        style("\u{2502}").fg(colors::CYAN), // │
        content,
        " ".repeat(padding),
        style("\u{2502}").fg(colors::CYAN)
    );
}

/// Print a box footer
pub fn box_footer() {
    let width = 55;
    println!(
        "  {}{}{}",
        style("\u{2570}").fg(colors::CYAN), // ╰
        style("\u{2500}".repeat(width - 2)).fg(colors::CYAN),
        style("\u{256F}").fg(colors::CYAN) // ╯
    );
}

/// Print success banner
pub fn success_banner(msg: &str) {
    let line = "\u{2550}".repeat(51); // ═
    println!("  {}", style(&line).fg(colors::CYAN));
    println!(
        "  {}  {}",
        style(symbols::DIAMOND).fg(colors::MAGENTA).bold(),
        gradient_text(msg)
    );
    println!("  {}", style(&line).fg(colors::CYAN));
    println!();
}

/// Print file tree item
pub fn tree_item(prefix: &str, name: &str, description: Option<&str>, is_last: bool) {
    let connector = if is_last {
        "\u{2570}\u{2500}\u{2500}" // ╰──
    } else {
        "\u{251C}\u{2500}\u{2500}" // ├──
    };

    match description {
        Some(desc) => println!(
            "  {}{}  {}   {}",
            style(prefix).fg(colors::DIM),
            style(connector).fg(colors::DIM),
            style(name).fg(colors::CYAN),
            style(desc).dim()
        ),
        None => println!(
            "  {}{}  {}",
            style(prefix).fg(colors::DIM),
            style(connector).fg(colors::DIM),
            style(name).fg(colors::CYAN)
        ),
    }
}

/// Print directory in tree
pub fn tree_dir(prefix: &str, name: &str) {
    println!(
        "  {}{} {}/",
        style(prefix).fg(colors::DIM),
        style(symbols::TRIANGLE).fg(colors::CYAN),
        style(name).fg(colors::CYAN).bold()
    );
}

/// Eight-cell bar scaled against the largest service type.
fn handler_bar(handlers: usize, max_handlers: usize) -> String {
    let filled = ((handlers * 8) / max_handlers.max(1)).min(8);
    format!(
        "{}{}",
        symbols::PROGRESS_FILLED.repeat(filled),
        symbols::PROGRESS_EMPTY.repeat(8 - filled)
    )
}

/// Print service type summary line
pub fn service_type_line(name: &str, handlers: usize, max_handlers: usize) {
    println!(
        "  {}   {:32} {:>3} handlers   {}",
        style(symbols::TRIANGLE).fg(colors::CYAN),
        style(name).bold(),
        handlers,
        style(handler_bar(handlers, max_handlers)).fg(colors::VIOLET)
    );
}

/// Print timing information
pub fn timing(label: &str, duration_ms: u128) {
    println!(
        "  {} {} in {}ms",
        style(symbols::DIAMOND_OUTLINE).fg(colors::CYAN),
        label,
        duration_ms
    );
}

/// Print error header for failed runs
pub fn nope_header() {
    eprintln!();
    eprintln!(
        "  {} {}",
        style(symbols::DIAMOND).fg(colors::MAGENTA).bold(),
        style("Nope.").fg(colors::MAGENTA).bold()
    );
    eprintln!();
}

/// Print "Looking good" success for check
pub fn looking_good() {
    println!(
        "  {} {}",
        style(symbols::TARGET_FILLED).fg(colors::NEON_GREEN),
        style("Looking good.").bold()
    );
}
