//! Status lines for the bibtpl CLI.
//!
//! Everything here writes to stderr. `render` with a single template and
//! `inspect` put their payload (rendered text, JSON) on stdout, so status
//! lines never end up in a pipe or a redirected file.

use std::path::Path;

use console::style;

#[derive(Clone, Copy)]
enum Tag {
    Ok,
    Warn,
    Error,
}

fn tagged_line(tag: Tag, text: &str) -> String {
    let label = match tag {
        Tag::Ok => style("[OK]").green(),
        Tag::Warn => style("[WARN]").yellow(),
        Tag::Error => style("[ERROR]").red(),
    };
    format!("{} {text}", label.for_stderr().bold())
}

fn tagged(tag: Tag, text: &str) {
    eprintln!("{}", tagged_line(tag, text));
}

/// Command title, underlined to its own width.
pub fn print_header(title: &str) {
    eprintln!("\n{}", style(title).bold().cyan());
    eprintln!("{}", style("=".repeat(title.chars().count())).dim());
}

pub fn print_success(text: &str) {
    tagged(Tag::Ok, text);
}

/// Non-fatal conditions: empty conversions, unknown locale ids.
pub fn print_warning(text: &str) {
    tagged(Tag::Warn, text);
}

/// A template that failed while the others kept rendering.
pub fn print_error(text: &str) {
    tagged(Tag::Error, text);
}

/// `init` progress, e.g. `[1/2] Creating project directory: refs/`.
pub fn print_step(step: u32, total: u32, text: &str) {
    eprintln!("{} {text}", style(format!("[{step}/{total}]")).dim());
}

/// Indented summary field under a header.
pub fn print_key_value(key: &str, value: &str) {
    eprintln!("  {}: {value}", style(key).dim());
}

/// Summary field naming a file the command read or wrote.
pub fn print_path(key: &str, path: &Path) {
    print_key_value(key, &path.display().to_string());
}
