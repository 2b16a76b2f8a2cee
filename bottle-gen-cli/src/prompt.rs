//! Interactive prompts: table selection and the per-key policy source.

use std::io::{self, BufRead, Write};

use bottle_gen::{ForeignKey, ForeignKeyPolicy, PolicySource, Table};

/// Asks a human for class names and foreign key handling.
///
/// Generic over its reader and writer so it runs the same against stdin/stdout and against
/// in-memory buffers.
pub struct PromptPolicy<R, W> {
    input: R,
    output: W,
}

impl PromptPolicy<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> PromptPolicy<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Prints `prompt` and reads one trimmed line. End of input reads as an empty answer.
    pub fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{prompt} ")?;
        self.output.flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    pub fn say(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{message}")
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    fn ask_or_default(&mut self, prompt: &str) -> String {
        self.ask(prompt).unwrap_or_else(|e| {
            log::warn!("could not read answer ({e}), keeping the default");
            String::new()
        })
    }
}

impl<R: BufRead, W: Write> PolicySource for PromptPolicy<R, W> {
    fn decide(&mut self, table: &Table, foreign_key: &ForeignKey) -> ForeignKeyPolicy {
        let _ = writeln!(
            self.output,
            "  {}.{} -> {}.{}",
            table.name, foreign_key.column, foreign_key.referenced_schema, foreign_key.referenced_table
        );
        loop {
            match self.ask_or_default("  Handling (1=plain column, 2=relationship) [2]:").as_str() {
                "1" => return ForeignKeyPolicy::Column,
                "2" | "" => return ForeignKeyPolicy::Relationship,
                other => {
                    let _ = writeln!(self.output, "  Invalid option '{other}', answer 1 or 2.");
                }
            }
        }
    }

    fn class_name(&mut self, table: &Table, default_name: &str) -> String {
        let answer = self.ask_or_default(&format!("Table: {} -> Class [{default_name}]:", table.name));
        if answer.is_empty() { default_name.to_string() } else { answer }
    }
}

// ============================================================================
// Table Selection
// ============================================================================

/// The result of parsing a table selection.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Selection {
    /// Zero-based indices in the order given, without duplicates.
    pub indices: Vec<usize>,
    /// Entries that were not a number in range.
    pub invalid: Vec<String>,
}

/// Parses `all` or a comma-separated list of 1-based indices into `count` tables.
pub fn parse_selection(input: &str, count: usize) -> Selection {
    let input = input.trim();
    if input.eq_ignore_ascii_case("all") {
        return Selection { indices: (0..count).collect(), invalid: Vec::new() };
    }

    let mut selection = Selection::default();
    for entry in input.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        match entry.parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => {
                if !selection.indices.contains(&(n - 1)) {
                    selection.indices.push(n - 1);
                }
            }
            _ => selection.invalid.push(entry.to_string()),
        }
    }
    selection
}
