//! Splits the free-text form fields into structured records.

use crate::models::resume::ExperienceEntry;

/// Leading markers users type in front of bullet lines. The renderer draws its own glyph.
const BULLET_MARKERS: &[char] = &['-', '*', '•', '–', '·'];

/// Parses blank-line-delimited experience blocks.
///
/// Inside a block the first non-empty line is the title, the second the subtitle and every
/// remaining line one bullet. A line that is empty after trimming separates blocks.
pub fn parse_experience(raw: &str) -> Vec<ExperienceEntry> {
    let mut entries = Vec::new();
    let mut block: Vec<&str> = Vec::new();

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            if let Some(entry) = entry_from_block(&block) {
                entries.push(entry);
            }
            block.clear();
        } else {
            block.push(line);
        }
    }
    if let Some(entry) = entry_from_block(&block) {
        entries.push(entry);
    }

    entries
}

fn entry_from_block(lines: &[&str]) -> Option<ExperienceEntry> {
    let (title, rest) = lines.split_first()?;
    let (subtitle, bullets) = match rest.split_first() {
        Some((subtitle, bullets)) => (subtitle.to_string(), bullets),
        None => (String::new(), &[][..]),
    };

    Some(ExperienceEntry {
        title: title.to_string(),
        subtitle,
        bullets: bullets
            .iter()
            .map(|b| strip_bullet_marker(b))
            .filter(|b| !b.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

fn strip_bullet_marker(line: &str) -> &str {
    match line.strip_prefix(BULLET_MARKERS) {
        Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start(),
        _ => line,
    }
}

/// Parses a comma-separated list: items trimmed, empties dropped, order and duplicates kept.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses newline-delimited lines, dropping blank ones.
pub fn parse_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
