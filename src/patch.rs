//! Text patching primitives for printer config files
//!
//! Every function here is pure: it takes the current file content and
//! returns `Some(new_content)` when an edit is needed, or `None` when the
//! file already satisfies the desired state. The install routines decide
//! whether to write (and skip writing entirely under dry-run).

use std::sync::LazyLock;

use regex::Regex;

/// Insert an include line after the last existing `[include ...]` line
///
/// Appends at end of file when no include lines exist. `None` when the line
/// is already present anywhere in the file.
pub fn ensure_include_after_last(content: &str, include_line: &str) -> Option<String> {
    if content.contains(include_line) {
        return None;
    }

    let mut lines: Vec<&str> = content.split('\n').collect();
    let last_include = lines
        .iter()
        .rposition(|line| line.trim_start().starts_with("[include"));

    match last_include {
        Some(pos) => lines.insert(pos + 1, include_line),
        None => {
            if lines.last().is_some_and(|l| !l.is_empty()) {
                lines.push("");
            }
            lines.push(include_line);
        }
    }
    Some(lines.join("\n"))
}

/// Ensure a line is the first line of the file, removing stray duplicates
pub fn ensure_first_line(content: &str, line: &str) -> Option<String> {
    let lines: Vec<&str> = content.split('\n').collect();
    if lines.first().is_some_and(|first| first.trim() == line) {
        return None;
    }

    let mut new_lines: Vec<&str> = vec![line];
    new_lines.extend(lines.iter().filter(|l| l.trim() != line));
    let mut new_content = new_lines.join("\n");
    if !new_content.ends_with('\n') {
        new_content.push('\n');
    }
    Some(new_content)
}

/// Ensure the file ends with exactly one copy of the given include block
///
/// Any occurrences of the block's lines elsewhere in the file are removed
/// first, so re-ordering and deduplication fall out of the same edit.
pub fn ensure_ordered_block(content: &str, block_lines: &[&str]) -> Option<String> {
    let mut cleaned: String = content
        .split('\n')
        .filter(|line| !block_lines.contains(&line.trim()))
        .collect::<Vec<_>>()
        .join("\n");

    // Collapse runs of blank lines left behind by the removals
    static BLANKS: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));
    cleaned = BLANKS.replace_all(&cleaned, "\n\n").into_owned();

    let mut new_content = cleaned;
    if !new_content.ends_with('\n') {
        new_content.push('\n');
    }
    new_content.push_str(&block_lines.join("\n"));
    new_content.push('\n');

    if new_content == content {
        None
    } else {
        Some(new_content)
    }
}

/// Ensure a bare line is present in the file (service registration)
pub fn ensure_line_present(content: &str, line: &str) -> Option<String> {
    if content.lines().any(|l| l.trim() == line) {
        return None;
    }
    let mut new_content = content.to_string();
    if !new_content.is_empty() && !new_content.ends_with('\n') {
        new_content.push('\n');
    }
    new_content.push_str(line);
    new_content.push('\n');
    Some(new_content)
}

/// Ensure a `[section]` exists and contains the given key
///
/// Three cases: section missing entirely (append section plus key line),
/// section present without the key (insert key right after the header),
/// section and key both present (no change). The key check accepts both
/// `key:` and `key =` spellings.
pub fn ensure_section_key(
    content: &str,
    section_header: &str,
    key: &str,
    key_line: &str,
) -> Option<String> {
    let lines: Vec<&str> = content.split('\n').collect();
    let section_start = lines
        .iter()
        .position(|line| line.trim() == section_header);

    let Some(start) = section_start else {
        let mut new_content = content.to_string();
        if !new_content.is_empty() && !new_content.ends_with('\n') {
            new_content.push('\n');
        }
        new_content.push_str(section_header);
        new_content.push('\n');
        new_content.push_str(key_line);
        new_content.push('\n');
        return Some(new_content);
    };

    let section_end = lines[start + 1..]
        .iter()
        .position(|line| {
            let trimmed = line.trim();
            trimmed.starts_with('[') && trimmed.ends_with(']')
        })
        .map_or(lines.len(), |offset| start + 1 + offset);

    let has_key = lines[start + 1..section_end].iter().any(|line| {
        let trimmed = line.trim();
        trimmed.starts_with(&format!("{key}:")) || trimmed.starts_with(&format!("{key} ="))
    });

    if has_key {
        return None;
    }

    let mut new_lines = lines;
    new_lines.insert(start + 1, key_line);
    let mut new_content = new_lines.join("\n");
    if !new_content.ends_with('\n') {
        new_content.push('\n');
    }
    Some(new_content)
}

/// Ensure a whole config section is present, appending it when missing
///
/// Presence is keyed on the header line only; an existing section is never
/// rewritten.
pub fn ensure_section(content: &str, section_header: &str, section_body: &str) -> Option<String> {
    if content.contains(section_header) {
        return None;
    }
    let mut new_content = content.to_string();
    if !new_content.is_empty() && !new_content.ends_with('\n') {
        new_content.push('\n');
    }
    new_content.push_str(section_header);
    new_content.push('\n');
    new_content.push_str(section_body);
    if !section_body.ends_with('\n') {
        new_content.push('\n');
    }
    Some(new_content)
}

/// Outcome of the bed_mesh minval rewrite
#[derive(Debug, PartialEq, Eq)]
pub enum MinvalPatch {
    /// minval is already 1; nothing to do
    AlreadyApplied,
    /// The move_check_distance option was not found at all
    PatternNotFound,
    /// Patched content ready to write
    Patched(String),
}

static MINVAL_APPLIED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"['"]move_check_distance['"]\s*,\s*5(?:\.0*)?\s*,\s*minval\s*=\s*1(?:\.0*)?"#)
        .expect("valid regex")
});

static MINVAL_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?P<prefix>['"]move_check_distance['"]\s*,\s*5(?:\.0*)?\s*,\s*minval\s*=\s*)(?P<val>[0-9]+(?:\.[0-9]*)?)"#,
    )
    .expect("valid regex")
});

/// Lower the bed_mesh `move_check_distance` minval from 3 to 1
pub fn set_move_check_minval(content: &str) -> MinvalPatch {
    if MINVAL_APPLIED.is_match(content) {
        return MinvalPatch::AlreadyApplied;
    }
    if !MINVAL_TARGET.is_match(content) {
        return MinvalPatch::PatternNotFound;
    }
    let patched = MINVAL_TARGET
        .replacen(content, 1, "${prefix}1.")
        .into_owned();
    MinvalPatch::Patched(patched)
}
