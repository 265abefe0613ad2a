//! Reconciliation of hypotheses produced by successive lenses.

use std::collections::HashSet;

/// Ordered, de-duplicated hypotheses accumulated across lenses.
///
/// Lens outputs are split into blank-line separated blocks. Each block loses
/// its leading enumeration marker (`3.`, `3)`, `-`, `*`, `•`) and is compared
/// case-folded with whitespace collapsed; the first occurrence wins.
///
/// # Example
///
/// ```
/// use scenarist_workflow::HypothesisSet;
///
/// let mut set = HypothesisSet::new();
/// set.merge("1. The convoy sailed early.\n\n2. The escort was recalled.");
/// let added = set.merge("1. the  convoy sailed EARLY.\n\n2. A U-boat report was ignored.");
///
/// assert_eq!(added, 1);
/// assert_eq!(
///     set.render(),
///     "1. The convoy sailed early.\n\n2. The escort was recalled.\n\n3. A U-boat report was ignored.\n"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct HypothesisSet {
    blocks: Vec<String>,
    seen: HashSet<String>,
}

impl HypothesisSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the new hypotheses of one lens output; returns how many were new.
    pub fn merge(&mut self, text: &str) -> usize {
        let mut added = 0;
        for block in split_blocks(text) {
            let key = normalize(&block);
            if key.is_empty() || !self.seen.insert(key) {
                continue;
            }
            self.blocks.push(block);
            added += 1;
        }
        added
    }

    /// Number of hypotheses.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True when no hypotheses have been merged.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Hypotheses without numbering, in merge order.
    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    /// Renumbered hypotheses separated by blank lines.
    pub fn render(&self) -> String {
        let mut out = self
            .blocks
            .iter()
            .enumerate()
            .map(|(i, block)| format!("{}. {}", i + 1, block))
            .collect::<Vec<_>>()
            .join("\n\n");
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }
}

fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(finish_block(&current));
                current.clear();
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        blocks.push(finish_block(&current));
    }

    blocks.retain(|b| !b.is_empty());
    blocks
}

fn finish_block(lines: &[&str]) -> String {
    let joined = lines.join("\n");
    strip_marker(joined.trim()).trim().to_string()
}

fn strip_marker(block: &str) -> &str {
    if let Some(rest) = block
        .strip_prefix("- ")
        .or_else(|| block.strip_prefix("* "))
        .or_else(|| block.strip_prefix("• "))
    {
        return rest.trim_start();
    }

    let digits = block.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return block;
    }
    let rest = &block[digits..];
    match rest
        .strip_prefix('.')
        .or_else(|| rest.strip_prefix(')'))
    {
        Some(after) if after.starts_with(char::is_whitespace) => after.trim_start(),
        _ => block,
    }
}

fn normalize(block: &str) -> String {
    block
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers() {
        assert_eq!(strip_marker("12. Text"), "Text");
        assert_eq!(strip_marker("3) Text"), "Text");
        assert_eq!(strip_marker("- Text"), "Text");
        assert_eq!(strip_marker("1942 was cold"), "1942 was cold");
        assert_eq!(strip_marker("3.5 knots"), "3.5 knots");
    }

    #[test]
    fn multi_line_blocks_survive() {
        let blocks = split_blocks("1. First line\n   continues here\n\n\n2. Second\n");
        assert_eq!(blocks, vec!["First line\n   continues here", "Second"]);
    }
}
