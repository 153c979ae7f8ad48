use anyhow::{Context, Result};
use std::path::Path;

/// Load the monitored profile list from a CSV file with a `profile_url`
/// header column. Rotation order follows file order; duplicates are kept.
pub fn from_csv(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read profiles file: {}", path.display()))?;
    let profiles = parse_csv(&content)?;
    if profiles.is_empty() {
        anyhow::bail!("no profiles found in {}", path.display());
    }
    Ok(profiles)
}

/// Parse an inline comma-separated profile list.
pub fn from_inline(list: &str) -> Result<Vec<String>> {
    let profiles: Vec<String> = list
        .split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    if profiles.is_empty() {
        anyhow::bail!("no profiles in inline list");
    }
    Ok(profiles)
}

fn parse_csv(content: &str) -> Result<Vec<String>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = content.lines();

    let header = lines.next().context("profiles CSV is empty")?;
    let column = header
        .split(',')
        .map(|h| h.trim().trim_matches('"'))
        .position(|h| h == "profile_url")
        .context("profiles CSV has no profile_url column")?;

    let mut profiles = Vec::new();
    for line in lines {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        if let Some(value) = line.split(',').nth(column) {
            let value = value.trim().trim_matches('"');
            if !value.is_empty() {
                profiles.push(value.to_string());
            }
        }
    }
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_single_column() {
        let csv = "profile_url\nalice\nbob\n";
        assert_eq!(parse_csv(csv).unwrap(), vec!["alice", "bob"]);
    }

    #[test]
    fn test_parse_csv_finds_column() {
        let csv = "id,profile_url,notes\n1,alice,hey\n2,bob,\n";
        assert_eq!(parse_csv(csv).unwrap(), vec!["alice", "bob"]);
    }

    #[test]
    fn test_parse_csv_skips_blank_rows_keeps_duplicates() {
        let csv = "profile_url\nalice\n\nalice\n";
        assert_eq!(parse_csv(csv).unwrap(), vec!["alice", "alice"]);
    }

    #[test]
    fn test_parse_csv_missing_column() {
        assert!(parse_csv("name\nalice\n").is_err());
    }

    #[test]
    fn test_inline_list() {
        assert_eq!(
            from_inline("alice, bob ,carol").unwrap(),
            vec!["alice", "bob", "carol"]
        );
    }

    #[test]
    fn test_inline_empty_is_error() {
        assert!(from_inline("").is_err());
        assert!(from_inline(" , ,").is_err());
    }
}
