use super::*;

/// Heading id for run and participant identifiers: lower-cased, with
/// everything but letters, digits, `-` and `_` dropped.
pub(super) fn anchor_slug(identifier: &str) -> String {
    identifier
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

fn fold_to_ascii(c: char) -> Option<char> {
    const FOLDS: [(&str, char); 13] = [
        ("àáâãäåāą", 'a'),
        ("çćč", 'c'),
        ("ďđ", 'd'),
        ("èéêëēęě", 'e'),
        ("ìíîïī", 'i'),
        ("łľ", 'l'),
        ("ñńň", 'n'),
        ("òóôõöőō", 'o'),
        ("řŕ", 'r'),
        ("śšş", 's'),
        ("ùúûüűūů", 'u'),
        ("ýÿ", 'y'),
        ("žźż", 'z'),
    ];
    if c.is_ascii() {
        return Some(c);
    }
    FOLDS
        .iter()
        .find(|(accented, _)| accented.contains(c))
        .map(|(_, plain)| *plain)
}

/// Heading id for publication titles, following docutils `make_id`:
/// accents folded, runs of other characters become one `-`, and leading
/// digits or hyphens and trailing hyphens are trimmed.
pub(super) fn title_id(title: &str) -> String {
    let lowered: String = title
        .to_lowercase()
        .replace('ß', "sz")
        .replace('æ', "ae")
        .replace('œ', "oe")
        .replace('ø', "o")
        .chars()
        .filter_map(fold_to_ascii)
        .collect();

    let mut id = String::with_capacity(lowered.len());
    let mut pending_dash = false;
    for c in lowered.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !id.is_empty() {
                id.push('-');
            }
            pending_dash = false;
            id.push(c);
        } else {
            pending_dash = true;
        }
    }

    id.trim_start_matches(|c: char| c.is_ascii_digit() || c == '-')
        .to_string()
}

/// Anchor of the results block a run links to; session levels share one block.
pub(super) fn results_anchor(track: &str, runid: &str) -> String {
    anchor_slug(results_run_id(track, runid))
}
