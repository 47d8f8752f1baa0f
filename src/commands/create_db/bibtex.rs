use super::*;

/// One `name = value` pair; `raw` keeps the delimiters as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct BibField {
    pub(super) name: String,
    pub(super) raw: String,
    pub(super) value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct BibEntry {
    pub(super) entry_type: String,
    pub(super) key: String,
    pub(super) fields: Vec<BibField>,
}

impl BibEntry {
    pub(super) fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.as_str())
    }

    /// Re-serializes the entry with one tab-indented field per line.
    pub(super) fn to_bibtex(&self) -> String {
        let fields = self
            .fields
            .iter()
            .map(|field| format!("\t{} = {}", field.name, collapse_whitespace(&field.raw)))
            .collect::<Vec<_>>()
            .join(",\n");
        format!("@{}{{{},\n{}\n}}\n", self.entry_type, self.key, fields)
    }
}

pub(super) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|byte| byte.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn take_while(&mut self, keep: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&keep) {
            self.pos += 1;
        }
        &self.text[start..self.pos]
    }

    /// Consumes a `{...}` group and returns its inner text.
    fn braced(&mut self) -> Result<&'a str> {
        let start = self.pos + 1;
        let mut depth = 0usize;
        while let Some(byte) = self.peek() {
            match byte {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += 1;
                        return Ok(&self.text[start..self.pos - 1]);
                    }
                }
                b'\\' => self.pos += 1,
                _ => {}
            }
            self.pos += 1;
        }
        bail!("unbalanced braces starting at byte {start}")
    }

    /// Consumes a `"..."` string; quotes inside braces do not close it.
    fn quoted(&mut self) -> Result<&'a str> {
        let start = self.pos + 1;
        self.pos += 1;
        let mut depth = 0usize;
        while let Some(byte) = self.peek() {
            match byte {
                b'{' => depth += 1,
                b'}' => depth = depth.saturating_sub(1),
                b'\\' => self.pos += 1,
                b'"' if depth == 0 => {
                    self.pos += 1;
                    return Ok(&self.text[start..self.pos - 1]);
                }
                _ => {}
            }
            self.pos += 1;
        }
        bail!("unterminated string starting at byte {start}")
    }

    /// A field value: braced, quoted or bare pieces joined by `#`.
    fn value(&mut self) -> Result<(String, String)> {
        let start = self.pos;
        let mut value = String::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'{') => value.push_str(self.braced()?),
                Some(b'"') => value.push_str(self.quoted()?),
                Some(_) => value.push_str(
                    self.take_while(|byte| !matches!(byte, b',' | b'}' | b'#') && !byte.is_ascii_whitespace()),
                ),
                None => bail!("field value runs past end of file"),
            }
            self.skip_whitespace();
            if self.peek() == Some(b'#') {
                self.pos += 1;
                continue;
            }
            break;
        }
        Ok((self.text[start..self.pos].trim().to_string(), value))
    }
}

fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'-' | b':' | b'.' | b'+' | b'/')
}

#[derive(Debug, Default)]
pub(super) struct Bibliography {
    pub(super) entries: Vec<BibEntry>,
    pub(super) warnings: Vec<String>,
}

/// Parses the entries of a `.bib` file. `@comment`, `@preamble` and
/// `@string` blocks are skipped. A malformed entry is skipped with a
/// warning and scanning resumes at the next `@`.
pub(super) fn parse_bibliography(text: &str) -> Bibliography {
    let mut scanner = Scanner { text, pos: 0 };
    let mut bibliography = Bibliography::default();

    while let Some(offset) = text[scanner.pos..].find('@') {
        scanner.pos += offset + 1;
        let entry_start = scanner.pos;
        let entry_type = scanner
            .take_while(|byte| byte.is_ascii_alphabetic())
            .to_ascii_lowercase();
        scanner.skip_whitespace();
        if scanner.peek() != Some(b'{') {
            continue;
        }
        if matches!(entry_type.as_str(), "comment" | "preamble" | "string") {
            if let Err(err) = scanner.braced() {
                warn!(entry_type = %entry_type, error = %format!("{err:#}"), "skipping bibtex block");
                bibliography
                    .warnings
                    .push(format!("bibtex @{entry_type}: {err:#}"));
                scanner.pos = entry_start;
            }
            continue;
        }

        scanner.pos += 1;
        scanner.skip_whitespace();
        let key = scanner
            .take_while(|byte| byte != b',' && byte != b'}' && !byte.is_ascii_whitespace())
            .to_string();
        match parse_fields(&mut scanner) {
            Ok(fields) => bibliography.entries.push(BibEntry {
                entry_type,
                key,
                fields,
            }),
            Err(err) => {
                warn!(key = %key, error = %format!("{err:#}"), "skipping malformed bibtex entry");
                bibliography
                    .warnings
                    .push(format!("bibtex {key}: {err:#}"));
                scanner.pos = entry_start;
            }
        }
    }

    bibliography
}

fn parse_fields(scanner: &mut Scanner<'_>) -> Result<Vec<BibField>> {
    let mut fields = Vec::new();
    loop {
        scanner.skip_whitespace();
        match scanner.peek() {
            Some(b',') => {
                scanner.pos += 1;
                continue;
            }
            Some(b'}') => {
                scanner.pos += 1;
                return Ok(fields);
            }
            Some(_) => {}
            None => bail!("entry is not closed"),
        }

        let name = scanner.take_while(is_name_byte).to_ascii_lowercase();
        scanner.skip_whitespace();
        if name.is_empty() || scanner.peek() != Some(b'=') {
            bail!("expected `name = value` at byte {}", scanner.pos);
        }
        scanner.pos += 1;
        let (raw, value) = scanner.value()?;
        fields.push(BibField { name, raw, value });
    }
}

fn accented(accent: char, letter: char) -> Option<char> {
    let (plain, marked) = match accent {
        '\'' => ("aeiouyAEIOUYcnszCNSZ", "áéíóúýÁÉÍÓÚÝćńśźĆŃŚŹ"),
        '`' => ("aeiouAEIOU", "àèìòùÀÈÌÒÙ"),
        '^' => ("aeiouAEIOU", "âêîôûÂÊÎÔÛ"),
        '"' => ("aeiouyAEIOU", "äëïöüÿÄËÏÖÜ"),
        '~' => ("anoANO", "ãñõÃÑÕ"),
        '=' => ("aeiouAEIOU", "āēīōūĀĒĪŌŪ"),
        '.' => ("zZ", "żŻ"),
        'c' => ("cCsS", "çÇşŞ"),
        'v' => ("cCsSzZrReE", "čČšŠžŽřŘěĚ"),
        'H' => ("oOuU", "őŐűŰ"),
        _ => return None,
    };
    plain
        .chars()
        .position(|candidate| candidate == letter)
        .and_then(|idx| marked.chars().nth(idx))
}

fn named_symbol(name: &str) -> Option<&'static str> {
    Some(match name {
        "ss" => "ß",
        "o" => "ø",
        "O" => "Ø",
        "aa" => "å",
        "AA" => "Å",
        "ae" => "æ",
        "AE" => "Æ",
        "oe" => "œ",
        "l" => "ł",
        "L" => "Ł",
        "i" => "ı",
        "textendash" => "–",
        "textemdash" => "—",
        _ => return None,
    })
}

/// Renders LaTeX markup as plain text: accent macros become letters,
/// escapes become their characters and grouping braces disappear.
pub(super) fn latex_to_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                let Some(&next) = chars.peek() else {
                    break;
                };
                if !next.is_ascii_alphabetic() {
                    chars.next();
                    if let Some(mark) = ['\'', '`', '^', '"', '~', '=', '.'].iter().find(|m| **m == next) {
                        push_accented(&mut out, *mark, &mut chars);
                    } else if next == '\\' {
                        out.push(' ');
                    } else {
                        out.push(next);
                    }
                    continue;
                }

                let mut name = String::new();
                while let Some(&letter) = chars.peek() {
                    if !letter.is_ascii_alphabetic() {
                        break;
                    }
                    name.push(letter);
                    chars.next();
                }
                if let Some(mark) = ['c', 'v', 'H'].into_iter().find(|m| name.len() == 1 && name.starts_with(*m)) {
                    while chars.peek() == Some(&' ') {
                        chars.next();
                    }
                    push_accented(&mut out, mark, &mut chars);
                } else if let Some(symbol) = named_symbol(&name) {
                    out.push_str(symbol);
                    if chars.peek() == Some(&' ') {
                        chars.next();
                    }
                } else if chars.peek() == Some(&' ') {
                    chars.next();
                }
            }
            '{' | '}' | '$' => {}
            '~' => out.push(' '),
            '-' if chars.peek() == Some(&'-') => {
                chars.next();
                if chars.peek() == Some(&'-') {
                    chars.next();
                    out.push('—');
                } else {
                    out.push('–');
                }
            }
            _ => out.push(ch),
        }
    }

    out
}

fn push_accented(out: &mut String, accent: char, chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    let braced = chars.peek() == Some(&'{');
    if braced {
        chars.next();
    }
    let Some(letter) = chars.next() else {
        return;
    };
    if braced && chars.peek() == Some(&'}') {
        chars.next();
    }
    match accented(accent, letter) {
        Some(marked) => out.push(marked),
        None => out.push(letter),
    }
}
