use crate::colors::Palette;
use crate::constants::{PREFIX_MAX_LEN, PREFIX_MIN_LEN};
use crate::prefixes::find_unique_prefixes;
use anyhow::Result;
use std::io::{BufRead, Write};

/// an entry the chooser can display and select: a name for prefix matching
/// plus a printer for its list line
pub trait ListItem {
    fn name(&self) -> &str;

    fn print(
        &self,
        n: usize,
        prefix_len: usize,
        colors: &Palette,
        out: &mut dyn Write,
    ) -> std::io::Result<()>;
}

pub struct ListOptions<'a> {
    /// items per row; 0 means one per line
    pub columns: usize,
    pub header: Option<&'a str>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Selection {
    Index(usize),
    /// empty input line
    None,
    /// end of input
    Quit,
}

/// print the items, wrapping every `columns` entries, always ending the
/// block with a newline
pub fn list(
    items: &[&dyn ListItem],
    prefix_lengths: &[usize],
    colors: &Palette,
    opts: &ListOptions,
    out: &mut dyn Write,
) -> std::io::Result<()> {
    if items.is_empty() {
        return Ok(());
    }

    if let Some(header) = opts.header {
        writeln!(out, "{}", colors.paint(&colors.header, header))?;
    }

    let mut last_lf = false;
    for (i, item) in items.iter().enumerate() {
        item.print(i + 1, prefix_lengths[i], colors, out)?;

        if opts.columns > 0 && (i + 1) % opts.columns != 0 {
            write!(out, "\t")?;
            last_lf = false;
        } else {
            writeln!(out)?;
            last_lf = true;
        }
    }
    if !last_lf {
        writeln!(out)?;
    }

    Ok(())
}

/// display the list and read selections until one resolves; a selection is
/// either a 1-based index or a unique prefix of an item's name
pub fn list_and_choose(
    items: &[&dyn ListItem],
    colors: &Palette,
    opts: &ListOptions,
    prompt: &str,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<Selection> {
    loop {
        let prefix_lengths =
            find_unique_prefixes(&names(items), PREFIX_MIN_LEN, PREFIX_MAX_LEN);
        list(items, &prefix_lengths, colors, opts, out)?;

        write!(out, "{}> ", colors.paint(&colors.prompt, prompt))?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            return Ok(Selection::Quit);
        }

        let line = line.trim();
        if line.is_empty() {
            return Ok(Selection::None);
        }

        for token in line.split([' ', '\t', '\r', '\n', ',']) {
            if token.is_empty() {
                continue;
            }

            let index = if token.bytes().all(|b| b.is_ascii_digit()) {
                token
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .filter(|&i| i < items.len())
            } else {
                find_unique(token, items)
            };

            match index {
                Some(i) => return Ok(Selection::Index(i)),
                None => writeln!(out, "Huh ({token})?")?,
            }
        }
    }
}

fn names<'a>(items: &[&'a dyn ListItem]) -> Vec<&'a str> {
    items.iter().map(|item| item.name()).collect()
}

/// find the single item whose name starts with `token`; ambiguity is no match
fn find_unique(token: &str, items: &[&dyn ListItem]) -> Option<usize> {
    let mut found = None;
    for (i, item) in items.iter().enumerate() {
        if item.name().starts_with(token) {
            if found.is_some() {
                return None;
            }
            found = Some(i);
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct Named(&'static str);

    impl ListItem for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn print(
            &self,
            n: usize,
            prefix_len: usize,
            _colors: &Palette,
            out: &mut dyn Write,
        ) -> std::io::Result<()> {
            if prefix_len == 0 {
                write!(out, " {n:2}: {}", self.0)
            } else {
                write!(out, " {n:2}: [{}]{}", &self.0[..prefix_len], &self.0[prefix_len..])
            }
        }
    }

    fn choose(items: &[&dyn ListItem], input: &str) -> (Selection, String) {
        let colors = Palette::plain();
        let opts = ListOptions {
            columns: 0,
            header: None,
        };
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut out = Vec::new();
        let selection =
            list_and_choose(items, &colors, &opts, "What now", &mut reader, &mut out).unwrap();
        (selection, String::from_utf8(out).unwrap())
    }

    fn commands() -> [Named; 3] {
        [Named("status"), Named("stage"), Named("stash")]
    }

    #[test]
    fn numeric_selection() {
        let items = commands();
        let items: Vec<&dyn ListItem> = items.iter().map(|i| i as &dyn ListItem).collect();
        let (selection, _) = choose(&items, "1\n");
        assert_eq!(selection, Selection::Index(0));
    }

    #[test]
    fn numeric_selection_out_of_range() {
        let items = commands();
        let items: Vec<&dyn ListItem> = items.iter().map(|i| i as &dyn ListItem).collect();
        let (selection, out) = choose(&items, "4\n2\n");
        assert_eq!(selection, Selection::Index(1));
        assert!(out.contains("Huh (4)?"));
    }

    #[test]
    fn zero_is_not_a_selection() {
        let items = commands();
        let items: Vec<&dyn ListItem> = items.iter().map(|i| i as &dyn ListItem).collect();
        let (selection, out) = choose(&items, "0\n\n");
        assert_eq!(selection, Selection::None);
        assert!(out.contains("Huh (0)?"));
    }

    #[test]
    fn full_name_selects() {
        let items = commands();
        let items: Vec<&dyn ListItem> = items.iter().map(|i| i as &dyn ListItem).collect();
        let (selection, _) = choose(&items, "stage\n");
        assert_eq!(selection, Selection::Index(1));
    }

    #[test]
    fn unique_prefix_selects() {
        let items = commands();
        let items: Vec<&dyn ListItem> = items.iter().map(|i| i as &dyn ListItem).collect();
        let (selection, _) = choose(&items, "stag\n");
        assert_eq!(selection, Selection::Index(1));
    }

    #[test]
    fn ambiguous_prefix_is_rejected() {
        let items = commands();
        let items: Vec<&dyn ListItem> = items.iter().map(|i| i as &dyn ListItem).collect();
        let (selection, out) = choose(&items, "sta\nstash\n");
        assert_eq!(selection, Selection::Index(2));
        assert!(out.contains("Huh (sta)?"));
    }

    #[test]
    fn first_valid_token_wins() {
        let items = commands();
        let items: Vec<&dyn ListItem> = items.iter().map(|i| i as &dyn ListItem).collect();
        let (selection, out) = choose(&items, "bogus 2 3\n");
        assert_eq!(selection, Selection::Index(1));
        assert!(out.contains("Huh (bogus)?"));
    }

    #[test]
    fn comma_separates_tokens() {
        let items = commands();
        let items: Vec<&dyn ListItem> = items.iter().map(|i| i as &dyn ListItem).collect();
        let (selection, _) = choose(&items, ",,stash,1\n");
        assert_eq!(selection, Selection::Index(2));
    }

    #[test]
    fn empty_line_returns_none() {
        let items = commands();
        let items: Vec<&dyn ListItem> = items.iter().map(|i| i as &dyn ListItem).collect();
        let (selection, _) = choose(&items, "   \n");
        assert_eq!(selection, Selection::None);
    }

    #[test]
    fn eof_returns_quit() {
        let items = commands();
        let items: Vec<&dyn ListItem> = items.iter().map(|i| i as &dyn ListItem).collect();
        let (selection, _) = choose(&items, "");
        assert_eq!(selection, Selection::Quit);
    }

    #[test]
    fn same_input_same_result() {
        let items = commands();
        let items: Vec<&dyn ListItem> = items.iter().map(|i| i as &dyn ListItem).collect();
        let (first, _) = choose(&items, "stat\n");
        let (second, _) = choose(&items, "stat\n");
        assert_eq!(first, second);
        assert_eq!(first, Selection::Index(0));
    }

    #[test]
    fn listing_shows_prefixes_and_wraps_columns() {
        let items = commands();
        let items: Vec<&dyn ListItem> = items.iter().map(|i| i as &dyn ListItem).collect();
        let colors = Palette::plain();
        let opts = ListOptions {
            columns: 2,
            header: Some("*** Commands ***"),
        };
        let prefix_lengths = find_unique_prefixes(&names(&items), 1, 4);
        let mut out = Vec::new();
        list(&items, &prefix_lengths, &colors, &opts, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(
            out,
            "*** Commands ***\n  1: [stat]us\t  2: [stag]e\n  3: [stas]h\t\n"
        );
    }
}
