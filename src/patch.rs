use crate::colors::Palette;
use crate::diff::{Decision, FileDiff, Hunk, ParsedDiff};
use crate::session::Session;
use anyhow::Result;
use std::io::{BufRead, Write};

const HELP_PATCH_TEXT: &str = "\
y - stage this hunk
n - do not stage this hunk
a - stage this and all the remaining hunks
d - do not stage this hunk nor any of the remaining hunks
j - leave this hunk undecided, see next undecided hunk
J - leave this hunk undecided, see next hunk
k - leave this hunk undecided, see previous undecided hunk
K - leave this hunk undecided, see previous hunk
? - print help";

/// one side of a hunk header, with the count elided when it is 1, the way
/// the diffs being consumed write it
fn header_range(offset: i64, count: u64) -> String {
    if count == 1 {
        format!("{offset}")
    } else {
        format!("{offset},{count}")
    }
}

/// write one hunk, plain or colored, regenerating its header with the
/// new-file offset shifted by `delta`. A hunk with an all-zero header (the
/// file prelude) is passed through verbatim.
pub fn render_hunk(
    plain: &[u8],
    colored: Option<&[u8]>,
    hunk: &Hunk,
    delta: i64,
    colors: &Palette,
    out: &mut Vec<u8>,
) {
    let header = &hunk.header;

    if header.old_offset != 0 || header.new_offset != 0 {
        let new_offset = header.new_offset as i64 + delta;
        out.extend_from_slice(
            format!(
                "@@ -{} +{} @@",
                header_range(header.old_offset as i64, header.old_count),
                header_range(new_offset, header.new_count)
            )
            .as_bytes(),
        );

        // the trailer always includes the line terminator
        match colored {
            Some(colored) => {
                out.extend_from_slice(colors.fraginfo.as_bytes());
                out.extend_from_slice(
                    &colored[header.colored_extra_start..header.colored_extra_end],
                );
            }
            None => out.extend_from_slice(&plain[header.extra_start..header.extra_end]),
        }
    }

    match colored {
        Some(colored) => out.extend_from_slice(&colored[hunk.colored_start..hunk.colored_end]),
        None => out.extend_from_slice(&plain[hunk.start..hunk.end]),
    }
}

/// concatenate the file prelude and the selected hunks into a patch for the
/// applier. Skipped hunks shift the new-file offsets of everything after
/// them by their old/new line count difference.
pub fn reassemble_patch(plain: &[u8], file: &FileDiff, colors: &Palette, out: &mut Vec<u8>) {
    render_hunk(plain, None, &file.head, 0, colors, out);

    let mut delta: i64 = 0;
    for hunk in &file.hunks {
        if hunk.decision == Decision::Use {
            render_hunk(plain, None, hunk, delta, colors, out);
        } else {
            delta += hunk.header.old_count as i64 - hunk.header.new_count as i64;
        }
    }
}

/// the next undecided hunk after `from`, searching past the end around to
/// the start; `hunks.len()` when every hunk is decided
fn advance_to_undecided(hunks: &[Hunk], from: usize) -> usize {
    let count = hunks.len();
    for step in 1..=count {
        let i = (from + step) % count;
        if hunks[i].decision == Decision::Undecided {
            return i;
        }
    }
    count
}

/// walk the file's hunks, collecting a decision for each, then apply the
/// selected ones to the index
pub fn patch_update_file(
    s: &Session,
    plain: &[u8],
    colored: Option<&[u8]>,
    file: &mut FileDiff,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<()> {
    if file.hunks.is_empty() {
        return Ok(());
    }

    let mut buf = Vec::new();
    render_hunk(plain, colored, &file.head, 0, &s.colors, &mut buf);
    out.write_all(&buf)?;

    let mut hunk_index = 0;
    loop {
        if hunk_index >= file.hunks.len() {
            hunk_index = 0;
        }

        let undecided_previous = file.hunks[..hunk_index]
            .iter()
            .rposition(|hunk| hunk.decision == Decision::Undecided);
        let undecided_next = file.hunks[hunk_index + 1..]
            .iter()
            .position(|hunk| hunk.decision == Decision::Undecided)
            .map(|i| hunk_index + 1 + i);

        // everything decided?
        if undecided_previous.is_none()
            && undecided_next.is_none()
            && file.hunks[hunk_index].decision != Decision::Undecided
        {
            break;
        }

        buf.clear();
        render_hunk(plain, colored, &file.hunks[hunk_index], 0, &s.colors, &mut buf);
        out.write_all(&buf)?;

        let mut keys = String::new();
        if undecided_previous.is_some() {
            keys.push_str(",k");
        }
        if hunk_index > 0 {
            keys.push_str(",K");
        }
        if undecided_next.is_some() {
            keys.push_str(",j");
        }
        if hunk_index + 1 < file.hunks.len() {
            keys.push_str(",J");
        }
        let prompt = format!("Stage this hunk [y,n,a,d{keys},?]?");
        write!(out, "{} ", s.colors.paint(&s.colors.prompt, &prompt))?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let answer = line.trim_end_matches(['\n', '\r']);
        let Some(first) = answer.chars().next() else {
            continue;
        };

        match first.to_ascii_lowercase() {
            'y' => {
                file.hunks[hunk_index].decision = Decision::Use;
                hunk_index = advance_to_undecided(&file.hunks, hunk_index);
            }
            'n' => {
                file.hunks[hunk_index].decision = Decision::Skip;
                hunk_index = advance_to_undecided(&file.hunks, hunk_index);
            }
            'a' => {
                for hunk in &mut file.hunks[hunk_index..] {
                    if hunk.decision == Decision::Undecided {
                        hunk.decision = Decision::Use;
                    }
                }
                hunk_index = file.hunks.len();
            }
            'd' => {
                for hunk in &mut file.hunks[hunk_index..] {
                    if hunk.decision == Decision::Undecided {
                        hunk.decision = Decision::Skip;
                    }
                }
                hunk_index = file.hunks.len();
            }
            _ if first == 'K' => {
                if hunk_index > 0 {
                    hunk_index -= 1;
                } else {
                    writeln!(err, "{}", s.colors.paint(&s.colors.error, "No previous hunk"))?;
                }
            }
            _ if first == 'J' => {
                if hunk_index + 1 < file.hunks.len() {
                    hunk_index += 1;
                } else {
                    writeln!(err, "{}", s.colors.paint(&s.colors.error, "No next hunk"))?;
                }
            }
            _ if first == 'k' => match undecided_previous {
                Some(i) => hunk_index = i,
                None => {
                    writeln!(err, "{}", s.colors.paint(&s.colors.error, "No previous hunk"))?;
                }
            },
            _ if first == 'j' => match undecided_next {
                Some(i) => hunk_index = i,
                None => {
                    writeln!(err, "{}", s.colors.paint(&s.colors.error, "No next hunk"))?;
                }
            },
            _ => writeln!(out, "{}", s.colors.paint(&s.colors.error, HELP_PATCH_TEXT))?,
        }
    }

    if file.hunks.iter().any(|hunk| hunk.decision == Decision::Use) {
        buf.clear();
        reassemble_patch(plain, file, &s.colors, &mut buf);
        match s.git.apply_cached(&buf) {
            Ok(()) => {
                if let Err(e) = s.git.refresh_index() {
                    crate::warning!("{:#}", e);
                }
            }
            Err(e) => {
                writeln!(err, "{}", s.colors.paint(&s.colors.error, &format!("{e:#}")))?;
            }
        }
    }

    writeln!(out)?;
    Ok(())
}

/// capture the diff, then run the hunk walk for each file in turn
pub fn run_patch(
    s: &Session,
    pathspec: &[String],
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<()> {
    s.git.refresh_index()?;

    let plain = s.git.capture_diff(false, pathspec)?;
    if plain.is_empty() {
        return Ok(());
    }
    let colored = if s.colors.is_enabled() {
        Some(s.git.capture_diff(true, pathspec)?)
    } else {
        None
    };

    let ParsedDiff {
        plain,
        colored,
        mut files,
    } = ParsedDiff::parse(plain, colored)?;

    let mut last_error = None;
    for file in &mut files {
        if let Err(e) = patch_update_file(s, &plain, colored.as_deref(), file, input, out, err) {
            last_error = Some(e);
        }
    }

    match last_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
