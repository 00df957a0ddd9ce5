use anyhow::{Result, bail};

/// what the user decided about a hunk
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    #[default]
    Undecided,
    Skip,
    Use,
}

/// parsed `@@ -old[,cnt] +new[,cnt] @@<trailer>` line; the trailer ranges
/// cover everything after the second `@@` including the newline
#[derive(Debug, Default, Clone, Copy)]
pub struct HunkHeader {
    pub old_offset: u64,
    pub old_count: u64,
    pub new_offset: u64,
    pub new_count: u64,
    pub extra_start: usize,
    pub extra_end: usize,
    pub colored_extra_start: usize,
    pub colored_extra_end: usize,
}

/// byte range of one hunk in the plain diff buffer, mirrored into the
/// colored buffer when one was captured; the body starts after the header
/// line. A file's prelude is modeled as a hunk with an all-zero header.
#[derive(Debug, Default, Clone, Copy)]
pub struct Hunk {
    pub start: usize,
    pub end: usize,
    pub colored_start: usize,
    pub colored_end: usize,
    pub header: HunkHeader,
    pub decision: Decision,
}

/// one file block of the diff: the prelude (from the `diff ` line up to the
/// first `@@`) and its hunks
#[derive(Debug)]
pub struct FileDiff {
    pub head: Hunk,
    pub hunks: Vec<Hunk>,
}

/// a parsed diff session: the captured buffers plus the file/hunk index
/// into them
#[derive(Debug)]
pub struct ParsedDiff {
    pub plain: Vec<u8>,
    pub colored: Option<Vec<u8>>,
    pub files: Vec<FileDiff>,
}

impl ParsedDiff {
    /// split captured diff output into files and hunks. The colored buffer,
    /// when given, must have the same line structure as the plain one; the
    /// parser walks both in lockstep.
    pub fn parse(mut plain: Vec<u8>, mut colored: Option<Vec<u8>>) -> Result<Self> {
        complete_line(&mut plain);
        if let Some(colored) = colored.as_mut() {
            complete_line(colored);
        }

        let files = parse_file_diffs(&plain, colored.as_deref())?;

        Ok(Self {
            plain,
            colored,
            files,
        })
    }
}

fn complete_line(buf: &mut Vec<u8>) {
    if !buf.is_empty() && buf.last() != Some(&b'\n') {
        buf.push(b'\n');
    }
}

fn line_end(buf: &[u8], start: usize) -> usize {
    match buf[start..].iter().position(|&b| b == b'\n') {
        Some(i) => start + i + 1,
        None => buf.len(),
    }
}

fn parse_file_diffs(plain: &[u8], colored: Option<&[u8]>) -> Result<Vec<FileDiff>> {
    let mut files: Vec<FileDiff> = Vec::new();
    let mut p = 0;
    let mut colored_p = 0;

    while p < plain.len() {
        let eol = line_end(plain, p);
        let line = &plain[p..eol];

        let colored_eol = match colored {
            Some(colored) => {
                if colored_p >= colored.len() {
                    bail!("mismatched colored diff output");
                }
                line_end(colored, colored_p)
            }
            None => 0,
        };

        if line.starts_with(b"diff ") {
            files.push(FileDiff {
                head: Hunk {
                    start: p,
                    end: eol,
                    colored_start: colored_p,
                    colored_end: colored_eol,
                    ..Hunk::default()
                },
                hunks: Vec::new(),
            });
        } else {
            let Some(file) = files.last_mut() else {
                bail!(
                    "diff starts with unexpected line: {}",
                    String::from_utf8_lossy(line).trim_end()
                );
            };

            if line.starts_with(b"@@ ") {
                let header = parse_hunk_header(
                    plain,
                    p,
                    eol,
                    colored.map(|colored| (colored, colored_p, colored_eol)),
                )?;
                file.hunks.push(Hunk {
                    // the body starts on the line after the header
                    start: eol,
                    end: eol,
                    colored_start: colored_eol,
                    colored_end: colored_eol,
                    header,
                    decision: Decision::Undecided,
                });
            } else {
                let hunk = match file.hunks.last_mut() {
                    Some(hunk) => hunk,
                    None => &mut file.head,
                };
                hunk.end = eol;
                hunk.colored_end = colored_eol;
            }
        }

        p = eol;
        colored_p = colored_eol;
    }

    Ok(files)
}

fn parse_hunk_header(
    plain: &[u8],
    start: usize,
    eol: usize,
    colored: Option<(&[u8], usize, usize)>,
) -> Result<HunkHeader> {
    let line = &plain[start..eol];
    let mut header = HunkHeader::default();
    let mut i = 0;

    let parsed = (|| {
        expect(line, &mut i, b"@@ -")?;
        header.old_offset = take_number(line, &mut i)?;
        header.old_count = take_count(line, &mut i)?;
        expect(line, &mut i, b" +")?;
        header.new_offset = take_number(line, &mut i)?;
        header.new_count = take_count(line, &mut i)?;
        expect(line, &mut i, b" @@")
    })();
    if parsed.is_none() {
        bail!(
            "could not parse hunk header '{}'",
            String::from_utf8_lossy(line).trim_end()
        );
    }
    header.extra_start = start + i;
    header.extra_end = eol;

    if let Some((colored, colored_start, colored_eol)) = colored {
        let line = &colored[colored_start..colored_eol];
        let parsed = find_subslice(line, b"@@ -")
            .and_then(|open| find_subslice(&line[open..], b" @@").map(|close| open + close));
        let Some(close) = parsed else {
            bail!(
                "could not parse colored hunk header '{}'",
                String::from_utf8_lossy(line).trim_end()
            );
        };
        header.colored_extra_start = colored_start + close + 3;
        header.colored_extra_end = colored_eol;
    }

    Ok(header)
}

fn expect(line: &[u8], i: &mut usize, token: &[u8]) -> Option<()> {
    if line[*i..].starts_with(token) {
        *i += token.len();
        Some(())
    } else {
        None
    }
}

fn take_number(line: &[u8], i: &mut usize) -> Option<u64> {
    let start = *i;
    while *i < line.len() && line[*i].is_ascii_digit() {
        *i += 1;
    }
    std::str::from_utf8(&line[start..*i]).ok()?.parse().ok()
}

/// the count part of a range defaults to 1 when `,count` is omitted
fn take_count(line: &[u8], i: &mut usize) -> Option<u64> {
    if line.get(*i) == Some(&b',') {
        *i += 1;
        take_number(line, i)
    } else {
        Some(1)
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_FILES: &str = "\
diff --git a/alpha.txt b/alpha.txt
index 1111111..2222222 100644
--- a/alpha.txt
+++ b/alpha.txt
@@ -1,2 +1,3 @@
 one
+one and a half
 two
@@ -10,2 +11,2 @@ fn header()
-ten
+TEN
 eleven
diff --git a/beta.txt b/beta.txt
index 3333333..4444444 100644
--- a/beta.txt
+++ b/beta.txt
@@ -3 +3 @@
-old
+new
";

    fn parse(text: &str) -> ParsedDiff {
        ParsedDiff::parse(text.as_bytes().to_vec(), None).unwrap()
    }

    fn slice<'a>(buf: &'a [u8], hunk: &Hunk) -> &'a str {
        std::str::from_utf8(&buf[hunk.start..hunk.end]).unwrap()
    }

    #[test]
    fn splits_files_and_hunks() {
        let diff = parse(TWO_FILES);
        assert_eq!(diff.files.len(), 2);
        assert_eq!(diff.files[0].hunks.len(), 2);
        assert_eq!(diff.files[1].hunks.len(), 1);
    }

    #[test]
    fn head_covers_the_prelude() {
        let diff = parse(TWO_FILES);
        let head = &diff.files[0].head;
        let text = slice(&diff.plain, head);
        assert!(text.starts_with("diff --git a/alpha.txt"));
        assert!(text.ends_with("+++ b/alpha.txt\n"));
        assert_eq!(head.header.old_offset, 0);
        assert_eq!(head.header.new_offset, 0);
    }

    #[test]
    fn hunk_body_starts_after_the_header() {
        let diff = parse(TWO_FILES);
        let hunk = &diff.files[0].hunks[0];
        assert_eq!(
            slice(&diff.plain, hunk),
            " one\n+one and a half\n two\n"
        );
    }

    #[test]
    fn header_fields_and_trailer() {
        let diff = parse(TWO_FILES);
        let header = &diff.files[0].hunks[1].header;
        assert_eq!(
            (
                header.old_offset,
                header.old_count,
                header.new_offset,
                header.new_count
            ),
            (10, 2, 11, 2)
        );
        assert_eq!(
            std::str::from_utf8(&diff.plain[header.extra_start..header.extra_end]).unwrap(),
            " fn header()\n"
        );
    }

    #[test]
    fn count_defaults_to_one() {
        let diff = parse(TWO_FILES);
        let header = &diff.files[1].hunks[0].header;
        assert_eq!(
            (
                header.old_offset,
                header.old_count,
                header.new_offset,
                header.new_count
            ),
            (3, 1, 3, 1)
        );
    }

    #[test]
    fn empty_trailer_is_an_empty_range() {
        let diff = parse(TWO_FILES);
        let header = &diff.files[0].hunks[0].header;
        assert_eq!(header.extra_start + 1, header.extra_end);
        assert_eq!(diff.plain[header.extra_start], b'\n');
    }

    #[test]
    fn missing_final_newline_is_completed() {
        let diff = parse("diff --git a/x b/x\n--- a/x\n+++ b/x\n@@ -1 +1 @@\n-a\n+b");
        let hunk = &diff.files[0].hunks[0];
        assert_eq!(slice(&diff.plain, hunk), "-a\n+b\n");
    }

    #[test]
    fn leading_garbage_is_rejected() {
        let result = ParsedDiff::parse(b"not a diff\n".to_vec(), None);
        assert!(result.is_err());
    }

    #[test]
    fn malformed_header_is_rejected() {
        let text = "diff --git a/x b/x\n@@ bogus @@\n";
        let result = ParsedDiff::parse(text.as_bytes().to_vec(), None);
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("could not parse hunk header"));
    }

    #[test]
    fn empty_input_has_no_files() {
        let diff = parse("");
        assert!(diff.files.is_empty());
    }

    #[test]
    fn colored_ranges_track_the_colored_buffer() {
        let plain = "\
diff --git a/x b/x
--- a/x
+++ b/x
@@ -1,2 +1,2 @@ main
-a
+b
 c
";
        let colored = "\
\x1b[1mdiff --git a/x b/x\x1b[m
\x1b[1m--- a/x\x1b[m
\x1b[1m+++ b/x\x1b[m
\x1b[36m@@ -1,2 +1,2 @@\x1b[m main
\x1b[31m-a\x1b[m
\x1b[32m+b\x1b[m
 c
";
        let diff = ParsedDiff::parse(
            plain.as_bytes().to_vec(),
            Some(colored.as_bytes().to_vec()),
        )
        .unwrap();

        let colored_buf = diff.colored.as_ref().unwrap();
        let head = &diff.files[0].head;
        assert!(
            std::str::from_utf8(&colored_buf[head.colored_start..head.colored_end])
                .unwrap()
                .ends_with("+++ b/x\x1b[m\n")
        );

        let hunk = &diff.files[0].hunks[0];
        assert_eq!(
            std::str::from_utf8(&colored_buf[hunk.colored_start..hunk.colored_end]).unwrap(),
            "\x1b[31m-a\x1b[m\n\x1b[32m+b\x1b[m\n c\n"
        );
        assert_eq!(
            std::str::from_utf8(
                &colored_buf
                    [hunk.header.colored_extra_start..hunk.header.colored_extra_end]
            )
            .unwrap(),
            "\x1b[m main\n"
        );
    }

    #[test]
    fn short_colored_buffer_is_rejected() {
        let plain = "diff --git a/x b/x\n@@ -1 +1 @@\n-a\n+b\n";
        let colored = "diff --git a/x b/x\n";
        let result = ParsedDiff::parse(
            plain.as_bytes().to_vec(),
            Some(colored.as_bytes().to_vec()),
        );
        assert!(result.is_err());
    }
}
