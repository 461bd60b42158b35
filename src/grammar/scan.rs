//! Statement-boundary scanning for chunked input
//!
//! The stream parser reads fixed-size chunks and must only hand whole
//! statements to the grammar engine. `statement_end` finds the last byte
//! offset in a buffer up to which every statement is complete, skipping
//! terminator characters inside quoted strings, IRI references, comments
//! and nested brackets.

/// Scanner state carried across buffer refills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Code,
    Comment,
    IriRef,
    Short(char),
    Long(char),
}

/// Find the end offset (exclusive, past the terminating `.`) of the last
/// complete statement in `buf`, or `None` if no statement terminator has
/// been seen yet.
///
/// A `.` terminates a statement only at bracket depth zero, outside strings
/// and comments, and when followed by whitespace or a comment. A `.` as the
/// final byte of the buffer is not a terminator: more input could extend it
/// into a number or a dotted local name.
pub(crate) fn statement_end(buf: &str) -> Option<usize> {
    let bytes = buf.as_bytes();
    let mut region = Region::Code;
    let mut depth: usize = 0;
    let mut last_end = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match region {
            Region::Comment => {
                if b == b'\n' {
                    region = Region::Code;
                }
            }
            Region::IriRef => {
                if b == b'>' {
                    region = Region::Code;
                }
            }
            Region::Short(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q as u8 || b == b'\n' {
                    region = Region::Code;
                }
            }
            Region::Long(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q as u8 && bytes[i..].starts_with(&[q as u8; 3]) {
                    region = Region::Code;
                    i += 2;
                }
            }
            Region::Code => match b {
                b'#' => region = Region::Comment,
                b'<' => region = Region::IriRef,
                b'"' | b'\'' => {
                    if bytes[i..].starts_with(&[b; 3]) {
                        region = Region::Long(b as char);
                        i += 2;
                    } else {
                        region = Region::Short(b as char);
                    }
                }
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => depth = depth.saturating_sub(1),
                b'.' if depth == 0 => {
                    // only a terminator when something separates it from
                    // the next token
                    match bytes.get(i + 1) {
                        Some(next) if next.is_ascii_whitespace() || *next == b'#' => {
                            last_end = Some(i + 1);
                        }
                        _ => {}
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }

    last_end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_statement() {
        let buf = "<http://e.com/s> <http://e.com/p> <http://e.com/o> .\n";
        assert_eq!(statement_end(buf), Some(buf.len() - 1));
    }

    #[test]
    fn test_no_terminator_yet() {
        assert_eq!(statement_end("<http://e.com/s> <http://e.com/p>"), None);
    }

    #[test]
    fn test_dot_inside_iri_ignored() {
        let buf = "<http://e.com/a.b> <http://e.com/p. q";
        assert_eq!(statement_end(buf), None);
    }

    #[test]
    fn test_dot_inside_string_ignored() {
        let buf = "<http://e.com/s> <http://e.com/p> \"v. 1. 2\"";
        assert_eq!(statement_end(buf), None);
        let buf = "<http://e.com/s> <http://e.com/p> \"v. 1\" .\n";
        assert_eq!(statement_end(buf), Some(buf.len() - 1));
    }

    #[test]
    fn test_dot_inside_long_string_ignored() {
        let buf = "<http://e.com/s> <http://e.com/p> \"\"\"a . b\n\"next\" . c\"\"\" .\n";
        assert_eq!(statement_end(buf), Some(buf.len() - 1));
    }

    #[test]
    fn test_dot_inside_brackets_ignored() {
        // the inner '.' after <b> sits at depth 1
        let buf = "<http://e.com/a> <http://e.com/p> [ <http://e.com/q> <http://e.com/b> . ]";
        assert_eq!(statement_end(buf), None);
    }

    #[test]
    fn test_dot_inside_comment_ignored() {
        let buf = "# not a terminator .\n<http://e.com/s> <http://e.com/p> <http://e.com/o>";
        assert_eq!(statement_end(buf), None);
    }

    #[test]
    fn test_trailing_dot_needs_lookahead() {
        // could still grow into a decimal or a dotted local name
        assert_eq!(statement_end("<http://e.com/s> <http://e.com/p> 4."), None);
        let buf = "<http://e.com/s> <http://e.com/p> 4. ";
        assert_eq!(statement_end(buf), Some(buf.len() - 1));
    }

    #[test]
    fn test_last_of_several_statements() {
        let buf = "<http://e.com/a> <http://e.com/p> <http://e.com/b> .\n\
                   <http://e.com/c> <http://e.com/p> <http://e.com/d> .\n\
                   <http://e.com/e> <http://e.com/p>";
        let end = statement_end(buf).unwrap();
        assert!(buf[..end].ends_with('.'));
        assert!(buf[end..].contains("e.com/e"));
    }

    #[test]
    fn test_escaped_quote_in_string() {
        let buf = "<http://e.com/s> <http://e.com/p> \"say \\\". not done";
        assert_eq!(statement_end(buf), None);
    }
}
