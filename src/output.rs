//! Output formatting for lookup results

use crate::query::{LookupHit, Snippet};
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Print lookup hits to stdout, one per line
pub fn print_hits(hits: &[LookupHit], color: bool) -> io::Result<()> {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    write_hits(&mut stdout, hits)
}

/// Write hits as `glossary (src -> tgt)  source => target  # note`
pub fn write_hits<W: WriteColor>(out: &mut W, hits: &[LookupHit]) -> io::Result<()> {
    for hit in hits {
        let record = &hit.record;

        // Glossary label
        out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
        write!(
            out,
            "{} ({} -> {})",
            record.glossary_name, record.source_language, record.target_language
        )?;
        out.reset()?;
        write!(out, "  ")?;

        write_snippets(out, &hit.snippets)?;

        write!(out, " => ")?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
        write!(out, "{}", record.target_term)?;
        out.reset()?;

        if !record.note.is_empty() {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
            write!(out, "  # {}", record.note)?;
            out.reset()?;
        }

        writeln!(out)?;
    }

    Ok(())
}

/// Source term with the matched keywords highlighted
fn write_snippets<W: WriteColor>(out: &mut W, snippets: &[Snippet]) -> io::Result<()> {
    for snippet in snippets {
        match snippet {
            Snippet::Text(text) => write!(out, "{}", text)?,
            Snippet::Keyword(text) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
                write!(out, "{}", text)?;
                out.reset()?;
            }
        }
    }
    Ok(())
}

/// Print hits as a JSON array
pub fn print_hits_json(hits: &[LookupHit]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    serde_json::to_writer_pretty(&mut lock, hits)?;
    writeln!(lock)
}

/// Print the hit count to stderr so stdout stays parseable
pub fn print_hit_count(count: usize, color: bool) -> io::Result<()> {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stderr = StandardStream::stderr(choice);
    stderr.set_color(ColorSpec::new().set_dimmed(true))?;
    match count {
        0 => writeln!(stderr, "no matches")?,
        1 => writeln!(stderr, "1 match")?,
        n => writeln!(stderr, "{n} matches")?,
    }
    stderr.reset()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glossary::record::{GlossaryKey, TermRecord};
    use crate::query::MatchKind;
    use termcolor::{Buffer, NoColor};

    fn hit(note: Option<&str>) -> LookupHit {
        let key = GlossaryKey::new("spec", "en", "ja");
        LookupHit {
            record_id: 0,
            project: "docs".into(),
            record: TermRecord::new(&key, "end user", "エンドユーザー", note.map(String::from))
                .unwrap(),
            match_kind: MatchKind::Token,
            snippets: vec![
                Snippet::Text("end ".into()),
                Snippet::Keyword("user".into()),
            ],
        }
    }

    #[test]
    fn test_write_hits_plain() {
        let mut out = NoColor::new(Vec::new());
        write_hits(&mut out, &[hit(None), hit(Some("UI only"))]).unwrap();

        let text = String::from_utf8(out.into_inner()).unwrap();
        assert_eq!(
            text,
            "spec (en -> ja)  end user => エンドユーザー\n\
             spec (en -> ja)  end user => エンドユーザー  # UI only\n"
        );
    }

    #[test]
    fn test_write_hits_highlights_keyword() {
        let mut out = Buffer::ansi();
        write_hits(&mut out, &[hit(None)]).unwrap();

        let text = String::from_utf8(out.into_inner()).unwrap();
        assert!(text.contains("\x1b[31m"));
        assert!(text.contains("user\x1b[0m"));
    }

    #[test]
    fn test_hits_json_shape() {
        let json = serde_json::to_value([hit(None)]).unwrap();
        assert_eq!(json[0]["source_term"], "end user");
        assert_eq!(json[0]["match_kind"], "token");
        assert_eq!(json[0]["project"], "docs");
        assert_eq!(json[0]["snippets"][1]["kind"], "keyword");
    }
}
