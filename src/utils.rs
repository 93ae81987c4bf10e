use std::fmt::Formatter;

/// `Debug` output for error enums: the error itself, followed by every
/// `source` in the chain. Without this, `{:?}` on a wrapped `reqwest::Error`
/// hides what actually went wrong on the wire.
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{e}\n")?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{cause}")?;
        current = cause.source();
    }
    Ok(())
}

/// Clean a single-line text input the way the host's settings form expects:
/// markup is stripped, line breaks and tabs become spaces, runs of whitespace
/// collapse to one, and the ends are trimmed.
///
/// Only `<` followed by a letter, `/` or `!` and closed by a later `>` counts
/// as a tag; any other `<` is kept, since it may be part of a password.
pub fn sanitize_text_field(input: &str) -> String {
    let mut stripped = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find('<') {
        stripped.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let opens_tag = tail
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!');
        match tail.find('>') {
            Some(end) if opens_tag => rest = &tail[end + 1..],
            _ => {
                stripped.push('<');
                rest = tail;
            }
        }
    }
    stripped.push_str(rest);
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
