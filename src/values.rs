//! Header/cookie value loader: a leading `@` means "read newline-delimited values
//! from this filesystem path", curl-compatible.

const FILE_MARKER: char = '@';

/// Expand `raw` CLI-supplied `--header`/`--cookie` values: entries starting with `@`
/// are replaced by the newline-delimited contents of that file; everything else
/// passes through unchanged. Returns an error naming the unreadable path.
pub fn load(raw: &[String]) -> std::io::Result<Vec<String>> {
    let mut out = Vec::with_capacity(raw.len());

    for v in raw {
        match v.strip_prefix(FILE_MARKER) {
            Some(path) => out.extend(load_file(path)?),
            None => out.push(v.clone()),
        }
    }

    Ok(out)
}

fn load_file(path: &str) -> std::io::Result<Vec<String>> {
    let body = std::fs::read_to_string(path)?;
    Ok(body.lines().map(str::to_string).collect())
}
