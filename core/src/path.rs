//! Command path and input line normalization.

/// Normalizes a command path or an input line.
///
/// Leading and trailing whitespace is removed, internal whitespace runs
/// collapse to a single space, and a carriage return truncates the line.
///
/// # Examples
///
/// ```
/// use cmdtree_core::normalize;
///
/// assert_eq!(normalize("  show \t  instance  "), "show instance");
/// assert_eq!(normalize("reload config\r\ntrailing"), "reload config");
/// ```
pub fn normalize(input: &str) -> String {
    let line = match input.find('\r') {
        Some(cr) => &input[..cr],
        None => input,
    };

    let mut out = String::with_capacity(line.len());
    for word in line.split_ascii_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Length of the parent prefix of a normalized path, or `None` when the
/// parent is the root.
///
/// `"show interface"` has a parent prefix of length 4 (`"show"`).
pub fn parent_len(path: &str) -> Option<usize> {
    path.rfind(' ')
}

/// Last segment of a normalized path.
pub fn leaf_name(path: &str) -> &str {
    match parent_len(path) {
        Some(len) => &path[len + 1..],
        None => path,
    }
}
